//! Analytics payloads handed to the event reporter

use serde::Serialize;
use smallvec::SmallVec;

/// One analytics event.
///
/// Serializes to the parameter object of the transport call
/// (`event_category`, `event_label`, optional `value`); the name travels
/// separately as the event action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TrackedEvent {
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "event_category")]
    pub category: String,
    #[serde(rename = "event_label")]
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u32>,
}

/// A single transport parameter value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamValue<'a> {
    Text(&'a str),
    Number(u32),
}

impl TrackedEvent {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            label: label.into(),
            value: None,
        }
    }

    /// Attach a numeric value
    pub fn with_value(mut self, value: u32) -> Self {
        self.value = Some(value);
        self
    }

    /// Transport parameters in a fixed order
    pub fn params(&self) -> SmallVec<[(&'static str, ParamValue<'_>); 3]> {
        let mut params = SmallVec::new();
        params.push(("event_category", ParamValue::Text(&self.category)));
        params.push(("event_label", ParamValue::Text(&self.label)));
        if let Some(value) = self.value {
            params.push(("value", ParamValue::Number(value)));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_without_value() {
        let event = TrackedEvent::new("scroll_depth", "Engagement", "25%");
        let params = event.params();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0], ("event_category", ParamValue::Text("Engagement")));
        assert_eq!(params[1], ("event_label", ParamValue::Text("25%")));
    }

    #[test]
    fn test_serialized_shape() {
        let event = TrackedEvent::new("generate_lead", "Contact", "Location Sent").with_value(1);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "event_category": "Contact",
                "event_label": "Location Sent",
                "value": 1
            })
        );
    }
}
