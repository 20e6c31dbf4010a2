//! `web-sys` implementation of the storefront host traits

use js_sys::{Function, Object, Reflect};
use storefront_platform::{
    Document, DocumentMetrics, EventReporter, FrameScheduler, Host, Navigator, ParamValue,
    PlatformError, Result, TrackedEvent,
};
use tracing::{debug, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlElement, HtmlImageElement};

/// Browser host over the live DOM
pub struct WebHost {
    window: web_sys::Window,
    document: web_sys::Document,
    frame_callback: Option<Function>,
}

impl WebHost {
    /// Bind to the global window and document
    pub fn new() -> Result<Self> {
        let window =
            web_sys::window().ok_or_else(|| PlatformError::Unavailable("window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| PlatformError::Unavailable("document".to_string()))?;
        Ok(Self {
            window,
            document,
            frame_callback: None,
        })
    }

    pub fn window(&self) -> &web_sys::Window {
        &self.window
    }

    pub fn document(&self) -> &web_sys::Document {
        &self.document
    }

    /// Function invoked by `requestAnimationFrame`
    pub fn set_frame_callback(&mut self, callback: Function) {
        self.frame_callback = Some(callback);
    }

    fn html(node: &Element) -> Option<&HtmlElement> {
        node.dyn_ref::<HtmlElement>()
    }
}

impl Document for WebHost {
    type Node = Element;

    fn query_all(&self, selector: &str) -> Vec<Element> {
        let list = match self.document.query_selector_all(selector) {
            Ok(list) => list,
            Err(_) => {
                warn!("invalid selector {:?}", selector);
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn query_within(&self, root: &Element, selector: &str) -> Option<Element> {
        root.query_selector(selector).ok().flatten()
    }

    fn closest(&self, node: &Element, selector: &str) -> Option<Element> {
        node.closest(selector).ok().flatten()
    }

    fn contains(&self, ancestor: &Element, node: &Element) -> bool {
        ancestor.contains(Some(node.as_ref()))
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&mut self, node: &Element, name: &str, value: &str) {
        if node.set_attribute(name, value).is_err() {
            warn!("failed to set attribute {}", name);
        }
    }

    fn tab_index(&self, node: &Element) -> i32 {
        Self::html(node).map(HtmlElement::tab_index).unwrap_or(-1)
    }

    fn set_tab_index(&mut self, node: &Element, index: i32) {
        if let Some(html) = Self::html(node) {
            html.set_tab_index(index);
        }
    }

    fn focus(&mut self, node: &Element) {
        if let Some(html) = Self::html(node) {
            if html.focus().is_err() {
                debug!("focus rejected");
            }
        }
    }

    fn text_content(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn natural_size(&self, node: &Element) -> Option<(u32, u32)> {
        let image = node.dyn_ref::<HtmlImageElement>()?;
        let (width, height) = (image.natural_width(), image.natural_height());
        (image.complete() && width > 0 && height > 0).then_some((width, height))
    }

    fn body_data(&self, key: &str) -> Option<String> {
        self.document.body()?.dataset().get(key)
    }
}

impl DocumentMetrics for WebHost {
    fn document_height(&self) -> f64 {
        self.document
            .body()
            .map(|body| f64::from(body.scroll_height()))
            .unwrap_or(0.0)
    }

    fn viewport_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0)
    }

    fn scroll_y(&self) -> f64 {
        self.window
            .scroll_y()
            .or_else(|_| self.window.page_y_offset())
            .unwrap_or(0.0)
    }
}

impl FrameScheduler for WebHost {
    fn request_frame(&mut self) {
        let Some(callback) = &self.frame_callback else {
            warn!("animation frame requested before callback was installed");
            return;
        };
        if self.window.request_animation_frame(callback).is_err() {
            warn!("requestAnimationFrame failed");
        }
    }
}

impl EventReporter for WebHost {
    fn report(&mut self, event: &TrackedEvent) {
        if let Err(e) = send_to_gtag(&self.window, event) {
            debug!("analytics event {} dropped: {}", event.name, e);
        }
    }
}

impl Navigator for WebHost {
    fn current_path(&self) -> String {
        self.window.location().pathname().unwrap_or_default()
    }

    fn user_agent(&self) -> String {
        self.window.navigator().user_agent().unwrap_or_default()
    }
}

impl Host for WebHost {
    fn name(&self) -> &'static str {
        "web"
    }
}

/// `gtag("event", name, params)`
fn send_to_gtag(window: &web_sys::Window, event: &TrackedEvent) -> Result<()> {
    let gtag = Reflect::get(window, &JsValue::from_str("gtag"))
        .map_err(|_| PlatformError::Unavailable("gtag".to_string()))?;
    let gtag = gtag
        .dyn_into::<Function>()
        .map_err(|_| PlatformError::Unavailable("gtag".to_string()))?;

    let params = Object::new();
    for (key, value) in event.params() {
        let value = match value {
            ParamValue::Text(text) => JsValue::from_str(text),
            ParamValue::Number(n) => JsValue::from(n),
        };
        Reflect::set(&params, &JsValue::from_str(key), &value)
            .map_err(|e| PlatformError::Call(format!("{:?}", e)))?;
    }

    gtag.call3(
        &JsValue::UNDEFINED,
        &JsValue::from_str("event"),
        &JsValue::from_str(&event.name),
        &params,
    )
    .map_err(|e| PlatformError::Call(format!("{:?}", e)))?;
    Ok(())
}
