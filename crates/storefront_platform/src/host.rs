//! Host traits implemented by each page backend (browser, headless)

use std::fmt::Debug;

use crate::report::TrackedEvent;

/// The subset of the DOM the page controllers need.
///
/// Selectors are plain CSS selector strings; each backend decides how much of
/// the selector grammar it supports. Lookups that find nothing return `None`
/// rather than failing.
pub trait Document {
    /// Handle to one element
    type Node: Clone + PartialEq + Debug;

    /// All elements matching `selector`, in document order
    fn query_all(&self, selector: &str) -> Vec<Self::Node>;

    /// First element matching `selector`
    fn query_first(&self, selector: &str) -> Option<Self::Node> {
        self.query_all(selector).into_iter().next()
    }

    /// First descendant of `root` matching `selector`
    fn query_within(&self, root: &Self::Node, selector: &str) -> Option<Self::Node>;

    /// Nearest inclusive ancestor of `node` matching `selector`
    fn closest(&self, node: &Self::Node, selector: &str) -> Option<Self::Node>;

    /// Whether `node` is `ancestor` or one of its descendants
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);

    fn has_attribute(&self, node: &Self::Node, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    /// Element id, treating an empty id as absent
    fn id(&self, node: &Self::Node) -> Option<String> {
        self.attribute(node, "id").filter(|id| !id.is_empty())
    }

    fn tab_index(&self, node: &Self::Node) -> i32;

    fn set_tab_index(&mut self, node: &Self::Node, index: i32);

    /// Move keyboard focus to `node`
    fn focus(&mut self, node: &Self::Node);

    /// Concatenated text of `node` and its descendants
    fn text_content(&self, node: &Self::Node) -> String;

    /// Intrinsic size of a loaded image, `None` until it has loaded
    fn natural_size(&self, node: &Self::Node) -> Option<(u32, u32)>;

    /// A `data-*` value on the document body
    fn body_data(&self, key: &str) -> Option<String>;
}

/// Layout measurements, queried synchronously
pub trait DocumentMetrics {
    /// Total scrollable height of the document body
    fn document_height(&self) -> f64;

    /// Height of the viewport
    fn viewport_height(&self) -> f64;

    /// Current vertical scroll offset
    fn scroll_y(&self) -> f64;
}

/// Schedules `AnimationFrame` events
pub trait FrameScheduler {
    /// Ask for one animation-frame callback.
    ///
    /// The host later dispatches `PageEvent::AnimationFrame` exactly once per
    /// request.
    fn request_frame(&mut self);
}

/// Fire-and-forget analytics transport
pub trait EventReporter {
    /// Send one event. Must never fail observably; a host without a transport
    /// drops the event.
    fn report(&mut self, event: &TrackedEvent);
}

/// Browser navigation and environment queries
pub trait Navigator {
    /// Path component of the current URL (e.g. `/kalotina.html`)
    fn current_path(&self) -> String;

    /// The browser's user agent string
    fn user_agent(&self) -> String;
}

/// Everything a page backend provides
pub trait Host: Document + DocumentMetrics + FrameScheduler + EventReporter + Navigator {
    /// Get the host name
    ///
    /// Returns a string like "web" or "headless".
    fn name(&self) -> &'static str;
}
