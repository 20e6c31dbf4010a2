//! Accessible dropdown controller
//!
//! Makes CSS-only dropdowns (a trigger plus a sibling panel inside a shared
//! container) operable by mouse, keyboard and assistive technology:
//!
//! - the trigger becomes focusable and points at the panel via `aria-controls`
//! - open state is mirrored into `aria-expanded` (trigger) and `aria-hidden`
//!   (panel), which the stylesheet keys off
//! - click, Space or Enter on the trigger toggles
//! - Escape on the trigger closes and keeps focus on it
//! - a click outside a widget's container closes that widget
//! - Escape anywhere closes every widget
//!
//! Widgets are independent; closing one never touches another.
//!
//! # Example
//!
//! ```
//! use storefront_core::dropdown::{DropdownController, DropdownSelectors};
//! use storefront_platform::headless::HeadlessHost;
//! use storefront_platform::Document;
//!
//! let mut host = HeadlessHost::new();
//! let nav = host.element(host.body(), "div", "dropdown");
//! let button = host.element(nav, "button", "dropbtn");
//! let panel = host.element(nav, "div", "dropdown-content");
//!
//! let mut dropdowns = DropdownController::new(DropdownSelectors::default());
//! assert_eq!(dropdowns.wire_all(&mut host), 1);
//!
//! dropdowns.on_trigger_activate(&mut host, &button);
//! assert_eq!(host.attribute(&button, "aria-expanded").as_deref(), Some("true"));
//! assert_eq!(host.attribute(&panel, "aria-hidden").as_deref(), Some("false"));
//! ```

use std::fmt::Debug;

use slotmap::{new_key_type, SlotMap};
use storefront_platform::{DefaultAction, Document, Key};
use tracing::debug;

use crate::config::Selectors;

new_key_type! {
    /// Handle to one wired dropdown
    pub struct DropdownId;
}

/// Selectors locating the three parts of a dropdown
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropdownSelectors {
    pub trigger: String,
    pub container: String,
    pub panel: String,
}

impl Default for DropdownSelectors {
    fn default() -> Self {
        Self::from(&Selectors::default())
    }
}

impl From<&Selectors> for DropdownSelectors {
    fn from(selectors: &Selectors) -> Self {
        Self {
            trigger: selectors.dropdown_trigger.clone(),
            container: selectors.dropdown_container.clone(),
            panel: selectors.dropdown_panel.clone(),
        }
    }
}

/// State of one dropdown widget
#[derive(Clone, Debug)]
pub struct DropdownState<N> {
    is_open: bool,
    trigger: N,
    container: N,
    menu: N,
    menu_id: String,
}

impl<N> DropdownState<N> {
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn trigger(&self) -> &N {
        &self.trigger
    }

    pub fn container(&self) -> &N {
        &self.container
    }

    pub fn menu(&self) -> &N {
        &self.menu
    }

    /// Id linking the trigger's `aria-controls` to the panel
    pub fn menu_id(&self) -> &str {
        &self.menu_id
    }

    /// Set the state and mirror it into the ARIA attributes
    fn set_open<D>(&mut self, doc: &mut D, open: bool)
    where
        D: Document<Node = N> + ?Sized,
    {
        self.is_open = open;
        doc.set_attribute(&self.trigger, "aria-expanded", bool_attr(open));
        doc.set_attribute(&self.menu, "aria-hidden", bool_attr(!open));
    }
}

fn bool_attr(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Owns every dropdown on the page
#[derive(Debug)]
pub struct DropdownController<N> {
    widgets: SlotMap<DropdownId, DropdownState<N>>,
    selectors: DropdownSelectors,
}

impl<N: Clone + PartialEq + Debug> DropdownController<N> {
    pub fn new(selectors: DropdownSelectors) -> Self {
        Self {
            widgets: SlotMap::with_key(),
            selectors,
        }
    }

    /// Wire every trigger in the document; returns how many were wired.
    ///
    /// A trigger's index (used for generated panel ids) is its position among
    /// all matching triggers, including ones that end up skipped.
    pub fn wire_all<D>(&mut self, doc: &mut D) -> usize
    where
        D: Document<Node = N> + ?Sized,
    {
        let mut wired = 0;
        for (index, trigger) in doc.query_all(&self.selectors.trigger).into_iter().enumerate() {
            if self.wire(doc, trigger, index).is_some() {
                wired += 1;
            }
        }
        wired
    }

    /// Wire a single trigger. Returns `None` when the trigger has no
    /// enclosing container or the container has no panel.
    pub fn wire<D>(&mut self, doc: &mut D, trigger: N, index: usize) -> Option<DropdownId>
    where
        D: Document<Node = N> + ?Sized,
    {
        if let Some(existing) = self.find_by_trigger(&trigger) {
            return Some(existing);
        }

        if doc.tab_index(&trigger) < 0 {
            doc.set_tab_index(&trigger, 0);
        }

        let Some(container) = doc.closest(&trigger, &self.selectors.container) else {
            debug!(index, "dropdown trigger outside a container, skipping");
            return None;
        };
        let Some(menu) = doc.query_within(&container, &self.selectors.panel) else {
            debug!(index, "dropdown container without a panel, skipping");
            return None;
        };

        let menu_id = match doc.id(&menu) {
            Some(id) => id,
            None => {
                let id = format!("dropdown-menu-{index}");
                doc.set_attribute(&menu, "id", &id);
                id
            }
        };
        doc.set_attribute(&trigger, "aria-controls", &menu_id);

        let mut state = DropdownState {
            is_open: false,
            trigger,
            container,
            menu,
            menu_id,
        };
        state.set_open(doc, false);

        let id = self.widgets.insert(state);
        debug!(?id, index, "dropdown wired");
        Some(id)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn get(&self, id: DropdownId) -> Option<&DropdownState<N>> {
        self.widgets.get(id)
    }

    pub fn is_open(&self, id: DropdownId) -> bool {
        self.widgets.get(id).is_some_and(|w| w.is_open)
    }

    /// Number of currently open dropdowns
    pub fn open_count(&self) -> usize {
        self.widgets.values().filter(|w| w.is_open).count()
    }

    pub fn ids(&self) -> impl Iterator<Item = DropdownId> + '_ {
        self.widgets.keys()
    }

    /// Dropdown whose trigger is exactly `trigger`
    pub fn find_by_trigger(&self, trigger: &N) -> Option<DropdownId> {
        self.widgets
            .iter()
            .find(|(_, w)| w.trigger == *trigger)
            .map(|(id, _)| id)
    }

    /// Dropdown whose trigger is `target` or contains it
    pub fn find_trigger_for<D>(&self, doc: &D, target: &N) -> Option<DropdownId>
    where
        D: Document<Node = N> + ?Sized,
    {
        self.widgets
            .iter()
            .find(|(_, w)| doc.contains(&w.trigger, target))
            .map(|(id, _)| id)
    }

    /// Flip a dropdown; returns the new state
    pub fn toggle<D>(&mut self, doc: &mut D, id: DropdownId) -> Option<bool>
    where
        D: Document<Node = N> + ?Sized,
    {
        let widget = self.widgets.get_mut(id)?;
        let open = !widget.is_open;
        widget.set_open(doc, open);
        Some(open)
    }

    pub fn open<D>(&mut self, doc: &mut D, id: DropdownId)
    where
        D: Document<Node = N> + ?Sized,
    {
        if let Some(widget) = self.widgets.get_mut(id) {
            widget.set_open(doc, true);
        }
    }

    pub fn close<D>(&mut self, doc: &mut D, id: DropdownId)
    where
        D: Document<Node = N> + ?Sized,
    {
        if let Some(widget) = self.widgets.get_mut(id) {
            widget.set_open(doc, false);
        }
    }

    /// Click on (or inside) a trigger
    pub fn on_trigger_activate<D>(&mut self, doc: &mut D, target: &N) -> DefaultAction
    where
        D: Document<Node = N> + ?Sized,
    {
        let Some(id) = self.find_trigger_for(&*doc, target) else {
            return DefaultAction::Allow;
        };
        self.toggle(doc, id);
        DefaultAction::Prevent
    }

    /// Key press while a trigger has focus
    pub fn on_trigger_key<D>(&mut self, doc: &mut D, target: &N, key: &Key) -> DefaultAction
    where
        D: Document<Node = N> + ?Sized,
    {
        let Some(id) = self.find_trigger_for(&*doc, target) else {
            return DefaultAction::Allow;
        };

        match key {
            key if key.is_activation() => {
                self.toggle(doc, id);
                DefaultAction::Prevent
            }
            Key::Escape => {
                self.close(doc, id);
                if let Some(widget) = self.widgets.get(id) {
                    doc.focus(&widget.trigger);
                }
                DefaultAction::Allow
            }
            _ => DefaultAction::Allow,
        }
    }

    /// Document-wide click: close every dropdown whose container does not
    /// contain `target`
    pub fn on_outside_click<D>(&mut self, doc: &mut D, target: &N)
    where
        D: Document<Node = N> + ?Sized,
    {
        for widget in self.widgets.values_mut() {
            if !doc.contains(&widget.container, target) {
                widget.set_open(doc, false);
            }
        }
    }

    /// Document-wide Escape: close everything, wherever focus is
    pub fn on_escape<D>(&mut self, doc: &mut D)
    where
        D: Document<Node = N> + ?Sized,
    {
        for widget in self.widgets.values_mut() {
            widget.set_open(doc, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_platform::headless::{HeadlessHost, NodeId};

    struct Widget {
        container: NodeId,
        trigger: NodeId,
        menu: NodeId,
    }

    fn add_widget(host: &mut HeadlessHost, trigger_tag: &str) -> Widget {
        let body = host.body();
        let container = host.element(body, "div", "dropdown");
        let trigger = host.element(container, trigger_tag, "dropbtn");
        let menu = host.element(container, "div", "dropdown-content");
        let item = host.element(menu, "a", "");
        host.set_attribute(&item, "href", "/services.html");
        Widget {
            container,
            trigger,
            menu,
        }
    }

    fn controller() -> DropdownController<NodeId> {
        DropdownController::new(DropdownSelectors::default())
    }

    fn attr(host: &HeadlessHost, node: NodeId, name: &str) -> Option<String> {
        host.attribute(&node, name)
    }

    #[test]
    fn test_wire_sets_aria_and_ids() {
        let mut host = HeadlessHost::new();
        let a = add_widget(&mut host, "span");
        let b = add_widget(&mut host, "button");
        host.set_attribute(&b.menu, "id", "services-menu");

        let mut dropdowns = controller();
        assert_eq!(dropdowns.wire_all(&mut host), 2);

        let state = dropdowns.get(dropdowns.find_by_trigger(&a.trigger).unwrap()).unwrap();
        assert_eq!(state.container(), &a.container);
        assert_eq!(state.menu(), &a.menu);
        assert!(!state.is_open());

        assert_eq!(attr(&host, a.menu, "id").as_deref(), Some("dropdown-menu-0"));
        assert_eq!(
            attr(&host, a.trigger, "aria-controls").as_deref(),
            Some("dropdown-menu-0")
        );
        assert_eq!(
            attr(&host, b.trigger, "aria-controls").as_deref(),
            Some("services-menu")
        );
        for w in [&a, &b] {
            assert_eq!(attr(&host, w.trigger, "aria-expanded").as_deref(), Some("false"));
            assert_eq!(attr(&host, w.menu, "aria-hidden").as_deref(), Some("true"));
            assert_eq!(host.tab_index(&w.trigger), 0);
        }
    }

    #[test]
    fn test_missing_structure_is_skipped() {
        let mut host = HeadlessHost::new();
        let body = host.body();
        // Trigger without a container
        let stray = host.element(body, "span", "dropbtn");
        // Container without a panel
        let empty = host.element(body, "div", "dropdown");
        host.element(empty, "span", "dropbtn");
        let wired = add_widget(&mut host, "span");

        let mut dropdowns = controller();
        assert_eq!(dropdowns.wire_all(&mut host), 1);
        assert_eq!(dropdowns.len(), 1);

        // Skipped triggers still consume an index
        assert_eq!(
            attr(&host, wired.menu, "id").as_deref(),
            Some("dropdown-menu-2")
        );
        assert_eq!(attr(&host, stray, "aria-expanded"), None);
        // Focusability is applied before the structure check
        assert_eq!(host.tab_index(&stray), 0);
    }

    #[test]
    fn test_wire_is_idempotent_per_trigger() {
        let mut host = HeadlessHost::new();
        add_widget(&mut host, "span");
        let mut dropdowns = controller();
        dropdowns.wire_all(&mut host);
        dropdowns.wire_all(&mut host);
        assert_eq!(dropdowns.len(), 1);
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let mut host = HeadlessHost::new();
        let w = add_widget(&mut host, "span");
        let mut dropdowns = controller();
        dropdowns.wire_all(&mut host);
        let id = dropdowns.find_by_trigger(&w.trigger).unwrap();

        let before = (
            attr(&host, w.trigger, "aria-expanded"),
            attr(&host, w.menu, "aria-hidden"),
        );
        assert_eq!(dropdowns.toggle(&mut host, id), Some(true));
        assert_eq!(attr(&host, w.trigger, "aria-expanded").as_deref(), Some("true"));
        assert_eq!(attr(&host, w.menu, "aria-hidden").as_deref(), Some("false"));
        assert_eq!(dropdowns.toggle(&mut host, id), Some(false));

        let after = (
            attr(&host, w.trigger, "aria-expanded"),
            attr(&host, w.menu, "aria-hidden"),
        );
        assert_eq!(before, after);
        assert!(!dropdowns.is_open(id));
    }

    #[test]
    fn test_open_close_idempotent() {
        let mut host = HeadlessHost::new();
        let w = add_widget(&mut host, "span");
        let mut dropdowns = controller();
        dropdowns.wire_all(&mut host);
        let id = dropdowns.find_by_trigger(&w.trigger).unwrap();

        dropdowns.open(&mut host, id);
        dropdowns.open(&mut host, id);
        assert!(dropdowns.is_open(id));
        dropdowns.close(&mut host, id);
        dropdowns.close(&mut host, id);
        assert!(!dropdowns.is_open(id));
        assert_eq!(attr(&host, w.menu, "aria-hidden").as_deref(), Some("true"));
    }

    #[test]
    fn test_click_on_trigger_child_toggles() {
        let mut host = HeadlessHost::new();
        let w = add_widget(&mut host, "span");
        let caret = host.element(w.trigger, "i", "caret");
        let mut dropdowns = controller();
        dropdowns.wire_all(&mut host);

        assert_eq!(
            dropdowns.on_trigger_activate(&mut host, &caret),
            DefaultAction::Prevent
        );
        assert_eq!(dropdowns.open_count(), 1);

        // Clicks elsewhere are not trigger activations
        assert_eq!(
            dropdowns.on_trigger_activate(&mut host, &w.menu),
            DefaultAction::Allow
        );
        assert_eq!(dropdowns.open_count(), 1);
    }

    #[test]
    fn test_clicking_other_trigger_switches_dropdowns() {
        let mut host = HeadlessHost::new();
        let a = add_widget(&mut host, "span");
        let b = add_widget(&mut host, "span");
        let mut dropdowns = controller();
        dropdowns.wire_all(&mut host);
        let id_a = dropdowns.find_by_trigger(&a.trigger).unwrap();
        let id_b = dropdowns.find_by_trigger(&b.trigger).unwrap();

        dropdowns.on_trigger_activate(&mut host, &a.trigger);
        dropdowns.on_outside_click(&mut host, &a.trigger);
        assert!(dropdowns.is_open(id_a));

        // Trigger listener runs before the bubbling document listener
        dropdowns.on_trigger_activate(&mut host, &b.trigger);
        dropdowns.on_outside_click(&mut host, &b.trigger);
        assert!(!dropdowns.is_open(id_a));
        assert!(dropdowns.is_open(id_b));
    }

    #[test]
    fn test_click_inside_panel_keeps_open() {
        let mut host = HeadlessHost::new();
        let w = add_widget(&mut host, "span");
        let mut dropdowns = controller();
        dropdowns.wire_all(&mut host);
        let id = dropdowns.find_by_trigger(&w.trigger).unwrap();

        dropdowns.open(&mut host, id);
        dropdowns.on_outside_click(&mut host, &w.menu);
        assert!(dropdowns.is_open(id));

        let body = host.body();
        dropdowns.on_outside_click(&mut host, &body);
        assert!(!dropdowns.is_open(id));
    }

    #[test]
    fn test_keyboard_activation() {
        let mut host = HeadlessHost::new();
        let w = add_widget(&mut host, "span");
        let mut dropdowns = controller();
        dropdowns.wire_all(&mut host);
        let id = dropdowns.find_by_trigger(&w.trigger).unwrap();

        assert_eq!(
            dropdowns.on_trigger_key(&mut host, &w.trigger, &Key::Space),
            DefaultAction::Prevent
        );
        assert!(dropdowns.is_open(id));
        assert_eq!(
            dropdowns.on_trigger_key(&mut host, &w.trigger, &Key::Enter),
            DefaultAction::Prevent
        );
        assert!(!dropdowns.is_open(id));
        assert_eq!(
            dropdowns.on_trigger_key(&mut host, &w.trigger, &Key::Char('a')),
            DefaultAction::Allow
        );
        assert!(!dropdowns.is_open(id));
    }

    #[test]
    fn test_escape_on_trigger_closes_and_focuses() {
        let mut host = HeadlessHost::new();
        let w = add_widget(&mut host, "span");
        let mut dropdowns = controller();
        dropdowns.wire_all(&mut host);
        let id = dropdowns.find_by_trigger(&w.trigger).unwrap();

        dropdowns.open(&mut host, id);
        dropdowns.on_trigger_key(&mut host, &w.trigger, &Key::Escape);
        assert!(!dropdowns.is_open(id));
        assert_eq!(host.focused(), Some(w.trigger));
    }

    #[test]
    fn test_global_escape_closes_all() {
        let mut host = HeadlessHost::new();
        let widgets: Vec<Widget> = (0..3).map(|_| add_widget(&mut host, "span")).collect();
        let mut dropdowns = controller();
        dropdowns.wire_all(&mut host);

        let ids: Vec<DropdownId> = dropdowns.ids().collect();
        for id in &ids {
            dropdowns.open(&mut host, *id);
        }
        assert_eq!(dropdowns.open_count(), 3);

        dropdowns.on_escape(&mut host);
        assert_eq!(dropdowns.open_count(), 0);
        for w in &widgets {
            assert_eq!(attr(&host, w.trigger, "aria-expanded").as_deref(), Some("false"));
        }
        // Focus is left alone by the global handler
        assert_eq!(host.focused(), None);
    }
}
