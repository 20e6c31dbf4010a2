//! In-memory host
//!
//! A small element tree with enough selector support for the page
//! controllers (type, `.class`, `#id`, attribute selectors, descendant and
//! child combinators, selector lists), plus scripted metrics, a frame
//! request counter and an event log. Used by tests and by tooling that runs
//! the controllers outside a browser.
//!
//! # Example
//!
//! ```
//! use storefront_platform::headless::HeadlessHost;
//! use storefront_platform::Document;
//!
//! let mut host = HeadlessHost::new();
//! let nav = host.element(host.body(), "nav", "dropdown");
//! let button = host.element(nav, "button", "dropbtn");
//!
//! assert_eq!(host.closest(&button, ".dropdown"), Some(nav));
//! ```

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{all_consuming, map, opt, value},
    error::ErrorKind,
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, terminated},
    Finish, IResult,
};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::warn;

use crate::error::{PlatformError, Result};
use crate::host::{Document, DocumentMetrics, EventReporter, FrameScheduler, Host, Navigator};
use crate::report::TrackedEvent;

/// Handle to a node in a [`HeadlessHost`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct NodeData {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: FxHashMap<String, String>,
    text: String,
    tab_index: Option<i32>,
    natural_size: Option<(u32, u32)>,
}

impl NodeData {
    fn new(tag: &str, parent: Option<NodeId>) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            parent,
            children: Vec::new(),
            attributes: FxHashMap::default(),
            text: String::new(),
            tab_index: None,
            natural_size: None,
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.attributes
            .get("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    fn default_tab_index(&self) -> i32 {
        match self.tag.as_str() {
            "a" if self.attributes.contains_key("href") => 0,
            "button" | "input" | "select" | "textarea" => 0,
            _ => -1,
        }
    }
}

/// Headless page backend
#[derive(Debug)]
pub struct HeadlessHost {
    nodes: Vec<NodeData>,
    document_height: f64,
    viewport_height: f64,
    scroll_y: f64,
    pending_frames: usize,
    reported: Vec<TrackedEvent>,
    transport: bool,
    focused: Option<NodeId>,
    path: String,
    user_agent: String,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessHost {
    /// Desktop user agent used unless overridden
    pub const DESKTOP_USER_AGENT: &'static str =
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";

    /// Create an empty page containing only `<body>`
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData::new("body", None)],
            document_height: 0.0,
            viewport_height: 0.0,
            scroll_y: 0.0,
            pending_frames: 0,
            reported: Vec::new(),
            transport: true,
            focused: None,
            path: "/".to_string(),
            user_agent: Self::DESKTOP_USER_AGENT.to_string(),
        }
    }

    /// The `<body>` element
    pub fn body(&self) -> NodeId {
        NodeId(0)
    }

    /// Append a new element under `parent`
    pub fn append(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData::new(tag, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Append an element with a space-separated class list
    pub fn element(&mut self, parent: NodeId, tag: &str, classes: &str) -> NodeId {
        let id = self.append(parent, tag);
        if !classes.is_empty() {
            self.set_attribute(&id, "class", classes);
        }
        id
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) {
        self.nodes[node.0].text = text.to_string();
    }

    /// Mark an image as loaded with the given intrinsic size
    pub fn set_natural_size(&mut self, node: NodeId, width: u32, height: u32) {
        self.nodes[node.0].natural_size = Some((width, height));
    }

    pub fn tag(&self, node: NodeId) -> &str {
        &self.nodes[node.0].tag
    }

    /// Set document and viewport heights
    pub fn set_metrics(&mut self, document_height: f64, viewport_height: f64) {
        self.document_height = document_height;
        self.viewport_height = viewport_height;
    }

    /// Move the vertical scroll offset
    pub fn scroll_to(&mut self, y: f64) {
        self.scroll_y = y;
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) {
        self.user_agent = user_agent.into();
    }

    /// Simulate a page where the analytics transport never loaded
    pub fn disable_transport(&mut self) {
        self.transport = false;
    }

    /// Consume one pending frame request, returning whether there was one
    pub fn take_frame_request(&mut self) -> bool {
        if self.pending_frames == 0 {
            return false;
        }
        self.pending_frames -= 1;
        true
    }

    pub fn pending_frames(&self) -> usize {
        self.pending_frames
    }

    /// Events delivered to the transport so far
    pub fn reported(&self) -> &[TrackedEvent] {
        &self.reported
    }

    /// Drain the event log
    pub fn take_reported(&mut self) -> Vec<TrackedEvent> {
        std::mem::take(&mut self.reported)
    }

    /// Node holding keyboard focus
    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    /// Nodes below `root` in document order, excluding `root`
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.node(root).children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        out
    }

    fn matches(&self, id: NodeId, selectors: &[ComplexSelector]) -> bool {
        selectors.iter().any(|complex| self.matches_complex(id, complex))
    }

    /// Match right to left, backtracking over descendant combinators
    fn matches_complex(&self, id: NodeId, complex: &[Compound]) -> bool {
        let Some((subject, rest)) = complex.split_last() else {
            return false;
        };
        if !self.matches_compound(id, subject) {
            return false;
        }
        if rest.is_empty() {
            return true;
        }

        let mut cursor = self.node(id).parent;
        match subject.combinator {
            Combinator::Child => cursor.is_some_and(|parent| self.matches_complex(parent, rest)),
            Combinator::Descendant => {
                while let Some(ancestor) = cursor {
                    if self.matches_complex(ancestor, rest) {
                        return true;
                    }
                    cursor = self.node(ancestor).parent;
                }
                false
            }
        }
    }

    fn matches_compound(&self, id: NodeId, compound: &Compound) -> bool {
        let node = self.node(id);
        if let Some(tag) = &compound.tag {
            if tag != "*" && *tag != node.tag {
                return false;
            }
        }
        if let Some(wanted) = &compound.id {
            if node.attributes.get("id") != Some(wanted) {
                return false;
            }
        }
        if !compound.classes.iter().all(|class| node.has_class(class)) {
            return false;
        }
        compound.attributes.iter().all(|attr| {
            let Some(value) = node.attributes.get(&attr.name) else {
                return false;
            };
            match &attr.op {
                AttrOp::Exists => true,
                AttrOp::Equals(expected) => value == expected,
                AttrOp::Prefix(prefix) => !prefix.is_empty() && value.starts_with(prefix.as_str()),
                AttrOp::Suffix(suffix) => !suffix.is_empty() && value.ends_with(suffix.as_str()),
                AttrOp::Substring(part) => !part.is_empty() && value.contains(part.as_str()),
                AttrOp::Includes(word) => value.split_whitespace().any(|w| w == word),
            }
        })
    }
}

impl Document for HeadlessHost {
    type Node = NodeId;

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        let selectors = selectors_or_empty(selector);
        let root = self.body();
        std::iter::once(root)
            .chain(self.descendants(root))
            .filter(|id| self.matches(*id, &selectors))
            .collect()
    }

    fn query_within(&self, root: &NodeId, selector: &str) -> Option<NodeId> {
        let selectors = selectors_or_empty(selector);
        self.descendants(*root)
            .into_iter()
            .find(|id| self.matches(*id, &selectors))
    }

    fn closest(&self, node: &NodeId, selector: &str) -> Option<NodeId> {
        let selectors = selectors_or_empty(selector);
        let mut cursor = Some(*node);
        while let Some(id) = cursor {
            if self.matches(id, &selectors) {
                return Some(id);
            }
            cursor = self.node(id).parent;
        }
        None
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        let mut cursor = Some(*node);
        while let Some(id) = cursor {
            if id == *ancestor {
                return true;
            }
            cursor = self.node(id).parent;
        }
        false
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.node(*node).attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        self.nodes[node.0]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn tab_index(&self, node: &NodeId) -> i32 {
        let data = self.node(*node);
        data.tab_index.unwrap_or_else(|| data.default_tab_index())
    }

    fn set_tab_index(&mut self, node: &NodeId, index: i32) {
        self.nodes[node.0].tab_index = Some(index);
    }

    fn focus(&mut self, node: &NodeId) {
        self.focused = Some(*node);
    }

    fn text_content(&self, node: &NodeId) -> String {
        let mut text = self.node(*node).text.clone();
        for id in self.descendants(*node) {
            text.push_str(&self.node(id).text);
        }
        text
    }

    fn natural_size(&self, node: &NodeId) -> Option<(u32, u32)> {
        self.node(*node).natural_size
    }

    fn body_data(&self, key: &str) -> Option<String> {
        self.attribute(&self.body(), &format!("data-{key}"))
    }
}

impl DocumentMetrics for HeadlessHost {
    fn document_height(&self) -> f64 {
        self.document_height
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }
}

impl FrameScheduler for HeadlessHost {
    fn request_frame(&mut self) {
        self.pending_frames += 1;
    }
}

impl EventReporter for HeadlessHost {
    fn report(&mut self, event: &TrackedEvent) {
        if self.transport {
            self.reported.push(event.clone());
        }
    }
}

impl Navigator for HeadlessHost {
    fn current_path(&self) -> String {
        self.path.clone()
    }

    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }
}

impl Host for HeadlessHost {
    fn name(&self) -> &'static str {
        "headless"
    }
}

// ============================================================================
// Selectors
// ============================================================================

type ComplexSelector = Vec<Compound>;

/// Relation of a compound to the one on its left
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Combinator {
    #[default]
    Descendant,
    Child,
}

#[derive(Debug, Default, PartialEq)]
struct Compound {
    combinator: Combinator,
    tag: Option<String>,
    id: Option<String>,
    classes: SmallVec<[String; 2]>,
    attributes: SmallVec<[AttrMatch; 1]>,
}

#[derive(Debug, PartialEq)]
struct AttrMatch {
    name: String,
    op: AttrOp,
}

#[derive(Debug, PartialEq)]
enum AttrOp {
    Exists,
    Equals(String),
    Prefix(String),
    Suffix(String),
    Substring(String),
    Includes(String),
}

enum Simple<'a> {
    Class(&'a str),
    Id(&'a str),
    Attribute(AttrMatch),
}

/// Parse a selector list; pseudo-classes and sibling combinators are rejected
fn parse_selector_list(input: &str) -> Result<Vec<ComplexSelector>> {
    selector_list(input)
        .finish()
        .map(|(_, list)| list)
        .map_err(|e| PlatformError::Selector(format!("{:?} near {:?}", input, e.input)))
}

/// Invalid selectors match nothing, like a throwing `querySelectorAll`
fn selectors_or_empty(selector: &str) -> Vec<ComplexSelector> {
    match parse_selector_list(selector) {
        Ok(list) => list,
        Err(e) => {
            warn!("{}", e);
            Vec::new()
        }
    }
}

fn selector_list(input: &str) -> IResult<&str, Vec<ComplexSelector>> {
    all_consuming(delimited(
        multispace0,
        separated_list1(delimited(multispace0, char(','), multispace0), complex),
        multispace0,
    ))(input)
}

fn complex(input: &str) -> IResult<&str, ComplexSelector> {
    let (mut input, first) = compound(input)?;
    let mut parts = vec![first];
    loop {
        match pair(combinator, compound)(input) {
            Ok((rest, (relation, mut next))) => {
                next.combinator = relation;
                parts.push(next);
                input = rest;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }
    Ok((input, parts))
}

fn combinator(input: &str) -> IResult<&str, Combinator> {
    alt((
        value(Combinator::Child, delimited(multispace0, char('>'), multispace0)),
        value(Combinator::Descendant, multispace1),
    ))(input)
}

fn compound(input: &str) -> IResult<&str, Compound> {
    let (input, tag_name) = opt(alt((tag("*"), identifier)))(input)?;
    let (input, parts) = many0(simple)(input)?;
    if tag_name.is_none() && parts.is_empty() {
        return Err(nom::Err::Error(nom::error::Error::new(input, ErrorKind::Verify)));
    }

    let mut compound = Compound {
        tag: tag_name.map(str::to_ascii_lowercase),
        ..Compound::default()
    };
    for part in parts {
        match part {
            Simple::Class(class) => compound.classes.push(class.to_string()),
            Simple::Id(id) => compound.id = Some(id.to_string()),
            Simple::Attribute(attr) => compound.attributes.push(attr),
        }
    }
    Ok((input, compound))
}

fn simple(input: &str) -> IResult<&str, Simple<'_>> {
    alt((
        map(preceded(char('.'), identifier), Simple::Class),
        map(preceded(char('#'), identifier), Simple::Id),
        map(attribute, Simple::Attribute),
    ))(input)
}

/// `[name]` or `[name op value]`, value quoted or bare
fn attribute(input: &str) -> IResult<&str, AttrMatch> {
    let (input, _) = char('[')(input)?;
    let (input, name) = delimited(multispace0, identifier, multispace0)(input)?;
    let (input, rule) = opt(pair(
        terminated(
            alt((tag("^="), tag("$="), tag("*="), tag("~="), tag("="))),
            multispace0,
        ),
        terminated(alt((quoted, identifier)), multispace0),
    ))(input)?;
    let (input, _) = char(']')(input)?;

    let op = match rule {
        None => AttrOp::Exists,
        Some(("^=", v)) => AttrOp::Prefix(v.to_string()),
        Some(("$=", v)) => AttrOp::Suffix(v.to_string()),
        Some(("*=", v)) => AttrOp::Substring(v.to_string()),
        Some(("~=", v)) => AttrOp::Includes(v.to_string()),
        Some((_, v)) => AttrOp::Equals(v.to_string()),
    };
    Ok((
        input,
        AttrMatch {
            name: name.to_ascii_lowercase(),
            op,
        },
    ))
}

fn quoted(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
        delimited(char('\''), take_while(|c: char| c != '\''), char('\'')),
    ))(input)
}

/// Parse an identifier (alphanumeric, hyphen, underscore)
fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '-' || c == '_')(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> (HeadlessHost, NodeId, NodeId, NodeId) {
        let mut host = HeadlessHost::new();
        let header = host.element(host.body(), "header", "");
        let logo = host.element(header, "img", "");
        let dropdown = host.element(host.body(), "div", "dropdown nav");
        let button = host.element(dropdown, "button", "dropbtn");
        (host, logo, dropdown, button)
    }

    #[test]
    fn test_class_and_tag_selectors() {
        let (host, logo, dropdown, button) = page();
        assert_eq!(host.query_all(".dropdown"), vec![dropdown]);
        assert_eq!(host.query_all("div.nav"), vec![dropdown]);
        assert_eq!(host.query_all("button.dropbtn"), vec![button]);
        assert_eq!(host.query_first("header img"), Some(logo));
        assert_eq!(host.query_first(".missing, header img"), Some(logo));
        assert!(host.query_all("span").is_empty());
    }

    #[test]
    fn test_attribute_selectors() {
        let mut host = HeadlessHost::new();
        let call = host.element(host.body(), "a", "");
        host.set_attribute(&call, "href", "tel:+359877845569");
        let site = host.element(host.body(), "a", "");
        host.set_attribute(&site, "href", "/english.html");

        assert_eq!(host.query_all("a[href^=\"tel:\"]"), vec![call]);
        assert_eq!(host.query_all("a[href='/english.html']"), vec![site]);
        assert_eq!(host.query_all("a[href]").len(), 2);
    }

    #[test]
    fn test_document_order() {
        let mut host = HeadlessHost::new();
        let first = host.element(host.body(), "div", "item");
        let second = host.element(host.body(), "div", "item");
        let nested = host.element(first, "div", "item");
        assert_eq!(host.query_all(".item"), vec![first, nested, second]);
    }

    #[test]
    fn test_closest_and_contains() {
        let (mut host, _, dropdown, button) = page();
        let icon = host.element(button, "span", "caret");
        assert_eq!(host.closest(&icon, ".dropdown"), Some(dropdown));
        assert_eq!(host.closest(&button, ".dropbtn"), Some(button));
        assert!(host.contains(&dropdown, &icon));
        assert!(host.contains(&dropdown, &dropdown));
        assert!(!host.contains(&button, &dropdown));
    }

    #[test]
    fn test_descendant_selector_requires_ancestor() {
        let mut host = HeadlessHost::new();
        let stray = host.element(host.body(), "img", "");
        let container = host.element(host.body(), "div", "header-container");
        let logo = host.element(container, "img", "");
        assert_eq!(host.query_all(".header-container img"), vec![logo]);
        assert_ne!(host.query_first(".header-container img"), Some(stray));
    }

    #[test]
    fn test_child_combinator_only_matches_direct_children() {
        let mut host = HeadlessHost::new();
        let dropdown = host.element(host.body(), "div", "dropdown");
        let wrap = host.element(dropdown, "div", "wrap");
        let nested = host.element(wrap, "div", "dropdown-content");
        let direct = host.element(dropdown, "div", "dropdown-content");

        assert_eq!(host.query_all(".dropdown > .dropdown-content"), vec![direct]);
        assert_eq!(host.query_all(".dropdown>.dropdown-content"), vec![direct]);
        assert_eq!(host.query_all(".dropdown .dropdown-content"), vec![nested, direct]);
        assert_eq!(host.query_all("body > .dropdown > .wrap > div"), vec![nested]);
        assert!(host.query_all(".wrap > .dropdown").is_empty());
    }

    #[test]
    fn test_descendant_backtracks_past_first_ancestor() {
        let mut host = HeadlessHost::new();
        let outer = host.element(host.body(), "div", "a");
        let middle = host.element(outer, "div", "b");
        let inner = host.element(middle, "div", "b");
        let leaf = host.element(inner, "span", "");
        // The nearest `.b` has a `.b` parent; only the outer one sits under `.a`
        assert_eq!(host.query_all(".a > .b span"), vec![leaf]);
        assert_eq!(host.query_all(".a > .b > .b > span"), vec![leaf]);
        assert!(host.query_all(".b > .a span").is_empty());
    }

    #[test]
    fn test_quoted_attribute_values_with_commas_and_spaces() {
        let mut host = HeadlessHost::new();
        let link = host.element(host.body(), "a", "");
        host.set_attribute(&link, "title", "x, y");
        let other = host.element(host.body(), "a", "");
        host.set_attribute(&other, "title", "call us now");

        assert_eq!(host.query_all(r#"a[title="x, y"]"#), vec![link]);
        assert_eq!(host.query_all("a[title='call us now']"), vec![other]);
        assert_eq!(host.query_all(r#"a[title="x, y"], a[title~=us]"#), vec![link, other]);
        assert_eq!(host.query_all("a[ title $= 'now' ]"), vec![other]);
        assert_eq!(host.query_all("a[title*=', ']"), vec![link]);
    }

    #[test]
    fn test_unsupported_selectors_match_nothing() {
        let (host, _, _, button) = page();
        assert!(parse_selector_list("button:hover").is_err());
        assert!(parse_selector_list(".a + .b").is_err());
        assert!(parse_selector_list(".dropdown >").is_err());
        assert!(parse_selector_list("a[title=\"open").is_err());
        assert!(parse_selector_list("").is_err());

        assert!(host.query_all("button:hover").is_empty());
        assert_eq!(host.closest(&button, ".dropbtn:focus"), None);
        assert!(matches!(
            parse_selector_list(".x ~ .y"),
            Err(PlatformError::Selector(_))
        ));
    }

    #[test]
    fn test_selector_list_whitespace() {
        let (host, logo, dropdown, _) = page();
        assert_eq!(
            host.query_all("  header img ,\n .dropdown  "),
            vec![logo, dropdown]
        );
    }

    #[test]
    fn test_tab_index_defaults() {
        let mut host = HeadlessHost::new();
        let div = host.element(host.body(), "div", "");
        let button = host.element(host.body(), "button", "");
        assert_eq!(host.tab_index(&div), -1);
        assert_eq!(host.tab_index(&button), 0);
        host.set_tab_index(&div, 0);
        assert_eq!(host.tab_index(&div), 0);
    }

    #[test]
    fn test_text_content_and_body_data() {
        let (mut host, _, _, button) = page();
        host.set_text(button, "  Services ");
        let caret = host.element(button, "span", "");
        host.set_text(caret, "v");
        assert_eq!(host.text_content(&button), "  Services v");

        let body = host.body();
        host.set_attribute(&body, "data-location", "Kalotina");
        assert_eq!(host.body_data("location").as_deref(), Some("Kalotina"));
        assert_eq!(host.body_data("missing"), None);
    }

    #[test]
    fn test_frames_and_transport() {
        let mut host = HeadlessHost::new();
        host.request_frame();
        assert_eq!(host.pending_frames(), 1);
        assert!(host.take_frame_request());
        assert!(!host.take_frame_request());

        host.report(&TrackedEvent::new("a", "b", "c"));
        host.disable_transport();
        host.report(&TrackedEvent::new("d", "e", "f"));
        assert_eq!(host.reported().len(), 1);
    }
}
