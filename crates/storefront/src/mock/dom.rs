//! Minimal DOM for the in-memory storefront.
//!
//! Pages are built as an [`Element`] tree and flattened into a [`Dom`]
//! arena in document (pre-)order, so node ids compare like document
//! positions and every subtree is a contiguous id range.

use std::ops::Range;

use super::storefront::Action;

/// Index of a node in a [`Dom`]; smaller ids come first in document order
pub type NodeId = usize;

/// Element under construction
#[derive(Debug, Clone, Default)]
pub struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    hidden: bool,
    disabled: bool,
    action: Option<Action>,
    children: Vec<Element>,
}

impl Element {
    /// New element with the given tag name
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Set an attribute, replacing an earlier value
    #[must_use]
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
        self
    }

    /// Set the `class` attribute
    #[must_use]
    pub fn class(self, classes: &str) -> Self {
        self.attr("class", classes)
    }

    /// Set the `id` attribute
    #[must_use]
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    /// Set the `data-test` attribute
    #[must_use]
    pub fn data_test(self, value: impl Into<String>) -> Self {
        self.attr("data-test", value)
    }

    /// Set the element's own text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Not rendered (`display: none`)
    #[must_use]
    pub const fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Disabled form control
    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// What clicking this element (or a descendant) does
    #[must_use]
    pub fn on_click(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    /// Append a child
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }
}

/// A flattened node
#[derive(Debug, Clone)]
pub struct Node {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    hidden: bool,
    disabled: bool,
    action: Option<Action>,
    parent: Option<NodeId>,
    end: NodeId,
}

impl Node {
    /// Lower-case tag name (`#document` for the root)
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Attribute value
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether `class` contains `class` as a whole word
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Own text (children excluded)
    #[must_use]
    pub fn own_text(&self) -> &str {
        &self.text
    }

    /// Disabled flag
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Click binding
    #[must_use]
    pub const fn action(&self) -> Option<&Action> {
        self.action.as_ref()
    }

    /// Parent node
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// Rendered document
#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Vec<Node>,
}

impl Dom {
    /// The document node
    pub const ROOT: NodeId = 0;

    /// Flatten `body` under a synthetic document node
    #[must_use]
    pub fn new(body: Element) -> Self {
        let mut dom = Self {
            nodes: vec![Node {
                tag: "#document".to_string(),
                attrs: Vec::new(),
                text: String::new(),
                hidden: false,
                disabled: false,
                action: None,
                parent: None,
                end: 1,
            }],
        };
        dom.push(body, Self::ROOT);
        dom.nodes[Self::ROOT].end = dom.nodes.len();
        dom
    }

    fn push(&mut self, element: Element, parent: NodeId) {
        let id = self.nodes.len();
        self.nodes.push(Node {
            tag: element.tag,
            attrs: element.attrs,
            text: element.text,
            hidden: element.hidden,
            disabled: element.disabled,
            action: element.action,
            parent: Some(parent),
            end: id + 1,
        });
        for child in element.children {
            self.push(child, id);
        }
        self.nodes[id].end = self.nodes.len();
    }

    /// Node by id
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Number of nodes including the document node
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; the document node is always present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of all strict descendants of `id`, in document order
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Range<NodeId> {
        id + 1..self.nodes[id].end
    }

    /// Direct children of `id`, in document order
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut next = id + 1;
        let end = self.nodes[id].end;
        std::iter::from_fn(move || {
            if next >= end {
                return None;
            }
            let child = next;
            next = self.nodes[child].end;
            Some(child)
        })
    }

    /// Element ancestors of `id`, nearest first (the document node excluded)
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.nodes[id].parent, |&p| self.nodes[p].parent)
            .filter(|&p| p != Self::ROOT)
    }

    /// `textContent`: own text followed by the children's, recursively
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let range = id..self.nodes[id].end;
        self.nodes[range].iter().map(|n| n.text.as_str()).collect()
    }

    /// Rendered: neither the node nor an ancestor is hidden
    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> bool {
        let node = &self.nodes[id];
        let hidden_input = node.tag == "input" && node.attr("type") == Some("hidden");
        !node.hidden
            && !hidden_input
            && id != Self::ROOT
            && self.ancestors(id).all(|a| !self.nodes[a].hidden)
    }

    /// Enabled: not disabled and not inside a disabled fieldset
    #[must_use]
    pub fn is_enabled(&self, id: NodeId) -> bool {
        !self.nodes[id].disabled
            && self
                .ancestors(id)
                .all(|a| !(self.nodes[a].disabled && self.nodes[a].tag == "fieldset"))
    }

    /// What a click on `id` triggers: its own binding or the nearest
    /// ancestor's (bubbling), else the first bound descendant (the element
    /// under the pointer when a wrapper is clicked)
    #[must_use]
    pub fn click_target(&self, id: NodeId) -> Option<&Action> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .chain(self.descendants(id))
            .find_map(|n| self.nodes[n].action.as_ref())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn sample() -> Dom {
        Dom::new(
            Element::new("body").child(
                Element::new("div")
                    .class("list")
                    .child(Element::new("span").text("one "))
                    .child(
                        Element::new("div")
                            .hidden(true)
                            .child(Element::new("span").text("two")),
                    )
                    .child(Element::new("button").text("Go").on_click(Action::OpenCart)),
            ),
        )
    }

    #[test]
    fn test_document_order_and_ranges() {
        let dom = sample();
        assert_eq!(dom.len(), 7);
        assert_eq!(dom.node(1).tag(), "body");
        assert_eq!(dom.descendants(2), 3..7);
        assert_eq!(dom.children(2).collect::<Vec<_>>(), vec![3, 4, 6]);
        assert_eq!(dom.ancestors(5).collect::<Vec<_>>(), vec![4, 2, 1]);
    }

    #[test]
    fn test_text_content_is_recursive() {
        let dom = sample();
        assert_eq!(dom.text_content(2), "one twoGo");
    }

    #[test]
    fn test_visibility_is_inherited() {
        let dom = sample();
        assert!(dom.is_visible(3));
        assert!(!dom.is_visible(4));
        assert!(!dom.is_visible(5));
        assert!(!dom.is_visible(Dom::ROOT));
    }

    #[test]
    fn test_click_bubbles_to_ancestor() {
        let dom = Dom::new(
            Element::new("a")
                .on_click(Action::OpenCart)
                .child(Element::new("div").text("Cart")),
        );
        assert_eq!(dom.click_target(2), Some(&Action::OpenCart));

        let wrapped = Dom::new(
            Element::new("div")
                .child(Element::new("span"))
                .child(Element::new("a").on_click(Action::OpenCart)),
        );
        assert_eq!(wrapped.click_target(1), Some(&Action::OpenCart));
        assert_eq!(wrapped.click_target(2), None);
    }

    #[test]
    fn test_attr_and_class() {
        let dom = Dom::new(Element::new("DIV").class("btn btn_small").attr("class", "btn"));
        let node = dom.node(1);
        assert_eq!(node.tag(), "div");
        assert!(node.has_class("btn"));
        assert!(!node.has_class("btn_small"));
    }
}
