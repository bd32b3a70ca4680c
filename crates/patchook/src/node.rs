//! Document tree for game-update posts.
//!
//! A node is either a run of text or an element with attributes and children. Any parser
//! (scraper, a DevTools DOM dump, a tree built by hand in tests) can produce this structure.

use indexmap::IndexMap;

/// Tag of the pass-through element that holds already substituted markdown.
///
/// Its text is never escaped, translated or quoted again, which is what lets the
/// normalizer run over its own output without changing it.
pub const MARKDOWN_TAG: &str = "x-markdown";

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element(Element),
}

/// An element node. Tag names are stored lowercase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<Node>,
}

impl Element {
    /// Create a new element without attributes or children
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_lowercase(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Get an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(&name.to_lowercase())
            .map(String::as_str)
    }

    /// Set an attribute, replacing any previous value
    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attributes
            .insert(name.to_lowercase(), value.to_string());
    }

    /// Remove an attribute, keeping the order of the others
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attributes.shift_remove(&name.to_lowercase())
    }

    /// Whether the `class` attribute holds every class in `classes`.
    ///
    /// `classes` may name several classes separated by whitespace.
    pub fn has_class(&self, classes: &str) -> bool {
        let Some(attr) = self.attr("class") else {
            return false;
        };
        let mut wanted = classes.split_whitespace().peekable();
        if wanted.peek().is_none() {
            return false;
        }
        wanted.all(|class| attr.split_whitespace().any(|have| have == class))
    }

    pub fn is_markdown(&self) -> bool {
        self.tag == MARKDOWN_TAG
    }

    /// Concatenated text of all descendants
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        for node in &self.children {
            node.collect_text(&mut text);
        }
        text
    }
}

impl Node {
    /// Create a new element node
    pub fn element(tag_name: &str) -> Self {
        Node::Element(Element::new(tag_name))
    }

    /// Create a new element node with attributes
    pub fn element_with_attrs(tag_name: &str, attrs: Vec<(&str, &str)>) -> Self {
        let mut element = Element::new(tag_name);
        for (name, value) in attrs {
            element.set_attr(name, value);
        }
        Node::Element(element)
    }

    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Node::Text(content.to_string())
    }

    /// Wrap already converted markdown so later passes leave it alone
    pub fn markdown(content: impl Into<String>) -> Self {
        Node::Element(Element {
            tag: MARKDOWN_TAG.to_string(),
            attributes: IndexMap::new(),
            children: vec![Node::Text(content.into())],
        })
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    /// Whether this node is substituted markdown
    pub fn is_markdown(&self) -> bool {
        matches!(self, Node::Element(element) if element.is_markdown())
    }

    /// Tag name for elements, `#text` for text nodes
    pub fn tag_name(&self) -> &str {
        match self {
            Node::Element(element) => &element.tag,
            Node::Text(_) => "#text",
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    /// Get an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.as_element()?.attr(name)
    }

    /// Check if an attribute exists
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// See [`Element::has_class`]
    pub fn has_class(&self, classes: &str) -> bool {
        self.as_element()
            .is_some_and(|element| element.has_class(classes))
    }

    /// Get all child nodes
    pub fn children(&self) -> std::slice::Iter<'_, Node> {
        match self {
            Node::Element(element) => element.children.iter(),
            Node::Text(_) => (&[] as &[Node]).iter(),
        }
    }

    /// Get only element children
    pub fn element_children(&self) -> impl Iterator<Item = &Node> {
        self.children().filter(|node| node.is_element())
    }

    /// Add a child node. Text nodes have no children, so this is a no-op for them.
    pub fn add_child(&mut self, child: Node) {
        if let Node::Element(element) = self {
            element.children.push(child);
        }
    }

    /// Set an attribute. No-op for text nodes.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        if let Node::Element(element) = self {
            element.set_attr(name, value);
        }
    }

    /// Get all text content from this node and descendants
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => stack.extend(element.children.iter().rev()),
            }
        }
    }

    /// Every descendant in document order, not including `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children().rev().collect(),
        }
    }

    /// First descendant element matching `predicate`, in document order
    pub fn find<F>(&self, predicate: F) -> Option<&Element>
    where
        F: Fn(&Element) -> bool,
    {
        self.descendants()
            .filter_map(Node::as_element)
            .find(|element| predicate(element))
    }

    /// Child-index path to the first descendant element matching `predicate`.
    pub fn find_path<F>(&self, predicate: F) -> Option<Vec<usize>>
    where
        F: Fn(&Element) -> bool,
    {
        let mut stack: Vec<(&Node, Vec<usize>)> = self
            .children()
            .enumerate()
            .rev()
            .map(|(index, child)| (child, vec![index]))
            .collect();

        while let Some((node, path)) = stack.pop() {
            let Node::Element(element) = node else {
                continue;
            };
            if predicate(element) {
                return Some(path);
            }
            for (index, child) in element.children.iter().enumerate().rev() {
                let mut child_path = path.clone();
                child_path.push(index);
                stack.push((child, child_path));
            }
        }
        None
    }

    /// Detach and return the node at `path`.
    pub fn remove_at(&mut self, path: &[usize]) -> Option<Node> {
        let (&last, parents) = path.split_last()?;
        let mut current = self;
        for &index in parents {
            current = current.as_element_mut()?.children.get_mut(index)?;
        }
        let children = &mut current.as_element_mut()?.children;
        (last < children.len()).then(|| children.remove(last))
    }
}

/// Depth-first iterator over a node's descendants.
#[derive(Debug)]
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().rev());
        Some(node)
    }
}
