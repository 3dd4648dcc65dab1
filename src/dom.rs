// Copyright (c) 2026 Mathsieve Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.

use indexmap::IndexMap;
use pulldown_cmark_escape::escape_html;

/// Handle into the document arena. Stable for the lifetime of the document,
/// even after the node is detached by a replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug)]
pub enum NodeKind {
    Element {
        tag: String,
        attrs: IndexMap<String, String>,
    },
    Text(String),
    /// Opaque markup produced by a typesetting engine. Serialized verbatim,
    /// never escaped and never scanned.
    Raw(String),
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// In-memory document tree. The only capabilities exposed are the ones the
/// annotation pipeline needs: subtree query, text content, attributes,
/// replacement, and subtree-insertion observation.
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    observed: Vec<NodeId>,
    insertions: Vec<NodeId>,
}

impl Document {
    pub fn new() -> Document {
        let mut doc = Document {
            nodes: vec![],
            root: NodeId(0),
            observed: vec![],
            insertions: vec![],
        };
        doc.root = doc.push(NodeKind::Element {
            tag: "body".to_string(),
            attrs: IndexMap::new(),
        });
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: vec![],
        });
        id
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element {
            tag: tag.to_string(),
            attrs: IndexMap::new(),
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    pub fn create_raw(&mut self, markup: &str) -> NodeId {
        self.push(NodeKind::Raw(markup.to_string()))
    }

    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        if self.is_observed(child) {
            self.insertions.push(child);
        }
    }

    /// Swap `new` into `old`'s place. Returns false when `old` is already
    /// detached, which is exactly the hydration race a deferred substitution
    /// has to tolerate.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> bool {
        let Some(parent) = self.nodes[old.0].parent else {
            return false;
        };
        let Some(pos) = self.nodes[parent.0].children.iter().position(|c| *c == old) else {
            return false;
        };
        self.nodes[parent.0].children[pos] = new;
        self.nodes[new.0].parent = Some(parent);
        self.nodes[old.0].parent = None;
        if self.is_observed(new) {
            self.insertions.push(new);
        }
        true
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { attrs, .. } => attrs.get(name).map(|s| s.as_str()),
            _ => None,
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeKind::Element { attrs, .. } = &mut self.nodes[id.0].kind {
            attrs.insert(name.to_string(), value.to_string());
        }
    }

    /// True while the node is reachable from the document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut cursor = id;
        loop {
            if cursor == self.root {
                return true;
            }
            match self.nodes[cursor.0].parent {
                Some(parent) => cursor = parent,
                None => return false,
            }
        }
    }

    pub fn has_ancestor(&self, id: NodeId, pred: impl Fn(&str) -> bool) -> bool {
        let mut cursor = self.nodes[id.0].parent;
        while let Some(node) = cursor {
            if let Some(tag) = self.tag(node) {
                if pred(tag) {
                    return true;
                }
            }
            cursor = self.nodes[node.0].parent;
        }
        false
    }

    /// Pre-order walk of the subtree rooted at `id`, `id` included.
    /// This is document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = vec![];
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            for child in self.nodes[node.0].children.iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// Concatenated text of the subtree, the `textContent` equivalent.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            if let NodeKind::Text(text) = &self.nodes[node.0].kind {
                out.push_str(text);
            }
        }
        out
    }

    /// Start reporting subtree insertions under `root`. There is no teardown;
    /// the observation lives as long as the document.
    pub fn observe(&mut self, root: NodeId) {
        if !self.observed.contains(&root) {
            self.observed.push(root);
        }
    }

    /// Drain the subtrees inserted under an observed root since the last call.
    pub fn take_insertions(&mut self) -> Vec<NodeId> {
        let mut drained = std::mem::take(&mut self.insertions);
        drained.dedup();
        drained
    }

    pub fn has_pending_insertions(&self) -> bool {
        !self.insertions.is_empty()
    }

    fn is_observed(&self, id: NodeId) -> bool {
        if self.observed.is_empty() {
            return false;
        }
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            if self.observed.contains(&node) {
                return true;
            }
            cursor = self.nodes[node.0].parent;
        }
        false
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_node(self.root, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => {
                escape_html(&mut *out, text).unwrap();
            }
            NodeKind::Raw(markup) => out.push_str(markup),
            NodeKind::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_html(&mut *out, value).unwrap();
                    out.push('"');
                }
                out.push('>');
                if matches!(tag.as_str(), "br" | "hr" | "img") {
                    return;
                }
                for child in &self.nodes[id.0].children {
                    self.write_node(*child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

#[cfg(test)]
mod test {
    use super::Document;

    #[test]
    fn test_replace_detaches_old_subtree() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let code = doc.create_element("code");
        let text = doc.create_text("$x$");
        doc.append(doc.root(), p);
        doc.append(p, code);
        doc.append(code, text);

        let span = doc.create_element("span");
        assert!(doc.replace(code, span));
        assert!(!doc.is_attached(code));
        assert!(doc.is_attached(span));

        // a second replacement of the detached node is a no-op
        let other = doc.create_element("span");
        assert!(!doc.replace(code, other));
    }

    #[test]
    fn test_text_content_concatenates_descendants() {
        let mut doc = Document::new();
        let pre = doc.create_element("pre");
        let code = doc.create_element("code");
        doc.append(doc.root(), pre);
        doc.append(pre, code);
        let a = doc.create_text("e^{-E_a");
        let b = doc.create_text("/(RT)}");
        doc.append(code, a);
        doc.append(code, b);
        assert_eq!(doc.text_content(pre), "e^{-E_a/(RT)}");
    }

    #[test]
    fn test_insertions_reported_only_under_observed_roots() {
        let mut doc = Document::new();
        let main = doc.create_element("main");
        let aside = doc.create_element("aside");
        doc.append(doc.root(), main);
        doc.append(doc.root(), aside);
        doc.observe(main);

        let inside = doc.create_element("p");
        doc.append(main, inside);
        let outside = doc.create_element("p");
        doc.append(aside, outside);

        assert_eq!(doc.take_insertions(), vec![inside]);
        assert!(doc.take_insertions().is_empty());
    }

    #[test]
    fn test_to_html_escapes_text_but_not_raw() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        doc.set_attr(p, "class", "x");
        let text = doc.create_text("a < b");
        let raw = doc.create_raw("<math><mi>x</mi></math>");
        doc.append(doc.root(), p);
        doc.append(p, text);
        doc.append(p, raw);
        assert_eq!(
            doc.to_html(),
            "<body><p class=\"x\">a &lt; b<math><mi>x</mi></math></p></body>"
        );
    }
}
