// Copyright (c) 2026 Mathsieve Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.

use std::sync::OnceLock;

use regex_lite::Regex;

use crate::classify::MathContext;
use crate::config;
use crate::dom::{Document, NodeId};

/// The selector forms needed for content-area roots. Anything fancier is
/// parsed to `None` and matches nothing, so an exotic selector in the
/// configuration degrades instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Tag(String),
    /// `a b`
    Descendant(String, String),
    /// `a > b`
    Child(String, String),
    /// `[class*=x]`
    ClassContains(String),
}

pub fn parse_selector(source: &str) -> Option<Selector> {
    let source = source.trim();
    if let Some(rest) = source.strip_prefix("[class*=") {
        let inner = rest.strip_suffix(']')?;
        let inner = inner.trim_matches(|c| c == '\'' || c == '"');
        return Some(Selector::ClassContains(inner.to_string()));
    }
    let parts: Vec<&str> = source.split_whitespace().collect();
    match parts.as_slice() {
        [tag] if is_tag(tag) => Some(Selector::Tag(tag.to_string())),
        [a, b] if is_tag(a) && is_tag(b) => {
            Some(Selector::Descendant(a.to_string(), b.to_string()))
        }
        [a, ">", b] if is_tag(a) && is_tag(b) => Some(Selector::Child(a.to_string(), b.to_string())),
        _ => None,
    }
}

fn is_tag(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric())
}

impl Selector {
    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        let Some(tag) = doc.tag(id) else {
            return false;
        };
        match self {
            Selector::Tag(t) => tag == t.as_str(),
            Selector::Descendant(a, b) => {
                tag == b.as_str() && doc.has_ancestor(id, |t| t == a.as_str())
            }
            Selector::Child(a, b) => {
                tag == b.as_str() && doc.parent(id).and_then(|p| doc.tag(p)) == Some(a.as_str())
            }
            Selector::ClassContains(s) => {
                doc.attr(id, "class").is_some_and(|class| class.contains(s))
            }
        }
    }
}

/// A text-bearing element eligible for math classification.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The `code` element itself.
    pub node: NodeId,
    /// The enclosing `pre` for block candidates. Block substitution targets
    /// the container, not the `code` element.
    pub container: Option<NodeId>,
    pub text: String,
    pub context: MathContext,
    /// Language token extracted from a `language-*` class.
    pub language: Option<String>,
}

fn language_class() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"language-([a-zA-Z0-9]+)").unwrap())
}

pub struct Scanner<'a> {
    config: &'a config::Scan,
}

impl<'a> Scanner<'a> {
    pub fn new(config: &'a config::Scan) -> Scanner<'a> {
        Scanner { config }
    }

    /// Resolve the configured root selectors, in document order, dedup'd.
    pub fn roots(&self, doc: &Document) -> Vec<NodeId> {
        let selectors: Vec<Selector> = self
            .config
            .roots
            .iter()
            .filter_map(|s| parse_selector(s))
            .collect();
        let mut out = vec![];
        for id in doc.descendants(doc.root()) {
            if selectors.iter().any(|s| s.matches(doc, id)) && !out.contains(&id) {
                out.push(id);
            }
        }
        out
    }

    /// Scan one root, marking it so the next pass skips it wholesale.
    pub fn scan_root(&self, doc: &mut Document, root: NodeId) -> Vec<Candidate> {
        if doc.attr(root, &self.config.root_marker).is_some() {
            return vec![];
        }
        doc.set_attr(root, &self.config.root_marker, "true");
        self.collect(doc, root)
    }

    /// Scan a freshly inserted subtree. No root marker here; node-level
    /// markers keep repeated scans idempotent.
    pub fn scan_subtree(&self, doc: &Document, subtree: NodeId) -> Vec<Candidate> {
        self.collect(doc, subtree)
    }

    fn collect(&self, doc: &Document, scope: NodeId) -> Vec<Candidate> {
        let mut out = vec![];
        for id in doc.descendants(scope) {
            if doc.tag(id) != Some("code") {
                continue;
            }
            if doc.attr(id, &self.config.node_marker).is_some() {
                continue;
            }

            let container = doc.parent(id).filter(|p| doc.tag(*p) == Some("pre"));
            if container.is_none() && doc.has_ancestor(id, |t| t == "pre") {
                // already covered at block granularity
                continue;
            }

            let text = doc.text_content(id).trim().to_string();
            if text.is_empty() {
                continue;
            }

            let language = container
                .and_then(|p| self.language_of(doc, p))
                .or_else(|| self.language_of(doc, id));

            out.push(Candidate {
                node: id,
                container,
                text,
                context: match container {
                    Some(_) => MathContext::Block,
                    None => MathContext::Inline,
                },
                language,
            });
        }
        out
    }

    fn language_of(&self, doc: &Document, id: NodeId) -> Option<String> {
        let class = doc.attr(id, "class")?;
        language_class()
            .captures(class)
            .map(|caps| caps[1].to_string())
    }
}
