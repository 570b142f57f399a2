//! Documentation comment tree as supplied by the host.
//!
//! A comment is an ordered list of [`DocNode`]s. Text is held in
//! [`TextNode`]s, each of which owns the runs that make up one block of
//! prose. A single sentence is usually split over several runs because
//! every source line of the comment becomes its own run.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Opaque identity of the declaration or node that owns a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeRef(pub u32);

/// Immutable fragment of literal comment text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    text: Arc<str>,
    absolute_start: usize,
    owner: NodeRef,
}

impl TextRun {
    pub fn new(text: impl Into<Arc<str>>, absolute_start: usize, owner: NodeRef) -> Self {
        Self {
            text: text.into(),
            absolute_start,
            owner,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte offset of the first character of this run in the host source.
    pub fn absolute_start(&self) -> usize {
        self.absolute_start
    }

    pub fn absolute_end(&self) -> usize {
        self.absolute_start + self.text.len()
    }

    pub fn owner(&self) -> NodeRef {
        self.owner
    }

    /// New run at the same position with different text.
    pub fn with_text(&self, text: impl Into<Arc<str>>) -> Self {
        Self {
            text: text.into(),
            absolute_start: self.absolute_start,
            owner: self.owner,
        }
    }

    /// True when both runs share the same text allocation, i.e. the run was
    /// carried over untouched by an edit.
    pub fn is_same(&self, other: &TextRun) -> bool {
        Arc::ptr_eq(&self.text, &other.text) && self.absolute_start == other.absolute_start
    }
}

/// Ordered runs forming one contiguous block of prose.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextNode {
    pub runs: Vec<TextRun>,
}

impl TextNode {
    pub fn new(runs: Vec<TextRun>) -> Self {
        Self { runs }
    }

    /// Concatenated text of all runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(TextRun::text).collect()
    }

    pub fn is_blank(&self) -> bool {
        self.runs.iter().all(|r| r.text().trim().is_empty())
    }
}

/// Name/value attribute on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Element with content, e.g. `<summary>...</summary>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<DocNode>,
}

/// Self-closing element, e.g. `<see cref="T"/>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyElement {
    pub name: String,
    pub attributes: Vec<Attribute>,
}

impl EmptyElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocNode {
    Text(TextNode),
    Element(Element),
    EmptyElement(EmptyElement),
}

impl DocNode {
    pub fn text(runs: Vec<TextRun>) -> Self {
        DocNode::Text(TextNode::new(runs))
    }

    pub fn element(name: impl Into<String>, children: Vec<DocNode>) -> Self {
        DocNode::Element(Element {
            name: name.into(),
            attributes: Vec::new(),
            children,
        })
    }

    pub fn empty_element(name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        DocNode::EmptyElement(EmptyElement {
            name: name.into(),
            attributes,
        })
    }

    /// Element name, `None` for text.
    pub fn name(&self) -> Option<&str> {
        match self {
            DocNode::Text(_) => None,
            DocNode::Element(e) => Some(&e.name),
            DocNode::EmptyElement(e) => Some(&e.name),
        }
    }

    /// Visits every run below this node in document order.
    pub fn for_each_run<'a>(&'a self, f: &mut dyn FnMut(&'a TextRun)) {
        match self {
            DocNode::Text(t) => {
                for run in &t.runs {
                    f(run);
                }
            }
            DocNode::Element(e) => {
                for child in &e.children {
                    child.for_each_run(&mut *f);
                }
            }
            DocNode::EmptyElement(_) => {}
        }
    }
}

/// Root of a documentation comment attached to one declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocComment {
    pub owner: NodeRef,
    pub nodes: Vec<DocNode>,
}

impl DocComment {
    pub fn new(owner: NodeRef, nodes: Vec<DocNode>) -> Self {
        Self { owner, nodes }
    }

    /// All runs of the comment, including those nested in elements.
    pub fn runs(&self) -> Vec<&TextRun> {
        let mut out = Vec::new();
        for node in &self.nodes {
            node.for_each_run(&mut |r| out.push(r));
        }
        out
    }

    /// Plain text of the comment with element boundaries dropped.
    pub fn plain_text(&self) -> String {
        self.runs().into_iter().map(TextRun::text).collect()
    }

    /// First element with the given name at the top level.
    pub fn element(&self, name: &str) -> Option<&Element> {
        self.nodes.iter().find_map(|n| match n {
            DocNode::Element(e) if e.name == name => Some(e),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, at: usize) -> TextRun {
        TextRun::new(text, at, NodeRef(1))
    }

    #[test]
    fn collects_nested_runs_in_order() {
        let comment = DocComment::new(
            NodeRef(1),
            vec![DocNode::element(
                "summary",
                vec![
                    DocNode::text(vec![run("Gets the ", 10)]),
                    DocNode::empty_element(
                        "see",
                        vec![Attribute {
                            name: "cref".into(),
                            value: "Foo".into(),
                        }],
                    ),
                    DocNode::text(vec![run(" value.", 30)]),
                ],
            )],
        );
        assert_eq!(comment.plain_text(), "Gets the  value.");
        assert_eq!(comment.runs().len(), 2);
        assert!(comment.element("summary").is_some());
    }

    #[test]
    fn with_text_keeps_position_but_not_identity() {
        let a = run("abc", 5);
        let b = a.with_text("xyz");
        assert_eq!(b.absolute_start(), 5);
        assert!(!a.is_same(&b));
        assert!(a.is_same(&a.clone()));
    }
}
