//! Table driven rewriting of documentation comments.
//!
//! The engine walks every text run of a comment, replaces phrase table
//! matches and hands back the original comment untouched when nothing
//! matched. Runs that did not change keep their text allocation so callers
//! can tell edited runs from carried over ones.

use std::borrow::Cow;

use crate::casing::{Casing, FirstWordPolicy};
use crate::generate::PhraseRule;
use crate::location::{to_location, Location};
use crate::node::{DocComment, DocNode, Element, TextNode, TextRun};
use crate::phrase::PhraseTable;

/// Elements whose content is code and never rewritten.
const CODE_ELEMENTS: &[&str] = &["c", "code"];

/// A phrase occurrence as reported to the rule layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCandidate {
    pub location: Location,
    pub matched_text: String,
    pub replacement: String,
}

/// Every table match in the prose of `comment`, in document order.
pub fn find_candidates(comment: &DocComment, table: &PhraseTable) -> Vec<MatchCandidate> {
    let mut out = Vec::new();
    if table.is_empty() {
        return out;
    }
    for run in prose_runs(&comment.nodes) {
        let text = run.text();
        for m in table.find_iter(text) {
            out.push(MatchCandidate {
                location: to_location(run, m.start, m.end - m.start, 0, 0),
                matched_text: text[m.start..m.end].to_string(),
                replacement: m.entry.replacement.clone(),
            });
        }
    }
    out
}

/// Runs outside of code elements.
fn prose_runs(nodes: &[DocNode]) -> Vec<&TextRun> {
    let mut out = Vec::new();
    for node in nodes {
        match node {
            DocNode::Text(t) => out.extend(t.runs.iter()),
            DocNode::Element(e) if !is_code_element(&e.name) => out.extend(prose_runs(&e.children)),
            DocNode::Element(_) | DocNode::EmptyElement(_) => {}
        }
    }
    out
}

fn is_code_element(name: &str) -> bool {
    CODE_ELEMENTS.contains(&name)
}

/// Rewrites `comment` through `table`.
///
/// Returns `Cow::Borrowed` when no run changed.
pub fn apply<'a>(
    comment: &'a DocComment,
    table: &PhraseTable,
    policy: FirstWordPolicy,
) -> Cow<'a, DocComment> {
    if table.is_empty() {
        return Cow::Borrowed(comment);
    }
    match rewrite_nodes(&comment.nodes, table, policy) {
        Some(nodes) => Cow::Owned(DocComment::new(comment.owner, merge_adjacent_text(nodes))),
        None => Cow::Borrowed(comment),
    }
}

/// [`apply`] with the table and policy of a rule.
pub fn apply_rule<'a>(comment: &'a DocComment, rule: &PhraseRule) -> Cow<'a, DocComment> {
    let result = apply(comment, &rule.table, rule.policy);
    if let Cow::Owned(_) = result {
        tracing::debug!(rule = %rule.name, owner = comment.owner.0, "rewrote comment");
    }
    result
}

fn rewrite_nodes(
    nodes: &[DocNode],
    table: &PhraseTable,
    policy: FirstWordPolicy,
) -> Option<Vec<DocNode>> {
    let mut changed = false;
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        let rewritten = match node {
            DocNode::Text(text) => rewrite_text(text, table, policy).map(DocNode::Text),
            DocNode::Element(e) if !is_code_element(&e.name) => {
                rewrite_nodes(&e.children, table, policy).map(|children| {
                    DocNode::Element(Element {
                        name: e.name.clone(),
                        attributes: e.attributes.clone(),
                        children: merge_adjacent_text(children),
                    })
                })
            }
            DocNode::Element(_) | DocNode::EmptyElement(_) => None,
        };
        match rewritten {
            Some(node) => {
                changed = true;
                out.push(node);
            }
            None => out.push(node.clone()),
        }
    }
    changed.then_some(out)
}

/// State handed from one run to the next of the same text node when a
/// replacement ends a run.
#[derive(Clone, Copy, Default)]
struct Carry {
    first_word: bool,
    trim: bool,
}

fn rewrite_text(text: &TextNode, table: &PhraseTable, policy: FirstWordPolicy) -> Option<TextNode> {
    let mut changed = false;
    let mut carry = Carry::default();
    let mut runs = Vec::with_capacity(text.runs.len());
    for run in &text.runs {
        let (rewritten, next) = rewrite_run(run.text(), table, policy, carry);
        carry = next;
        match rewritten {
            Some(new_text) => {
                changed = true;
                if !new_text.is_empty() {
                    runs.push(run.with_text(new_text));
                }
            }
            None => runs.push(run.clone()),
        }
    }
    changed.then(|| TextNode::new(runs))
}

fn rewrite_run(
    text: &str,
    table: &PhraseTable,
    policy: FirstWordPolicy,
    carry: Carry,
) -> (Option<String>, Carry) {
    let mut carry = carry;
    if !carry.first_word && !carry.trim && !table.may_match(text) {
        return (None, carry);
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    if carry.trim {
        cursor = skip_whitespace(text, 0);
        carry.trim = cursor == text.len();
    }
    for m in table.find_iter(text) {
        // A match starting inside dropped whitespace continues right after it.
        let replacement = if m.start < cursor {
            m.entry.replacement.trim_start_matches([' ', '\t'])
        } else {
            push_segment(&mut out, &text[cursor..m.start], policy, &mut carry);
            m.entry.replacement.as_str()
        };
        out.push_str(replacement);
        cursor = m.end;
        carry.first_word = policy.casing != Casing::Keep;
        carry.trim = false;
        if !policy.keep_leading_space && m.entry.replacement.ends_with(char::is_whitespace) {
            cursor = skip_whitespace(text, cursor);
            carry.trim = cursor == text.len();
        }
    }
    push_segment(&mut out, &text[cursor..], policy, &mut carry);

    if out == text {
        (None, carry)
    } else {
        (Some(out), carry)
    }
}

fn push_segment(out: &mut String, segment: &str, policy: FirstWordPolicy, carry: &mut Carry) {
    if carry.first_word && segment.chars().any(char::is_alphanumeric) {
        out.push_str(&policy.apply_to_first_word(segment));
        carry.first_word = false;
    } else {
        out.push_str(segment);
    }
}

fn skip_whitespace(text: &str, from: usize) -> usize {
    let rest = &text[from..];
    from + (rest.len() - rest.trim_start_matches([' ', '\t']).len())
}

/// Joins neighbouring text nodes into one, e.g. after an inline element
/// between them was removed.
pub fn merge_adjacent_text(nodes: Vec<DocNode>) -> Vec<DocNode> {
    let mut out: Vec<DocNode> = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            DocNode::Text(next) => match out.last_mut() {
                Some(DocNode::Text(prev)) => join_text(prev, next),
                _ => out.push(DocNode::Text(next)),
            },
            other => out.push(other),
        }
    }
    out
}

/// Appends `next` to `prev`, dropping a doubled space at the seam.
fn join_text(prev: &mut TextNode, next: TextNode) {
    let prev_ends_in_space = prev
        .runs
        .iter()
        .rev()
        .find(|r| !r.text().is_empty())
        .is_some_and(|r| r.text().ends_with(' '));
    let mut runs = next.runs.into_iter();
    if prev_ends_in_space {
        if let Some(first) = runs.next() {
            let trimmed = first.text().trim_start_matches(' ');
            let dropped = first.text().len() - trimmed.len();
            if dropped == 0 {
                prev.runs.push(first);
            } else if !trimmed.is_empty() {
                prev.runs.push(TextRun::new(
                    trimmed,
                    first.absolute_start() + dropped,
                    first.owner(),
                ));
            }
        }
    }
    prev.runs.extend(runs);
}

/// Drops every node matching `remove` (at any depth) and merges the text
/// around it. Borrowed when nothing was removed.
pub fn remove_elements<'a, F>(comment: &'a DocComment, remove: F) -> Cow<'a, DocComment>
where
    F: Fn(&DocNode) -> bool,
{
    match remove_from(&comment.nodes, &remove) {
        Some(nodes) => Cow::Owned(DocComment::new(comment.owner, merge_adjacent_text(nodes))),
        None => Cow::Borrowed(comment),
    }
}

fn remove_from<F>(nodes: &[DocNode], remove: &F) -> Option<Vec<DocNode>>
where
    F: Fn(&DocNode) -> bool,
{
    let mut changed = false;
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        if remove(node) {
            changed = true;
            continue;
        }
        if let DocNode::Element(e) = node {
            if let Some(children) = remove_from(&e.children, remove) {
                changed = true;
                out.push(DocNode::Element(Element {
                    name: e.name.clone(),
                    attributes: e.attributes.clone(),
                    children: merge_adjacent_text(children),
                }));
                continue;
            }
        }
        out.push(node.clone());
    }
    changed.then_some(out)
}
