use std::borrow::Cow;
use std::sync::Arc;
use std::thread;

use docguard_core::generate::{boolean_property, future_tense};
use docguard_core::{
    apply, apply_rule, find_candidates, resolve, Comparison, DocComment, DocNode, FirstWordPolicy,
    KnownNames, NodeRef, PhraseTable, StaticUnit, TextRun,
};

/// Builds `<summary>` from source lines the way a host splits a comment:
/// one run per line, offsets counted through the `/// ` prefixes.
fn summary(lines: &[&str]) -> DocComment {
    let owner = NodeRef(42);
    let mut offset = 0;
    let mut runs = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        offset += "/// ".len();
        let text = if idx + 1 < lines.len() {
            format!("{line}\n")
        } else {
            line.to_string()
        };
        runs.push(TextRun::new(text.as_str(), offset, owner));
        offset += text.len();
    }
    DocComment::new(
        owner,
        vec![DocNode::element("summary", vec![DocNode::text(runs)])],
    )
}

#[test]
fn longest_phrase_wins_over_shorter_prefix() {
    let table = PhraseTable::build(
        [("will be", "is"), ("will never be", "is never")],
        Comparison::Ordinal,
    );
    let comment = summary(&["This will never be null."]);
    let fixed = apply(&comment, &table, FirstWordPolicy::KEEP);
    assert_eq!(fixed.plain_text(), "This is never null.");
}

#[test]
fn boolean_summary_is_normalised_and_remainder_lowercased() {
    let comment = summary(&["Returns a flag that indicates if The control is visible."]);
    let fixed = apply_rule(&comment, &boolean_property());
    assert_eq!(
        fixed.plain_text(),
        "Gets a value indicating whether the control is visible."
    );
}

#[test]
fn boolean_summary_keeps_acronyms() {
    let comment = summary(&["Returns a flag that indicates if XML output is enabled."]);
    let fixed = apply_rule(&comment, &boolean_property());
    assert_eq!(
        fixed.plain_text(),
        "Gets a value indicating whether XML output is enabled."
    );
}

#[test]
fn future_tense_spanning_lines_is_rewritten_per_run() {
    let comment = summary(&["The cache will return", "the stored value and will not throw."]);
    let fixed = apply_rule(&comment, &future_tense());
    assert_eq!(
        fixed.plain_text(),
        "The cache returns\nthe stored value and does not throw."
    );
}

#[test]
fn fixes_are_idempotent_for_builtin_catalogs() {
    let comments = [
        summary(&["Gets or sets a value indicating wether the item is selected."]),
        summary(&["Will return the value.", "It will always be positive."]),
        summary(&["Determines whether the item exists."]),
    ];
    for rule in [boolean_property(), future_tense()] {
        for comment in &comments {
            let once = apply_rule(comment, &rule).into_owned();
            let twice = apply_rule(&once, &rule);
            assert!(
                matches!(twice, Cow::Borrowed(_)),
                "{} changed `{}` twice",
                rule.name,
                once.plain_text()
            );
        }
    }
}

#[test]
fn candidates_point_into_the_source_and_resolve_to_longest() {
    let comment = summary(&["It will never be null", "and will be set."]);
    let narrow = PhraseTable::build(
        [("be null", "is null"), ("will be", "is")],
        Comparison::Ordinal,
    );
    let wide = PhraseTable::build([("will never be", "is never")], Comparison::Ordinal);

    let mut candidates = find_candidates(&comment, &narrow);
    candidates.extend(find_candidates(&comment, &wide));
    let kept = resolve(candidates);

    let texts: Vec<_> = kept.iter().map(|c| c.matched_text.as_str()).collect();
    assert_eq!(texts, vec!["will never be", "will be"]);
    // first run starts after "/// " and the match after "It "
    assert_eq!(kept[0].location.start, 4 + 3);
    assert_eq!(kept[0].location.len(), "will never be".len());
}

#[test]
fn phrase_tables_are_shared_across_threads() {
    let table = Arc::new(PhraseTable::build(
        [("will be", "is"), ("will never be", "is never")],
        Comparison::Ordinal,
    ));
    let results: Vec<String> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let table = Arc::clone(&table);
                scope.spawn(move || {
                    let line = format!("Item {i} will never be null.");
                    let comment = summary(&[line.as_str()]);
                    apply(&comment, &table, FirstWordPolicy::KEEP).plain_text()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for (i, text) in results.iter().enumerate() {
        assert_eq!(text, &format!("Item {i} is never null."));
    }
}

#[test]
fn known_names_accept_concurrent_refreshes() {
    let names = Arc::new(KnownNames::new());
    thread::scope(|scope| {
        for _ in 0..4 {
            let names = Arc::clone(&names);
            scope.spawn(move || {
                for unit in 0..10 {
                    let unit = StaticUnit::new(format!("Unit{unit}"))
                        .with_types([format!("Ns.Type{unit}"), "Ns.Shared".to_string()]);
                    names.refresh(&unit);
                }
            });
        }
    });
    // 10 assembly names, 10 distinct types and one shared type
    assert_eq!(names.len(), 21);
    assert!(names.contains("Shared"));
    assert!(names.has_seen("Unit9"));
}
