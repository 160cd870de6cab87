//! Per-subscriber batch filtering

use std::borrow::Cow;

use genx_dom::{Document, MutationKind, MutationRecord};

use crate::SubscribeOptions;

/// Records of `batch` the subscriber should see, in order.
/// Full batches are borrowed, not copied.
pub fn filter_batch<'a>(
    doc: &Document,
    options: &SubscribeOptions,
    batch: &'a [MutationRecord],
) -> Cow<'a, [MutationRecord]> {
    if options.wants_everything() {
        return Cow::Borrowed(batch);
    }
    let prefixes = options.attribute_filter.as_slice();
    retain_matching(batch, |r| record_matches(doc, prefixes, r))
}

/// Evaluates `keep` once per record; borrows the batch until the first
/// rejected record
fn retain_matching<'a>(
    batch: &'a [MutationRecord],
    mut keep: impl FnMut(&MutationRecord) -> bool,
) -> Cow<'a, [MutationRecord]> {
    let Some(first_rejected) = batch.iter().position(|r| !keep(r)) else {
        return Cow::Borrowed(batch);
    };
    let mut kept = batch[..first_rejected].to_vec();
    kept.extend(batch[first_rejected + 1..].iter().filter(|r| keep(r)).cloned());
    Cow::Owned(kept)
}

/// Filtering rule for a single record:
///
/// - attribute changes pass if the attribute name starts with a prefix
/// - child list changes pass if an added node, or anything below it,
///   carries an attribute starting with a prefix
/// - character data changes always pass
pub fn record_matches<S: AsRef<str>>(doc: &Document, prefixes: &[S], record: &MutationRecord) -> bool {
    match record.kind {
        MutationKind::Attributes => record
            .attribute_name
            .as_deref()
            .is_some_and(|name| prefixes.iter().any(|p| name.starts_with(p.as_ref()))),
        MutationKind::ChildList => record
            .added_nodes
            .iter()
            .any(|&node| doc.subtree_has_attribute_prefix(node, prefixes)),
        MutationKind::CharacterData => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genx_dom::NodeId;

    fn setup() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new("about:blank");
        let outer = doc.create_element("section");
        let inner = doc.create_element("span");
        doc.set_attribute(inner, "fx-format", "currency").unwrap();
        doc.append_child(outer, inner).unwrap();
        (doc, outer, inner)
    }

    #[test]
    fn test_attribute_prefix() {
        let (doc, _, inner) = setup();
        let prefixes = ["fx-"];
        assert!(record_matches(&doc, &prefixes, &MutationRecord::attributes(inner, "fx-format", None)));
        assert!(!record_matches(&doc, &prefixes, &MutationRecord::attributes(inner, "bx-bind", None)));
        assert!(!record_matches(&doc, &prefixes, &MutationRecord::attributes(inner, "fx", None)));
    }

    #[test]
    fn test_child_list_looks_into_subtree() {
        let (doc, outer, _) = setup();
        let added = MutationRecord::child_list(doc.body(), vec![outer], Vec::new());
        assert!(record_matches(&doc, &["fx-"], &added));
        assert!(!record_matches(&doc, &["bx-"], &added));

        let removed = MutationRecord::child_list(doc.body(), Vec::new(), vec![outer]);
        assert!(!record_matches(&doc, &["fx-"], &removed));
    }

    #[test]
    fn test_character_data_always_passes() {
        let (doc, _, inner) = setup();
        let no_prefixes: [&str; 0] = [];
        assert!(record_matches(&doc, &no_prefixes, &MutationRecord::character_data(inner, None)));
    }

    #[test]
    fn test_filter_batch() {
        let (doc, outer, inner) = setup();
        let batch = vec![
            MutationRecord::attributes(inner, "bx-bind", None),
            MutationRecord::attributes(inner, "fx-format", None),
            MutationRecord::child_list(doc.body(), vec![outer], Vec::new()),
        ];

        let fx = filter_batch(&doc, &SubscribeOptions::prefixes(["fx-"]), &batch);
        assert_eq!(fx.len(), 2);
        assert!(matches!(fx, Cow::Owned(_)));

        let all = filter_batch(&doc, &SubscribeOptions::everything(), &batch);
        assert!(matches!(all, Cow::Borrowed(_)));
        assert_eq!(all.len(), 3);

        let none = filter_batch(&doc, &SubscribeOptions::prefixes(["ax-"]), &batch);
        assert!(none.is_empty());
    }

    #[test]
    fn test_each_record_checked_once() {
        let (doc, outer, inner) = setup();
        let batch = vec![
            MutationRecord::attributes(inner, "fx-format", None),
            MutationRecord::child_list(doc.body(), vec![outer], Vec::new()),
            MutationRecord::attributes(inner, "bx-bind", None),
            MutationRecord::character_data(inner, None),
            MutationRecord::attributes(inner, "bx-model", None),
        ];
        let prefixes = ["fx-"];

        let mut calls = 0;
        let kept = retain_matching(&batch, |r| {
            calls += 1;
            record_matches(&doc, &prefixes, r)
        });
        assert_eq!(calls, batch.len());
        let kinds: Vec<_> = kept.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![MutationKind::Attributes, MutationKind::ChildList, MutationKind::CharacterData]
        );

        let mut calls = 0;
        let all = retain_matching(&batch[..2], |r| {
            calls += 1;
            record_matches(&doc, &prefixes, r)
        });
        assert_eq!(calls, 2);
        assert!(matches!(all, Cow::Borrowed(_)));
    }
}
