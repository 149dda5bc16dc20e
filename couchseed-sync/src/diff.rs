//! Three-way split of a desired design document set against an observed one.
//!
//! Documents are matched by id. A matched pair is a change when their views
//! differ ([`DesignDocument::views_match`]); revision, language and filters
//! are not compared. Observed documents with no desired counterpart are
//! deleted unless they are internal (`_design/_…`).
//!
//! Output order follows input order; nothing is sorted.

use similar::TextDiff;

use couchseed_core::DesignDocument;

/// What it takes to turn the observed set into the desired set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Difference {
    /// Desired documents with no observed counterpart.
    pub additions: Vec<DesignDocument>,
    /// Desired documents whose observed counterpart has different views.
    pub changes: Vec<DesignDocument>,
    /// Observed, non-internal documents with no desired counterpart,
    /// revisions as observed.
    pub deletions: Vec<DesignDocument>,
}

impl Difference {
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.changes.is_empty() && self.deletions.is_empty()
    }

    /// Number of store writes the difference implies.
    pub fn len(&self) -> usize {
        self.additions.len() + self.changes.len() + self.deletions.len()
    }
}

/// Compare `desired` with `observed`. Neither input is modified.
pub fn diff(desired: &[DesignDocument], observed: &[DesignDocument]) -> Difference {
    let mut difference = Difference::default();

    for wanted in desired {
        match observed.iter().find(|o| o.id() == wanted.id()) {
            None => difference.additions.push(wanted.clone()),
            Some(current) if !current.views_match(wanted) => {
                difference.changes.push(wanted.clone())
            }
            Some(_) => {}
        }
    }

    for current in observed {
        let wanted = desired.iter().any(|d| d.id() == current.id());
        if !wanted && !current.is_internal() {
            difference.deletions.push(current.clone());
        }
    }

    difference
}

/// Unified diff of the views of `observed` against those of `desired`.
pub fn render_change(observed: &DesignDocument, desired: &DesignDocument) -> String {
    let old = serde_json::to_string_pretty(&observed.views).unwrap_or_default();
    let new = serde_json::to_string_pretty(&desired.views).unwrap_or_default();
    let old_header = format!("a/{}", observed.id());
    let new_header = format!("b/{}", desired.id());
    TextDiff::from_lines(&old, &new)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use couchseed_core::View;

    use super::*;

    const MAP: &str = "function(doc){}";

    fn player() -> DesignDocument {
        DesignDocument::new("player").with_view("byName", View::map(MAP))
    }

    fn user() -> DesignDocument {
        DesignDocument::new("user").with_view("byToken", View::map(MAP))
    }

    fn ids(docs: &[DesignDocument]) -> Vec<&str> {
        docs.iter().map(|d| d.id()).collect()
    }

    #[test]
    fn orphaned_observed_doc_is_deleted() {
        let desired = vec![player()];
        let observed = vec![player().with_rev("1-abc"), user().with_rev("1-def")];

        let d = diff(&desired, &observed);
        assert!(d.additions.is_empty());
        assert!(d.changes.is_empty());
        assert_eq!(ids(&d.deletions), vec!["_design/user"]);
        assert_eq!(d.deletions[0].rev(), "1-def", "deletion keeps observed rev");
    }

    #[test]
    fn changed_map_text_is_a_change() {
        let desired = vec![player()];
        let observed = vec![DesignDocument::new("player")
            .with_rev("1-abc")
            .with_view("byName", View::map("function(doc){ emit(doc.name); }"))];

        let d = diff(&desired, &observed);
        assert!(d.additions.is_empty());
        assert!(d.deletions.is_empty());
        assert_eq!(ids(&d.changes), vec!["_design/player"]);
        assert!(d.changes[0].rev().is_empty(), "change carries desired doc");
    }

    #[test]
    fn internal_orphan_is_left_alone() {
        let observed = vec![DesignDocument::new("_auth").with_rev("1-aaa")];
        let d = diff(&[], &observed);
        assert!(d.is_empty(), "got: {d:?}");
    }

    #[test]
    fn revision_difference_alone_is_not_a_change() {
        let d = diff(&[player().with_rev("9-zzz")], &[player().with_rev("1-abc")]);
        assert!(d.is_empty());
    }

    #[test]
    fn filter_and_language_differences_are_not_changes() {
        let desired = vec![player().with_filter("mine", "function(doc, req){ return true; }")];
        let observed = vec![player().with_rev("1-abc").with_language("erlang")];
        assert!(diff(&desired, &observed).is_empty());
    }

    #[test]
    fn empty_desired_deletes_everything_but_internal() {
        let observed = vec![
            player().with_rev("1-a"),
            DesignDocument::new("_auth").with_rev("1-b"),
            user().with_rev("1-c"),
        ];
        let d = diff(&[], &observed);
        assert!(d.additions.is_empty());
        assert!(d.changes.is_empty());
        assert_eq!(ids(&d.deletions), vec!["_design/player", "_design/user"]);
    }

    #[test]
    fn empty_observed_adds_everything() {
        let desired = vec![user(), player()];
        let d = diff(&desired, &[]);
        assert_eq!(d.additions, desired);
        assert!(d.changes.is_empty());
        assert!(d.deletions.is_empty());
    }

    #[test]
    fn buckets_are_disjoint_and_ordered_by_input() {
        let desired = vec![
            DesignDocument::new("c").with_view("v", View::map("new")),
            DesignDocument::new("a"),
            DesignDocument::new("b").with_view("v", View::map(MAP)),
        ];
        let observed = vec![
            DesignDocument::new("z").with_rev("1-z"),
            DesignDocument::new("c").with_rev("1-c").with_view("v", View::map("old")),
            DesignDocument::new("b").with_rev("1-b").with_view("v", View::map(MAP)),
            DesignDocument::new("y").with_rev("1-y"),
        ];

        let d = diff(&desired, &observed);
        assert_eq!(ids(&d.additions), vec!["_design/a"]);
        assert_eq!(ids(&d.changes), vec!["_design/c"]);
        assert_eq!(ids(&d.deletions), vec!["_design/z", "_design/y"]);
        assert_eq!(d.len(), 4);

        let mut seen = HashSet::new();
        for id in ids(&d.additions)
            .into_iter()
            .chain(ids(&d.changes))
            .chain(ids(&d.deletions))
        {
            assert!(seen.insert(id), "{id} appears in more than one bucket");
        }
    }

    #[test]
    fn inputs_are_not_modified() {
        let desired = vec![player()];
        let observed = vec![user().with_rev("1-def")];
        let before = (desired.clone(), observed.clone());
        let _ = diff(&desired, &observed);
        assert_eq!((desired, observed), before);
    }

    #[test]
    fn render_change_shows_view_lines() {
        let observed = DesignDocument::new("player")
            .with_rev("1-abc")
            .with_view("byName", View::map("old"));
        let desired = DesignDocument::new("player").with_view("byName", View::map("new"));

        let out = render_change(&observed, &desired);
        assert!(out.contains("--- a/_design/player"));
        assert!(out.contains("+++ b/_design/player"));
        assert!(out.contains("-    \"map\": \"old\""));
        assert!(out.contains("+    \"map\": \"new\""));
    }
}
