use crate::circle::{Circle, CircleId, CircleSet};

/// Draft text for the selected circle's comment. Re-seeded whenever the
/// selection changes, committed into the store only on an explicit save —
/// typing alone never mutates the circle.
#[derive(Clone, Debug, Default)]
pub struct CommentDraft {
    text: String,
    synced_for: Option<CircleId>,
}

impl CommentDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Mutable buffer for the text editor widget.
    pub fn buffer_mut(&mut self) -> &mut String {
        &mut self.text
    }

    /// Call once per frame with the currently selected circle; the draft is
    /// reseeded only when the selected id actually changed, so in-progress
    /// edits survive repaints.
    pub fn sync(&mut self, selected: Option<&Circle>) {
        let selected_id = selected.map(|c| c.id);
        if selected_id == self.synced_for {
            return;
        }
        self.synced_for = selected_id;
        self.text = selected
            .and_then(|c| c.comment.clone())
            .unwrap_or_default();
    }

    /// Commits the draft into the selected circle. No selection, no write.
    pub fn save(&self, circles: &mut CircleSet, selected_id: Option<CircleId>) {
        if let Some(id) = selected_id {
            circles.set_comment(id, &self.text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CommentDraft;
    use crate::circle::{CircleSet, PctPoint};

    #[test]
    fn draft_follows_selection_changes() {
        let mut circles = CircleSet::new();
        let a = circles.create(PctPoint::new(10.0, 10.0), 5.0);
        let b = circles.create(PctPoint::new(30.0, 30.0), 5.0);
        circles.set_comment(a, "first");

        let mut draft = CommentDraft::new();
        draft.sync(circles.get(a));
        assert_eq!(draft.text(), "first");

        draft.sync(circles.get(b));
        assert_eq!(draft.text(), "");

        draft.sync(None);
        assert_eq!(draft.text(), "");
    }

    #[test]
    fn sync_keeps_unsaved_edits_for_same_selection() {
        let mut circles = CircleSet::new();
        let a = circles.create(PctPoint::new(10.0, 10.0), 5.0);

        let mut draft = CommentDraft::new();
        draft.sync(circles.get(a));
        draft.buffer_mut().push_str("typing");

        draft.sync(circles.get(a));
        assert_eq!(draft.text(), "typing");
    }

    #[test]
    fn save_commits_only_on_request() {
        let mut circles = CircleSet::new();
        let a = circles.create(PctPoint::new(10.0, 10.0), 5.0);

        let mut draft = CommentDraft::new();
        draft.sync(circles.get(a));
        draft.buffer_mut().push_str("hello");
        assert_eq!(circles.get(a).unwrap().comment, None);

        draft.save(&mut circles, Some(a));
        assert_eq!(circles.get(a).unwrap().comment.as_deref(), Some("hello"));
    }

    #[test]
    fn save_without_selection_is_a_noop() {
        let mut circles = CircleSet::new();
        let a = circles.create(PctPoint::new(10.0, 10.0), 5.0);
        let revision = circles.revision();

        let mut draft = CommentDraft::new();
        draft.buffer_mut().push_str("orphan");
        draft.save(&mut circles, None);
        assert_eq!(circles.revision(), revision);
        assert_eq!(circles.get(a).unwrap().comment, None);
    }
}
