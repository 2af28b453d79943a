use crate::parser::ParseError;

/// What one edit did to the other side of the tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The editor text already describes the visual state and was kept as typed.
    Preserved,
    /// The editor text was replaced by freshly generated SQL.
    Regenerated,
    /// Typed SQL described a different query; the visual state now mirrors it.
    VisualUpdated,
    /// Typed SQL could not be read; the visual state was left alone.
    Rejected(ParseError),
}

impl SyncOutcome {
    pub fn text_changed(&self) -> bool {
        matches!(self, SyncOutcome::Regenerated)
    }

    pub fn visual_changed(&self) -> bool {
        matches!(self, SyncOutcome::VisualUpdated)
    }
}
