/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    /// Zero-based index of the question being shown.
    pub position: usize,
    pub score: usize,
}

impl SessionProgress {
    /// Fill ratio for a progress bar: `(position + 1) / total`, capped at 1.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        ((self.position + 1) as f64 / self.total as f64).min(1.0)
    }
}
