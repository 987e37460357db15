use serde::Serialize;

/// Point-in-time counts by status, recomputed from the registry on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Progress {
    pub total: usize,
    pub succeeded: usize,
    pub processing: usize,
    pub failed: usize,
}

impl Progress {
    pub fn settled(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn pending(&self) -> usize {
        self.total
            .saturating_sub(self.settled())
            .saturating_sub(self.processing)
    }

    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.settled() as f64 / self.total as f64 * 100.0
        }
    }

    /// e.g. `Processing URL 4 of 5 (60%) | 3 completed, 1 processing, 0 failed`.
    pub fn summary(&self) -> String {
        format!(
            "Processing URL {} of {} ({:.0}%) | {} completed, {} processing, {} failed",
            self.settled() + self.processing,
            self.total,
            self.percent(),
            self.succeeded,
            self.processing,
            self.failed
        )
    }
}
