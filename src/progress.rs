use std::time::Instant;

use crate::format::human_size;

/// Per-operation progress bundle for copy and move.
///
/// The underlying copy primitive is not instrumented per byte, so the
/// estimate only advances at sub-file granularity; for whole-tree operations
/// it is inherently coarse.
#[derive(Debug)]
pub struct Progress {
    total: u64,
    done: u64,
    started: Instant,
}

impl Progress {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            done: 0,
            started: Instant::now(),
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn done(&self) -> u64 {
        self.done
    }

    /// Record `bytes` more as processed and render the current estimate.
    pub fn advance(&mut self, bytes: u64) -> String {
        self.done = self.done.saturating_add(bytes).min(self.total);
        let percent = if self.total == 0 {
            100.0
        } else {
            self.done as f64 / self.total as f64 * 100.0
        };
        format!(
            "  {} / {} ({percent:.0}%)",
            human_size(self.done),
            human_size(self.total),
        )
    }

    /// Render the completion summary: elapsed time and mean throughput.
    pub fn finish(&self) -> String {
        let elapsed = self.started.elapsed().as_secs_f64();
        // a clock that has barely moved would make the rate meaningless
        let rate = if elapsed < 1e-3 {
            self.total as f64
        } else {
            self.total as f64 / elapsed
        };
        format!(
            "{} in {elapsed:.2}s ({}/s)",
            human_size(self.total),
            human_size(rate as u64),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_reports_percentage() {
        // Arrange
        let mut progress = Progress::new(1000);

        // Act
        let halfway = progress.advance(500);
        let done = progress.advance(500);

        // Assert
        assert!(halfway.contains("(50%)"), "{halfway}");
        assert!(done.contains("(100%)"), "{done}");
        assert_eq!(progress.done(), 1000);
    }

    #[test]
    fn test_advance_clamps_to_total() {
        let mut progress = Progress::new(100);
        let line = progress.advance(500);
        assert!(line.contains("(100%)"), "{line}");
        assert_eq!(progress.done(), 100);
    }

    #[test]
    fn test_zero_total_is_complete_immediately() {
        let mut progress = Progress::new(0);
        assert!(progress.advance(0).contains("(100%)"));
    }

    #[test]
    fn test_finish_guards_near_zero_elapsed() {
        // finish right after creation: elapsed is (near) zero and must not
        // produce an inf/NaN rate
        let progress = Progress::new(2048);
        let summary = progress.finish();
        assert!(summary.contains("2.0 KB"), "{summary}");
        assert!(summary.contains("/s"), "{summary}");
        assert!(!summary.contains("inf") && !summary.contains("NaN"), "{summary}");
    }
}
