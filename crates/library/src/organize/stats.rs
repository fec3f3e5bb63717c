use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Run-level accounting, produced once when a run completes.
///
/// `succeeded + failed == total_discovered` always holds. `skipped` is a
/// breakdown of `failed`: files that vanished or stopped qualifying between
/// discovery and their pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub total_discovered: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub skipped: u64,
    /// Wall-clock time from the start of discovery to the last pipeline
    /// finishing.
    pub elapsed: Duration,
    pub started_at: OffsetDateTime,
    pub finished_at: OffsetDateTime,
}

impl RunStats {
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Average wall-clock seconds per discovered file, if there were any.
    pub fn average_seconds(&self) -> Option<f64> {
        (self.total_discovered > 0).then(|| self.elapsed_seconds() / self.total_discovered as f64)
    }
}

impl Display for RunStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let started = self.started_at.format(&Rfc3339).map_err(|_| std::fmt::Error)?;
        let finished = self.finished_at.format(&Rfc3339).map_err(|_| std::fmt::Error)?;
        writeln!(f, "Started:   {started}")?;
        writeln!(f, "Finished:  {finished}")?;
        writeln!(f, "Total:     {}", self.total_discovered)?;
        writeln!(f, "Succeeded: {}", self.succeeded)?;
        writeln!(f, "Failed:    {} ({} skipped)", self.failed, self.skipped)?;
        write!(f, "Elapsed:   {:.2}s", self.elapsed_seconds())?;
        if let Some(average) = self.average_seconds() {
            write!(f, " ({average:.2}s per file)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn stats(total_discovered: u64, elapsed: Duration) -> RunStats {
        RunStats {
            total_discovered,
            succeeded: total_discovered.saturating_sub(1),
            failed: total_discovered.min(1),
            skipped: 0,
            elapsed,
            started_at: datetime!(2026-01-02 03:04:05 UTC),
            finished_at: datetime!(2026-01-02 03:04:15 UTC),
        }
    }

    #[test]
    fn test_average_seconds() {
        assert_eq!(stats(4, Duration::from_secs(10)).average_seconds(), Some(2.5));
        assert_eq!(stats(0, Duration::from_secs(10)).average_seconds(), None);
    }

    #[test]
    fn test_summary() {
        let summary = stats(4, Duration::from_secs(10)).to_string();
        assert!(summary.contains("Started:   2026-01-02T03:04:05Z"), "{summary}");
        assert!(summary.contains("Succeeded: 3"), "{summary}");
        assert!(summary.contains("Failed:    1 (0 skipped)"), "{summary}");
        assert!(summary.ends_with("Elapsed:   10.00s (2.50s per file)"), "{summary}");
        assert!(stats(0, Duration::ZERO).to_string().ends_with("Elapsed:   0.00s"));
    }
}
