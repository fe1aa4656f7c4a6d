//! Result export port trait.

use crate::domain::analysis::Snapshot;
use crate::domain::error::FoliostatError;
use std::path::Path;

/// Port for writing a computed snapshot to tabular output.
pub trait ReportPort {
    /// Per-date simple/log returns and equity values for every series.
    fn write_series_table(&self, snapshot: &Snapshot, path: &Path) -> Result<(), FoliostatError>;

    /// One row per series with the named metrics.
    fn write_stats_table(&self, snapshot: &Snapshot, path: &Path) -> Result<(), FoliostatError>;

    /// Square correlation table, empty when there is nothing to correlate.
    fn write_correlation_table(
        &self,
        snapshot: &Snapshot,
        path: &Path,
    ) -> Result<(), FoliostatError>;
}
