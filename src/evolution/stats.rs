//! Per-generation statistics and the tab-separated report they print as.

use std::fmt;
use std::io::Write;
use std::time::Duration;

use crate::error::Result;

/// Column header printed once before the first record.
pub const REPORT_COLUMNS: &str = "gen\tcum time\tbest bins\tbest fit\tavrg fit\tsearches";

/// One row of the run report.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationStats {
    /// 1-based; generation 1 is the initialized population.
    pub generation: usize,
    /// Wall time since the run started.
    pub elapsed: Duration,
    pub best_bins: usize,
    pub best_fitness: f64,
    pub average_fitness: f64,
    /// Local-search neighbors evaluated so far, initialization included.
    pub searches: usize,
}

impl fmt::Display for GenerationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{:.6}\t{}\t{:.6}\t{:.6}\t{}",
            self.generation,
            self.elapsed.as_secs_f64(),
            self.best_bins,
            self.best_fitness,
            self.average_fitness,
            self.searches
        )
    }
}

/// Writes the report header: the theoretical minimum and the column names.
pub fn write_header<W: Write + ?Sized>(out: &mut W, theoretical_min_bins: usize) -> Result<()> {
    writeln!(out, "theoretical minimum bins: {}", theoretical_min_bins)?;
    writeln!(out, "{}", REPORT_COLUMNS)?;
    Ok(())
}
