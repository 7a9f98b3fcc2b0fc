use std::io::Write;

use crate::report::{Chart, Table};

/// Output format for aggregated tables.
///
/// Each `TableRenderer` implementation:
/// - Is identified by a stable `name()` used on the command line.
/// - Prints values with two decimals and visibly distinguishes cells whose
///   `best` flag is set.
/// - Writes the whole table or fails; callers discard partial output.
pub trait TableRenderer {
    /// Format name for CLI selection.
    fn name(&self) -> &'static str;

    /// File extension for artifacts in this format, without the dot.
    fn extension(&self) -> &'static str;

    fn render_table(&self, table: &Table, out: &mut dyn Write) -> anyhow::Result<()>;
}

/// Output format for aggregated charts.
pub trait ChartRenderer {
    fn name(&self) -> &'static str;

    fn extension(&self) -> &'static str;

    /// Render `chart` as one self-contained artifact.
    fn render_chart(&self, chart: &Chart, out: &mut dyn Write) -> anyhow::Result<()>;
}
