use std::io::Write;

use benchlog_core::{Table, TableRenderer};

/// The table as pretty-printed JSON, for feeding other tooling.
pub struct JsonRenderer;

impl TableRenderer for JsonRenderer {
    fn name(&self) -> &'static str {
        "json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn render_table(&self, table: &Table, out: &mut dyn Write) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut *out, table)?;
        writeln!(out)?;
        Ok(())
    }
}
