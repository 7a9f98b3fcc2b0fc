use std::io::Write;

use benchlog_core::{Cell, Table, TableRenderer};

/// GitHub-flavoured Markdown pipe table under a `#` heading.
///
/// Best cells are wrapped in `***` (bold italic). Label columns are left
/// aligned and value columns right aligned.
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    fn cell(cell: &Cell) -> String {
        if cell.best {
            format!("***{}***", cell.formatted())
        } else {
            cell.formatted()
        }
    }
}

fn escape(v: &str) -> String {
    v.replace('|', r"\|")
}

impl TableRenderer for MarkdownRenderer {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn extension(&self) -> &'static str {
        "md"
    }

    fn render_table(&self, table: &Table, out: &mut dyn Write) -> anyhow::Result<()> {
        writeln!(out, "# {}", table.title)?;
        writeln!(out)?;

        write!(out, "|")?;
        for header in table.row_header.iter().chain(&table.columns) {
            write!(out, " {} |", escape(header))?;
        }
        writeln!(out)?;

        write!(out, "|")?;
        for _ in &table.row_header {
            write!(out, " :--- |")?;
        }
        for _ in &table.columns {
            write!(out, " ---: |")?;
        }
        writeln!(out)?;

        for row in &table.rows {
            write!(out, "|")?;
            for label in &row.labels {
                write!(out, " {} |", escape(label))?;
            }
            for cell in &row.cells {
                write!(out, " {} |", Self::cell(cell))?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}
