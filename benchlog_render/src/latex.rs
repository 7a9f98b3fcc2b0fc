use std::io::Write;

use benchlog_core::{Table, TableRenderer};

/// Color name the surrounding document must define, e.g.
/// `\definecolor{ngreen}{RGB}{144,238,144}`.
pub const BEST_COLOR: &str = "ngreen";

/// LaTeX `tabular` body for pasting into a paper.
///
/// Row labels are bold; best cells get a `\cellcolor` background, which
/// needs the `colortbl` package (or `xcolor` with the `table` option).
pub struct LatexRenderer;

fn escape(v: &str) -> String {
    let mut out = String::with_capacity(v.len());
    for c in v.chars() {
        match c {
            '\\' => out.push_str(r"\textbackslash{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

impl TableRenderer for LatexRenderer {
    fn name(&self) -> &'static str {
        "latex"
    }

    fn extension(&self) -> &'static str {
        "tex"
    }

    fn render_table(&self, table: &Table, out: &mut dyn Write) -> anyhow::Result<()> {
        let spec = format!(
            "{}{}",
            "l".repeat(table.row_header.len()),
            "r".repeat(table.columns.len())
        );
        writeln!(out, "% {}", table.title)?;
        writeln!(out, "\\begin{{tabular}}{{{spec}}}")?;
        writeln!(out, "\\hline")?;

        let headers: Vec<String> = table
            .row_header
            .iter()
            .chain(&table.columns)
            .map(|h| escape(h))
            .collect();
        writeln!(out, "{} \\\\", headers.join(" & "))?;
        writeln!(out, "\\hline")?;

        for row in &table.rows {
            let mut fields: Vec<String> = row
                .labels
                .iter()
                .map(|label| format!("\\textbf{{{}}}", escape(label)))
                .collect();
            fields.extend(row.cells.iter().map(|cell| {
                if cell.best {
                    format!("\\cellcolor{{{BEST_COLOR}}}{}", cell.formatted())
                } else {
                    cell.formatted()
                }
            }));
            writeln!(out, "{} \\\\", fields.join(" & "))?;
        }

        writeln!(out, "\\hline")?;
        writeln!(out, "\\end{{tabular}}")?;
        Ok(())
    }
}
