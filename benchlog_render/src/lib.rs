mod json;
mod latex;
mod markdown;
mod svg;

pub use json::JsonRenderer;
pub use latex::LatexRenderer;
pub use markdown::MarkdownRenderer;
pub use svg::SvgChartRenderer;

use benchlog_core::TableRenderer;

/// Table formats accepted by [`table_renderer_by_name`].
pub const TABLE_FORMATS: &[&str] = &["markdown", "latex", "json"];

/// Resolve a table renderer from its CLI name.
pub fn table_renderer_by_name(name: &str) -> anyhow::Result<Box<dyn TableRenderer>> {
    match name {
        "markdown" | "md" => Ok(Box::new(MarkdownRenderer)),
        "latex" | "tex" => Ok(Box::new(LatexRenderer)),
        "json" => Ok(Box::new(JsonRenderer)),
        other => anyhow::bail!(
            "unknown table format '{}'. Valid options: {}",
            other,
            TABLE_FORMATS.join(", ")
        ),
    }
}
