use thiserror::Error;

/// Everything that can abort a report.
///
/// None of these are recoverable for the report being built: a log that
/// fails to parse or aggregate never yields a partial table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReportError {
    #[error("line {line}: malformed log line: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("line {line}: unrecognized encoding token `{token}`")]
    MalformedConfigurationToken { line: usize, token: String },

    #[error("no uncompressed plain baseline for dataset `{dataset}`")]
    MissingBaseline { dataset: String },

    #[error("dataset `{dataset}` has {count} uncompressed plain baselines, expected exactly one")]
    AmbiguousBaseline { dataset: String, count: usize },

    #[error(
        "family `{family}`: column {column} expected dataset {} but found {}",
        display_slot(.expected),
        display_slot(.found)
    )]
    InconsistentColumnOrder {
        family: String,
        column: usize,
        expected: Option<String>,
        found: Option<String>,
    },

    #[error("dataset `{dataset}` ({config}): {reason}")]
    DegenerateMeasurement {
        dataset: String,
        config: String,
        reason: &'static str,
    },

    #[error("dataset `{dataset}` ({config}) has no read time; parse the log with two timing columns")]
    MissingTiming { dataset: String, config: String },

    #[error("no measurement for dataset `{dataset}`, family `{family}`, level {level}")]
    MissingMeasurement {
        dataset: String,
        family: String,
        level: i32,
    },

    #[error("dataset name `{dataset}`: {reason}")]
    MalformedDatasetName { dataset: String, reason: String },
}

fn display_slot(slot: &Option<String>) -> String {
    match slot {
        Some(name) => format!("`{name}`"),
        None => "nothing".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
