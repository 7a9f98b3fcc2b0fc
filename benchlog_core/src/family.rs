use serde::{Deserialize, Serialize};

use crate::encoding::Encoding;
use crate::measurement::{Measurement, DEFAULT_LEVEL};

/// A named encoding + compressor combination compared across datasets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Family {
    pub label: String,
    pub encoding: Encoding,
    /// Lowercase compressor name.
    pub compressor: String,
}

impl Family {
    pub fn new(label: impl Into<String>, encoding: Encoding, compressor: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            encoding,
            compressor: compressor.into().to_lowercase(),
        }
    }

    /// Same encoding and compressor, any level.
    pub fn matches_config(&self, m: &Measurement) -> bool {
        m.config.encoding == self.encoding && m.config.compressor == self.compressor
    }

    /// Same encoding and compressor at `level`.
    pub fn matches_at(&self, m: &Measurement, level: i32) -> bool {
        self.matches_config(m) && m.config.level == level
    }

    /// Member of the cross-configuration comparison (default level only).
    pub fn matches(&self, m: &Measurement) -> bool {
        self.matches_at(m, DEFAULT_LEVEL)
    }
}

const COMPRESSION_TABLE: [(&str, Encoding, &str); 12] = [
    ("gzip", Encoding::Plain, "gzip"),
    ("dictionary + gzip", Encoding::Dictionary, "gzip"),
    ("byte_stream_split + gzip", Encoding::Split, "gzip"),
    ("byte_stream_split_xor + gzip", Encoding::SplitXor, "gzip"),
    ("byte_stream_split_component + gzip", Encoding::SplitComponent, "gzip"),
    ("byte_stream_split_rle + gzip", Encoding::SplitRle, "gzip"),
    ("zstd", Encoding::Plain, "zstd"),
    ("dictionary + zstd", Encoding::Dictionary, "zstd"),
    ("byte_stream_split + zstd", Encoding::Split, "zstd"),
    ("byte_stream_split_xor + zstd", Encoding::SplitXor, "zstd"),
    ("byte_stream_split_component + zstd", Encoding::SplitComponent, "zstd"),
    ("byte_stream_split_rle + zstd", Encoding::SplitRle, "zstd"),
];

const ENTROPY_CHART: [(&str, Encoding, &str); 4] = [
    ("BYTE_STREAM_SPLIT + ZSTD", Encoding::Split, "zstd"),
    ("DICTIONARY + ZSTD", Encoding::Dictionary, "zstd"),
    ("PLAIN + ZSTD", Encoding::Plain, "zstd"),
    ("DICTIONARY (Uncompressed)", Encoding::Dictionary, "uncompressed"),
];

fn build(table: &[(&str, Encoding, &str)]) -> Vec<Family> {
    table
        .iter()
        .map(|&(label, encoding, compressor)| Family::new(label, encoding, compressor))
        .collect()
}

/// Every encoding under gzip and zstd, in table order.
pub fn comparison_families() -> Vec<Family> {
    build(&COMPRESSION_TABLE)
}

/// The series of the entropy charts.
pub fn chart_families() -> Vec<Family> {
    build(&ENTROPY_CHART)
}

/// Keep the families with at least one default-level measurement.
///
/// Returns `(present, absent)`.
pub fn split_present(families: Vec<Family>, measurements: &[Measurement]) -> (Vec<Family>, Vec<Family>) {
    split_present_at(families, measurements, &[DEFAULT_LEVEL])
}

/// Keep the families measured at one or more of `levels`.
pub fn split_present_at(
    families: Vec<Family>,
    measurements: &[Measurement],
    levels: &[i32],
) -> (Vec<Family>, Vec<Family>) {
    families.into_iter().partition(|f| {
        measurements
            .iter()
            .any(|m| levels.iter().any(|&level| f.matches_at(m, level)))
    })
}
