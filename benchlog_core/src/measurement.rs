use std::fmt;

use serde::Serialize;

use crate::encoding::Encoding;
use crate::parser::TimingColumns;

/// Compressor name the harness uses for "no compression", after case folding.
pub const UNCOMPRESSED: &str = "uncompressed";

/// Level sentinel meaning "not applicable / compressor default".
pub const DEFAULT_LEVEL: i32 = -1;

/// Configuration decoded from the tail of a result file name:
/// `....{compressor}.{encoding}.{level}.bit{precision})`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ConfigKey {
    /// Lowercase compressor name, e.g. `zstd` or `uncompressed`.
    pub compressor: String,
    pub encoding: Encoding,
    /// Compressor level; [`DEFAULT_LEVEL`] when not applicable.
    pub level: i32,
    /// Bit precision of the stored values.
    pub precision: u32,
}

impl ConfigKey {
    /// Whether this is the unencoded, uncompressed reference configuration.
    pub fn is_baseline(&self) -> bool {
        self.encoding == Encoding::Plain && self.compressor == UNCOMPRESSED
    }

    /// The four trailing file name segments this key was parsed from.
    pub fn file_name_suffix(&self) -> String {
        format!(
            "{}.{}.{}.bit{:02})",
            self.compressor,
            self.encoding.raw_token(),
            self.level,
            self.precision
        )
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} + {}, level {}, {} bit",
            self.encoding, self.compressor, self.level, self.precision
        )
    }
}

/// One observed benchmark result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    /// First two dot-separated segments of the result file name.
    pub dataset_name: String,
    pub config: ConfigKey,
    /// Encoded/compressed output size in bytes.
    pub byte_size: u64,
    pub write_time_seconds: f64,
    /// Absent when the log carries a single timing column.
    pub read_time_seconds: Option<f64>,
}

impl Measurement {
    /// Rebuild a log line that parses back into this measurement under `timings`.
    ///
    /// With [`TimingColumns::WriteOnly`] the unused second timing column is
    /// written as `0`.
    pub fn to_line(&self, timings: TimingColumns) -> String {
        let read = match timings {
            TimingColumns::WriteRead => self.read_time_seconds.unwrap_or(0.0),
            TimingColumns::WriteOnly => 0.0,
        };
        format!(
            "{}.{} {} {} {}",
            self.dataset_name,
            self.config.file_name_suffix(),
            self.write_time_seconds,
            read,
            self.byte_size
        )
    }
}
