use crate::encoding::Encoding;
use crate::error::{ReportError, Result};
use crate::measurement::{ConfigKey, Measurement};

/// Minimum whitespace-separated fields on a line: `path time_a time_b size`.
pub const MIN_FIELDS: usize = 4;

/// Dataset segments + compressor, encoding, level and precision segments.
pub const MIN_FILE_NAME_SEGMENTS: usize = 6;

/// Characters stripped from both ends of the precision segment (`bit` and `)`).
const PRECISION_PREFIX_LEN: usize = 3;
const PRECISION_SUFFIX_LEN: usize = 1;

/// Which timing columns a log carries. Set by the caller; never guessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimingColumns {
    /// `time_a` is the write time and `time_b` the read time.
    #[default]
    WriteRead,
    /// Only `time_a` (write time) is meaningful. `time_b` must still be a
    /// number but is discarded.
    WriteOnly,
}

impl TimingColumns {
    pub fn has_read_time(self) -> bool {
        matches!(self, Self::WriteRead)
    }
}

/// Dataset identity and configuration decoded from one result file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileKey {
    pub dataset_name: String,
    pub config: ConfigKey,
}

enum LineError {
    Malformed(String),
    UnknownEncoding(String),
}

impl LineError {
    fn at(self, line: usize) -> ReportError {
        match self {
            Self::Malformed(reason) => ReportError::MalformedLine { line, reason },
            Self::UnknownEncoding(token) => ReportError::MalformedConfigurationToken { line, token },
        }
    }
}

/// Turns harness log lines into [`Measurement`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordParser {
    timings: TimingColumns,
}

impl RecordParser {
    pub fn new(timings: TimingColumns) -> Self {
        Self { timings }
    }

    pub fn timings(&self) -> TimingColumns {
        self.timings
    }

    /// Parse a whole log. Lines are numbered from 1 and blank lines are
    /// skipped; the first bad line fails the whole log.
    pub fn parse_log(&self, text: &str) -> Result<Vec<Measurement>> {
        let mut measurements = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            measurements.push(self.parse_line(idx + 1, line)?);
        }
        tracing::debug!(count = measurements.len(), "parsed benchmark log");
        Ok(measurements)
    }

    /// Parse a single line; `line` is only used to label errors.
    pub fn parse_line(&self, line: usize, text: &str) -> Result<Measurement> {
        self.decode_line(text).map_err(|e| e.at(line))
    }

    fn decode_line(&self, text: &str) -> std::result::Result<Measurement, LineError> {
        let fields: Vec<&str> = text.split_whitespace().collect();
        if fields.len() < MIN_FIELDS {
            return Err(LineError::Malformed(format!(
                "expected at least {MIN_FIELDS} fields, found {}",
                fields.len()
            )));
        }

        let FileKey {
            dataset_name,
            config,
        } = decode_file_name(file_name_of(fields[0]))?;

        let time_a = parse_seconds(fields[1], "first timing")?;
        let time_b = parse_seconds(fields[2], "second timing")?;
        let byte_size: u64 = fields[3]
            .parse()
            .map_err(|_| LineError::Malformed(format!("size `{}` is not an unsigned integer", fields[3])))?;

        let read_time_seconds = match self.timings {
            TimingColumns::WriteRead => Some(time_b),
            TimingColumns::WriteOnly => None,
        };

        Ok(Measurement {
            dataset_name,
            config,
            byte_size,
            write_time_seconds: time_a,
            read_time_seconds,
        })
    }
}

/// Decode the result file name at the end of `path`, such as
/// `runs/a.1.zstd.no_enc.-1.bit08)`. `line` labels errors.
pub fn parse_file_name(line: usize, path: &str) -> Result<FileKey> {
    decode_file_name(file_name_of(path)).map_err(|e| e.at(line))
}

fn file_name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn decode_file_name(name: &str) -> std::result::Result<FileKey, LineError> {
    let segments: Vec<&str> = name.split('.').collect();
    let n = segments.len();
    if n < MIN_FILE_NAME_SEGMENTS {
        return Err(LineError::Malformed(format!(
            "file name `{name}` has {n} dot-separated segments, expected at least {MIN_FILE_NAME_SEGMENTS}"
        )));
    }

    let precision = parse_precision(segments[n - 1])?;
    let level: i32 = segments[n - 2]
        .parse()
        .map_err(|_| LineError::Malformed(format!("level `{}` is not an integer", segments[n - 2])))?;
    let encoding = Encoding::from_raw(segments[n - 3])
        .ok_or_else(|| LineError::UnknownEncoding(segments[n - 3].to_string()))?;
    let compressor = segments[n - 4].to_lowercase();
    if compressor.is_empty() {
        return Err(LineError::Malformed(format!("file name `{name}` has an empty compressor")));
    }

    Ok(FileKey {
        dataset_name: format!("{}.{}", segments[0], segments[1]),
        config: ConfigKey {
            compressor,
            encoding,
            level,
            precision,
        },
    })
}

fn parse_precision(segment: &str) -> std::result::Result<u32, LineError> {
    let malformed = || LineError::Malformed(format!("precision segment `{segment}` is not of the form `bitNN)`"));
    if segment.len() <= PRECISION_PREFIX_LEN + PRECISION_SUFFIX_LEN {
        return Err(malformed());
    }
    let digits = segment
        .get(PRECISION_PREFIX_LEN..segment.len() - PRECISION_SUFFIX_LEN)
        .ok_or_else(malformed)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    digits.parse().map_err(|_| malformed())
}

fn parse_seconds(field: &str, what: &str) -> std::result::Result<f64, LineError> {
    match field.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(LineError::Malformed(format!("{what} `{field}` is not a finite number"))),
    }
}
