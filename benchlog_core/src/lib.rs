pub mod aggregate;
pub mod encoding;
pub mod error;
pub mod family;
pub mod measurement;
pub mod parser;
pub mod render;
pub mod report;

pub use aggregate::{Aggregator, ChartOptions, ReportOptions, ThroughputBasis};
pub use encoding::Encoding;
pub use error::{ReportError, Result};
pub use family::Family;
pub use measurement::{ConfigKey, Measurement};
pub use parser::{RecordParser, TimingColumns};
pub use render::{ChartRenderer, TableRenderer};
pub use report::{Cell, Chart, Metric, Row, Series, Table};
