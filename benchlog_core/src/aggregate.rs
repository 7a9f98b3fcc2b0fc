use std::collections::HashMap;

use crate::error::{ReportError, Result};
use crate::family::Family;
use crate::measurement::Measurement;
use crate::report::{Cell, Chart, Metric, Row, Series, Table};

/// Bytes per MiB; throughput is reported in MiB/s.
pub const MIB: f64 = 1024.0 * 1024.0;

/// Row label of the uncompressed reference row.
pub const BASELINE_LABEL: &str = "no compression";

/// Header of the label column in comparison tables.
pub const COMPARISON_CORNER: &str = "Configuration \\ Test";

pub const ENTROPY_AXIS: &str = "Entropy (bits/element)";

/// Which byte count a throughput figure divides by the elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThroughputBasis {
    /// The measured (encoded/compressed) size.
    #[default]
    Encoded,
    /// The dataset's uncompressed baseline size.
    Raw,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    pub throughput_basis: ThroughputBasis,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChartOptions {
    /// Fixed uncompressed input size used instead of the dataset baseline,
    /// for inputs generated at a known size.
    pub raw_size: Option<u64>,
    /// Fixed upper bound of the y axis.
    pub y_max: Option<f64>,
}

/// Derives ratio and throughput tables from one log's measurements.
///
/// Construction performs baseline discovery. Every table built afterwards
/// is aligned to [`columns`](Self::columns), the datasets in the order their
/// baselines first appear in the log.
pub struct Aggregator<'a> {
    measurements: &'a [Measurement],
    columns: Vec<String>,
    baselines: HashMap<&'a str, &'a Measurement>,
    options: ReportOptions,
}

impl<'a> Aggregator<'a> {
    pub fn new(measurements: &'a [Measurement]) -> Result<Self> {
        Self::with_options(measurements, ReportOptions::default())
    }

    pub fn with_options(measurements: &'a [Measurement], options: ReportOptions) -> Result<Self> {
        let mut columns: Vec<String> = Vec::new();
        let mut found: HashMap<&'a str, Vec<&'a Measurement>> = HashMap::new();
        for m in measurements.iter().filter(|m| m.config.is_baseline()) {
            let entries = found.entry(m.dataset_name.as_str()).or_default();
            if entries.is_empty() {
                columns.push(m.dataset_name.clone());
            }
            entries.push(m);
        }

        let mut baselines = HashMap::with_capacity(found.len());
        for dataset in &columns {
            let entries = &found[dataset.as_str()];
            if entries.len() > 1 {
                return Err(ReportError::AmbiguousBaseline {
                    dataset: dataset.clone(),
                    count: entries.len(),
                });
            }
            let m = entries[0];
            baselines.insert(m.dataset_name.as_str(), m);
        }

        tracing::debug!(datasets = columns.len(), "discovered baselines");
        Ok(Self {
            measurements,
            columns,
            baselines,
            options,
        })
    }

    /// Dataset names in baseline discovery order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The uncompressed plain measurement of `dataset`.
    pub fn baseline(&self, dataset: &str) -> Result<&'a Measurement> {
        self.baselines
            .get(dataset)
            .copied()
            .ok_or_else(|| ReportError::MissingBaseline {
                dataset: dataset.to_string(),
            })
    }

    /// Baseline size of `dataset` in bytes.
    pub fn baseline_size(&self, dataset: &str) -> Result<u64> {
        Ok(self.baseline(dataset)?.byte_size)
    }

    /// `metric` for one measurement against its dataset baseline.
    pub fn value(&self, m: &Measurement, metric: Metric) -> Result<f64> {
        self.value_with_reference(m, metric, None)
    }

    fn value_with_reference(&self, m: &Measurement, metric: Metric, raw_size: Option<u64>) -> Result<f64> {
        let reference = || match raw_size {
            Some(size) => Ok(size),
            None => self.baseline_size(&m.dataset_name),
        };
        let degenerate = |reason: &'static str| ReportError::DegenerateMeasurement {
            dataset: m.dataset_name.clone(),
            config: m.config.to_string(),
            reason,
        };

        let seconds = match metric {
            Metric::Ratio => {
                if m.byte_size == 0 {
                    return Err(degenerate("zero byte size"));
                }
                return Ok(reference()? as f64 / m.byte_size as f64);
            }
            Metric::WriteThroughput => m.write_time_seconds,
            Metric::ReadThroughput => m.read_time_seconds.ok_or_else(|| ReportError::MissingTiming {
                dataset: m.dataset_name.clone(),
                config: m.config.to_string(),
            })?,
        };
        if seconds <= 0.0 {
            return Err(degenerate("non-positive elapsed time"));
        }
        let bytes = match self.options.throughput_basis {
            ThroughputBasis::Encoded => m.byte_size,
            ThroughputBasis::Raw => reference()?,
        };
        let throughput = (bytes as f64 / MIB) / seconds;
        if !throughput.is_finite() {
            return Err(degenerate("throughput overflows"));
        }
        Ok(throughput)
    }

    /// The family's default-level measurements, one per column.
    ///
    /// The i-th measurement of the family in log order must belong to the
    /// i-th column; anything else means the log is inconsistent and the
    /// table would be misaligned.
    pub fn family_row(&self, family: &Family) -> Result<Vec<&'a Measurement>> {
        let mut row: Vec<&'a Measurement> = Vec::with_capacity(self.columns.len());
        for m in self.measurements.iter().filter(|m| family.matches(m)) {
            self.baseline(&m.dataset_name)?;
            let column = row.len();
            match self.columns.get(column) {
                Some(expected) if *expected == m.dataset_name => row.push(m),
                expected => {
                    return Err(ReportError::InconsistentColumnOrder {
                        family: family.label.clone(),
                        column,
                        expected: expected.cloned(),
                        found: Some(m.dataset_name.clone()),
                    })
                }
            }
        }
        if let Some(expected) = self.columns.get(row.len()) {
            return Err(ReportError::InconsistentColumnOrder {
                family: family.label.clone(),
                column: row.len(),
                expected: Some(expected.clone()),
                found: None,
            });
        }
        Ok(row)
    }

    /// The "no compression" row. Its ratios are exactly 1.0.
    pub fn baseline_row(&self, metric: Metric) -> Result<Row> {
        let cells = self
            .columns
            .iter()
            .map(|dataset| Ok(Cell::plain(self.value(self.baseline(dataset)?, metric)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Row {
            labels: vec![BASELINE_LABEL.to_string()],
            cells,
        })
    }

    /// Baseline row followed by one row per family, best value per dataset
    /// marked across the families.
    pub fn table(&self, families: &[Family], metric: Metric) -> Result<Table> {
        let baseline = self.baseline_row(metric)?;

        let values = families
            .iter()
            .map(|family| {
                self.family_row(family)?
                    .into_iter()
                    .map(|m| self.value(m, metric))
                    .collect::<Result<Vec<f64>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        let mut rows = vec![baseline];
        rows.extend(
            families
                .iter()
                .zip(mark_best_per_column(&values))
                .map(|(family, cells)| Row {
                    labels: vec![family.label.clone()],
                    cells,
                }),
        );

        Ok(Table {
            title: metric.title().to_string(),
            row_header: vec![COMPARISON_CORNER.to_string()],
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Compression ratio per `(dataset, level)` row with one column per
    /// family; the best family is marked in each row.
    pub fn level_table(&self, families: &[Family], levels: &[i32]) -> Result<Table> {
        let mut labels = Vec::new();
        let mut values = Vec::new();
        for dataset in &self.columns {
            for &level in levels {
                let row = families
                    .iter()
                    .map(|family| {
                        let m = self
                            .measurements
                            .iter()
                            .find(|m| m.dataset_name == *dataset && family.matches_at(m, level))
                            .ok_or_else(|| ReportError::MissingMeasurement {
                                dataset: dataset.clone(),
                                family: family.label.clone(),
                                level,
                            })?;
                        self.value(m, Metric::Ratio)
                    })
                    .collect::<Result<Vec<f64>>>()?;
                labels.push(vec![dataset.clone(), level.to_string()]);
                values.push(row);
            }
        }

        let rows = labels
            .into_iter()
            .zip(values.iter().map(|row| mark_best(row)))
            .map(|(labels, cells)| Row { labels, cells })
            .collect();

        Ok(Table {
            title: "Compression levels".to_string(),
            row_header: vec!["Test".to_string(), "Level".to_string()],
            columns: families.iter().map(|f| f.label.clone()).collect(),
            rows,
        })
    }

    /// One series per family: `metric` against the entropy embedded in the
    /// dataset name, sorted by entropy.
    pub fn series(&self, families: &[Family], metric: Metric, options: &ChartOptions) -> Result<Vec<Series>> {
        families
            .iter()
            .map(|family| {
                let mut points = self
                    .measurements
                    .iter()
                    .filter(|m| family.matches(m))
                    .map(|m| {
                        let x = entropy_of(&m.dataset_name)?;
                        let y = self.value_with_reference(m, metric, options.raw_size)?;
                        Ok((x, y))
                    })
                    .collect::<Result<Vec<(i64, f64)>>>()?;
                points.sort_by_key(|&(x, _)| x);
                Ok(Series {
                    label: family.label.clone(),
                    points,
                })
            })
            .collect()
    }

    pub fn entropy_chart(&self, families: &[Family], metric: Metric, options: &ChartOptions) -> Result<Chart> {
        Ok(Chart {
            title: format!("{} by entropy", metric.title()),
            x_label: ENTROPY_AXIS.to_string(),
            y_label: metric.title().to_string(),
            y_max: options.y_max,
            series: self.series(families, metric, options)?,
        })
    }
}

/// Integer after the first `_` of the dataset's leading segment:
/// `gen_12.f64` → 12.
pub fn entropy_of(dataset: &str) -> Result<i64> {
    let malformed = |reason: &str| ReportError::MalformedDatasetName {
        dataset: dataset.to_string(),
        reason: reason.to_string(),
    };
    let stem = dataset.split('.').next().unwrap_or(dataset);
    let field = stem
        .split('_')
        .nth(1)
        .ok_or_else(|| malformed("no `_`-separated entropy field"))?;
    field
        .parse()
        .map_err(|_| malformed("entropy field is not an integer"))
}

/// Flag every value equal to the row maximum.
pub fn mark_best(values: &[f64]) -> Vec<Cell> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    values
        .iter()
        .map(|&value| Cell {
            value,
            best: value == max,
        })
        .collect()
}

/// Flag, in each column, every value equal to that column's maximum.
///
/// Maxima are computed over all rows first; a value's flag depends on
/// rows after it.
pub fn mark_best_per_column(rows: &[Vec<f64>]) -> Vec<Vec<Cell>> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut maxima = vec![f64::NEG_INFINITY; width];
    for row in rows {
        for (slot, &value) in maxima.iter_mut().zip(row) {
            *slot = slot.max(value);
        }
    }
    rows.iter()
        .map(|row| {
            row.iter()
                .zip(&maxima)
                .map(|(&value, &max)| Cell {
                    value,
                    best: value == max,
                })
                .collect()
        })
        .collect()
}
