use std::fmt;

use serde::Serialize;

/// Quantity shown in a table or chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Baseline size divided by the measured size.
    Ratio,
    /// MiB/s over the write time.
    WriteThroughput,
    /// MiB/s over the read time.
    ReadThroughput,
}

impl Metric {
    pub fn title(self) -> &'static str {
        match self {
            Metric::Ratio => "Compression ratio",
            Metric::WriteThroughput => "Write throughput (MiB/s)",
            Metric::ReadThroughput => "Read throughput (MiB/s)",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// One numeric table cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cell {
    pub value: f64,
    /// Equal to the best value of its comparison group.
    pub best: bool,
}

impl Cell {
    pub fn plain(value: f64) -> Self {
        Self { value, best: false }
    }

    /// The value with two decimals, the way every renderer prints it.
    pub fn formatted(&self) -> String {
        format!("{:.2}", self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    /// One label per entry of [`Table::row_header`].
    pub labels: Vec<String>,
    /// One cell per entry of [`Table::columns`].
    pub cells: Vec<Cell>,
}

/// Aggregated, renderer-agnostic table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub title: String,
    /// Headers of the label columns on the left.
    pub row_header: Vec<String>,
    /// Headers of the value columns.
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    /// Swap rows and value columns. Multi-label rows have their labels
    /// joined with a space.
    pub fn transposed(&self) -> Table {
        let columns = self.rows.iter().map(|row| row.labels.join(" ")).collect();
        let rows = self
            .columns
            .iter()
            .enumerate()
            .map(|(col, name)| Row {
                labels: vec![name.clone()],
                cells: self.rows.iter().map(|row| row.cells[col]).collect(),
            })
            .collect();
        Table {
            title: self.title.clone(),
            row_header: vec![self.row_header.join(" ")],
            columns,
            rows,
        }
    }

    /// Value columns reordered by header name, cells moved along.
    pub fn with_sorted_columns(&self) -> Table {
        let mut order: Vec<usize> = (0..self.columns.len()).collect();
        order.sort_by(|&a, &b| self.columns[a].cmp(&self.columns[b]));
        Table {
            title: self.title.clone(),
            row_header: self.row_header.clone(),
            columns: order.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| Row {
                    labels: row.labels.clone(),
                    cells: order.iter().map(|&i| row.cells[i]).collect(),
                })
                .collect(),
        }
    }

    /// Every cell flagged as best, as `(row, column)` positions.
    pub fn best_cells(&self) -> Vec<(usize, usize)> {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(r, row)| {
                row.cells
                    .iter()
                    .enumerate()
                    .filter(|(_, cell)| cell.best)
                    .map(move |(c, _)| (r, c))
            })
            .collect()
    }
}

/// One line of a chart, points sorted by `x`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub points: Vec<(i64, f64)>,
}

/// Aggregated, renderer-agnostic line chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Fixed upper bound of the y axis; derived from the data when `None`.
    pub y_max: Option<f64>,
    pub series: Vec<Series>,
}
