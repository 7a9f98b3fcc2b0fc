use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use benchlog_core::family::{chart_families, comparison_families, split_present_at};
use benchlog_core::measurement::DEFAULT_LEVEL;
use benchlog_core::{
    Aggregator, ChartOptions, ChartRenderer, Family, Measurement, Metric, RecordParser, ReportOptions, Table,
    TableRenderer, ThroughputBasis, TimingColumns,
};
use benchlog_render::{table_renderer_by_name, SvgChartRenderer};

// ── CLI definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "benchlog",
    about = "Turn encoding/compression benchmark logs into comparison tables and entropy charts",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Timings {
    /// `path write read size`
    WriteRead,
    /// `path write unused size`
    WriteOnly,
}

impl From<Timings> for TimingColumns {
    fn from(t: Timings) -> Self {
        match t {
            Timings::WriteRead => TimingColumns::WriteRead,
            Timings::WriteOnly => TimingColumns::WriteOnly,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Basis {
    /// Measured (encoded/compressed) size
    Encoded,
    /// Uncompressed baseline size of the dataset
    Raw,
}

impl From<Basis> for ThroughputBasis {
    fn from(b: Basis) -> Self {
        match b {
            Basis::Encoded => ThroughputBasis::Encoded,
            Basis::Raw => ThroughputBasis::Raw,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print ratio and throughput tables, one column per dataset
    Tables {
        /// Benchmark log ("-" reads stdin; .gz and .zst are decompressed)
        log: PathBuf,
        /// Timing columns of the log
        #[arg(long, value_enum, default_value = "write-read")]
        timings: Timings,
        /// Output format: markdown | latex | json
        #[arg(short, long, default_value = "markdown")]
        format: String,
        /// JSON file with the families to compare, in row order
        #[arg(long)]
        families: Option<PathBuf>,
        /// Byte count throughput is computed over
        #[arg(long, value_enum, default_value = "encoded")]
        throughput_basis: Basis,
        /// Datasets as rows, families as columns
        #[arg(long)]
        transpose: bool,
        /// Order datasets by name instead of by first appearance in the log
        #[arg(long)]
        sort: bool,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the compression ratio of one compressor across levels
    Levels {
        /// Benchmark log ("-" reads stdin; .gz and .zst are decompressed)
        log: PathBuf,
        #[arg(long, value_enum, default_value = "write-read")]
        timings: Timings,
        /// Compressor whose encodings are compared
        #[arg(short, long, default_value = "zstd")]
        compressor: String,
        /// Levels to tabulate, comma separated
        #[arg(short, long, value_delimiter = ',', default_value = "1,4,7,10", allow_hyphen_values = true)]
        levels: Vec<i32>,
        /// JSON file with the families to compare, in column order
        #[arg(long)]
        families: Option<PathBuf>,
        /// Output format: markdown | latex | json
        #[arg(short, long, default_value = "markdown")]
        format: String,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write SVG charts of ratio and throughput against dataset entropy
    Charts {
        /// Benchmark log ("-" reads stdin; .gz and .zst are decompressed)
        log: PathBuf,
        #[arg(long, value_enum, default_value = "write-read")]
        timings: Timings,
        /// Directory the charts are written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// JSON file with the chart series families
        #[arg(long)]
        families: Option<PathBuf>,
        /// Fixed uncompressed input size in bytes, used instead of baselines
        #[arg(long)]
        raw_size: Option<u64>,
        /// Byte count throughput is computed over [default: raw with --raw-size, encoded otherwise]
        #[arg(long, value_enum)]
        throughput_basis: Option<Basis>,
        /// Upper bound of the write throughput y axis
        #[arg(long)]
        write_y_max: Option<f64>,
        /// Upper bound of the read throughput y axis
        #[arg(long)]
        read_y_max: Option<f64>,
    },
    /// List parsed measurements and dataset baselines
    Inspect {
        /// Benchmark log ("-" reads stdin; .gz and .zst are decompressed)
        log: PathBuf,
        #[arg(long, value_enum, default_value = "write-read")]
        timings: Timings,
    },
}

// ── Helpers ────────────────────────────────────────────────────────────────

/// Whole log as text, decompressing by file extension.
fn read_log(path: &Path) -> anyhow::Result<String> {
    let mut text = String::new();
    if path.to_str() == Some("-") {
        io::stdin()
            .lock()
            .read_to_string(&mut text)
            .context("reading log from stdin")?;
        return Ok(text);
    }

    let file = File::open(path).with_context(|| format!("opening log file {:?}", path))?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("gz") => {
            flate2::read::GzDecoder::new(file)
                .read_to_string(&mut text)
                .with_context(|| format!("decompressing gzip log {:?}", path))?;
        }
        Some("zst") => {
            zstd::stream::read::Decoder::new(file)
                .with_context(|| format!("opening zstd log {:?}", path))?
                .read_to_string(&mut text)
                .with_context(|| format!("decompressing zstd log {:?}", path))?;
        }
        _ => {
            let mut file = file;
            file.read_to_string(&mut text)
                .with_context(|| format!("reading log file {:?}", path))?;
        }
    }
    Ok(text)
}

fn load_measurements(path: &Path, timings: Timings) -> anyhow::Result<Vec<Measurement>> {
    let text = read_log(path)?;
    let measurements = RecordParser::new(timings.into())
        .parse_log(&text)
        .with_context(|| format!("parsing {:?}", path))?;
    tracing::debug!(count = measurements.len(), path = ?path, "loaded measurements");
    Ok(measurements)
}

fn load_families(path: &Path) -> anyhow::Result<Vec<Family>> {
    let file = File::open(path).with_context(|| format!("opening family file {:?}", path))?;
    let families: Vec<Family> = serde_json::from_reader(io::BufReader::new(file))
        .with_context(|| format!("parsing family file {:?}", path))?;
    // normalize the case the same way `Family::new` does
    Ok(families
        .into_iter()
        .map(|f| Family::new(f.label, f.encoding, f.compressor))
        .collect())
}

/// Charts plot the throughput of the fixed-size input when one is given.
fn chart_basis(raw_size: Option<u64>, basis: Option<Basis>) -> ThroughputBasis {
    match (basis, raw_size) {
        (Some(basis), _) => basis.into(),
        (None, Some(_)) => ThroughputBasis::Raw,
        (None, None) => ThroughputBasis::Encoded,
    }
}

/// Families from `--families` as given, or the built-in catalogue minus
/// the families the log has no measurement for at any of `levels`.
fn select_families(
    file: Option<&Path>,
    catalogue: Vec<Family>,
    measurements: &[Measurement],
    levels: &[i32],
) -> anyhow::Result<Vec<Family>> {
    if let Some(path) = file {
        return load_families(path);
    }
    let (present, absent) = split_present_at(catalogue, measurements, levels);
    for family in &absent {
        tracing::warn!(family = %family.label, "no measurements, skipping family");
    }
    Ok(present)
}

fn open_output(output: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating output file {:?}", path))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn write_tables(
    renderer: &dyn TableRenderer,
    tables: &[Table],
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let mut out = open_output(output)?;
    for (i, table) in tables.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        renderer.render_table(table, &mut out)?;
    }
    out.flush()?;
    if let Some(path) = output {
        tracing::info!(path = ?path, tables = tables.len(), "wrote tables");
    }
    Ok(())
}

// ── Subcommand implementations ─────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn run_tables(
    log: PathBuf,
    timings: Timings,
    format: &str,
    families: Option<PathBuf>,
    basis: Basis,
    transpose: bool,
    sort: bool,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let renderer = table_renderer_by_name(format)?;
    let measurements = load_measurements(&log, timings)?;
    let options = ReportOptions {
        throughput_basis: basis.into(),
    };
    let aggregator = Aggregator::with_options(&measurements, options)?;
    let families = select_families(
        families.as_deref(),
        comparison_families(),
        &measurements,
        &[DEFAULT_LEVEL],
    )?;

    let mut metrics = vec![Metric::Ratio, Metric::WriteThroughput];
    if TimingColumns::from(timings).has_read_time() {
        metrics.push(Metric::ReadThroughput);
    }

    let tables = metrics
        .into_iter()
        .map(|metric| -> anyhow::Result<Table> {
            let mut table = aggregator.table(&families, metric)?;
            if sort {
                table = table.with_sorted_columns();
            }
            Ok(if transpose { table.transposed() } else { table })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    write_tables(renderer.as_ref(), &tables, output.as_deref())
}

fn run_levels(
    log: PathBuf,
    timings: Timings,
    compressor: &str,
    levels: &[i32],
    families: Option<PathBuf>,
    format: &str,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let renderer = table_renderer_by_name(format)?;
    let measurements = load_measurements(&log, timings)?;
    let aggregator = Aggregator::new(&measurements)?;

    let compressor = compressor.to_lowercase();
    let catalogue: Vec<Family> = comparison_families()
        .into_iter()
        .filter(|f| f.compressor == compressor)
        .collect();
    let families = select_families(families.as_deref(), catalogue, &measurements, levels)?;
    if families.is_empty() {
        anyhow::bail!("no families with measurements for compressor '{}' at levels {:?}", compressor, levels);
    }

    let table = aggregator.level_table(&families, levels)?;
    write_tables(renderer.as_ref(), &[table], output.as_deref())
}

#[allow(clippy::too_many_arguments)]
fn run_charts(
    log: PathBuf,
    timings: Timings,
    out_dir: PathBuf,
    families: Option<PathBuf>,
    raw_size: Option<u64>,
    basis: Option<Basis>,
    write_y_max: Option<f64>,
    read_y_max: Option<f64>,
) -> anyhow::Result<()> {
    let measurements = load_measurements(&log, timings)?;
    let options = ReportOptions {
        throughput_basis: chart_basis(raw_size, basis),
    };
    let aggregator = Aggregator::with_options(&measurements, options)?;
    let families = select_families(
        families.as_deref(),
        chart_families(),
        &measurements,
        &[DEFAULT_LEVEL],
    )?;

    let mut charts = vec![
        ("entropy_ratio", Metric::Ratio, None),
        ("entropy_write_speed", Metric::WriteThroughput, write_y_max),
    ];
    if TimingColumns::from(timings).has_read_time() {
        charts.push(("entropy_read_speed", Metric::ReadThroughput, read_y_max));
    }

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating output directory {:?}", out_dir))?;

    let renderer = SvgChartRenderer;
    for (stem, metric, y_max) in charts {
        let options = ChartOptions { raw_size, y_max };
        let chart = aggregator.entropy_chart(&families, metric, &options)?;
        let path = out_dir.join(format!("{}.{}", stem, renderer.extension()));
        let file = File::create(&path).with_context(|| format!("creating chart file {:?}", path))?;
        let mut out = BufWriter::new(file);
        renderer.render_chart(&chart, &mut out)?;
        out.flush()
            .with_context(|| format!("writing chart file {:?}", path))?;
        drop(out);
        tracing::info!(path = ?path, series = chart.series.len(), "wrote chart");
    }
    Ok(())
}

fn run_inspect(log: PathBuf, timings: Timings) -> anyhow::Result<()> {
    let measurements = load_measurements(&log, timings)?;
    let aggregator = Aggregator::new(&measurements)?;

    println!("=== Benchmark log: {:?} ===", log);
    println!();
    println!("  measurements   : {}", measurements.len());
    println!("  datasets       : {}", aggregator.columns().len());
    println!(
        "  default level  : {}",
        measurements
            .iter()
            .filter(|m| m.config.level == DEFAULT_LEVEL)
            .count()
    );

    println!();
    println!("  {:<32}  {:>14}", "dataset", "baseline bytes");
    println!("  {}", "-".repeat(48));
    for dataset in aggregator.columns() {
        println!("  {:<32}  {:>14}", dataset, aggregator.baseline_size(dataset)?);
    }

    println!();
    println!(
        "  {:<32}  {:<14}  {:<16}  {:>5}  {:>4}  {:>14}  {:>10}  {:>10}",
        "dataset", "compressor", "encoding", "level", "bits", "bytes", "write s", "read s"
    );
    println!("  {}", "-".repeat(118));
    for m in &measurements {
        let read = match m.read_time_seconds {
            Some(t) => format!("{:.4}", t),
            None => "-".to_string(),
        };
        println!(
            "  {:<32}  {:<14}  {:<16}  {:>5}  {:>4}  {:>14}  {:>10.4}  {:>10}",
            m.dataset_name,
            m.config.compressor,
            m.config.encoding.canonical(),
            m.config.level,
            m.config.precision,
            m.byte_size,
            m.write_time_seconds,
            read
        );
    }
    Ok(())
}

// ── Entry point ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Tables {
            log,
            timings,
            format,
            families,
            throughput_basis,
            transpose,
            sort,
            output,
        } => run_tables(log, timings, &format, families, throughput_basis, transpose, sort, output),
        Commands::Levels {
            log,
            timings,
            compressor,
            levels,
            families,
            format,
            output,
        } => run_levels(log, timings, &compressor, &levels, families, &format, output),
        Commands::Charts {
            log,
            timings,
            out_dir,
            families,
            raw_size,
            throughput_basis,
            write_y_max,
            read_y_max,
        } => run_charts(
            log,
            timings,
            out_dir,
            families,
            raw_size,
            throughput_basis,
            write_y_max,
            read_y_max,
        ),
        Commands::Inspect { log, timings } => run_inspect(log, timings),
    }
}
