/// Aggregator tests: baseline discovery, column alignment, ratio and
/// throughput arithmetic, and best-value marking.
use benchlog_core::aggregate::{entropy_of, mark_best, mark_best_per_column, BASELINE_LABEL, MIB};
use benchlog_core::family::{chart_families, comparison_families, split_present, split_present_at};
use benchlog_core::{
    Aggregator, ChartOptions, Encoding, Family, Measurement, Metric, RecordParser, ReportError, ReportOptions,
    ThroughputBasis,
};

// ── helpers ───────────────────────────────────────────────────────────────

fn measurements(log: &str) -> Vec<Measurement> {
    RecordParser::default().parse_log(log).unwrap()
}

fn zstd_split() -> Family {
    Family::new("byte_stream_split + zstd", Encoding::Split, "zstd")
}

fn zstd_plain() -> Family {
    Family::new("zstd", Encoding::Plain, "zstd")
}

fn zstd_dict() -> Family {
    Family::new("dictionary + zstd", Encoding::Dictionary, "zstd")
}

const TWO_DATASETS: &str = "\
a.1.UNCOMPRESSED.no_enc.-1.bit08) 0.5 0.25 2000
b.2.UNCOMPRESSED.no_enc.-1.bit08) 1.0 0.5 4000
a.1.zstd.no_enc.-1.bit08) 1.0 2.0 1000
b.2.zstd.no_enc.-1.bit08) 2.0 1.0 1000
a.1.zstd.fp.-1.bit08) 1.0 2.0 500
b.2.zstd.fp.-1.bit08) 2.0 1.0 2000
a.1.zstd.fp.3.bit08) 4.0 2.0 400
";

// ── scenarios ─────────────────────────────────────────────────────────────

#[test]
fn test_single_dataset_scenario() {
    let ms = measurements(
        "a.1.zstd.no_enc.-1.bit08) 1.0 2.0 1000\na.1.UNCOMPRESSED.no_enc.-1.bit08) 0.5 0.1 2000\n",
    );
    let agg = Aggregator::new(&ms).unwrap();
    assert_eq!(agg.columns(), ["a.1"]);
    assert_eq!(agg.baseline_size("a.1").unwrap(), 2000);

    let ratio = agg.table(&[zstd_plain()], Metric::Ratio).unwrap();
    assert_eq!(ratio.rows[1].cells[0].value, 2.0);
    assert_eq!(ratio.rows[1].cells[0].formatted(), "2.00");

    let write = agg.table(&[zstd_plain()], Metric::WriteThroughput).unwrap();
    let expected = (1000.0 / 1_048_576.0) / 1.0;
    assert_eq!(write.rows[1].cells[0].value, expected);
    assert!((write.rows[1].cells[0].value - 0.00095).abs() < 1e-5);
}

#[test]
fn test_baseline_row_ratio_is_exactly_one() {
    let ms = measurements(TWO_DATASETS);
    let agg = Aggregator::new(&ms).unwrap();
    let table = agg.table(&[zstd_plain(), zstd_split()], Metric::Ratio).unwrap();

    let baseline = &table.rows[0];
    assert_eq!(baseline.labels, [BASELINE_LABEL]);
    for cell in &baseline.cells {
        assert_eq!(cell.value, 1.0);
        assert!(!cell.best, "the baseline row never competes");
    }
}

#[test]
fn test_comparison_table_layout_and_best() {
    let ms = measurements(TWO_DATASETS);
    let agg = Aggregator::new(&ms).unwrap();
    let table = agg.table(&[zstd_plain(), zstd_split()], Metric::Ratio).unwrap();

    assert_eq!(table.title, "Compression ratio");
    assert_eq!(table.columns, ["a.1", "b.2"]);
    assert_eq!(table.rows.len(), 3);

    let plain = &table.rows[1];
    let split = &table.rows[2];
    assert_eq!(plain.cells[0].value, 2.0);
    assert_eq!(plain.cells[1].value, 4.0);
    assert_eq!(split.cells[0].value, 4.0);
    assert_eq!(split.cells[1].value, 2.0);

    // a.1 best is split, b.2 best is plain
    assert_eq!(table.best_cells(), vec![(1, 1), (2, 0)]);
}

#[test]
fn test_write_and_read_throughput() {
    let ms = measurements(TWO_DATASETS);
    let agg = Aggregator::new(&ms).unwrap();

    let write = agg.table(&[zstd_plain()], Metric::WriteThroughput).unwrap();
    assert_eq!(write.rows[0].cells[0].value, (2000.0 / MIB) / 0.5);
    assert_eq!(write.rows[1].cells[1].value, (1000.0 / MIB) / 2.0);

    let read = agg.table(&[zstd_plain()], Metric::ReadThroughput).unwrap();
    assert_eq!(read.rows[1].cells[0].value, (1000.0 / MIB) / 2.0);
    assert_eq!(read.rows[1].cells[1].value, (1000.0 / MIB) / 1.0);
}

#[test]
fn test_raw_throughput_basis_uses_baseline_size() {
    let ms = measurements(TWO_DATASETS);
    let options = ReportOptions {
        throughput_basis: ThroughputBasis::Raw,
    };
    let agg = Aggregator::with_options(&ms, options).unwrap();
    let write = agg.table(&[zstd_split()], Metric::WriteThroughput).unwrap();
    assert_eq!(write.rows[1].cells[0].value, (2000.0 / MIB) / 1.0);
    assert_eq!(write.rows[1].cells[1].value, (4000.0 / MIB) / 2.0);
}

#[test]
fn test_only_default_level_enters_comparison() {
    // a.1 split at level 3 (ratio 5.0) must not show up or win
    let ms = measurements(TWO_DATASETS);
    let agg = Aggregator::new(&ms).unwrap();
    let row = agg.family_row(&zstd_split()).unwrap();
    assert_eq!(row.len(), 2);
    assert!(row.iter().all(|m| m.config.level == -1));
}

// ── best marking ──────────────────────────────────────────────────────────

#[test]
fn test_ties_are_all_marked_best() {
    // ratios 3.50, 3.50 and 3.49 for the same dataset
    let ms = measurements(
        "\
d.1.UNCOMPRESSED.no_enc.-1.bit08) 1 1 7000
d.1.zstd.no_enc.-1.bit08) 1 1 2000
d.1.zstd.dict.-1.bit08) 1 1 2000
d.1.zstd.fp.-1.bit08) 1 1 2006
",
    );
    let agg = Aggregator::new(&ms).unwrap();
    let table = agg.table(&[zstd_plain(), zstd_dict(), zstd_split()], Metric::Ratio).unwrap();
    let cells: Vec<_> = table.rows[1..].iter().map(|r| r.cells[0]).collect();
    assert_eq!(cells[0].formatted(), "3.50");
    assert_eq!(cells[1].formatted(), "3.50");
    assert_eq!(cells[2].formatted(), "3.49");
    assert!(cells[0].best);
    assert!(cells[1].best);
    assert!(!cells[2].best);
}

#[test]
fn test_best_is_exact_float_equality_not_rounded() {
    let cells = mark_best(&[3.499, 3.5, 3.4951]);
    assert_eq!(cells.iter().map(|c| c.best).collect::<Vec<_>>(), [false, true, false]);
    // 3.4951 formats like 3.50 but is not the maximum
    assert_eq!(cells[2].formatted(), "3.50");
}

#[test]
fn test_mark_best_per_column_sees_later_rows() {
    let rows = vec![vec![1.0, 9.0], vec![5.0, 9.0], vec![2.0, 3.0]];
    let marked = mark_best_per_column(&rows);
    let flags: Vec<Vec<bool>> = marked.iter().map(|r| r.iter().map(|c| c.best).collect()).collect();
    assert_eq!(flags, vec![vec![false, true], vec![true, true], vec![false, false]]);
}

// ── failures ──────────────────────────────────────────────────────────────

#[test]
fn test_missing_baseline() {
    let ms = measurements(
        "a.1.UNCOMPRESSED.no_enc.-1.bit08) 1 1 2000\nb.2.zstd.no_enc.-1.bit08) 1 1 1000\n",
    );
    let agg = Aggregator::new(&ms).unwrap();
    let err = agg.table(&[zstd_plain()], Metric::Ratio).unwrap_err();
    assert_eq!(
        err,
        ReportError::MissingBaseline {
            dataset: "b.2".to_string()
        }
    );
}

#[test]
fn test_ambiguous_baseline() {
    let ms = measurements(
        "a.1.UNCOMPRESSED.no_enc.-1.bit08) 1 1 2000\na.1.UNCOMPRESSED.no_enc.3.bit08) 1 1 2000\n",
    );
    let err = Aggregator::new(&ms).err().unwrap();
    assert_eq!(
        err,
        ReportError::AmbiguousBaseline {
            dataset: "a.1".to_string(),
            count: 2
        }
    );
}

#[test]
fn test_reordered_family_rows_fail() {
    let ms = measurements(
        "\
a.1.UNCOMPRESSED.no_enc.-1.bit08) 1 1 2000
b.2.UNCOMPRESSED.no_enc.-1.bit08) 1 1 2000
b.2.zstd.no_enc.-1.bit08) 1 1 1000
a.1.zstd.no_enc.-1.bit08) 1 1 1000
",
    );
    let agg = Aggregator::new(&ms).unwrap();
    let err = agg.table(&[zstd_plain()], Metric::Ratio).unwrap_err();
    assert_eq!(
        err,
        ReportError::InconsistentColumnOrder {
            family: "zstd".to_string(),
            column: 0,
            expected: Some("a.1".to_string()),
            found: Some("b.2".to_string()),
        }
    );
}

#[test]
fn test_incomplete_family_row_fails() {
    let ms = measurements(
        "\
a.1.UNCOMPRESSED.no_enc.-1.bit08) 1 1 2000
b.2.UNCOMPRESSED.no_enc.-1.bit08) 1 1 2000
a.1.zstd.no_enc.-1.bit08) 1 1 1000
",
    );
    let agg = Aggregator::new(&ms).unwrap();
    let err = agg.family_row(&zstd_plain()).unwrap_err();
    assert_eq!(
        err,
        ReportError::InconsistentColumnOrder {
            family: "zstd".to_string(),
            column: 1,
            expected: Some("b.2".to_string()),
            found: None,
        }
    );
    assert!(err.to_string().contains("found nothing"));
}

#[test]
fn test_extra_family_entry_fails() {
    let ms = measurements(
        "\
a.1.UNCOMPRESSED.no_enc.-1.bit08) 1 1 2000
a.1.zstd.no_enc.-1.bit08) 1 1 1000
a.1.zstd.no_enc.-1.bit16) 1 1 1000
",
    );
    let agg = Aggregator::new(&ms).unwrap();
    let err = agg.family_row(&zstd_plain()).unwrap_err();
    assert!(matches!(
        err,
        ReportError::InconsistentColumnOrder {
            column: 1,
            expected: None,
            ..
        }
    ));
}

#[test]
fn test_zero_size_is_degenerate() {
    let ms = measurements("a.1.UNCOMPRESSED.no_enc.-1.bit08) 1 1 2000\na.1.zstd.no_enc.-1.bit08) 1 1 0\n");
    let agg = Aggregator::new(&ms).unwrap();
    let err = agg.table(&[zstd_plain()], Metric::Ratio).unwrap_err();
    assert!(matches!(err, ReportError::DegenerateMeasurement { ref dataset, .. } if dataset == "a.1"));
}

#[test]
fn test_zero_time_is_degenerate() {
    let ms = measurements("a.1.UNCOMPRESSED.no_enc.-1.bit08) 1 1 2000\na.1.zstd.no_enc.-1.bit08) 0 1 1000\n");
    let agg = Aggregator::new(&ms).unwrap();
    assert!(agg.table(&[zstd_plain()], Metric::Ratio).is_ok());
    let err = agg.table(&[zstd_plain()], Metric::WriteThroughput).unwrap_err();
    assert!(matches!(err, ReportError::DegenerateMeasurement { .. }));
}

#[test]
fn test_overflowing_throughput_is_degenerate() {
    let ms = measurements(
        "a.1.uncompressed.no_enc.-1.bit08) 1 1 1000\n\
         a.1.zstd.no_enc.-1.bit08) 1e-320 1 1000000000000\n",
    );
    let agg = Aggregator::new(&ms).unwrap();
    let err = agg.table(&[zstd_plain()], Metric::WriteThroughput).unwrap_err();
    assert_eq!(
        err,
        ReportError::DegenerateMeasurement {
            dataset: "a.1".to_string(),
            config: ms[1].config.to_string(),
            reason: "throughput overflows",
        }
    );
    // ratio of the same measurement is still fine
    assert!(agg.table(&[zstd_plain()], Metric::Ratio).is_ok());
}

#[test]
fn test_read_throughput_needs_read_times() {
    let ms = RecordParser::new(benchlog_core::TimingColumns::WriteOnly)
        .parse_log("a.1.UNCOMPRESSED.no_enc.-1.bit08) 1 1 2000\n")
        .unwrap();
    let agg = Aggregator::new(&ms).unwrap();
    let err = agg.table(&[], Metric::ReadThroughput).unwrap_err();
    assert!(matches!(err, ReportError::MissingTiming { .. }));
}

// ── level tables ──────────────────────────────────────────────────────────

#[test]
fn test_level_table_marks_best_per_row() {
    let ms = measurements(
        "\
a.1.UNCOMPRESSED.no_enc.-1.bit08) 1 1 1200
a.1.zstd.no_enc.1.bit08) 1 1 600
a.1.zstd.fp.1.bit08) 1 1 400
a.1.zstd.no_enc.4.bit08) 1 1 300
a.1.zstd.fp.4.bit08) 1 1 300
",
    );
    let agg = Aggregator::new(&ms).unwrap();
    let table = agg.level_table(&[zstd_plain(), zstd_split()], &[1, 4]).unwrap();
    assert_eq!(table.row_header, ["Test", "Level"]);
    assert_eq!(table.columns, ["zstd", "byte_stream_split + zstd"]);
    assert_eq!(table.rows[0].labels, ["a.1", "1"]);
    assert_eq!(table.rows[0].cells[0].value, 2.0);
    assert_eq!(table.rows[0].cells[1].value, 3.0);
    assert!(!table.rows[0].cells[0].best);
    assert!(table.rows[0].cells[1].best);
    assert!(table.rows[1].cells.iter().all(|c| c.best && c.value == 4.0));

    let err = agg.level_table(&[zstd_plain()], &[7]).unwrap_err();
    assert_eq!(
        err,
        ReportError::MissingMeasurement {
            dataset: "a.1".to_string(),
            family: "zstd".to_string(),
            level: 7
        }
    );
}

// ── charts ────────────────────────────────────────────────────────────────

#[test]
fn test_entropy_from_dataset_name() {
    assert_eq!(entropy_of("gen_12.f64").unwrap(), 12);
    assert_eq!(entropy_of("gen_3_x.f64").unwrap(), 3);
    assert!(matches!(entropy_of("msg.f64"), Err(ReportError::MalformedDatasetName { .. })));
    assert!(matches!(entropy_of("gen_x.f64"), Err(ReportError::MalformedDatasetName { .. })));
}

#[test]
fn test_series_sorted_by_entropy() {
    let ms = measurements(
        "\
gen_16.f64.UNCOMPRESSED.no_enc.-1.bit64) 1 1 8000
gen_4.f64.UNCOMPRESSED.no_enc.-1.bit64) 1 1 8000
gen_16.f64.zstd.fp.-1.bit64) 2 1 4000
gen_4.f64.zstd.fp.-1.bit64) 1 1 1000
",
    );
    let agg = Aggregator::new(&ms).unwrap();
    let family = Family::new("BYTE_STREAM_SPLIT + ZSTD", Encoding::Split, "zstd");
    let series = agg
        .series(&[family.clone()], Metric::Ratio, &ChartOptions::default())
        .unwrap();
    assert_eq!(series[0].label, "BYTE_STREAM_SPLIT + ZSTD");
    assert_eq!(series[0].points, vec![(4, 8.0), (16, 2.0)]);

    let fixed = ChartOptions {
        raw_size: Some(16_000),
        y_max: Some(600.0),
    };
    let chart = agg.entropy_chart(&[family], Metric::Ratio, &fixed).unwrap();
    assert_eq!(chart.series[0].points, vec![(4, 16.0), (16, 4.0)]);
    assert_eq!(chart.y_max, Some(600.0));
    assert_eq!(chart.x_label, "Entropy (bits/element)");
}

#[test]
fn test_series_with_fixed_raw_size_needs_no_baseline() {
    let ms = measurements("gen_8.f64.zstd.dict.-1.bit64) 1 1 1024\n");
    let agg = Aggregator::new(&ms).unwrap();
    let options = ChartOptions {
        raw_size: Some(4096),
        y_max: None,
    };
    let family = Family::new("DICTIONARY + ZSTD", Encoding::Dictionary, "zstd");
    let series = agg.series(&[family.clone()], Metric::Ratio, &options).unwrap();
    assert_eq!(series[0].points, vec![(8, 4.0)]);

    let err = agg.series(&[family], Metric::Ratio, &ChartOptions::default()).unwrap_err();
    assert!(matches!(err, ReportError::MissingBaseline { .. }));
}

#[test]
fn test_raw_basis_series_uses_fixed_size_for_throughput() {
    let ms = measurements("gen_4.f64.ZSTD.fp.-1.bit64) 1.0 0.5 1048576\n");
    let options = ChartOptions {
        raw_size: Some(64 * 1024 * 1024),
        y_max: None,
    };
    let raw = Aggregator::with_options(
        &ms,
        ReportOptions {
            throughput_basis: ThroughputBasis::Raw,
        },
    )
    .unwrap();
    let write = raw.series(&[zstd_split()], Metric::WriteThroughput, &options).unwrap();
    assert_eq!(write[0].points, vec![(4, 64.0)]);
    let read = raw.series(&[zstd_split()], Metric::ReadThroughput, &options).unwrap();
    assert_eq!(read[0].points, vec![(4, 128.0)]);

    let encoded = Aggregator::new(&ms).unwrap();
    let write = encoded.series(&[zstd_split()], Metric::WriteThroughput, &options).unwrap();
    assert_eq!(write[0].points, vec![(4, 1.0)]);
}

#[test]
fn test_sorted_columns_keep_best_flags() {
    let ms = measurements(
        "z.1.uncompressed.no_enc.-1.bit08) 1 1 1000\n\
         a.1.uncompressed.no_enc.-1.bit08) 1 1 3000\n\
         z.1.zstd.no_enc.-1.bit08) 1 1 500\n\
         a.1.zstd.no_enc.-1.bit08) 1 1 1000\n\
         z.1.zstd.fp.-1.bit08) 1 1 250\n\
         a.1.zstd.fp.-1.bit08) 1 1 1500\n",
    );
    let agg = Aggregator::new(&ms).unwrap();
    let table = agg.table(&[zstd_plain(), zstd_split()], Metric::Ratio).unwrap();
    assert_eq!(table.columns, ["z.1", "a.1"]);

    let sorted = table.with_sorted_columns();
    assert_eq!(sorted.columns, ["a.1", "z.1"]);
    let values: Vec<Vec<f64>> = sorted
        .rows
        .iter()
        .map(|r| r.cells.iter().map(|c| c.value).collect())
        .collect();
    assert_eq!(values, [vec![1.0, 1.0], vec![3.0, 2.0], vec![2.0, 4.0]]);
    assert_eq!(sorted.best_cells(), [(1, 0), (2, 1)]);

    let by_dataset = sorted.transposed();
    let labels: Vec<_> = by_dataset.rows.iter().map(|r| r.labels[0].as_str()).collect();
    assert_eq!(labels, ["a.1", "z.1"]);
}

// ── catalogue ─────────────────────────────────────────────────────────────

#[test]
fn test_catalogue_filtering() {
    let ms = measurements(TWO_DATASETS);
    let (present, absent) = split_present(comparison_families(), &ms);
    let labels: Vec<_> = present.iter().map(|f| f.label.as_str()).collect();
    assert_eq!(labels, ["zstd", "byte_stream_split + zstd"]);
    assert_eq!(absent.len(), 10);

    assert_eq!(chart_families().len(), 4);
    assert!(chart_families().iter().any(|f| f.compressor == "uncompressed"));
}

#[test]
fn test_catalogue_filtering_at_levels() {
    let ms = measurements(
        "a.1.uncompressed.no_enc.-1.bit08) 1 1 2000\n\
         a.1.zstd.no_enc.4.bit08) 1 1 1000\n\
         a.1.zstd.dict.7.bit08) 1 1 900\n\
         a.1.zstd.fp_xor.-1.bit08) 1 1 800\n",
    );
    let (present, absent) = split_present_at(comparison_families(), &ms, &[1, 4, 7, 10]);
    let labels: Vec<_> = present.iter().map(|f| f.label.as_str()).collect();
    assert_eq!(labels, ["zstd", "dictionary + zstd"]);
    assert_eq!(absent.len(), 10);
}
