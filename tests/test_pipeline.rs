//! Integration test: full evaluation grid end-to-end

use ndarray::Array2;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use evoclass::prelude::*;

/// Builds a base dataset covering all four events. `per_class` instances per
/// class per event, two well-separated classes, community + leadership
/// feature families plus the event label.
fn grid_dataset(per_class: usize) -> Dataset {
    grid_dataset_by(|_, _| per_class)
}

/// Like `grid_dataset` but with per-(event, class) instance counts.
fn grid_dataset_by(sizes: impl Fn(i64, i64) -> usize) -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for event in 1..=4i64 {
        for class in 0..2i64 {
            for _ in 0..sizes(event, class) {
                let base = class as f64 * 6.0;
                rows.push(vec![
                    base + rng.gen::<f64>(),
                    base + rng.gen::<f64>(),
                    rng.gen::<f64>(),
                    event as f64,
                    class as f64,
                ]);
            }
        }
    }
    let n = rows.len();
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Dataset::new(
        Array2::from_shape_vec((n, 5), flat).unwrap(),
        vec![
            "comm_size".into(),
            "comm_density".into(),
            "leader_deg".into(),
            "event".into(),
            "class".into(),
        ],
        4,
    )
    .unwrap()
}

fn config(dir: &std::path::Path) -> EvalConfig {
    EvalConfig::new("event", "class")
        .with_folds(3)
        .with_seed(1)
        .with_smote_neighbors(2)
        .with_out_dir(dir)
}

/// Splits report text into non-empty lines after the preamble.
fn report_lines(text: &str) -> Vec<&str> {
    text.lines()
        .filter(|l| !l.is_empty() && *l != "Classification Results")
        .collect()
}

#[test]
fn test_report_shape_and_panel_order() {
    let dir = tempfile::tempdir().unwrap();
    let base = grid_dataset(8);
    let summary = Pipeline::new(config(dir.path())).run(&base).unwrap();

    assert_eq!(summary.rows_completed, 12);
    assert_eq!(summary.evaluations, 96);

    let text = std::fs::read_to_string(dir.path().join("classification_results.txt")).unwrap();
    let lines = report_lines(&text);
    // 4 partitions, each 1 header + 3 rows
    assert_eq!(lines.len(), 16);

    let header = "Logistic,NaiveBayes,KNN,DecisionTree,RandomForest,ExtraTrees,AdaBoost,LinearSVM,";
    for p in 0..4 {
        assert_eq!(lines[p * 4], header, "partition {} header", p + 1);
        for r in 1..=3 {
            let row = lines[p * 4 + r];
            let values: Vec<&str> = row.trim_end_matches(',').split(',').collect();
            assert_eq!(values.len(), 8, "row {row:?} must carry one value per model");
            for v in values {
                let acc: f64 = v.parse().unwrap();
                assert!((0.0..=100.0).contains(&acc));
                assert_eq!(v.split('.').nth(1).map(str::len), Some(3), "3-decimal accuracy");
            }
        }
    }
}

#[test]
fn test_repeated_runs_are_bit_identical() {
    let base = grid_dataset(8);

    let mut reports = Vec::new();
    for _ in 0..2 {
        let dir = tempfile::tempdir().unwrap();
        Pipeline::new(config(dir.path())).run(&base).unwrap();
        reports.push(std::fs::read(dir.path().join("classification_results.txt")).unwrap());
    }
    assert_eq!(reports[0], reports[1]);
}

#[test]
fn test_partition_filters_cover_all_labeled_instances() {
    let base = grid_dataset(8);
    let filter = PartitionFilter::new("event");
    let total: usize = Event::ALL
        .iter()
        .map(|&e| filter.partition(&base, e).unwrap().n_instances())
        .sum();
    assert_eq!(total, base.n_instances());
}

#[test]
fn test_chart_artifacts_cover_every_partition() {
    let dir = tempfile::tempdir().unwrap();
    let base = grid_dataset(8);
    let summary = Pipeline::new(config(dir.path())).run(&base).unwrap();
    assert_eq!(summary.charts_written, 4);

    let panel: Vec<&str> = ModelKind::PANEL.iter().map(|m| m.name()).collect();
    for event in Event::ALL {
        let path = dir
            .path()
            .join(format!("chart_event{}_{}.json", event.ordinal(), event.name()));
        let spec: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let legend: Vec<&str> = spec["legend"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(legend, panel, "legend order for {event}");
    }
}

#[test]
fn test_sparse_class_aborts_with_insufficient_data() {
    let dir = tempfile::tempdir().unwrap();
    // Event 1 is balanced but tiny: resampling leaves it at 3 per class,
    // which cannot form 10 stratified folds.
    let base = grid_dataset_by(|event, _| if event == 1 { 3 } else { 12 });
    let config = EvalConfig::new("event", "class")
        .with_folds(10)
        .with_smote_neighbors(2)
        .with_out_dir(dir.path());

    let err = Pipeline::new(config).run(&base).unwrap_err();
    assert!(matches!(err, EvalError::InsufficientTrainingData { .. }));
}

#[test]
fn test_failed_row_is_entirely_absent() {
    let dir = tempfile::tempdir().unwrap();
    // Event 2's minority class has a single instance, so oversampling cannot
    // synthesize neighbors and every row of that partition is skipped.
    let base = grid_dataset_by(|event, class| if event == 2 && class == 1 { 1 } else { 8 });
    let summary = Pipeline::new(config(dir.path())).run(&base).unwrap();

    assert_eq!(summary.rows_skipped, 3);
    assert_eq!(summary.rows_completed, 9);
    assert_eq!(summary.charts_written, 4);

    let text = std::fs::read_to_string(dir.path().join("classification_results.txt")).unwrap();
    let lines = report_lines(&text);
    // 4 headers + 9 surviving rows; no partial rows anywhere
    assert_eq!(lines.len(), 13);
    for line in &lines {
        let fields = line.trim_end_matches(',').split(',').count();
        assert_eq!(fields, 8);
    }
}

#[test]
fn test_csv_roundtrip_through_loader() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("communities.csv");

    let base = grid_dataset(8);
    let mut csv = String::from("comm_size,comm_density,leader_deg,event,class\n");
    for i in 0..base.n_instances() {
        let row: Vec<String> = (0..base.n_attributes())
            .map(|j| format!("{}", base.values()[[i, j]]))
            .collect();
        csv.push_str(&row.join(","));
        csv.push('\n');
    }
    std::fs::write(&csv_path, csv).unwrap();

    let loaded = DatasetLoader::new().load_csv(&csv_path, "class").unwrap();
    assert_eq!(loaded.n_instances(), base.n_instances());
    assert_eq!(loaded.n_attributes(), 5);

    let summary = Pipeline::new(config(dir.path())).run(&loaded).unwrap();
    assert_eq!(summary.rows_completed, 12);
}
