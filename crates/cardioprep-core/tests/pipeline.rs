use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use cardioprep_core::{
    config::columns,
    export::{PART_FILE_NAME, SUCCESS_MARKER},
    ingestion::load_table,
    NoopObserver, Pipeline, PipelineConfig, PipelineError, Stage, StageObserver,
};
use polars::prelude::*;

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

fn fixture(name: &str) -> DataFrame {
    load_table(&fixture_path(name)).expect("load fixture")
}

const TRANSFORM_STAGES: [Stage; 4] = [
    Stage::Encoding,
    Stage::FeatureDerivation,
    Stage::Filtering,
    Stage::Bucketing,
];

#[derive(Default)]
struct RecordingObserver {
    stages: Vec<Stage>,
    encoded_columns: Vec<String>,
}

impl StageObserver for RecordingObserver {
    fn on_stage(&mut self, stage: Stage, df: &DataFrame) -> cardioprep_core::Result<()> {
        if stage == Stage::Encoding {
            self.encoded_columns = df
                .get_column_names()
                .iter()
                .map(|name| name.to_string())
                .collect();
        }
        self.stages.push(stage);
        Ok(())
    }
}

#[test]
fn transform_filters_buckets_and_counts() -> Result<()> {
    let input = fixture("heart_sample.csv");
    let output = Pipeline::new().transform(&input, &mut NoopObserver)?;
    let df = &output.dataframe;

    assert_eq!(df.height(), 6);
    assert_eq!(output.high_chol_count, 3);
    assert_eq!(output.summary.rows_loaded, 10);
    assert_eq!(output.summary.rows_after_filter, 6);
    assert_eq!(
        output.summary.category_labels,
        vec!["typical", "asymptomatic", "atypical", "non-anginal"]
    );

    let ages = df.column(columns::AGE)?.cast(&DataType::Float64)?;
    let bps = df.column(columns::RESTING_BP)?.cast(&DataType::Float64)?;
    let squared = df.column(columns::RESTING_BP_SQUARED)?.f64()?.clone();
    for idx in 0..df.height() {
        let age = ages.f64()?.get(idx).expect("age present");
        let bp = bps.f64()?.get(idx).expect("trestbps present");
        assert!(age > 50.0 && bp > 140.0, "row {idx} escaped the filter");
        let power = squared.get(idx).expect("derived value present");
        assert!((power - bp * bp).abs() < 1e-9);
    }

    let levels = df.column(columns::CHOLESTEROL_LEVEL)?.str()?;
    let high_rows = levels.into_iter().filter(|v| *v == Some("High")).count();
    assert_eq!(high_rows, output.high_chol_count);

    assert!(df.column(columns::CHEST_PAIN_VECTOR).is_err());
    Ok(())
}

#[test]
fn included_and_excluded_patients() -> Result<()> {
    let input = df!(
        "age" => &[55i64, 45],
        "trestbps" => &[150i64, 150],
        "chol" => &[250i64, 300],
        "cp" => &["typical", "atypical"],
    )?;

    let output = Pipeline::new().transform(&input, &mut NoopObserver)?;
    let df = &output.dataframe;

    assert_eq!(df.height(), 1);
    assert_eq!(df.column("age")?.i64()?.get(0), Some(55));
    assert_eq!(df.column("powerOfTrestbps")?.f64()?.get(0), Some(22500.0));
    assert_eq!(df.column("cholesterol_level")?.str()?.get(0), Some("High"));
    assert_eq!(output.high_chol_count, 1);
    Ok(())
}

#[test]
fn missing_cholesterol_counts_as_high() -> Result<()> {
    let input = fixture("heart_sample.csv");
    let output = Pipeline::new().transform(&input, &mut NoopObserver)?;
    let df = &output.dataframe;

    let chol = df.column(columns::CHOLESTEROL)?.cast(&DataType::Float64)?;
    let levels = df.column(columns::CHOLESTEROL_LEVEL)?.str()?;
    let missing: Vec<_> = (0..df.height())
        .filter(|idx| chol.f64().map(|ca| ca.get(*idx).is_none()).unwrap_or(false))
        .collect();

    assert_eq!(missing.len(), 1);
    assert_eq!(levels.get(missing[0]), Some("High"));
    Ok(())
}

#[test]
fn encoding_is_stable_across_row_order() -> Result<()> {
    let input = fixture("heart_sample.csv");
    let reversed = input.reverse();

    let forward = Pipeline::new().transform(&input, &mut NoopObserver)?;
    let backward = Pipeline::new().transform(&reversed, &mut NoopObserver)?;

    assert_eq!(forward.summary.category_labels, backward.summary.category_labels);
    Ok(())
}

#[test]
fn observer_sees_every_stage_in_order() -> Result<()> {
    let input = fixture("heart_sample.csv");
    let mut observer = RecordingObserver::default();
    Pipeline::new().transform(&input, &mut observer)?;

    assert_eq!(observer.stages, TRANSFORM_STAGES.to_vec());
    assert!(observer
        .encoded_columns
        .iter()
        .any(|name| name == columns::CHEST_PAIN_VECTOR));
    Ok(())
}

#[test]
fn run_writes_directory_and_replaces_previous_output() -> Result<()> {
    let scratch = tempfile::tempdir()?;
    let output_dir = scratch.path().join("output");
    fs::create_dir_all(&output_dir)?;
    fs::write(output_dir.join("stale.csv"), "old\n")?;

    let config = PipelineConfig::new(fixture_path("heart_sample.csv"), &output_dir);
    let mut observer = RecordingObserver::default();
    let output = Pipeline::new().run(&config, &mut observer)?;

    let mut expected = vec![Stage::Load];
    expected.extend(TRANSFORM_STAGES);
    assert_eq!(observer.stages, expected);
    assert_eq!(output.summary.output_path.as_deref(), Some(output_dir.as_path()));
    assert!(!output_dir.join("stale.csv").exists());
    assert!(output_dir.join(SUCCESS_MARKER).exists());

    let written = load_table(&output_dir.join(PART_FILE_NAME))?;
    assert_eq!(written.height(), 6);
    for name in [
        columns::CHEST_PAIN_INDEX,
        columns::RESTING_BP_SQUARED,
        columns::CHOLESTEROL_LEVEL,
        "thalach",
    ] {
        assert!(written.column(name).is_ok(), "missing {name}");
    }
    assert!(written.column(columns::CHEST_PAIN_VECTOR).is_err());
    Ok(())
}

#[test]
fn late_float_and_non_numeric_rows_do_not_abort_the_run() -> Result<()> {
    let scratch = tempfile::tempdir()?;
    let input_path = scratch.path().join("heart.csv");
    let mut content = String::from("age,trestbps,chol,cp\n");
    for _ in 0..1200 {
        content.push_str("55,150,250,typical\n");
    }
    content.push_str("60,145.5,n/a,atypical\n");
    fs::write(&input_path, content)?;

    let output_dir = scratch.path().join("output");
    let config = PipelineConfig::new(&input_path, &output_dir);
    let output = Pipeline::new().run(&config, &mut NoopObserver)?;
    let df = &output.dataframe;

    assert_eq!(df.height(), 1201);
    assert_eq!(output.high_chol_count, 1201);

    let squared = df.column(columns::RESTING_BP_SQUARED)?.f64()?;
    assert!((squared.get(1200).expect("derived value present") - 145.5 * 145.5).abs() < 1e-9);
    assert_eq!(df.column(columns::CHOLESTEROL_LEVEL)?.str()?.get(1200), Some("High"));
    assert!(output_dir.join(PART_FILE_NAME).exists());
    Ok(())
}

#[test]
fn unreadable_input_aborts_before_export() {
    let scratch = tempfile::tempdir().unwrap();
    let output_dir = scratch.path().join("output");
    let config = PipelineConfig::new(scratch.path().join("missing.csv"), &output_dir);

    let err = Pipeline::new()
        .run(&config, &mut NoopObserver)
        .err()
        .expect("run should fail");

    assert!(matches!(err, PipelineError::DataSource { .. }));
    assert!(!output_dir.exists());
}

#[test]
fn header_only_input_fails_to_fit() {
    let input = fixture("header_only.csv");
    let err = Pipeline::new()
        .transform(&input, &mut NoopObserver)
        .err()
        .expect("transform should fail");

    assert!(matches!(err, PipelineError::Fit { ref column, .. } if column == "cp"));
}

#[test]
fn missing_required_column_is_reported() {
    let input = df!("age" => &[60i64], "cp" => &["typical"]).unwrap();
    let err = Pipeline::new()
        .transform(&input, &mut NoopObserver)
        .err()
        .expect("transform should fail");

    assert!(matches!(err, PipelineError::MissingColumn(name) if name == "trestbps"));
}
