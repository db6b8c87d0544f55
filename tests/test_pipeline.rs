//! Integration test: Full pipeline (encode → scale → split → train → evaluate)

use polars::prelude::*;
use tabflow::data::encode_categoricals;
use tabflow::preprocessing::{scale_features, ScaleMethod};
use tabflow::training::{
    features_and_target, train_test_split, EvalReport, FittedModel, ModelKind,
};
use tabflow::visualization::confusion_matrix_data_uri;

fn create_classification_dataset() -> DataFrame {
    let n = 40;
    let mut age = Vec::with_capacity(n);
    let mut fare = Vec::with_capacity(n);
    let mut sex = Vec::with_capacity(n);
    let mut target = Vec::with_capacity(n);

    for i in 0..n {
        let survived = i >= n / 2;
        age.push(if survived { 45.0 + i as f64 } else { 20.0 + i as f64 });
        fare.push(if survived { 80.0 + i as f64 } else { 7.0 + i as f64 });
        sex.push(if survived { "female" } else { "male" });
        target.push(if survived { 1i64 } else { 0 });
    }

    df!(
        "age" => &age,
        "fare" => &fare,
        "sex" => &sex,
        "survived" => &target
    )
    .unwrap()
}

#[test]
fn test_full_classification_pipeline() {
    let df = create_classification_dataset();

    let (working, encoders) = encode_categoricals(&df, &[]).unwrap();
    assert!(encoders.contains_key("sex"));
    assert!(working.column("sex").unwrap().dtype().is_primitive_numeric());

    let (scaled, scaled_columns) = scale_features(&working, ScaleMethod::Standard).unwrap();
    assert_eq!(scaled_columns.len(), 3);

    let (x, y) = features_and_target(&scaled).unwrap();
    let split = train_test_split(&x, &y, 0.25).unwrap();
    assert_eq!(split.train_rows() + split.test_rows(), 40);

    for kind in [ModelKind::Logistic, ModelKind::Tree] {
        let model = FittedModel::fit(kind, &split.x_train, &split.y_train).unwrap();
        let y_pred = model.predict(&split.x_test).unwrap();

        let report = EvalReport::compute(&split.y_test, &y_pred);
        assert!(
            report.accuracy > 0.8,
            "{:?} accuracy too low: {}",
            kind,
            report.accuracy
        );
        assert!(report.report.get("macro avg").is_some());
    }
}

#[test]
fn test_pipeline_with_denylist_and_minmax() {
    let mut df = create_classification_dataset();
    df.with_column(Series::new("Name".into(), vec!["nobody"; 40]))
        .unwrap();

    let (working, _) = encode_categoricals(&df, &["Name".to_string()]).unwrap();
    assert!(!working.get_column_names().iter().any(|c| c.as_str() == "Name"));

    let (scaled, _) = scale_features(&working, ScaleMethod::MinMax).unwrap();
    let age = scaled.column("age").unwrap().f64().unwrap();
    for v in age.into_no_null_iter() {
        assert!((0.0..=1.0).contains(&v));
    }
}

#[test]
fn test_confusion_image_from_pipeline_output() {
    let df = create_classification_dataset();
    let (working, _) = encode_categoricals(&df, &[]).unwrap();
    let (x, y) = features_and_target(&working).unwrap();
    let split = train_test_split(&x, &y, 0.3).unwrap();

    let model = FittedModel::fit(ModelKind::Tree, &split.x_train, &split.y_train).unwrap();
    let y_pred = model.predict(&split.x_test).unwrap();

    let (labels, matrix) = tabflow::training::confusion_matrix(&split.y_test, &y_pred);
    assert!(!labels.is_empty());

    let uri = confusion_matrix_data_uri(&matrix).unwrap();
    assert!(uri.starts_with("data:image/png;base64,"));
}
