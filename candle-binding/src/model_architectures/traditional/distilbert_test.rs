//! Tests for the DistilBERT sentiment classifier

use super::distilbert::*;
use crate::model_architectures::traits::{ModelVariant, SentimentClassifier};
use crate::test_fixtures::{fixtures::*, test_utils::*};
use candle_core::{DType, Device};
use candle_nn::{VarBuilder, VarMap};
use rstest::*;
use serde_json::Value;

fn tiny_config() -> Value {
    serde_json::from_str(TINY_DISTILBERT_CONFIG_JSON).unwrap()
}

fn binary_labels() -> Vec<String> {
    vec!["NEGATIVE".to_string(), "POSITIVE".to_string()]
}

#[fixture]
fn tiny_distilbert() -> DistilBertSentimentClassifier {
    let vb = VarBuilder::zeros(DType::F32, &Device::Cpu);
    DistilBertSentimentClassifier::from_parts(
        vb,
        &tiny_config(),
        tiny_tokenizer(32),
        binary_labels(),
    )
    .unwrap()
}

#[rstest]
fn test_distilbert_encoder_first_token_shape() {
    let vb = VarBuilder::zeros(DType::F32, &Device::Cpu);
    let encoder = DistilBertEncoder::load(vb, &tiny_config(), tiny_tokenizer(32)).unwrap();

    assert_eq!(encoder.dim(), 32);
    let first = encoder.encode_first_token("the grid is clean").unwrap();
    assert_eq!(first.dims(), &[1, 32]);
}

#[rstest]
fn test_distilbert_zero_weights_predict_first_class(
    tiny_distilbert: DistilBertSentimentClassifier,
) {
    assert_eq!(tiny_distilbert.variant(), ModelVariant::Balanced);

    let (idx, prob) = tiny_distilbert.predict("this movie is terrible").unwrap();
    assert_eq!(idx, 0);
    assert!((prob - 0.5).abs() < 1e-5);

    assert_eq!(tiny_distilbert.classify("this movie is terrible").unwrap(), "NEGATIVE");
}

#[rstest]
fn test_distilbert_handles_edge_inputs(tiny_distilbert: DistilBertSentimentClassifier) {
    assert_eq!(tiny_distilbert.classify("").unwrap(), "NEGATIVE");
    // Out-of-vocabulary words map to [UNK]
    assert_eq!(tiny_distilbert.classify("völlig unbekannt").unwrap(), "NEGATIVE");
    // Longer than the tokenizer's max length; truncated rather than rejected
    assert_eq!(
        tiny_distilbert.classify(&generate_test_text(400)).unwrap(),
        "NEGATIVE"
    );
}

#[rstest]
fn test_distilbert_labels_come_from_checkpoint(tiny_distilbert: DistilBertSentimentClassifier) {
    assert_eq!(tiny_distilbert.labels(), &["NEGATIVE", "POSITIVE"]);
}

#[rstest]
fn test_distilbert_from_parts_rejects_missing_dim() {
    let mut config = tiny_config();
    config.as_object_mut().unwrap().remove("dim");

    let vb = VarBuilder::zeros(DType::F32, &Device::Cpu);
    let result =
        DistilBertSentimentClassifier::from_parts(vb, &config, tiny_tokenizer(32), binary_labels());
    assert!(result.is_err());
}

#[rstest]
fn test_distilbert_new_reports_load_failure(temp_dir: tempfile::TempDir) {
    let err = DistilBertSentimentClassifier::new(&temp_dir.path().to_string_lossy(), true, 512)
        .unwrap_err();

    assert!(err.is_load_failure());
    assert_error_type(&err, "DistilBert");
}

#[rstest]
#[case([0.0, 50.0], "POSITIVE")]
#[case([50.0, 0.0], "NEGATIVE")]
fn test_distilbert_loads_local_checkpoint(
    temp_dir: tempfile::TempDir,
    #[case] bias: [f32; 2],
    #[case] expected: &str,
) {
    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    DistilBertSentimentClassifier::from_parts(
        vb,
        &tiny_config(),
        tiny_tokenizer(32),
        binary_labels(),
    )
    .unwrap();
    write_tiny_checkpoint_files(temp_dir.path(), TINY_DISTILBERT_CONFIG_JSON);
    save_varmap_with(&varmap, temp_dir.path(), "classifier.bias", &bias);

    let path = temp_dir.path().to_string_lossy().to_string();
    let classifier = DistilBertSentimentClassifier::new(&path, true, 32).unwrap();

    assert_eq!(classifier.labels(), &["NEGATIVE", "POSITIVE"]);
    assert_eq!(classifier.classify("the grid is clean").unwrap(), expected);
}

/// Real checkpoint test; skipped when the model directory is absent
#[rstest]
fn test_distilbert_real_model_binary_labels() {
    if !model_exists(DISTILBERT_SENTIMENT_MODEL) {
        println!(
            "DistilBERT sentiment model not found under {}, skipping real model test",
            MODELS_BASE_PATH
        );
        return;
    }

    let classifier =
        DistilBertSentimentClassifier::new(&model_path(DISTILBERT_SENTIMENT_MODEL), true, 512)
            .expect("real DistilBERT checkpoint should load");

    assert_eq!(
        classifier
            .classify("This project is revolutionary and exciting!")
            .unwrap(),
        "POSITIVE"
    );
    assert_eq!(
        classifier
            .classify("The movie was terrible and far too long.")
            .unwrap(),
        "NEGATIVE"
    );
}
