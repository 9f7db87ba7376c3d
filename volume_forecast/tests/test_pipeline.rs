mod common;

use approx::assert_relative_eq;
use common::ScriptedModel;
use pretty_assertions::assert_eq;
use rstest::rstest;
use volume_forecast::data::SeriesEmbeddings;
use volume_forecast::{AppConfig, ForecastError, LlmForecaster};
use volume_math::{QuantileScaler, SequenceCodec};

#[test]
fn test_end_to_end_with_scaler() {
    let codec = SequenceCodec::default();
    // The service sees values divided by 30 and answers in the same range
    let reply = codec.encode(&[40.0 / 30.0, 50.0 / 30.0, 60.0 / 30.0]);

    let scaler = QuantileScaler::new(1.0).unwrap();
    let mut forecaster = LlmForecaster::new(ScriptedModel::replying(&reply)).with_scaler(scaler);

    let forecast = forecaster.predict(&[10.0, 20.0, 30.0], 2).unwrap();

    assert_eq!(forecast.values().len(), 2);
    assert_relative_eq!(forecast.values()[0], 40.0, max_relative = 1e-12);
    assert_relative_eq!(forecast.values()[1], 50.0, max_relative = 1e-12);
    assert_eq!(forecast.raw_response().text, reply);
    assert_eq!(forecaster.scaler().unwrap().reference_value(), Some(30.0));

    let prompts = forecaster.model().prompts.borrow();
    assert_eq!(prompts.len(), 1);
    let normalized = codec.encode(&[1.0 / 3.0, 2.0 / 3.0, 1.0]);
    assert!(prompts[0].user.ends_with(&normalized));
    assert!(prompts[0].user.contains("for 2 values"));
}

#[test]
fn test_predict_without_scaler_passes_values_through() {
    let mut forecaster = LlmForecaster::new(ScriptedModel::replying("7 , 8 , 9"));
    let forecast = forecaster.predict(&[1.0, 2.0, 3.0], 3).unwrap();

    assert_eq!(forecast.values(), &[7.0, 8.0, 9.0]);
    assert!(forecast.is_complete());

    let prompts = forecaster.model().prompts.borrow();
    assert!(prompts[0].user.ends_with("1 , 2 , 3"));
}

#[rstest]
#[case("1 , 2 , 3 , 4 , 5", 3, vec![1.0, 2.0, 3.0])]
#[case("1 , 2", 4, vec![1.0, 2.0])]
#[case("4 2", 1, vec![42.0])]
fn test_forecast_is_truncated_not_padded(
    #[case] reply: &str,
    #[case] predict_frame: usize,
    #[case] expected: Vec<f64>,
) {
    let mut forecaster = LlmForecaster::new(ScriptedModel::replying(reply));
    let forecast = forecaster.predict(&[1.0], predict_frame).unwrap();

    assert_eq!(forecast.values(), expected.as_slice());
    assert_eq!(forecast.requested_horizon(), predict_frame);
    assert_eq!(forecast.is_complete(), expected.len() == predict_frame);
}

#[test]
fn test_scaler_is_refit_on_every_call() {
    let scaler = QuantileScaler::new(1.0).unwrap();
    let mut forecaster = LlmForecaster::new(ScriptedModel::replying("1")).with_scaler(scaler);

    let first = forecaster.predict(&[2.0, 4.0], 1).unwrap();
    assert_eq!(first.values(), &[4.0]);

    let second = forecaster.predict(&[5.0, 10.0], 1).unwrap();
    assert_eq!(second.values(), &[10.0]);
}

#[test]
fn test_malformed_response_propagates() {
    let mut forecaster =
        LlmForecaster::new(ScriptedModel::replying("The next terms are 4 , 5"));
    let err = forecaster.predict(&[1.0, 2.0, 3.0], 2).unwrap_err();

    assert!(matches!(err, ForecastError::MalformedNumber(_)));
}

#[test]
fn test_malformed_response_names_substring() {
    let mut forecaster = LlmForecaster::new(ScriptedModel::replying("12a,34"));
    match forecaster.predict(&[1.0], 2) {
        Err(ForecastError::MalformedNumber(substring)) => assert_eq!(substring, "12a"),
        other => panic!("Expected MalformedNumber, got {:?}", other),
    }
}

#[rstest]
#[case("N a N , 5", "NaN")]
#[case("1 , i n f", "inf")]
#[case("- i n f i n i t y", "-inf")]
fn test_non_finite_response_is_malformed(#[case] reply: &str, #[case] named: &str) {
    let scaler = QuantileScaler::default();
    let mut forecaster = LlmForecaster::new(ScriptedModel::replying(reply)).with_scaler(scaler);

    match forecaster.predict(&[1.0, 2.0], 2) {
        Err(ForecastError::MalformedNumber(substring)) => assert_eq!(substring, named),
        other => panic!("Expected MalformedNumber, got {:?}", other),
    }
}

#[test]
fn test_service_failure_propagates() {
    let mut forecaster = LlmForecaster::new(ScriptedModel::failing("rate limited"));
    let err = forecaster.predict(&[1.0, 2.0], 2).unwrap_err();

    assert!(matches!(err, ForecastError::ExternalService(ref msg) if msg == "rate limited"));
    assert_eq!(forecaster.model().prompts.borrow().len(), 1);
}

#[test]
fn test_zero_horizon_is_rejected_before_calling_service() {
    let mut forecaster = LlmForecaster::new(ScriptedModel::replying("1"));
    let err = forecaster.predict(&[1.0], 0).unwrap_err();

    assert!(matches!(err, ForecastError::InvalidParameter(_)));
    assert!(forecaster.model().prompts.borrow().is_empty());
}

#[test]
fn test_empty_history_with_scaler_fails() {
    let scaler = QuantileScaler::default();
    let mut forecaster = LlmForecaster::new(ScriptedModel::replying("1")).with_scaler(scaler);

    let err = forecaster.predict(&[], 1).unwrap_err();
    assert!(matches!(err, ForecastError::InvalidParameter(_)));
    assert!(forecaster.model().prompts.borrow().is_empty());
}

#[test]
fn test_custom_codec_is_used_both_ways() {
    let codec = SequenceCodec::new("_", ";").unwrap();
    let mut forecaster = LlmForecaster::new(ScriptedModel::replying("3_;_4")).with_codec(codec);

    let forecast = forecaster.predict(&[1.0, 2.0], 2).unwrap();
    assert_eq!(forecast.values(), &[3.0, 4.0]);

    let prompts = forecaster.model().prompts.borrow();
    assert!(prompts[0].user.ends_with("1_;_2"));
}

#[test]
fn test_from_config() {
    let mut config = AppConfig::default();
    config.scaler.enabled = false;
    config.codec.num_sep = ";".to_string();

    let forecaster = LlmForecaster::from_config(ScriptedModel::default(), &config).unwrap();
    assert!(forecaster.scaler().is_none());
    assert_eq!(forecaster.codec().num_sep(), ";");

    config.scaler.enabled = true;
    let forecaster = LlmForecaster::from_config(ScriptedModel::default(), &config).unwrap();
    assert_eq!(forecaster.scaler().unwrap().upper_quant(), 0.95);
}

#[test]
fn test_mean_absolute_error() {
    let mut forecaster = LlmForecaster::new(ScriptedModel::replying("1 0 , 2 0"));
    let forecast = forecaster.predict(&[5.0], 2).unwrap();

    assert_relative_eq!(forecast.mean_absolute_error(&[11.0, 17.0]).unwrap(), 2.0);
    assert!(forecast.mean_absolute_error(&[1.0]).is_err());
}

#[test]
fn test_embed_returns_vector_unmodified() {
    let vector = vec![0.25, -0.5, 0.125];
    let mut forecaster = LlmForecaster::new(ScriptedModel::embedding(vector.clone()));

    assert_eq!(forecaster.embed(&[1.0, 2.0]).unwrap(), vector);
    assert_eq!(
        forecaster.model().embed_inputs.borrow().as_slice(),
        &["1 , 2".to_string()]
    );
}

#[test]
fn test_embed_collapses_newlines() {
    let codec = SequenceCodec::new("\n", ",").unwrap();
    let mut forecaster =
        LlmForecaster::new(ScriptedModel::embedding(vec![1.0])).with_codec(codec);

    forecaster.embed(&[1.0, 2.0]).unwrap();

    let inputs = forecaster.model().embed_inputs.borrow();
    assert_eq!(inputs[0], "1 , 2");
    assert!(!inputs[0].contains('\n'));
}

#[test]
fn test_embed_applies_scaler() {
    let scaler = QuantileScaler::new(1.0).unwrap();
    let mut forecaster =
        LlmForecaster::new(ScriptedModel::embedding(vec![1.0])).with_scaler(scaler);

    forecaster.embed(&[2.0, 4.0]).unwrap();
    assert_eq!(forecaster.model().embed_inputs.borrow()[0], "0 . 5 , 1");
}

#[test]
fn test_embed_failure_propagates() {
    let mut forecaster = LlmForecaster::new(ScriptedModel::failing("unauthorized"));
    let err = forecaster.embed(&[1.0]).unwrap_err();
    assert!(matches!(err, ForecastError::ExternalService(_)));
}

#[test]
fn test_embeddings_are_kept_per_series() {
    let mut forecaster = LlmForecaster::new(ScriptedModel::embedding(vec![0.5, 0.25]));
    let mut embeddings = SeriesEmbeddings::new();

    let vector = forecaster.embed(&[3.0, 4.0]).unwrap();
    embeddings.insert("10", "1", vector);

    assert_eq!(embeddings.get("10", "1"), Some(&[0.5, 0.25][..]));
}
