use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use volume_forecast::client::{parse_embedding_response, ChatRequest, EmbeddingRequest, Usage};
use volume_forecast::config::ServiceConfig;
use volume_forecast::{Completion, ForecastError, LanguageModel, OpenAiClient, Prompt};

#[test]
fn test_chat_request_body() {
    let prompt = Prompt {
        system: "You predict sales volumes.".to_string(),
        user: "Sequence:\n1 , 2".to_string(),
    };
    let request = ChatRequest::new("gpt-3.5-turbo", &prompt);

    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({
            "model": "gpt-3.5-turbo",
            "messages": [
                {"role": "system", "content": "You predict sales volumes."},
                {"role": "user", "content": "Sequence:\n1 , 2"}
            ]
        })
    );
}

#[test]
fn test_embedding_request_body() {
    let request = EmbeddingRequest {
        model: "text-embedding-ada-002",
        input: vec!["1 , 2"],
    };

    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({"model": "text-embedding-ada-002", "input": ["1 , 2"]})
    );
}

#[test]
fn test_completion_response_parsing() {
    let body = json!({
        "id": "chatcmpl-1",
        "model": "gpt-3.5-turbo-0613",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": "4 0 , 5 0"}, "finish_reason": "stop"}
        ],
        "usage": {"prompt_tokens": 80, "completion_tokens": 9, "total_tokens": 89}
    })
    .to_string();

    let completion = Completion::from_response_json(&body).unwrap();

    assert_eq!(completion.text, "4 0 , 5 0");
    assert_eq!(completion.model, "gpt-3.5-turbo-0613");
    assert_eq!(
        completion.usage,
        Some(Usage {
            prompt_tokens: 80,
            completion_tokens: 9,
            total_tokens: 89
        })
    );
}

#[test]
fn test_completion_without_choices_is_a_service_error() {
    let body = json!({"model": "m", "choices": []}).to_string();
    let err = Completion::from_response_json(&body).unwrap_err();
    assert!(matches!(err, ForecastError::ExternalService(_)));
}

#[test]
fn test_completion_with_null_or_blank_content_is_a_service_error() {
    let null_body = json!({"choices": [{"message": {"role": "assistant", "content": null}}]}).to_string();
    let blank_body = json!({"choices": [{"message": {"role": "assistant", "content": "  "}}]}).to_string();

    assert!(matches!(
        Completion::from_response_json(&null_body),
        Err(ForecastError::ExternalService(_))
    ));
    assert!(matches!(
        Completion::from_response_json(&blank_body),
        Err(ForecastError::ExternalService(_))
    ));
}

#[test]
fn test_completion_garbage_body() {
    assert!(matches!(
        Completion::from_response_json("<html>502</html>"),
        Err(ForecastError::ExternalService(_))
    ));
}

#[test]
fn test_embedding_response_parsing() {
    let body = json!({
        "object": "list",
        "data": [{"object": "embedding", "index": 0, "embedding": [0.1, -0.2, 0.3]}],
        "model": "text-embedding-ada-002"
    })
    .to_string();

    assert_eq!(parse_embedding_response(&body).unwrap(), vec![0.1, -0.2, 0.3]);
}

#[test]
fn test_embedding_response_without_data() {
    let body = json!({"object": "list", "data": []}).to_string();
    assert!(matches!(
        parse_embedding_response(&body),
        Err(ForecastError::ExternalService(_))
    ));
}

#[test]
fn test_client_trims_base_url() {
    let client = OpenAiClient::new(
        "http://localhost:8080/v1/",
        "key",
        "completion-model",
        "embedding-model",
        Duration::from_secs(5),
    )
    .unwrap();

    assert_eq!(client.base_url(), "http://localhost:8080/v1");
    assert_eq!(client.completion_model(), "completion-model");
    assert_eq!(client.embedding_model(), "embedding-model");
}

#[test]
fn test_from_config_requires_api_key() {
    let config = ServiceConfig {
        api_key_env: "VOLUME_FORECAST_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
        ..ServiceConfig::default()
    };

    let err = OpenAiClient::from_config(&config).unwrap_err();
    assert!(matches!(err, ForecastError::ConfigError(_)));
}

#[test]
fn test_unreachable_service_is_a_service_error() {
    let client = OpenAiClient::new(
        "http://127.0.0.1:1",
        "key",
        "completion-model",
        "embedding-model",
        Duration::from_secs(2),
    )
    .unwrap();
    let prompt = Prompt {
        system: "s".to_string(),
        user: "u".to_string(),
    };

    assert!(matches!(
        client.complete(&prompt),
        Err(ForecastError::ExternalService(_))
    ));
    assert!(matches!(
        client.embed("1 , 2"),
        Err(ForecastError::ExternalService(_))
    ));
}
