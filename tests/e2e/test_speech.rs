use crate::e2e::helpers;

use helpers::{split_wavs, wav_len, TestContext, SAMPLE_RATE};
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_single_wav_when_not_streaming(ctx: &TestContext) {
    let text = "Hello there. How are you today? I am fine.";

    let response = ctx
        .client
        .post(
            "/v1/audio/speech",
            &json!({
                "input": text,
                "language": "en",
                "stream": false,
                "max_chunk_words": 5
            }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::OK)
        .assert_header("content-type", "audio/wav")
        .assert_header("x-streaming", "false")
        .assert_header("x-language", "en")
        .assert_header("x-voice-type", "neutral");

    // Chunking options are ignored without streaming
    assert_eq!(split_wavs(&response.body_bytes).len(), 1);
    assert_eq!(ctx.model.texts(), vec![text.to_string()]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_stream_by_default_on_speech_route(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/v1/audio/speech",
            &json!({
                "input": "Hello there. How are you today? I am fine.",
                "language": "en",
                "max_chunk_words": 5,
                "max_chunk_sentences": 1
            }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::OK)
        .assert_header("x-streaming", "true")
        .assert_header("x-chunk-count", "3");
    assert_eq!(split_wavs(&response.body_bytes).len(), 3);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_apply_request_defaults(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/v1/audio/speech", &json!({ "input": "Hi.", "language": "en" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let calls = ctx.model.calls.lock().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].temperature, 0.7);
    assert_eq!(calls[0].exaggeration, 0.3);
    assert!(!calls[0].with_voice_prompt);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_speed_up_audio(ctx: &TestContext) {
    let text = "Speed check.";
    let normal = ctx
        .client
        .post(
            "/v1/audio/speech",
            &json!({ "input": text, "language": "en", "stream": false }),
        )
        .await
        .unwrap();
    let fast = ctx
        .client
        .post(
            "/v1/audio/speech",
            &json!({ "input": text, "language": "en", "stream": false, "speed": 2.0 }),
        )
        .await
        .unwrap();

    let normal_len = wav_len(&normal.body_bytes);
    let fast_len = wav_len(&fast.body_bytes);
    assert_eq!(normal_len, text.len() as u32 * SAMPLE_RATE / 100);
    assert_eq!(fast_len, normal_len / 2);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_raise_expressiveness_to_voice_floor(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/v1/audio/speech",
            &json!({
                "input": "Floor check.",
                "language": "en",
                "voice": "female",
                "exaggeration": 0.1,
                "stream": false
            }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::OK)
        .assert_header("x-voice-type", "female");

    let calls = ctx.model.calls.lock().clone();
    assert_eq!(calls[0].exaggeration, 0.45);
    assert!(calls[0].with_voice_prompt);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_detect_language_when_omitted(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/v1/audio/speech",
            &json!({
                "input": "Bonjour tout le monde, comment allez-vous aujourd'hui ? Il fait très beau ce matin.",
                "stream": false
            }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::OK)
        .assert_header("x-language", "fr");
    assert_eq!(ctx.model.calls.lock()[0].language, "fr");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_default_short_input_to_english(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/v1/audio/speech", &json!({ "input": "Hi." }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::OK)
        .assert_header("x-language", "en");
    assert_eq!(ctx.model.calls.lock()[0].language, "en");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_unknown_voice_as_bad_request(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/v1/audio/speech", &json!({ "input": "Hello.", "voice": "robot" }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("voice");
    assert!(ctx.model.calls.lock().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_negative_chunk_words_as_bad_request(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/v1/audio/speech/stream",
            &json!({ "input": "Hello.", "max_chunk_words": -1 }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("max_chunk_words");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_empty_input(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/v1/audio/speech", &json!({ "input": "   " }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("input cannot be empty");
    assert_eq!(ctx.model.call_count(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_input_over_character_limit(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/v1/audio/speech", &json!({ "input": "a".repeat(5001) }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("5000 characters or less");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_out_of_range_parameters(ctx: &TestContext) {
    let cases = [
        (json!({ "input": "x", "temperature": 2.0 }), "temperature"),
        (json!({ "input": "x", "speed": 0.1 }), "speed"),
        (json!({ "input": "x", "max_chunk_words": 1 }), "max_chunk_words"),
        (json!({ "input": "x", "language": "xx" }), "unsupported language"),
    ];

    for (body, message) in cases {
        ctx.client
            .post("/v1/audio/speech/stream", &body)
            .await
            .unwrap()
            .assert_status(StatusCode::BAD_REQUEST)
            .assert_error_message(message);
    }
    assert_eq!(ctx.model.call_count(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_503_for_unloaded_voice(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/v1/audio/speech",
            &json!({ "input": "Hello.", "language": "en", "voice": "male" }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::SERVICE_UNAVAILABLE)
        .assert_error_message("male");
    assert_eq!(ctx.model.call_count(), 0);
}

#[tokio::test]
async fn it_should_return_503_while_initializing() {
    let ctx = TestContext::initializing().await;

    let response = ctx
        .client
        .post("/v1/audio/speech", &json!({ "input": "Hello.", "language": "en" }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::SERVICE_UNAVAILABLE)
        .assert_error_message("initializing");
}
