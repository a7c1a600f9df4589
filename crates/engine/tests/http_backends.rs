//! Remote backends against a local stub server

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::StubServer;
use gu_xlit_core::{Language, TransliterationEngine};
use gu_xlit_engine::{
    FallbackEngine, InputToolsConfig, InputToolsEngine, TransliterationOutcome, Transliterator,
    XlitApiConfig, XlitApiEngine,
};

fn xlit_api(server: &StubServer) -> XlitApiEngine {
    XlitApiEngine::new(XlitApiConfig {
        base_url: server.base_url.clone(),
        timeout: Duration::from_secs(2),
        cache_size: 0,
    })
    .unwrap()
}

fn input_tools(server: &StubServer) -> InputToolsEngine {
    InputToolsEngine::new(InputToolsConfig {
        endpoint: format!("{}request", server.base_url),
        timeout: Duration::from_secs(2),
    })
    .unwrap()
}

#[tokio::test]
async fn test_xlit_api_batch() {
    let server = StubServer::start(|_| {
        (
            200,
            r#"{"output":[{"source":"kem","target":["કેમ"]},{"source":"cho","target":["છો"]}]}"#
                .to_string(),
        )
    })
    .await;

    let engine = xlit_api(&server);
    let out = engine
        .translit_sentence("kem  cho", Language::Gujarati)
        .await
        .unwrap();
    assert_eq!(out, vec!["કેમ છો"]);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].target, "/transliterate");
    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body["config"]["language"]["targetLanguage"], "gu");
    assert_eq!(body["input"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_xlit_api_empty_batch_output_falls_back() {
    let server = StubServer::start(|req| match (req.method.as_str(), req.target.as_str()) {
        ("POST", _) => (200, r#"{"output":[]}"#.to_string()),
        ("GET", "/tl/gu/kem") => (200, r#"{"success":true,"result":{"gu":["કેમ"]}}"#.to_string()),
        ("GET", "/tl/gu/cho") => (200, r#"{"success":true,"result":{"gu":["છો"]}}"#.to_string()),
        _ => (404, String::new()),
    })
    .await;

    let xlit = Transliterator::with_engine(Arc::new(xlit_api(&server)), Language::Gujarati);
    assert_eq!(xlit.transliterate("  kem cho  ").await, "કેમ છો");
    assert_eq!(server.requests().len(), 3);
}

#[tokio::test]
async fn test_xlit_api_short_batch_output_keeps_every_word() {
    let server = StubServer::start(|req| match (req.method.as_str(), req.target.as_str()) {
        ("POST", _) => (
            200,
            r#"{"output":[{"source":"kem","target":["કેમ"]}]}"#.to_string(),
        ),
        ("GET", "/tl/gu/kem") => (200, r#"{"success":true,"result":{"gu":["કેમ"]}}"#.to_string()),
        ("GET", "/tl/gu/cho") => (200, r#"{"success":true,"result":{"gu":["છો"]}}"#.to_string()),
        ("GET", "/tl/gu/tame") => (200, r#"{"success":true,"result":{"gu":["તમે"]}}"#.to_string()),
        _ => (404, String::new()),
    })
    .await;

    let xlit = Transliterator::with_engine(Arc::new(xlit_api(&server)), Language::Gujarati);
    assert_eq!(xlit.transliterate("kem cho tame").await, "કેમ છો તમે");

    let targets: Vec<String> = server.requests().into_iter().map(|r| r.target).collect();
    assert_eq!(
        targets,
        vec!["/transliterate", "/tl/gu/kem", "/tl/gu/cho", "/tl/gu/tame"]
    );
}

#[tokio::test]
async fn test_xlit_api_word_by_word_fallback() {
    let server = StubServer::start(|req| match (req.method.as_str(), req.target.as_str()) {
        ("POST", _) => (503, "overloaded".to_string()),
        ("GET", "/tl/gu/kem") => (
            200,
            r#"{"success":true,"result":{"gu":["કેમ"]}}"#.to_string(),
        ),
        _ => (200, r#"{"success":false,"error":"unknown word"}"#.to_string()),
    })
    .await;

    let engine = xlit_api(&server);
    let out = engine
        .translit_sentence("kem zzq", Language::Gujarati)
        .await
        .unwrap();
    // Failed words keep their original spelling
    assert_eq!(out, vec!["કેમ zzq"]);

    let targets: Vec<String> = server.requests().into_iter().map(|r| r.target).collect();
    assert_eq!(targets, vec!["/transliterate", "/tl/gu/kem", "/tl/gu/zzq"]);
}

#[tokio::test]
async fn test_xlit_api_total_failure_passes_through_adapter() {
    let server = StubServer::start(|_| (500, "down".to_string())).await;

    let engine = Arc::new(xlit_api(&server));
    assert!(engine
        .translit_sentence("tame kem cho", Language::Gujarati)
        .await
        .is_err());

    let xlit = Transliterator::with_engine(engine, Language::Gujarati);
    let outcome = xlit.transliterate_detailed("  tame kem cho  ").await;
    assert_eq!(outcome.text(), "tame kem cho");
    assert!(matches!(outcome, TransliterationOutcome::PassedThrough { .. }));
}

#[tokio::test]
async fn test_input_tools() {
    let server = StubServer::start(|_| {
        (
            200,
            r#"["SUCCESS",[["kem cho",["કેમ છો","કેમ છૉ"],[],{"candidate_type":[0,0]}]]]"#
                .to_string(),
        )
    })
    .await;

    let engine = input_tools(&server);
    let out = engine
        .translit_sentence("kem cho", Language::Gujarati)
        .await
        .unwrap();
    assert_eq!(out, vec!["કેમ છો"]);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert!(requests[0].target.starts_with("/request?"));
    assert!(requests[0].target.contains("itc=gu-t-i0-und"));
    assert_eq!(requests[0].body, "text=kem+cho");
}

#[tokio::test]
async fn test_input_tools_http_error() {
    let server = StubServer::start(|_| (429, String::new())).await;
    let engine = input_tools(&server);
    let err = engine
        .translit_sentence("kem cho", Language::Gujarati)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("429"));
}

#[tokio::test]
async fn test_chain_skips_latin_result() {
    // Input Tools echoes Latin text; the xlit API produces Gujarati
    let google = StubServer::start(|_| {
        (
            200,
            r#"["SUCCESS",[["kem cho",["kem cho"]]]]"#.to_string(),
        )
    })
    .await;
    let ai4bharat = StubServer::start(|_| {
        (
            200,
            r#"{"output":[{"source":"kem","target":["કેમ"]},{"source":"cho","target":["છો"]}]}"#
                .to_string(),
        )
    })
    .await;

    let engines: Vec<Arc<dyn TransliterationEngine>> = vec![
        Arc::new(input_tools(&google)) as Arc<dyn TransliterationEngine>,
        Arc::new(xlit_api(&ai4bharat)) as Arc<dyn TransliterationEngine>,
    ];
    let chain = FallbackEngine::new(engines);
    let xlit = Transliterator::with_engine(Arc::new(chain), Language::Gujarati);

    let outcome = xlit.transliterate_detailed("kem cho").await;
    assert_eq!(
        outcome,
        TransliterationOutcome::Transliterated {
            text: "કેમ છો".to_string(),
            engine: "fallback(input-tools→xlit-api)".to_string(),
        }
    );
    assert_eq!(google.requests().len(), 1);
    assert_eq!(ai4bharat.requests().len(), 1);
}
