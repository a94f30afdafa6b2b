//! Integration tests for the failover client
//!
//! Each backend is a wiremock server; unreachable backends point at
//! `http://localhost:1`. Call counts are enforced with `.expect(n)`, which
//! wiremock verifies when the server is dropped.

use tempfile::TempDir;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use apy_failover::{
    Admission, BackendSelector, Direction, LanguagePair, PreferenceStore, TranslatorClient,
    TranslatorError,
};

const UNREACHABLE: &str = "http://localhost:1";

// ==================== Test Helpers ====================

fn list_pairs_body(pairs: &[(&str, &str)]) -> serde_json::Value {
    let data: Vec<_> = pairs
        .iter()
        .map(|(s, t)| serde_json::json!({ "sourceLanguage": s, "targetLanguage": t }))
        .collect();
    serde_json::json!({ "responseData": data, "responseDetails": null, "responseStatus": 200 })
}

fn translation_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "responseData": { "translatedText": text },
        "responseDetails": null,
        "responseStatus": 200
    })
}

/// Backend listing `pairs`, answering `/listPairs` exactly `expected_calls` times
async fn pairs_backend(pairs: &[(&str, &str)], expected_calls: u64) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/listPairs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_pairs_body(pairs)))
        .expect(expected_calls)
        .mount(&mock_server)
        .await;
    mock_server
}

/// Backend listing `pairs` and translating every request to `translated`
async fn translating_backend(
    pairs: &[(&str, &str)],
    translated: &str,
    expected_translations: u64,
) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/listPairs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_pairs_body(pairs)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(translation_body(translated)))
        .expect(expected_translations)
        .mount(&mock_server)
        .await;
    mock_server
}

async fn client_with(addresses: Vec<String>) -> TranslatorClient {
    let client = TranslatorClient::with_http_client(reqwest::Client::new());
    client.seed(addresses, Admission::Trusted).await;
    client
}

// ==================== Failover Ordering ====================

#[tokio::test]
async fn test_first_backend_success_never_contacts_later_backends() {
    let first = pairs_backend(&[("en", "es")], 1).await;
    let second = pairs_backend(&[("en", "ca")], 0).await;
    let third = pairs_backend(&[("en", "fr")], 0).await;
    let client = client_with(vec![first.uri(), second.uri(), third.uri()]).await;

    let catalog = client.list_pairs(BackendSelector::Failover).await.unwrap();

    assert_eq!(catalog, vec![LanguagePair::new("en", "es")]);
}

#[tokio::test]
async fn test_kth_backend_answers_after_transport_failures() {
    let third = pairs_backend(&[("en", "ca")], 1).await;
    let fourth = pairs_backend(&[("en", "fr")], 0).await;
    let client = client_with(vec![
        UNREACHABLE.to_string(),
        UNREACHABLE.to_string(),
        third.uri(),
        fourth.uri(),
    ])
    .await;

    let catalog = client.list_pairs(BackendSelector::Failover).await.unwrap();

    assert_eq!(catalog, vec![LanguagePair::new("en", "ca")]);
}

#[tokio::test]
async fn test_status_error_advances_to_next_backend() {
    let failing = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/listPairs"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&failing)
        .await;
    let healthy = pairs_backend(&[("es", "en"), ("en", "es")], 1).await;
    let client = client_with(vec![failing.uri(), healthy.uri()]).await;

    let catalog = client
        .pairs_by_source("es", BackendSelector::Failover)
        .await
        .unwrap();

    assert_eq!(catalog, vec![LanguagePair::new("es", "en")]);
}

#[tokio::test]
async fn test_exhausted_registry_surfaces_last_error() {
    let failing = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/listPairs"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&failing)
        .await;
    let client = client_with(vec![UNREACHABLE.to_string(), failing.uri()]).await;

    let result = client.pairs_by_target("en", BackendSelector::Failover).await;

    assert_eq!(result.unwrap_err(), TranslatorError::BackendStatus { code: 503 });
}

#[tokio::test]
async fn test_pinned_backend_failure_is_terminal() {
    let healthy = pairs_backend(&[("en", "es")], 0).await;
    let client = client_with(vec![UNREACHABLE.to_string(), healthy.uri()]).await;

    let result = client
        .pair_exists("en", "es", BackendSelector::Pinned(0))
        .await;

    assert!(matches!(result, Err(TranslatorError::Connection(_))));
}

#[tokio::test]
async fn test_pinned_backend_skips_earlier_entries() {
    let first = pairs_backend(&[("en", "es")], 0).await;
    let second = pairs_backend(&[("en", "ca")], 1).await;
    let client = client_with(vec![first.uri(), second.uri()]).await;

    let exists = client
        .pair_exists("en", "ca", BackendSelector::Pinned(1))
        .await
        .unwrap();

    assert!(exists);
}

#[tokio::test]
async fn test_empty_registry_makes_no_network_attempt() {
    let client = client_with(Vec::new()).await;

    assert_eq!(
        client
            .pairs_by_source("en", BackendSelector::Failover)
            .await
            .unwrap_err(),
        TranslatorError::NoBackendsConfigured
    );
    assert_eq!(
        client
            .pair_exists("en", "es", BackendSelector::Failover)
            .await
            .unwrap_err(),
        TranslatorError::NoBackendsConfigured
    );
}

// ==================== Translation ====================

#[tokio::test]
async fn test_translate_skips_backend_lacking_pair() {
    let lacking = translating_backend(&[("en", "ca")], "unused", 0).await;
    let offering = translating_backend(&[("en", "es")], "hola mundo", 1).await;
    let client = client_with(vec![lacking.uri(), offering.uri()]).await;

    let translated = client
        .translate("hello world", "en", "es", BackendSelector::Failover)
        .await
        .unwrap();

    assert_eq!(translated, "hola mundo");
}

#[tokio::test]
async fn test_translate_pair_missing_everywhere() {
    let first = translating_backend(&[("en", "ca")], "unused", 0).await;
    let second = translating_backend(&[("es", "en")], "unused", 0).await;
    let client = client_with(vec![first.uri(), second.uri()]).await;

    let result = client
        .translate("hello", "en", "es", BackendSelector::Failover)
        .await;

    assert_eq!(
        result.unwrap_err(),
        TranslatorError::PairNotFound {
            source_lang: "en".to_string(),
            target_lang: "es".to_string()
        }
    );
}

#[tokio::test]
async fn test_translate_round_trips_reserved_characters_and_entities() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/listPairs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_pairs_body(&[("en", "es")])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/translate"))
        .and(query_param("q", "salt & pepper"))
        .and(query_param("langpair", "en|es"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(translation_body("sal &amp; pimienta")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    let client = client_with(vec![mock_server.uri()]).await;

    let translated = client
        .translate("salt & pepper", "en", "es", BackendSelector::Failover)
        .await
        .unwrap();

    assert_eq!(translated, "sal & pimienta");

    let requests = mock_server.received_requests().await.unwrap();
    let translate_request = requests
        .iter()
        .find(|r| r.url.path() == "/translate")
        .expect("translate request should have been sent");
    assert_eq!(
        translate_request.url.query(),
        Some("q=salt%20%26%20pepper&langpair=en%7Ces")
    );
}

#[tokio::test]
async fn test_translate_after_translation_status_error() {
    let failing = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/listPairs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_pairs_body(&[("en", "es")])))
        .mount(&failing)
        .await;
    Mock::given(method("GET"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&failing)
        .await;
    let healthy = translating_backend(&[("en", "es")], "hola", 1).await;
    let client = client_with(vec![failing.uri(), healthy.uri()]).await;

    let translated = client
        .translate("hello", "en", "es", BackendSelector::Failover)
        .await
        .unwrap();

    assert_eq!(translated, "hola");
}

// ==================== Registry Admission ====================

#[tokio::test]
async fn test_replace_all_drops_unreachable_middle_backend() {
    let a = pairs_backend(&[("en", "es")], 1).await;
    let c = pairs_backend(&[("en", "es")], 1).await;
    let client = client_with(Vec::new()).await;

    let count = client
        .registry()
        .replace_all(
            [a.uri(), UNREACHABLE.to_string(), c.uri()],
            Admission::Probed,
        )
        .await;

    assert_eq!(count, 2);
    assert_eq!(client.addresses(), vec![a.uri(), c.uri()]);
}

// ==================== Preferences Hand-off ====================

#[tokio::test]
async fn test_preferences_seed_client_and_receive_snapshot() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let prefs_path = temp_dir.path().join("prefs.json");
    let backend = pairs_backend(&[("en", "es")], 1).await;

    let mut store = PreferenceStore::open(&prefs_path).unwrap();
    store.set_addresses(vec![UNREACHABLE.to_string()]);
    store
        .set_lang_pair(Direction::Outgoing, "alice", "en", "es")
        .unwrap();

    // Saved addresses were validated when stored, so they are trusted on load
    let client = TranslatorClient::with_http_client(reqwest::Client::new());
    let loaded = client
        .seed(store.addresses().to_vec(), Admission::Trusted)
        .await;
    assert_eq!(loaded, 1);

    client
        .registry()
        .insert_at(backend.uri(), 0, Admission::Probed)
        .await
        .unwrap();

    store.set_addresses(client.addresses());
    store.save().unwrap();

    let reopened = PreferenceStore::open(&prefs_path).unwrap();
    assert_eq!(
        reopened.addresses(),
        &[backend.uri(), UNREACHABLE.to_string()]
    );
    assert!(reopened.has_user(Direction::Outgoing, "alice"));
}
