use std::collections::HashSet;
use std::time::Duration;

use bridgeus::{
    application::credentials::CredentialStore,
    config::ApiSettings,
    infra::http::{ApiClient, RequestOptions},
};
use futures::future::join_all;
use httpmock::MockServer;
use metrics_util::debugging::DebuggingRecorder;
use serde_json::{Value, json};

#[tokio::test]
async fn refresh_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.path("/api/inbox").header("authorization", "Bearer stale");
            then.status(401);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.path("/api/inbox").header("authorization", "Bearer fresh");
            then.status(200).json_body(json!({"items": []}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method("POST")
                .path("/api/auth/refresh")
                .json_body(json!({"refresh_token": "good"}));
            then.status(200)
                .delay(Duration::from_millis(300))
                .json_body(json!({"access_token": "fresh", "refresh_token": "bad"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method("POST")
                .path("/api/auth/refresh")
                .json_body(json!({"refresh_token": "bad"}));
            then.status(401);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.path("/api/private");
            then.status(401);
        })
        .await;

    let store = CredentialStore::new();
    store.set("stale", "good");
    let client =
        ApiClient::new(&ApiSettings::new(server.url("/api")), store.clone()).expect("client");

    // Three concurrent expiries: one refresh, two joiners, three resends.
    let results = join_all(
        (0..3).map(|_| client.dispatch::<Value>("/inbox", RequestOptions::get())),
    )
    .await;
    assert!(results.iter().all(Result::is_ok));

    // Second refresh is rejected and signs the session out.
    let failed = client
        .dispatch::<Value>("/private", RequestOptions::get())
        .await;
    assert!(failed.is_err());
    assert!(store.current().is_empty());

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    for expected in [
        "bridgeus_auth_refresh_total",
        "bridgeus_auth_refresh_joined_total",
        "bridgeus_auth_refresh_failed_total",
        "bridgeus_http_retry_total",
    ] {
        assert!(names.contains(expected), "missing metric {expected}");
    }
}
