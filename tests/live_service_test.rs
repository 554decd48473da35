//! Live service integration tests for the Discovery SDK
//!
//! These tests talk to a real Discovery instance and only run when
//! `DISCOVERY_LIVE_TESTS` is set. Credentials come from the environment:
//!
//! - `DISCOVERY_URL` (optional, defaults to the public gateway)
//! - `DISCOVERY_APIKEY`, or `DISCOVERY_USERNAME` and `DISCOVERY_PASSWORD`
//! - `DISCOVERY_ENVIRONMENT_ID`, a writable environment reserved for tests
//!
//! Run with: DISCOVERY_LIVE_TESTS=1 cargo test --test live_service_test -- --nocapture

use discovery_sdk::{
    Auth, Client, ClientBuilder, CollectionOptions, ConfigurationOptions, DocumentUpload,
    Expansion, MetricsRange, QueryLogOptions, QueryOptions,
};
use std::time::Duration;
use time::OffsetDateTime;

const GATE: &str = "DISCOVERY_LIVE_TESTS";
const VERSION: &str = "2017-10-16";

struct Live {
    client: Client,
    environment_id: String,
}

/// Build a client from the environment, or `None` when live tests are off
fn live() -> Option<Live> {
    if std::env::var_os(GATE).is_none() {
        println!("{} not set, skipping live test", GATE);
        return None;
    }

    let auth = match std::env::var("DISCOVERY_APIKEY") {
        Ok(key) => Auth::api_key(key),
        Err(_) => Auth::basic(
            std::env::var("DISCOVERY_USERNAME").expect("DISCOVERY_USERNAME"),
            std::env::var("DISCOVERY_PASSWORD").expect("DISCOVERY_PASSWORD"),
        ),
    };

    let mut builder = ClientBuilder::new(VERSION)
        .auth(auth)
        .default_header("X-Watson-Learning-Opt-Out", "1")
        .default_header("X-Watson-Test", "1")
        .timeout_ms(60_000)
        .retries(2)
        .user_agent_extra("live-test/1.0");
    if let Ok(url) = std::env::var("DISCOVERY_URL") {
        builder = builder.base_url(url);
    }

    Some(Live {
        client: builder.build().expect("Failed to build client"),
        environment_id: std::env::var("DISCOVERY_ENVIRONMENT_ID")
            .expect("DISCOVERY_ENVIRONMENT_ID"),
    })
}

fn unique_name(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

#[tokio::test]
async fn test_environments() {
    let Some(live) = live() else { return };

    let envs = live.client.list_environments(None).await.unwrap();
    assert!(!envs.result.environments.is_empty());

    let env = live
        .client
        .get_environment(&envs.result.environments[0].environment_id)
        .await
        .unwrap();
    assert!(!env.result.environment_id.is_empty());

    let collections = live
        .client
        .list_collections(&live.environment_id, None)
        .await
        .unwrap();
    if let Some(first) = collections.result.collections.first() {
        let fields = live
            .client
            .list_fields(&live.environment_id, &[first.collection_id.as_str()])
            .await
            .unwrap();
        assert!(fields.get("fields").is_some());
    }
}

#[tokio::test]
async fn test_configuration_lifecycle() {
    let Some(live) = live() else { return };
    let env = live.environment_id.as_str();

    let created = live
        .client
        .create_configuration(
            env,
            ConfigurationOptions {
                name: unique_name("rust-sdk-config"),
                description: Some("creating new config for rust sdk".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let configuration_id = created.result.configuration_id;
    assert!(!configuration_id.is_empty());

    let renamed = unique_name("lala");
    let updated = live
        .client
        .update_configuration(
            env,
            &configuration_id,
            ConfigurationOptions {
                name: renamed.clone(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.result.name, renamed);

    let deleted = live
        .client
        .delete_configuration(env, &configuration_id)
        .await
        .unwrap();
    assert_eq!(deleted.result.status, "deleted");
}

#[tokio::test]
async fn test_collection_documents_and_query() {
    let Some(live) = live() else { return };
    let env = live.environment_id.as_str();
    let client = &live.client;

    let name = unique_name("rust-sdk-collection");
    let collection_id = client
        .create_collection(
            env,
            CollectionOptions {
                name: name.clone(),
                description: Some("Integration test for rust sdk".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .result
        .collection_id;
    assert!(!collection_id.is_empty());

    let updated = client
        .update_collection(
            env,
            &collection_id,
            CollectionOptions {
                name,
                description: Some("Updating description".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(
        updated.result.description.as_deref(),
        Some("Updating description")
    );

    client
        .create_expansions(
            env,
            &collection_id,
            vec![Expansion::one_way(["a"], ["b"])],
        )
        .await
        .unwrap();
    let expansions = client.list_expansions(env, &collection_id).await.unwrap();
    assert_eq!(expansions.result.expansions.len(), 1);
    client.delete_expansions(env, &collection_id).await.unwrap();

    let html = "<html><body><h1>Live test</h1><p>Rust SDK document.</p></body></html>";
    let added = client
        .add_document(
            env,
            &collection_id,
            DocumentUpload::file(html.as_bytes().to_vec(), "simple.html"),
        )
        .await
        .unwrap();
    let document_id = added.result.document_id;

    let status = client
        .get_document_status(env, &collection_id, &document_id)
        .await
        .unwrap();
    assert!(!status.result.status.is_empty());

    // Give ingestion a moment before querying
    tokio::time::sleep(Duration::from_secs(5)).await;

    let sha1 = status.result.sha1.unwrap_or_default();
    if sha1.len() >= 8 {
        let res = client
            .query(
                env,
                &collection_id,
                QueryOptions {
                    filter: Some(format!("extracted_metadata.sha1::{}", &sha1[..8])),
                    return_fields: vec!["extracted_metadata.sha1".to_string()],
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        for result in &res.result.results {
            let stored = result
                .fields
                .get("extracted_metadata")
                .and_then(|m| m["sha1"].as_str())
                .unwrap_or_default();
            assert!(stored.starts_with(&sha1[..8]));
        }
    }

    client
        .delete_document(env, &collection_id, &document_id)
        .await
        .unwrap();

    client.delete_collection(env, &collection_id).await.unwrap();
    let err = client.get_collection(env, &collection_id).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_metrics_and_logs() {
    let Some(live) = live() else { return };
    let client = &live.client;

    let end = OffsetDateTime::now_utc();
    let start = end - time::Duration::days(7);

    let res = client
        .get_metrics_query(MetricsRange::between(start, end))
        .await
        .unwrap();
    assert!(res.get("aggregations").is_some());

    let _ = client
        .get_metrics_event_rate(MetricsRange::between(start, end))
        .await
        .unwrap();
    let _ = client
        .get_metrics_query_event(MetricsRange::default())
        .await
        .unwrap();
    let _ = client
        .get_metrics_query_no_results(MetricsRange::default())
        .await
        .unwrap();
    let _ = client.get_metrics_query_token_event(Some(10)).await.unwrap();

    let logs = client
        .query_log(QueryLogOptions {
            count: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(logs.result.results.len() <= 2);
}

#[tokio::test]
async fn test_credentials() {
    let Some(live) = live() else { return };

    let creds = live
        .client
        .list_credentials(&live.environment_id)
        .await
        .unwrap();
    assert!(creds.get("credentials").is_some());
}
