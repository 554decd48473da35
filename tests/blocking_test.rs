//! Tests for the blocking client facade

use discovery_sdk::{blocking, Auth, ClientBuilder, DocumentUpload, Error, QueryOptions};
use serde_json::json;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn setup() -> (MockServer, blocking::Client) {
    let server = tokio_test::block_on(MockServer::start());
    let client = blocking::Client::new(
        ClientBuilder::new("2017-10-16")
            .base_url(server.uri())
            .auth(Auth::basic("user", "pass"))
            .allow_insecure_http(),
    )
    .expect("Failed to build blocking client");
    (server, client)
}

#[test]
fn test_blocking_list_collections() {
    let (server, client) = setup();

    tokio_test::block_on(
        Mock::given(method("GET"))
            .and(path("/v1/environments/env/collections"))
            .and(query_param("version", "2017-10-16"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "collections": [{"collection_id": "coll-1", "name": "manuals"}]
            })))
            .expect(1)
            .mount(&server),
    );

    let res = client.list_collections("env", None).unwrap();
    assert_eq!(res.result.collections[0].collection_id, "coll-1");
    assert_eq!(client.config().version, "2017-10-16");
}

#[test]
fn test_blocking_query_and_upload() {
    let (server, client) = setup();

    tokio_test::block_on(async {
        Mock::given(method("GET"))
            .and(path("/v1/environments/env/collections/coll/query"))
            .and(query_param("query", "text:rust"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"matching_results": 2, "results": []})),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/environments/env/collections/coll/documents"))
            .respond_with(
                ResponseTemplate::new(202)
                    .set_body_json(json!({"document_id": "doc-9", "status": "processing"})),
            )
            .expect(1)
            .mount(&server)
            .await;
    });

    let res = client
        .query(
            "env",
            "coll",
            QueryOptions {
                query: Some("text:rust".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(res.result.matching_results, 2);

    let added = client
        .add_document("env", "coll", DocumentUpload::file(b"plain".to_vec(), "a.txt"))
        .unwrap();
    assert_eq!(added.result.document_id, "doc-9");
}

#[test]
fn test_blocking_error_passthrough() {
    let (server, client) = setup();

    tokio_test::block_on(
        Mock::given(method("DELETE"))
            .and(path("/v1/environments/env"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
            .expect(1)
            .mount(&server),
    );

    let err = client.delete_environment("env").unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(client.get_environment(""), Err(Error::InvalidArgument(_))));
}
