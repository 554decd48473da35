use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use discovery_sdk::{Auth, ClientBuilder, DocumentUpload, QueryOptions};
use serde_json::json;
use std::time::Duration;
use tokio::runtime::Runtime;
use wiremock::{
    matchers::{method, path_regex},
    Mock, MockServer, ResponseTemplate,
};

/// Create a mock server with query and ingestion endpoints
async fn setup_mock_server() -> MockServer {
    let server = MockServer::start().await;

    // Query endpoint, with a result list large enough to exercise decoding
    let results: Vec<_> = (0..50)
        .map(|i| {
            json!({
                "id": format!("doc-{}", i),
                "collection_id": "coll",
                "result_metadata": {"score": 1.0 / (i as f64 + 1.0)},
                "text": "The quick brown fox jumps over the lazy dog",
                "enriched_text": {"concepts": [{"text": "fox", "relevance": 0.9}]}
            })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path_regex(r"^/v1/environments/[^/]+/collections/[^/]+/query$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "matching_results": 50,
                    "session_token": "1_bench",
                    "results": results
                }))
                .set_delay(Duration::from_millis(10)), // Simulate network latency
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/v1/environments/[^/]+/collections/[^/]+/documents$"))
        .respond_with(
            ResponseTemplate::new(202)
                .set_body_json(json!({"document_id": "doc-1", "status": "processing"}))
                .set_delay(Duration::from_millis(15)),
        )
        .mount(&server)
        .await;

    server
}

fn bench_client(server: &MockServer) -> discovery_sdk::Client {
    ClientBuilder::new("2017-10-16")
        .base_url(server.uri())
        .auth(Auth::basic("bench", "bench"))
        .timeout_ms(30000)
        .allow_insecure_http()
        .build()
        .expect("Failed to build client")
}

fn bench_query(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(setup_mock_server());
    let client = bench_client(&server);

    c.bench_function("query_50_results", |b| {
        b.iter(|| {
            rt.block_on(async {
                let _ = client
                    .query(
                        black_box("env"),
                        black_box("coll"),
                        black_box(QueryOptions {
                            natural_language_query: Some("quick fox".to_string()),
                            count: Some(50),
                            ..Default::default()
                        }),
                    )
                    .await
                    .expect("Failed to query");
            });
        });
    });
}

fn bench_add_document(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(setup_mock_server());
    let client = bench_client(&server);

    let mut group = c.benchmark_group("add_document");

    for size_kb in [1usize, 64, 512].iter() {
        let content = "<p>lorem ipsum</p>".repeat(size_kb * 1024 / 18);

        group.bench_with_input(BenchmarkId::from_parameter(size_kb), size_kb, |b, _| {
            b.iter(|| {
                rt.block_on(async {
                    let _ = client
                        .add_document(
                            black_box("env"),
                            black_box("coll"),
                            DocumentUpload::file(content.clone().into_bytes(), "bench.html"),
                        )
                        .await
                        .expect("Failed to add document");
                });
            });
        });
    }

    group.finish();
}

fn bench_concurrent_queries(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(setup_mock_server());
    let client = bench_client(&server);

    let mut group = c.benchmark_group("concurrent_queries");

    for concurrency in [1, 5, 10, 20].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(concurrency),
            concurrency,
            |b, &concurrency| {
                b.iter(|| {
                    rt.block_on(async {
                        let mut tasks = Vec::new();

                        for i in 0..concurrency {
                            let client = client.clone();
                            let task = tokio::spawn(async move {
                                client
                                    .query(
                                        "env",
                                        &format!("coll-{}", i),
                                        QueryOptions::default(),
                                    )
                                    .await
                                    .expect("Failed to query")
                            });
                            tasks.push(task);
                        }

                        for task in tasks {
                            let _ = task.await.expect("Task panicked");
                        }
                    });
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_query,
    bench_add_document,
    bench_concurrent_queries
);
criterion_main!(benches);
