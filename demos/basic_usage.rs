//! Basic usage example for the Discovery SDK
//!
//! Walks through one collection's lifecycle: create it, ingest a document,
//! wait for indexing, query it, report a click, then clean up.

use discovery_sdk::{
    Auth, Client, ClientBuilder, CollectionOptions, DocumentUpload, EventData, EventType,
    Expansion, QueryOptions,
};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize the client
    let client = create_client()?;

    // Example 1: Pick the environment
    println!("=== Example 1: Environments ===");
    let environment_id = environment_example(&client).await?;

    // Example 2: Create a collection
    println!("\n=== Example 2: Create a collection ===");
    let collection_id = collection_example(&client, &environment_id).await?;

    // Example 3: Ingest a document
    println!("\n=== Example 3: Ingest a document ===");
    let document_id = document_example(&client, &environment_id, &collection_id).await?;

    // Example 4: Query and report a click
    println!("\n=== Example 4: Query ===");
    query_example(&client, &environment_id, &collection_id, &document_id).await?;

    // Example 5: Clean up
    println!("\n=== Example 5: Clean up ===");
    let deleted = client
        .delete_collection(&environment_id, &collection_id)
        .await?;
    println!("Collection {} {}", deleted.result.collection_id, deleted.result.status);

    Ok(())
}

fn create_client() -> Result<Client, Box<dyn std::error::Error>> {
    // Get configuration from environment
    let base_url = std::env::var("DISCOVERY_URL")
        .unwrap_or_else(|_| discovery_sdk::DEFAULT_BASE_URL.to_string());
    let username = std::env::var("DISCOVERY_USERNAME").unwrap_or_else(|_| "username".to_string());
    let password = std::env::var("DISCOVERY_PASSWORD").unwrap_or_else(|_| "password".to_string());

    let client = ClientBuilder::new("2017-10-16")
        .base_url(base_url)
        .auth(Auth::basic(username, password))
        .default_header("X-Watson-Learning-Opt-Out", "1")
        .default_header("X-Watson-Test", "1")
        .retries(2)
        .user_agent_extra("demos/1.0")
        .build()?;

    Ok(client)
}

async fn environment_example(client: &Client) -> Result<String, Box<dyn std::error::Error>> {
    let envs = client.list_environments(None).await?;

    // The read-only news environment is always listed; use the writable one
    let env = envs
        .result
        .environments
        .into_iter()
        .find(|e| !e.read_only)
        .ok_or("no writable environment")?;

    println!("Using environment {} ({})", env.name, env.environment_id);

    let collections = client.list_collections(&env.environment_id, None).await?;
    println!("{} collections present", collections.result.collections.len());

    Ok(env.environment_id)
}

async fn collection_example(
    client: &Client,
    environment_id: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    let created = client
        .create_collection(
            environment_id,
            CollectionOptions {
                name: format!("demo-{}", std::process::id()),
                description: Some("Created by the basic usage demo".to_string()),
                language: Some("en".to_string()),
                ..Default::default()
            },
        )
        .await?;

    let collection_id = created.result.collection_id;
    println!("Created collection {}", collection_id);

    client
        .create_expansions(
            environment_id,
            &collection_id,
            vec![Expansion::synonyms(["fox", "vixen"])],
        )
        .await?;
    println!("Added query expansions");

    Ok(collection_id)
}

async fn document_example(
    client: &Client,
    environment_id: &str,
    collection_id: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    let html = "<html><body><h1>Demo</h1><p>The quick brown fox.</p></body></html>";
    let upload = DocumentUpload::file(html.as_bytes().to_vec(), "demo.html")
        .with_metadata(serde_json::json!({"source": "demo"}));

    let added = client
        .add_document(environment_id, collection_id, upload)
        .await?;
    let document_id = added.result.document_id;
    println!("Document {} accepted ({})", document_id, added.result.status);

    // Ingestion is asynchronous
    for _ in 0..30 {
        let status = client
            .get_document_status(environment_id, collection_id, &document_id)
            .await?;
        println!("  status: {}", status.result.status);
        if status.result.status != "processing" {
            break;
        }
        tokio::time::sleep(Duration::from_secs(2)).await;
    }

    Ok(document_id)
}

async fn query_example(
    client: &Client,
    environment_id: &str,
    collection_id: &str,
    document_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let res = client
        .query(
            environment_id,
            collection_id,
            QueryOptions {
                natural_language_query: Some("quick fox".to_string()),
                count: Some(5),
                ..Default::default()
            },
        )
        .await?;

    println!("{} matching results", res.result.matching_results);
    for result in &res.result.results {
        println!("  {:?}", result.id);
    }

    if let Some(session_token) = res.result.session_token {
        let event = client
            .create_event(
                EventType::Click,
                EventData {
                    environment_id: environment_id.to_string(),
                    session_token,
                    collection_id: collection_id.to_string(),
                    document_id: document_id.to_string(),
                    ..Default::default()
                },
            )
            .await?;
        println!("Recorded {} event", event.result.event_type);
    }

    Ok(())
}
