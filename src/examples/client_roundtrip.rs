//! Client Round-Trip Example
//!
//! Creates a collection, stores, reads, patches and queries documents on a
//! running ArangoDB server.
//!
//! Run with: cargo run --example client_roundtrip [config.json]

use arangodoc_core::ValueKind;
use arangodoc_rs::{Client, ClientConfig, ClientError, CollectionType, Document, Schema};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("arangodoc_rs=debug,arangodoc_core=info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ClientConfig::load(&path)?,
        None => ClientConfig::default().with_credentials("root", ""),
    };
    println!("arangodoc Client Example ({})\n", config.url);

    let client = Client::new(config);
    let version = client.version().await?;
    println!("🔌 Server version: {}", version.get_string("version")?);

    let collection = format!("demo_{}", uuid::Uuid::new_v4().simple());
    client
        .create_collection(&collection, CollectionType::Document)
        .await?;
    println!("✅ Created collection {}\n", collection);

    let mut schema = Schema::new();
    schema.must_have("title").of_type(ValueKind::String).min(1);

    // Rejected locally, never sent
    match client
        .create_validated(&collection, &Document::new(), &schema)
        .await
    {
        Err(ClientError::Validation(result)) => {
            println!("🚫 Rejected: {:?}", result.messages())
        }
        other => println!("Unexpected: {:?}", other),
    }

    let mut doc = Document::new();
    doc.set("title", "first")?
        .set("created", chrono::Utc::now())?
        .set("meta.views", 0i64)?;
    let meta = client.create_validated(&collection, &doc, &schema).await?;
    let handle = meta.id()?;
    println!("📝 Stored {} (rev {})", handle, meta.rev()?);

    let mut patch = Document::new();
    patch.set("meta.views", 5i64)?;
    client.update_document(&handle, &patch).await?;

    if let Some(stored) = client.get_document(&handle).await? {
        println!("   Views: {}", stored.get_i64("meta.views")?);
    }

    let mut vars = Document::new();
    vars.set("@coll", collection.as_str())?.set("min", 1i64)?;
    let rows = client
        .query("FOR d IN @@coll FILTER d.meta.views >= @min RETURN d", &vars)
        .await?;
    println!("🔍 Query matched {} documents", rows.len());

    client.delete_document(&handle).await?;
    println!("   Missing after delete: {}", client.get_document(&handle).await?.is_none());

    client.drop_collection(&collection).await?;
    println!("🧹 Dropped {}", collection);

    Ok(())
}
