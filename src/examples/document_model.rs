//! Document Model Example
//!
//! Builds a document through field paths, maps it to and from a struct and
//! validates it against a schema. Needs no server.
//!
//! Run with: cargo run --example document_model

use arangodoc_core::*;
use chrono::Utc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Customer {
    name: String,
    email: Option<String>,
    orders: Vec<i64>,
}

impl ToDocument for Customer {
    fn to_document(&self) -> Result<Document> {
        let mut w = DocumentWriter::new();
        w.field("name", &self.name)?
            .field_with("email", &self.email, FieldOptions::new().ignore_null())?
            .field("orders", &self.orders)?;
        Ok(w.finish())
    }
}

impl FromDocument for Customer {
    fn from_document(doc: &Document) -> Result<Self> {
        let r = DocumentReader::new(doc);
        let mut customer = Customer::default();
        r.read("name", &mut customer.name)?;
        r.read("email", &mut customer.email)?;
        r.read("orders", &mut customer.orders)?;
        Ok(customer)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("arangodoc_core=debug")),
        )
        .init();

    println!("arangodoc Document Model Example\n");

    // Build a nested document through paths
    let mut doc = Document::new();
    doc.set("user.name", "Ann")?
        .set("user.tags", vec!["admin", "ops"])?
        .set("user.tags[*]", "oncall")?
        .set("user.joined", Utc::now())?;
    doc.set_key("ann")?;

    println!("📝 Document: {}", serde_json::to_string_pretty(&doc)?);
    println!("   Name: {}", doc.get_string("user.name")?);
    println!("   Tags: {:?}", doc.get_list::<String>("user.tags")?);
    println!("   Has email: {}\n", doc.has("user.email"));

    // Structural operations
    let public = doc.clone_except(["user.joined"]);
    println!("🔒 Without join date: {}", public.to_json());
    doc.each_as::<String, _>("user.tags", |i, tag| println!("   tag {}: {}", i, tag));

    // Object mapping
    let customer = Customer {
        name: "Bob".to_string(),
        email: None,
        orders: vec![1001, 1002],
    };
    let mapped = Document::from_object(&customer)?;
    println!("\n🔁 Mapped customer: {}", mapped.to_json());
    let back: Customer = mapped.to_object()?;
    println!("   Back again: {:?}\n", back);

    // Validation
    let mut schema = Schema::new();
    schema
        .must_have("name")
        .of_type(ValueKind::String)
        .min(2)
        .should_have("email")
        .matches(r"^[^@\s]+@[^@\s]+$", true)?
        .message("email address is malformed");

    let mut invalid = mapped.clone();
    invalid.set("email", "not-an-email")?;
    for document in [&mapped, &invalid] {
        let result = schema.validate(document);
        println!("✅ Valid: {} {:?}", result.is_valid(), result.messages());
    }

    Ok(())
}
