use crate::{ClientConfig, ClientError, Result};
use arangodoc_core::system::is_document_handle;
use arangodoc_core::{Document, DocumentError, FromDocument, Schema, Settings, ToDocument};
use reqwest::{Client as HttpClient, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

/// Kind of collection to create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionType {
    Document,
    Edge,
}

impl CollectionType {
    fn code(self) -> u8 {
        match self {
            CollectionType::Document => 2,
            CollectionType::Edge => 3,
        }
    }
}

/// ArangoDB REST API Client
pub struct Client {
    config: ClientConfig,
    client: HttpClient,
}

#[derive(Serialize)]
struct CreateCollectionRequest<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: u8,
}

#[derive(Serialize)]
struct CursorRequest<'a> {
    query: &'a str,
    #[serde(rename = "bindVars")]
    bind_vars: &'a Document,
}

#[derive(Deserialize)]
struct CursorResponse {
    #[serde(default)]
    result: Vec<serde_json::Value>,
    #[serde(default, rename = "hasMore")]
    has_more: bool,
    #[serde(default)]
    id: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "errorMessage")]
    error_message: String,
}

impl Client {
    /// Create a new client for the configured server and database
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            client: HttpClient::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Encoding defaults to hand to `DocumentWriter::with_settings`
    pub fn settings(&self) -> &Settings {
        &self.config.settings
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/_db/{}{}",
            self.config.url.trim_end_matches('/'),
            self.config.database,
            path
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        tracing::debug!("{} {}", method, url);

        let builder = self.client.request(method, url);
        match &self.config.username {
            Some(username) => builder.basic_auth(username, self.config.password.as_deref()),
            None => builder,
        }
    }

    /// Server version information
    pub async fn version(&self) -> Result<Document> {
        let response = send(self.request(Method::GET, "/_api/version")).await?;
        read_document(response).await
    }

    /// Create a collection and return the server's description of it
    pub async fn create_collection(&self, name: &str, kind: CollectionType) -> Result<Document> {
        let req = CreateCollectionRequest {
            name,
            kind: kind.code(),
        };
        let response = send(self.request(Method::POST, "/_api/collection").json(&req)).await?;
        read_document(response).await
    }

    pub async fn drop_collection(&self, name: &str) -> Result<()> {
        send(self.request(Method::DELETE, &format!("/_api/collection/{}", name))).await?;
        Ok(())
    }

    /// Store a document; returns the `_id` / `_key` / `_rev` assigned by the server
    pub async fn create_document(&self, collection: &str, doc: &Document) -> Result<Document> {
        let path = format!("/_api/document/{}", collection);
        let response = send(self.request(Method::POST, &path).json(doc)).await?;
        read_document(response).await
    }

    /// Validate against `schema` before storing; nothing is sent when validation fails
    pub async fn create_validated(
        &self,
        collection: &str,
        doc: &Document,
        schema: &Schema,
    ) -> Result<Document> {
        let result = schema.validate(doc);
        if !result.is_valid() {
            tracing::debug!(
                "Rejected document for '{}' with {} violations",
                collection,
                result.violations.len()
            );
            return Err(ClientError::Validation(result));
        }
        self.create_document(collection, doc).await
    }

    pub async fn create_object<T: ToDocument + ?Sized>(
        &self,
        collection: &str,
        value: &T,
    ) -> Result<Document> {
        let doc = Document::from_object(value)?;
        self.create_document(collection, &doc).await
    }

    /// Get a document by handle (`collection/key`)
    pub async fn get_document(&self, handle: &str) -> Result<Option<Document>> {
        check_handle(handle)?;
        let path = format!("/_api/document/{}", handle);

        let response = self.request(Method::GET, &path).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = check(response).await?;
        Ok(Some(read_document(response).await?))
    }

    pub async fn get_object<T: FromDocument>(&self, handle: &str) -> Result<Option<T>> {
        match self.get_document(handle).await? {
            Some(doc) => Ok(Some(doc.to_object()?)),
            None => Ok(None),
        }
    }

    /// Replace the whole document stored under `handle`
    pub async fn replace_document(&self, handle: &str, doc: &Document) -> Result<Document> {
        check_handle(handle)?;
        let path = format!("/_api/document/{}", handle);
        let response = send(self.request(Method::PUT, &path).json(doc)).await?;
        read_document(response).await
    }

    /// Patch only the fields present in `doc`
    pub async fn update_document(&self, handle: &str, doc: &Document) -> Result<Document> {
        check_handle(handle)?;
        let path = format!("/_api/document/{}", handle);
        let response = send(self.request(Method::PATCH, &path).json(doc)).await?;
        read_document(response).await
    }

    pub async fn delete_document(&self, handle: &str) -> Result<()> {
        check_handle(handle)?;
        send(self.request(Method::DELETE, &format!("/_api/document/{}", handle))).await?;
        Ok(())
    }

    /// Run an AQL query and collect every batch of the cursor
    pub async fn query(&self, aql: &str, bind_vars: &Document) -> Result<Vec<Document>> {
        let req = CursorRequest {
            query: aql,
            bind_vars,
        };
        let response = send(self.request(Method::POST, "/_api/cursor").json(&req)).await?;
        let mut batch: CursorResponse = response.json().await?;

        let mut documents = Vec::new();
        loop {
            for item in std::mem::take(&mut batch.result) {
                documents.push(Document::from_json(item)?);
            }
            if !batch.has_more {
                break;
            }

            let id = batch.id.take().ok_or(ClientError::InvalidResponse)?;
            let path = format!("/_api/cursor/{}", id);
            let response = send(self.request(Method::PUT, &path)).await?;
            batch = response.json().await?;
        }

        tracing::debug!("Query returned {} documents", documents.len());
        Ok(documents)
    }
}

async fn send(builder: RequestBuilder) -> Result<Response> {
    let response = builder.send().await?;
    check(response).await
}

async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(server_error(status.as_u16(), &body))
}

async fn read_document(response: Response) -> Result<Document> {
    let body: serde_json::Value = response.json().await?;
    Ok(Document::from_json(body)?)
}

/// Prefer the server's `errorMessage` over the raw body
fn server_error(status: u16, body: &str) -> ClientError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|e| e.error_message)
        .unwrap_or_else(|_| body.to_string());
    tracing::warn!("Server error {}: {}", status, message);
    ClientError::Server { status, message }
}

fn check_handle(handle: &str) -> Result<()> {
    if is_document_handle(handle) {
        Ok(())
    } else {
        Err(DocumentError::InvalidHandle {
            field: "_id",
            value: handle.to_string(),
        }
        .into())
    }
}
