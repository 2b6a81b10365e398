use crate::config::Config;
use async_trait::async_trait;
use domain::models::{Metadata, RetrievedDocument, VectorRecord};
use domain::ports::{IndexSpec, VectorStore};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use shared::types::Result;
use std::sync::Arc;
use std::time::Duration;

const API_VERSION: &str = "2025-01";
const READY_POLL_INTERVAL: Duration = Duration::from_secs(2);
const READY_POLL_ATTEMPTS: usize = 30;

#[derive(Deserialize)]
struct IndexDescription {
    host: String,
    status: IndexStatus,
}

#[derive(Deserialize)]
struct IndexStatus {
    ready: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<Metadata>,
}

/// Client for a Pinecone-style vector database: index lifecycle on the
/// control plane, upsert and query on the per-index data plane host.
#[derive(Clone)]
pub struct PineconeClient {
    client: Arc<Client>,
    controller_url: String,
    api_key: String,
}

impl PineconeClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Arc::new(Client::new()),
            controller_url: config.pinecone_controller_url.trim_end_matches('/').to_string(),
            api_key: config.pinecone_api_key.clone(),
        }
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-Api-Version", API_VERSION)
    }

    async fn describe(&self, name: &str) -> Result<Option<IndexDescription>> {
        let url = format!("{}/indexes/{name}", self.controller_url);
        let response = self.request(reqwest::Method::GET, &url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Pinecone describe error {status}: {body}"));
        }
        Ok(Some(response.json().await?))
    }

    /// Resolve the data-plane host for an index, waiting for readiness.
    async fn host_for(&self, name: &str) -> Result<String> {
        for _ in 0..READY_POLL_ATTEMPTS {
            if let Some(description) = self.describe(name).await? {
                if description.status.ready {
                    return Ok(description.host);
                }
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
        Err(anyhow::anyhow!("index '{name}' never became ready"))
    }
}

#[async_trait]
impl VectorStore for PineconeClient {
    async fn index_exists(&self, name: &str) -> Result<bool> {
        Ok(self.describe(name).await?.is_some())
    }

    async fn create_index(&self, spec: &IndexSpec) -> Result<()> {
        let url = format!("{}/indexes", self.controller_url);
        let body = json!({
            "name": spec.name,
            "dimension": spec.dimension,
            "metric": "cosine",
            "spec": { "serverless": { "cloud": "aws", "region": "us-east-1" } },
        });
        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Pinecone create error {status}: {body}"));
        }
        // Creation is asynchronous on the service side.
        self.host_for(&spec.name).await?;
        Ok(())
    }

    async fn delete_index(&self, name: &str) -> Result<()> {
        let url = format!("{}/indexes/{name}", self.controller_url);
        let response = self.request(reqwest::Method::DELETE, &url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND || status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(anyhow::anyhow!("Pinecone delete error {status}: {body}"))
    }

    async fn upsert(&self, index: &str, records: &[VectorRecord]) -> Result<()> {
        let host = self.host_for(index).await?;
        let url = format!("https://{host}/vectors/upsert");
        let vectors: Vec<_> = records
            .iter()
            .map(|record| {
                json!({
                    "id": record.id,
                    "values": record.values,
                    "metadata": record.metadata,
                })
            })
            .collect();
        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&json!({ "vectors": vectors }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Pinecone upsert error {status}: {body}"));
        }
        Ok(())
    }

    async fn query(
        &self,
        index: &str,
        vector: &[f32],
        top_k: usize,
        filter: Option<(&str, &str)>,
    ) -> Result<Vec<RetrievedDocument>> {
        let host = self.host_for(index).await?;
        let url = format!("https://{host}/query");
        let mut body = json!({
            "vector": vector,
            "topK": top_k,
            "includeMetadata": true,
        });
        if let Some((key, value)) = filter {
            body["filter"] = json!({ key: { "$eq": value } });
        }
        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Pinecone query error {status}: {text}"));
        }
        let parsed: QueryResponse = response.json().await?;
        let documents = parsed
            .matches
            .into_iter()
            .map(|m| {
                let mut metadata = m.metadata.unwrap_or_default();
                let content = metadata.remove("text").unwrap_or_default();
                RetrievedDocument {
                    content,
                    metadata,
                    score: m.score,
                }
            })
            .collect();
        Ok(documents)
    }
}
