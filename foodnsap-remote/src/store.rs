use crate::config::RemoteConfig;
use crate::error;
use async_trait::async_trait;
use foodnsap::services::{DomainMutation, RemoteStore};
use foodnsap::{FoodnsapError, MutationExecutor, QueuedMutation, Result};
use reqwest::{Method, RequestBuilder, Response};
use serde_json::Value;

const RETURN_ROWS: &str = "return=representation";
const RETURN_NOTHING: &str = "return=minimal";
const MERGE_DUPLICATES: &str = "resolution=merge-duplicates";

/// Client for the backend's PostgREST table API.
pub struct RestStore {
    config: RemoteConfig,
    http_client: reqwest::Client,
}

impl RestStore {
    pub fn new(config: RemoteConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            config,
            http_client,
        }
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn request(&self, method: Method, table: &str) -> (String, RequestBuilder) {
        let url = self.config.table_url(table);
        let builder = self
            .http_client
            .request(method, &url)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(self.config.bearer());
        (url, builder)
    }

    async fn send(url: &str, builder: RequestBuilder) -> Result<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| error::transport(url, e))?;
        if !response.status().is_success() {
            let err = error::status(response).await;
            tracing::warn!("[REMOTE] {} -> {}", url, err);
            return Err(err);
        }
        Ok(response)
    }

    async fn rows(url: &str, response: Response) -> Result<Vec<Value>> {
        match response.json::<Value>().await.map_err(|e| error::decode(url, e))? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            row => Ok(vec![row]),
        }
    }
}

#[async_trait]
impl RemoteStore for RestStore {
    async fn insert(&self, table: &str, row: Value) -> Result<Value> {
        let (url, builder) = self.request(Method::POST, table);
        let response = Self::send(&url, builder.header("Prefer", RETURN_ROWS).json(&row)).await?;
        Self::rows(&url, response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| FoodnsapError::Json(format!("insert into {} returned no rows", table)))
    }

    async fn insert_many(&self, table: &str, rows: Vec<Value>) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let (url, builder) = self.request(Method::POST, table);
        Self::send(&url, builder.header("Prefer", RETURN_NOTHING).json(&rows)).await?;
        Ok(())
    }

    async fn update(&self, table: &str, id: &str, changes: Value) -> Result<Value> {
        let (url, builder) = self.request(Method::PATCH, table);
        let builder = builder
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", RETURN_ROWS)
            .json(&changes);
        let response = Self::send(&url, builder).await?;
        // PostgREST answers 200 with no rows when the filter matched nothing.
        Self::rows(&url, response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| FoodnsapError::Remote {
                status: 404,
                message: format!("{}/{} not found", table, id),
            })
    }

    async fn delete(&self, table: &str, id: &str) -> Result<()> {
        let (url, builder) = self.request(Method::DELETE, table);
        Self::send(&url, builder.query(&[("id", format!("eq.{}", id))])).await?;
        Ok(())
    }

    async fn upsert(&self, table: &str, row: Value) -> Result<()> {
        let (url, builder) = self.request(Method::POST, table);
        let builder = builder
            .header("Prefer", format!("{},{}", MERGE_DUPLICATES, RETURN_NOTHING))
            .json(&row);
        Self::send(&url, builder).await?;
        Ok(())
    }

    async fn fetch(&self, table: &str, id: &str) -> Result<Option<Value>> {
        let (url, builder) = self.request(Method::GET, table);
        let builder = builder.query(&[("id", format!("eq.{}", id)), ("select", "*".to_string())]);
        let response = Self::send(&url, builder).await?;
        Ok(Self::rows(&url, response).await?.into_iter().next())
    }
}

/// Replays plain row mutations. Named actions need
/// [`foodnsap::ReplayExecutor`], which knows how to expand them.
#[async_trait]
impl MutationExecutor for RestStore {
    async fn execute(&self, mutation: &QueuedMutation) -> Result<()> {
        match DomainMutation::try_from(mutation)? {
            DomainMutation::InsertRow { table, row } => self.insert(&table, row).await.map(drop),
            DomainMutation::UpdateRow { table, id, changes } => {
                self.update(&table, &id, changes).await.map(drop)
            }
            DomainMutation::DeleteRow { table, id } => self.delete(&table, &id).await,
            _ => Err(FoodnsapError::InvalidMutation(format!(
                "{} is an action; replay it with ReplayExecutor",
                mutation
            ))),
        }
    }
}
