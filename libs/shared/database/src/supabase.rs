use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;
use shared_models::error::RemoteError;

/// The record gateway: a thin, uniform client over the remote structured
/// store. Each call is one independent round-trip; there is no retry and
/// no transaction, so a failure midway through a multi-call handler leaves
/// prior writes committed.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    service_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
}

impl FilterOp {
    fn as_str(self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Gte => "gte",
            FilterOp::Lte => "lte",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: String,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Eq,
            value: value.into(),
        }
    }

    pub fn gte(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Gte,
            value: value.into(),
        }
    }

    pub fn lte(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Lte,
            value: value.into(),
        }
    }

    fn to_query_pair(&self) -> String {
        format!(
            "{}={}.{}",
            self.column,
            self.op.as_str(),
            urlencoding::encode(&self.value)
        )
    }
}

/// Options for a filtered select: related-collection expansion (embedded
/// resource list, e.g. `*, patients(name)`), ordering and a row limit.
#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
    pub expand: Option<String>,
    pub order: Option<(String, bool)>,
    pub limit: Option<i32>,
}

impl SelectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expand(mut self, select_list: impl Into<String>) -> Self {
        self.expand = Some(select_list.into());
        self
    }

    pub fn order_asc(mut self, column: impl Into<String>) -> Self {
        self.order = Some((column.into(), false));
        self
    }

    pub fn order_desc(mut self, column: impl Into<String>) -> Self {
        self.order = Some((column.into(), true));
        self
    }

    pub fn limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.clone(),
            service_key: config.supabase_service_key.clone(),
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(key) = HeaderValue::from_str(&self.service_key) {
            headers.insert("apikey", key);
        }
        if let Ok(bearer) = HeaderValue::from_str(&format!("Bearer {}", self.service_key)) {
            headers.insert(AUTHORIZATION, bearer);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    fn table_path(table: &str, filters: &[Filter], opts: &SelectOptions) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(expand) = &opts.expand {
            parts.push(format!("select={}", urlencoding::encode(expand)));
        }
        for filter in filters {
            parts.push(filter.to_query_pair());
        }
        if let Some((column, desc)) = &opts.order {
            let direction = if *desc { "desc" } else { "asc" };
            parts.push(format!("order={}.{}", column, direction));
        }
        if let Some(limit) = opts.limit {
            parts.push(format!("limit={}", limit));
        }
        if parts.is_empty() {
            format!("/rest/v1/{}", table)
        } else {
            format!("/rest/v1/{}?{}", table, parts.join("&"))
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<reqwest::Response, RemoteError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("store request {} {}", method, url);

        let mut req = self.client.request(method, &url).headers(self.headers());
        if let Some(extra) = extra_headers {
            req = req.headers(extra);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }

        let response = req.send().await.map_err(RemoteError::transport)?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| status.to_string());
            error!("store error ({}): {}", status, message);
            return Err(RemoteError::new(Some(status.as_u16()), message));
        }
        Ok(response)
    }

    /// Filtered select with optional expansion, ordering and limit.
    pub async fn select(
        &self,
        table: &str,
        filters: &[Filter],
        opts: SelectOptions,
    ) -> Result<Vec<Value>, RemoteError> {
        let path = Self::table_path(table, filters, &opts);
        let response = self.send(Method::GET, &path, None, None).await?;
        response
            .json::<Vec<Value>>()
            .await
            .map_err(RemoteError::transport)
    }

    /// Single-row fetch by id; `Ok(None)` is the not-found signal.
    pub async fn find_by_id(
        &self,
        table: &str,
        id: &str,
        expand: Option<&str>,
    ) -> Result<Option<Value>, RemoteError> {
        let mut opts = SelectOptions::new().limit(1);
        if let Some(expand) = expand {
            opts = opts.expand(expand);
        }
        let rows = self.select(table, &[Filter::eq("id", id)], opts).await?;
        Ok(rows.into_iter().next())
    }

    /// Insert one row; returns the created row including the
    /// server-generated id.
    pub async fn insert(&self, table: &str, row: Value) -> Result<Value, RemoteError> {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let path = format!("/rest/v1/{}", table);
        let response = self
            .send(Method::POST, &path, Some(row), Some(headers))
            .await?;
        let mut rows = response
            .json::<Vec<Value>>()
            .await
            .map_err(RemoteError::transport)?;
        if rows.is_empty() {
            return Err(RemoteError::new(None, format!("insert into {} returned no row", table)));
        }
        Ok(rows.remove(0))
    }

    /// Patch the row with the given id.
    pub async fn update(&self, table: &str, id: &str, patch: Value) -> Result<(), RemoteError> {
        let path = format!("/rest/v1/{}?id=eq.{}", table, urlencoding::encode(id));
        self.send(Method::PATCH, &path, Some(patch), None).await?;
        Ok(())
    }

    /// Delete the row with the given id.
    pub async fn delete(&self, table: &str, id: &str) -> Result<(), RemoteError> {
        let path = format!("/rest/v1/{}?id=eq.{}", table, urlencoding::encode(id));
        self.send(Method::DELETE, &path, None, None).await?;
        Ok(())
    }

    /// Exact row count for the filtered collection, taken from the
    /// Content-Range header.
    pub async fn count(&self, table: &str, filters: &[Filter]) -> Result<i64, RemoteError> {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("count=exact"));

        let opts = SelectOptions::new().expand("id").limit(1);
        let path = Self::table_path(table, filters, &opts);
        let response = self.send(Method::GET, &path, None, Some(headers)).await?;

        let range = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        range
            .rsplit('/')
            .next()
            .and_then(|total| total.parse::<i64>().ok())
            .ok_or_else(|| RemoteError::new(None, format!("missing exact count for {}", table)))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
