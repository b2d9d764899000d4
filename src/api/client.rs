//! HTTP client for Cloudflare API

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, trace};

use crate::api::response::ApiResponse;
use crate::error::{CfmError, Result};

pub const CF_API_BASE: &str = "https://api.cloudflare.com/client/v4";

const USER_AGENT: &str = concat!("cfm/", env!("CARGO_PKG_VERSION"));

/// Cloudflare API client bound to one API token
pub struct CloudflareClient {
    client: Client,
    base_url: String,
    api_token: String,
}

impl CloudflareClient {
    /// Create a client for `api_token` talking to `base_url`
    pub fn new(api_token: &str, base_url: &str) -> Result<Self> {
        if api_token.trim().is_empty() {
            return Err(CfmError::Auth("API token is empty".to_string()));
        }

        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build request with authentication headers
    fn build_request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url).bearer_auth(&self.api_token)
    }

    /// Send a request and decode the standard envelope
    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<ApiResponse<T>> {
        let response = req.send().await?;

        let status = response.status();
        let text = response.text().await?;
        trace!("Response: {}", text);

        if !status.is_success() {
            return Err(status_error(status, &text));
        }

        let api_response: ApiResponse<T> = serde_json::from_str(&text)?;

        if !api_response.success {
            return Err(CfmError::Api {
                status: status.as_u16(),
                message: api_response.error_summary(),
            });
        }

        Ok(api_response)
    }

    /// Make a GET request to the API
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>> {
        let url = self.url(path);
        debug!("GET {}", url);

        self.send(self.build_request(Method::GET, &url)).await
    }

    /// GET every page of a list endpoint, following `result_info.total_pages`
    pub async fn get_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        per_page: u32,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let response: ApiResponse<Vec<T>> = self.get(&page_path(path, page, per_page)).await?;
            let total_pages = response
                .result_info
                .as_ref()
                .and_then(|info| info.total_pages)
                .unwrap_or(1);

            let batch = response.result.unwrap_or_default();
            let exhausted = batch.is_empty();
            items.extend(batch);

            if exhausted || page >= total_pages {
                break;
            }
            page += 1;
        }

        Ok(items)
    }

    /// Make a POST request to the API
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Value,
    ) -> Result<ApiResponse<T>> {
        let url = self.url(path);
        debug!("POST {} with body: {}", url, body);

        self.send(self.build_request(Method::POST, &url).json(&body))
            .await
    }

    /// Make a PUT request to the API
    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Value,
    ) -> Result<ApiResponse<T>> {
        let url = self.url(path);
        debug!("PUT {} with body: {}", url, body);

        self.send(self.build_request(Method::PUT, &url).json(&body))
            .await
    }

    /// Make a DELETE request to the API
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>> {
        let url = self.url(path);
        debug!("DELETE {}", url);

        self.send(self.build_request(Method::DELETE, &url)).await
    }

    /// GET an endpoint that answers with a plain body instead of the JSON envelope
    pub async fn get_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.url(path);
        debug!("GET (raw) {}", url);

        let response = self.build_request(Method::GET, &url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            return Err(status_error(status, &text));
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Like [`get_bytes`](Self::get_bytes) for text bodies
    pub async fn get_text(&self, path: &str) -> Result<String> {
        let bytes = self.get_bytes(path).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// PUT an opaque byte payload
    pub async fn put_bytes<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Vec<u8>,
    ) -> Result<ApiResponse<T>> {
        let url = self.url(path);
        debug!("PUT {} ({} bytes)", url, body.len());

        let req = self
            .build_request(Method::PUT, &url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(body);

        self.send(req).await
    }

    /// Upload a service-worker script as multipart form data
    pub async fn put_worker_script<T: DeserializeOwned>(
        &self,
        path: &str,
        script: String,
    ) -> Result<ApiResponse<T>> {
        let url = self.url(path);
        debug!("PUT {} (worker script, {} bytes)", url, script.len());

        let metadata = json!({ "body_part": "script" });
        let form = Form::new()
            .part(
                "metadata",
                Part::text(metadata.to_string()).mime_str("application/json")?,
            )
            .part(
                "script",
                Part::text(script)
                    .file_name("worker.js")
                    .mime_str("application/javascript")?,
            );

        self.send(self.build_request(Method::PUT, &url).multipart(form))
            .await
    }
}

/// Map a non-2xx response to an error, preferring the envelope's messages
fn status_error(status: StatusCode, text: &str) -> CfmError {
    let message = serde_json::from_str::<ApiResponse<Value>>(text)
        .map(|r| r.error_summary())
        .unwrap_or_else(|_| text.trim().to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CfmError::Auth(message),
        _ => CfmError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

fn page_path(path: &str, page: u32, per_page: u32) -> String {
    let sep = if path.contains('?') { '&' } else { '?' };
    format!("{}{}page={}&per_page={}", path, sep, page, per_page)
}

/// Percent-encode one URL path segment (KV keys may contain `/`, spaces, ...)
pub fn encode_segment(segment: &str) -> String {
    let Ok(mut url) = Url::parse("https://segment.invalid/") else {
        return segment.to_string();
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(segment);
    }
    url.path().trim_start_matches('/').to_string()
}
