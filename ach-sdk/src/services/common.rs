//! Common utilities for backend clients
//!
//! `HttpTransport` owns the request/response plumbing shared by every client:
//! URL assembly, JSON encoding and decoding, status handling and error context.

use std::fmt;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::mapping::map_http_error;
use crate::error::{ErrorContext, Result, ServiceError};

/// UserAgent structure for identifying the client to backend services
#[derive(Debug, Clone)]
pub struct UserAgent {
    /// Application name
    pub app_name: String,

    /// Version string
    pub version: String,

    /// Optional extra info
    pub extra: Option<String>,
}

impl Default for UserAgent {
    fn default() -> Self {
        Self {
            app_name: "ACH-Concourse".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            extra: Some("ach-sdk".to_string()),
        }
    }
}

impl fmt::Display for UserAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.app_name, self.version)?;

        if let Some(ref extra) = self.extra {
            write!(f, " ({})", extra)?;
        }

        Ok(())
    }
}

/// Request path relative to a backend's base URL
///
/// Routes are split on `/`; record ids are appended as one opaque segment and
/// percent-encoded when the URL is built, so `/`, `?` and `%` inside an id never
/// change which resource is addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPath {
    segments: Vec<String>,
}

impl ApiPath {
    pub fn new(route: &str) -> Self {
        Self {
            segments: Vec::new(),
        }
        .route(route)
    }

    /// Append the segments of a fixed route such as `api/v1/entries`
    pub fn route(mut self, route: &str) -> Self {
        self.segments.extend(
            route
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string),
        );
        self
    }

    /// Append a record id as a single segment
    pub fn id(mut self, id: &str) -> Self {
        self.segments.push(id.to_string());
        self
    }

    /// Resolve against a base URL
    pub fn resolve(&self, base_url: &str) -> Result<Url> {
        let mut url = Url::parse(base_url)
            .map_err(|e| ServiceError::configuration(format!("Invalid base URL {}: {}", base_url, e)))?;

        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ServiceError::configuration(format!("{} cannot be a base URL", base_url)))?;
            path.pop_if_empty();
            for segment in &self.segments {
                // `push` drops dot segments; they would address another resource.
                if segment.is_empty() || segment == "." || segment == ".." {
                    return Err(ServiceError::validation(format!(
                        "Invalid path segment '{}'",
                        segment
                    )));
                }
                path.push(segment);
            }
        }

        Ok(url)
    }
}

impl From<&str> for ApiPath {
    fn from(route: &str) -> Self {
        ApiPath::new(route)
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// JSON-over-HTTP transport bound to one backend
#[derive(Debug, Clone)]
pub struct HttpTransport {
    service: String,
    base_url: String,
    http: Client,
}

impl HttpTransport {
    pub fn new(service: impl Into<String>, base_url: impl Into<String>, http: Client) -> Self {
        Self {
            service: service.into(),
            base_url: base_url.into(),
            http,
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &ApiPath) -> Result<Url> {
        path.resolve(&self.base_url)
    }

    fn context(&self, path: &ApiPath) -> ErrorContext {
        ErrorContext::for_service(self.service.as_str()).endpoint(path.to_string())
    }

    /// GET a JSON document; any non-2xx status is an error
    pub async fn get_json<R>(&self, path: impl Into<ApiPath>, query: &[(&str, String)]) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let path = path.into();
        let url = self.url(&path)?;
        debug!(service = %self.service, "GET {} {:?}", url, query);
        let builder = self.http.get(url).query(query);
        let response = self.send(builder, &path).await?;
        self.read_json(response, &path).await
    }

    /// GET a JSON document where 404 means "absent"
    pub async fn get_optional<R>(&self, path: impl Into<ApiPath>) -> Result<Option<R>>
    where
        R: DeserializeOwned,
    {
        let path = path.into();
        let url = self.url(&path)?;
        debug!(service = %self.service, "GET {}", url);
        let response = self.send(self.http.get(url), &path).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        self.read_json(response, &path).await.map(Some)
    }

    /// POST a JSON body to a create endpoint; only 201 counts as created
    pub async fn create_json<T, R>(&self, path: impl Into<ApiPath>, body: &T) -> Result<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let path = path.into();
        let url = self.url(&path)?;
        debug!(service = %self.service, "POST {}", url);
        let builder = self.http.post(url).json(body);
        let response = self.send(builder, &path).await?;

        let status = response.status();
        if status.is_success() && status != StatusCode::CREATED {
            return Err(ServiceError::service(format!(
                "{} service returned status {} on create, expected 201",
                self.service.to_uppercase(),
                status.as_u16()
            ))
            .with_context(self.context(&path).status_code(status.as_u16())));
        }

        self.read_json(response, &path).await
    }

    /// Send a JSON body where a 404 response means "absent"
    pub async fn send_json_optional<T, R>(
        &self,
        method: Method,
        path: impl Into<ApiPath>,
        body: &T,
    ) -> Result<Option<R>>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let path = path.into();
        let url = self.url(&path)?;
        debug!(service = %self.service, "{} {}", method, url);
        let builder = self.http.request(method, url).json(body);
        let response = self.send(builder, &path).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        self.read_json(response, &path).await.map(Some)
    }

    /// Probe `GET /healthz`
    pub async fn health(&self) -> Result<bool> {
        let url = self.url(&ApiPath::new("healthz"))?;
        match self.http.get(url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                warn!(service = %self.service, "Health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn send(&self, builder: RequestBuilder, path: &ApiPath) -> Result<Response> {
        builder
            .send()
            .await
            .map_err(|e| ServiceError::from(e).with_context(self.context(path)))
    }

    async fn read_json<R>(&self, response: Response, path: &ApiPath) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let status = response.status();
        if !status.is_success() {
            return Err(parse_error_response(self.context(path), response).await);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ServiceError::from(e).with_context(self.context(path)))?;

        serde_json::from_slice::<R>(&bytes).map_err(|e| {
            ServiceError::parsing(format!(
                "Failed to parse {} response: {}",
                self.service.to_uppercase(),
                e
            ))
            .with_context(self.context(path).status_code(status.as_u16()))
        })
    }
}

/// Parse error response from HTTP response
pub async fn parse_error_response(context: ErrorContext, response: Response) -> ServiceError {
    let status = response.status();

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => format!("Failed to read error response: {}", e),
    };

    map_http_error(status, &body, &context).with_context(context.status_code(status.as_u16()))
}
