//! Builds the single configured transport a `NetService` owns.
//!
//! # Design
//! All cross-cutting policy lives here: JSON default headers, fixed timeouts,
//! the platform engine profile and base-URL resolution. `Client` is immutable
//! after construction; `NetService` shares it with in-flight calls through an
//! `Arc` but never hands it to another service.

use reqwest::header::{HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use tracing::debug;
use url::Url;

use crate::codec;
use crate::config::{ClientConfig, CONNECT_TIMEOUT, CONTENT_TYPE_JSON, REQUEST_TIMEOUT, SOCKET_TIMEOUT};
use crate::error::NetError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::options::RequestOptions;
use crate::platform::Engine;

/// Opaque handle to the underlying transport and its connection pool.
#[derive(Debug)]
pub struct Client {
    http: reqwest::Client,
    base_url: Option<String>,
    default_headers: Vec<(String, String)>,
    engine: Engine,
}

pub struct ClientFactory;

impl ClientFactory {
    pub fn create(config: &ClientConfig) -> Result<Client, NetError> {
        let engine = Engine::current();
        let builder = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(SOCKET_TIMEOUT);
        let http = engine
            .configure(builder)
            .build()
            .map_err(|e| NetError::Construction(e.to_string()))?;

        debug!(engine = engine.name(), base_url = ?config.base_url(), "http client created");
        Ok(Client {
            http,
            base_url: config.base_url().map(str::to_string),
            default_headers: vec![
                (ACCEPT.as_str().to_string(), CONTENT_TYPE_JSON.to_string()),
                (CONTENT_TYPE.as_str().to_string(), CONTENT_TYPE_JSON.to_string()),
            ],
            engine,
        })
    }

    /// Build from the current `EnvironmentConfig` snapshot.
    pub fn create_default() -> Result<Client, NetError> {
        Self::create(&ClientConfig::from_env_config())
    }
}

impl Client {
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }

    /// Resolve `path` against the base URL.
    ///
    /// A path that already parses as a hierarchical URL (`https://…`) is used
    /// verbatim, and a scheme-relative `//host/x` takes the base's scheme.
    /// Anything else is appended to the base with exactly one `/` between
    /// them. A base carrying a query or fragment cannot be appended to and is
    /// rejected.
    pub fn resolve(&self, path: &str) -> Result<Url, NetError> {
        if let Ok(url) = Url::parse(path) {
            if !url.cannot_be_a_base() {
                return Ok(url);
            }
        }
        let base = self.base_url.as_deref().ok_or_else(|| {
            NetError::InvalidRequest(format!("relative path `{path}` with no base url configured"))
        })?;
        let parsed = Url::parse(base).map_err(|e| NetError::InvalidRequest(format!("base url `{base}`: {e}")))?;
        if path.starts_with("//") {
            return parsed
                .join(path)
                .map_err(|e| NetError::InvalidRequest(format!("{path}: {e}")));
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(NetError::InvalidRequest(format!(
                "base url `{base}` has a query or fragment"
            )));
        }
        let joined = match path.trim_start_matches('/') {
            "" => base.to_string(),
            rest => format!("{}/{rest}", base.trim_end_matches('/')),
        };
        Url::parse(&joined).map_err(|e| NetError::InvalidRequest(format!("{joined}: {e}")))
    }

    /// Describe a call as data: resolved URL, present query pairs, merged
    /// headers and optional JSON body.
    ///
    /// Headers are merged case-insensitively with the caller's value winning:
    /// a caller `Accept` replaces the default one instead of being sent twice.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        options: &RequestOptions,
        body: Option<String>,
    ) -> Result<HttpRequest, NetError> {
        let mut url = self.resolve(path)?;
        let mut present = options.present_query().peekable();
        if present.peek().is_some() {
            url.query_pairs_mut().extend_pairs(present);
        }

        let mut headers = self.default_headers.clone();
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| NetError::InvalidRequest(format!("header `{name}`: {e}")))?;
            HeaderValue::from_str(value)
                .map_err(|e| NetError::InvalidRequest(format!("header `{name}` value: {e}")))?;
            match headers.iter_mut().find(|(k, _)| k.as_str() == name.as_str()) {
                Some(slot) => slot.1 = value.clone(),
                None => headers.push((name.as_str().to_string(), value.clone())),
            }
        }

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }

    pub fn build_get(&self, path: &str, options: &RequestOptions) -> Result<HttpRequest, NetError> {
        self.build_request(HttpMethod::Get, path, options, None)
    }

    pub fn build_post<Q: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &Q,
        options: &RequestOptions,
    ) -> Result<HttpRequest, NetError> {
        let body = codec::encode(body)?;
        let mut request = self.build_request(HttpMethod::Post, path, options, Some(body))?;
        // Always JSON on POST, whatever the caller passed.
        match request.headers.iter_mut().find(|(k, _)| k.as_str() == CONTENT_TYPE.as_str()) {
            Some(slot) => slot.1 = CONTENT_TYPE_JSON.to_string(),
            None => request
                .headers
                .push((CONTENT_TYPE.as_str().to_string(), CONTENT_TYPE_JSON.to_string())),
        }
        Ok(request)
    }

    /// Run one exchange. Request and response bodies are logged verbatim.
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, NetError> {
        debug!(
            method = request.method.as_str(),
            url = %request.url,
            headers = ?request.headers,
            body = request.body.as_deref().unwrap_or(""),
            "request"
        );
        let mut builder = self.http.request(request.method.into(), request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect();
        let body = response.text().await?;
        debug!(status, body = %body, "response");

        Ok(HttpResponse { status, headers, body })
    }
}

/// Non-2xx is an error; 2xx bodies decode into `R`.
pub fn parse_response<R: serde::de::DeserializeOwned>(response: HttpResponse) -> Result<R, NetError> {
    if !response.is_success() {
        return Err(NetError::HttpStatus {
            status: response.status,
            body: response.body,
        });
    }
    codec::decode(&response.body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: Option<&str>) -> Client {
        ClientFactory::create(&ClientConfig::new(base)).unwrap()
    }

    #[test]
    fn relative_path_joins_base() {
        let c = client(Some("https://api.example.com/"));
        assert_eq!(c.resolve("users/1").unwrap().as_str(), "https://api.example.com/users/1");
        assert_eq!(c.resolve("/users/1").unwrap().as_str(), "https://api.example.com/users/1");
    }

    #[test]
    fn base_path_prefix_is_kept() {
        let c = client(Some("https://api.example.com/v1"));
        assert_eq!(c.resolve("users").unwrap().as_str(), "https://api.example.com/v1/users");
    }

    #[test]
    fn absolute_path_is_verbatim() {
        let c = client(Some("https://api.example.com/"));
        assert_eq!(
            c.resolve("http://other.example.org/x?y=1").unwrap().as_str(),
            "http://other.example.org/x?y=1"
        );
    }

    #[test]
    fn scheme_relative_path_takes_base_scheme() {
        let c = client(Some("https://api.example.com/v1/"));
        assert_eq!(
            c.resolve("//cdn.example.net/img/1").unwrap().as_str(),
            "https://cdn.example.net/img/1"
        );
    }

    #[test]
    fn base_with_query_is_rejected() {
        let err = client(Some("https://api.example.com/?k=1")).resolve("users").unwrap_err();
        assert!(matches!(err, NetError::InvalidRequest(_)));
        let err = client(Some("https://api.example.com/#top")).resolve("users").unwrap_err();
        assert!(matches!(err, NetError::InvalidRequest(_)));
    }

    #[test]
    fn relative_path_without_base_is_rejected() {
        let err = client(None).resolve("users/1").unwrap_err();
        assert!(matches!(err, NetError::InvalidRequest(_)));
    }

    #[test]
    fn get_carries_default_headers() {
        let req = client(Some("http://localhost:3000")).build_get("echo", &RequestOptions::new()).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url.as_str(), "http://localhost:3000/echo");
        assert_eq!(req.header_values("Accept"), vec!["application/json"]);
        assert_eq!(req.header_values("content-type"), vec!["application/json"]);
        assert!(req.body.is_none());
    }

    #[test]
    fn null_query_values_are_omitted() {
        let opts = RequestOptions::new()
            .query("page", Some(1))
            .query("cursor", None::<String>)
            .query("q", Some("a b"));
        let req = client(Some("http://localhost:3000")).build_get("echo", &opts).unwrap();
        assert_eq!(req.url.as_str(), "http://localhost:3000/echo?page=1&q=a+b");
        assert!(!req.url.as_str().contains("cursor"));
    }

    #[test]
    fn all_null_query_leaves_url_untouched() {
        let opts = RequestOptions::new().query("cursor", None::<String>);
        let req = client(Some("http://localhost:3000")).build_get("echo", &opts).unwrap();
        assert_eq!(req.url.as_str(), "http://localhost:3000/echo");
    }

    #[test]
    fn query_appends_to_existing_query() {
        let opts = RequestOptions::new().query("b", Some(2));
        let req = client(None).build_get("http://h.example/p?a=1", &opts).unwrap();
        assert_eq!(req.url.as_str(), "http://h.example/p?a=1&b=2");
    }

    #[test]
    fn caller_header_replaces_default() {
        let opts = RequestOptions::new()
            .header("accept", "text/plain")
            .header("X-Trace", "abc");
        let req = client(Some("http://localhost:3000")).build_get("echo", &opts).unwrap();
        assert_eq!(req.header_values("Accept"), vec!["text/plain"]);
        assert_eq!(req.header_values("x-trace"), vec!["abc"]);
    }

    #[test]
    fn repeated_caller_header_last_wins() {
        let opts = RequestOptions::new().header("X-Trace", "one").header("x-trace", "two");
        let req = client(Some("http://localhost:3000")).build_get("echo", &opts).unwrap();
        assert_eq!(req.header_values("x-trace"), vec!["two"]);
    }

    #[test]
    fn illegal_header_is_rejected() {
        let opts = RequestOptions::new().header("bad header", "x");
        let err = client(Some("http://localhost:3000")).build_get("echo", &opts).unwrap_err();
        assert!(matches!(err, NetError::InvalidRequest(_)));
    }

    #[test]
    fn post_encodes_body_and_forces_json() {
        let opts = RequestOptions::new().header("Content-Type", "text/plain");
        let req = client(Some("http://localhost:3000"))
            .build_post("users", &serde_json::json!({ "name": "Bo" }), &opts)
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.header_values("content-type"), vec!["application/json"]);
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["name"], "Bo");
    }

    #[test]
    fn parse_non_2xx_is_http_status_error() {
        let response = HttpResponse {
            status: 404,
            headers: Vec::new(),
            body: r#"{"error":"missing"}"#.to_string(),
        };
        let err = parse_response::<serde_json::Value>(response).unwrap_err();
        assert!(matches!(err, NetError::HttpStatus { status: 404, .. }));
    }

    #[test]
    fn parse_success_decodes_body() {
        let response = HttpResponse {
            status: 201,
            headers: Vec::new(),
            body: r#"{"id":2}"#.to_string(),
        };
        let value: serde_json::Value = parse_response(response).unwrap();
        assert_eq!(value["id"], 2);
    }

    #[test]
    fn parse_bad_json_is_decoding_error() {
        let response = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: "not json".to_string(),
        };
        let err = parse_response::<serde_json::Value>(response).unwrap_err();
        assert!(matches!(err, NetError::Decoding(_)));
    }
}
