//! Typed GET/POST façade over one owned `Client`.
//!
//! # Design
//! `NetService` is `Open` until `close()` and `Closed` afterwards, once and
//! for good. Each call clones the `Arc<Client>` under a short lock and then
//! runs without it, so concurrent calls never contend and `close()` never
//! waits. A call that got its handle before `close()` completes normally; the
//! connection pool is released when the last such call drops its handle.
//! Calls that start after `close()` fail with `UseAfterClose`.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, Instrument};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::NetError;
use crate::factory::{self, Client, ClientFactory};
use crate::http::{HttpRequest, HttpResponse};
use crate::options::RequestOptions;

#[derive(Debug)]
pub struct NetService {
    client: Mutex<Option<Arc<Client>>>,
    config: ClientConfig,
}

impl NetService {
    /// Build against the current `EnvironmentConfig` base URL.
    pub fn new() -> Result<Self, NetError> {
        Self::from_config(ClientConfig::from_env_config())
    }

    /// Build with an explicit base URL, ignoring `EnvironmentConfig`.
    pub fn with_base_url(base_url: Option<&str>) -> Result<Self, NetError> {
        Self::from_config(ClientConfig::new(base_url))
    }

    pub fn from_config(config: ClientConfig) -> Result<Self, NetError> {
        let client = ClientFactory::create(&config)?;
        Ok(Self {
            client: Mutex::new(Some(Arc::new(client))),
            config,
        })
    }

    pub fn base_url(&self) -> Option<&str> {
        self.config.base_url()
    }

    pub fn is_closed(&self) -> bool {
        self.client.lock().unwrap_or_else(PoisonError::into_inner).is_none()
    }

    /// GET `path` and decode the JSON body into `R`.
    pub async fn get_async<R: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<R, NetError> {
        let client = self.handle()?;
        let request = client.build_get(path, &options)?;
        let response = send(&client, request).await?;
        factory::parse_response(response)
    }

    /// POST `body` as JSON to `path` and decode the JSON body into `R`.
    pub async fn post_async<Q, R>(&self, path: &str, body: &Q, options: RequestOptions) -> Result<R, NetError>
    where
        Q: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let client = self.handle()?;
        let request = client.build_post(path, body, &options)?;
        let response = send(&client, request).await?;
        factory::parse_response(response)
    }

    /// Describe a GET without sending it.
    pub fn build_get(&self, path: &str, options: &RequestOptions) -> Result<HttpRequest, NetError> {
        self.handle()?.build_get(path, options)
    }

    /// Describe a POST without sending it.
    pub fn build_post<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &Q,
        options: &RequestOptions,
    ) -> Result<HttpRequest, NetError> {
        self.handle()?.build_post(path, body, options)
    }

    /// Send a prebuilt request. Any status is returned as data.
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, NetError> {
        let client = self.handle()?;
        send(&client, request).await
    }

    /// Release the client. Returns `true` only for the call that actually
    /// released it; later calls are no-ops.
    pub fn close(&self) -> bool {
        let released = self.client.lock().unwrap_or_else(PoisonError::into_inner).take();
        match released {
            Some(client) => {
                debug!(in_flight = Arc::strong_count(&client) - 1, "net service closed");
                true
            }
            None => false,
        }
    }

    fn handle(&self) -> Result<Arc<Client>, NetError> {
        self.client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(NetError::UseAfterClose)
    }
}

async fn send(client: &Client, request: HttpRequest) -> Result<HttpResponse, NetError> {
    let span = tracing::debug_span!(
        "net_request",
        request_id = %Uuid::new_v4(),
        method = request.method.as_str(),
        url = %request.url,
    );
    client.execute(request).instrument(span).await
}
