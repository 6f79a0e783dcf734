// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pooled hyper client used as the network end of a session.

use crate::error::{BoxError, Result};
use crate::transport::server_name::{PinnedServerName, ServerNameOverride};
use crate::transport::tls::{build_client_config, TlsSettings};
use bytes::Bytes;
use futures::future::BoxFuture;
use http::uri::Scheme;
use http::{Request, Response};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use rustls::ClientConfig;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use tokio::sync::OnceCell;
use tower::Service;
use tracing::{debug, instrument};

type PlainClient = Client<HttpConnector, Full<Bytes>>;
type TlsClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Sends requests over plain HTTP or rustls. The TLS config is only built when
/// the first `https` request goes out, so certificate problems surface there.
///
/// TLS connections are pooled per server name: switching the override to
/// another name, or clearing it, never reuses a connection verified against
/// the previous one.
#[derive(Clone)]
pub struct HttpsService {
    tls: Arc<TlsSettings>,
    server_name: ServerNameOverride,
    plain: PlainClient,
    tls_config: Arc<OnceCell<ClientConfig>>,
    secure: Arc<Mutex<HashMap<Option<String>, TlsClient>>>,
}

impl std::fmt::Debug for HttpsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pools = self
            .secure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("HttpsService")
            .field("tls", &self.tls)
            .field("server_name", &self.server_name)
            .field("tls_pools", &pools)
            .finish()
    }
}

impl HttpsService {
    pub fn new(tls: TlsSettings, server_name: ServerNameOverride) -> Self {
        Self {
            tls: Arc::new(tls),
            server_name,
            plain: Client::builder(TokioExecutor::new()).build_http(),
            tls_config: Arc::new(OnceCell::new()),
            secure: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    async fn tls_client(&self, server_name: Option<String>) -> Result<TlsClient> {
        let config = self
            .tls_config
            .get_or_try_init(|| async { build_client_config(&self.tls) })
            .await?;
        Ok(self.pooled_client(config, server_name))
    }

    fn pooled_client(&self, config: &ClientConfig, server_name: Option<String>) -> TlsClient {
        let mut pools = self.secure.lock().unwrap_or_else(PoisonError::into_inner);
        pools
            .entry(server_name)
            .or_insert_with_key(|name| build_tls_client(config.clone(), name.clone()))
            .clone()
    }
}

#[instrument(skip(config))]
fn build_tls_client(config: ClientConfig, server_name: Option<String>) -> TlsClient {
    let https = HttpsConnectorBuilder::new()
        .with_tls_config(config)
        .https_or_http()
        .with_server_name_resolver(PinnedServerName::new(server_name))
        .enable_http1()
        .build();
    debug!("Built TLS client");
    Client::builder(TokioExecutor::new()).build(https)
}

impl Service<Request<Full<Bytes>>> for HttpsService {
    type Response = Response<Incoming>;
    type Error = BoxError;
    type Future = BoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Full<Bytes>>) -> Self::Future {
        let this = self.clone();
        // Name the rewriter wrote for this request
        let server_name = self.server_name.get();
        Box::pin(async move {
            if req.uri().scheme() == Some(&Scheme::HTTPS) {
                let client = this.tls_client(server_name).await?;
                Ok(client.request(req).await?)
            } else {
                Ok(this.plain.request(req).await?)
            }
        })
    }
}
