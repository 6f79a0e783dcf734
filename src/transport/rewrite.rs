// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Send-time rewriting of `kube://` URLs and the TLS server name.

use crate::constants::placeholders;
use crate::error::{BoxError, KubeSessionError};
use crate::transport::server_name::ServerNameOverride;
use bytes::Bytes;
use futures::future::BoxFuture;
use http::header::HOST;
use http::{HeaderMap, Method, Request, Response};
use http_body_util::Full;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::{debug, trace, warn};

/// A request as issued through a session, before its URL is rewritten.
/// The URL is kept as a string since `kube:///...` is not a valid `http::Uri`.
#[derive(Clone, Debug)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Substitute the placeholder scheme and namespace token anywhere in `url`
pub fn rewrite_url(url: &str, server: &str, namespace: &str) -> String {
    url.replace(placeholders::KUBE_SCHEME, server)
        .replace(placeholders::NAMESPACE, namespace)
}

/// Layer binding [`KubeRewrite`] to a cluster server and namespace
#[derive(Clone, Debug)]
pub struct KubeRewriteLayer {
    server: Arc<str>,
    namespace: Arc<str>,
    server_name: ServerNameOverride,
}

impl KubeRewriteLayer {
    pub fn new(server: &str, namespace: &str, server_name: ServerNameOverride) -> Self {
        Self {
            server: server.into(),
            namespace: namespace.into(),
            server_name,
        }
    }
}

impl<S> Layer<S> for KubeRewriteLayer {
    type Service = KubeRewrite<S>;

    fn layer(&self, inner: S) -> Self::Service {
        KubeRewrite {
            inner,
            server: self.server.clone(),
            namespace: self.namespace.clone(),
            server_name: self.server_name.clone(),
        }
    }
}

/// Rewrites each request right before handing it to the inner HTTP service:
/// placeholders in the URL are substituted, and an explicit `Host` header
/// becomes the name new TLS connections are verified against.
#[derive(Clone, Debug)]
pub struct KubeRewrite<S> {
    inner: S,
    server: Arc<str>,
    namespace: Arc<str>,
    server_name: ServerNameOverride,
}

impl<S> KubeRewrite<S> {
    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn apply_host_override(&self, headers: &HeaderMap) {
        // HeaderMap lookups are case-insensitive
        let host = match headers.get(HOST).map(|v| v.to_str()) {
            Some(Ok(host)) => host,
            Some(Err(_)) => {
                warn!("Ignoring non-ASCII Host header for certificate verification");
                ""
            }
            None => "",
        };

        if host.is_empty() {
            self.server_name.clear();
        } else {
            debug!("Verifying server certificate against Host header {}", host);
            self.server_name.set(host);
        }
    }
}

impl<S, B> Service<PreparedRequest> for KubeRewrite<S>
where
    S: Service<Request<Full<Bytes>>, Response = Response<B>>,
    S::Error: Into<BoxError>,
    S::Future: Send + 'static,
    B: 'static,
{
    type Response = Response<B>;
    type Error = KubeSessionError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner
            .poll_ready(cx)
            .map_err(|e| KubeSessionError::Transport(e.into()))
    }

    fn call(&mut self, req: PreparedRequest) -> Self::Future {
        let url = rewrite_url(&req.url, &self.server, &self.namespace);
        trace!("Rewrote {} to {}", req.url, url);
        self.apply_host_override(&req.headers);

        let request = Request::builder()
            .method(req.method)
            .uri(url.as_str())
            .body(Full::new(req.body));
        let mut request = match request {
            Ok(request) => request,
            Err(e) => {
                let err = KubeSessionError::Transport(Box::new(e));
                return Box::pin(async move { Err::<Response<B>, _>(err) });
            }
        };
        *request.headers_mut() = req.headers;

        let response = self.inner.call(request);
        Box::pin(async move {
            response
                .await
                .map_err(|e| KubeSessionError::Transport(e.into()))
        })
    }
}
