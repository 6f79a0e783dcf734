// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The request-issuing surface of a session

use crate::error::{BoxError, KubeSessionError, Result};
use crate::transport::{
    ClientCertificate, HttpsService, KubeRewrite, PreparedRequest, ServerNameOverride, Verify,
};
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Response};
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use serde::de::DeserializeOwned;
use tower::{Service, ServiceExt};
use tracing::{debug, instrument};

/// An HTTP session bound to one cluster. Requests use `kube://` URLs, which
/// are rewritten to the cluster server when they are sent.
///
/// Cloning is cheap and clones share the connection pool and the TLS server
/// name override.
#[derive(Clone, Debug)]
pub struct KubeSession<S = HttpsService> {
    transport: KubeRewrite<S>,
    headers: HeaderMap,
    verify: Verify,
    client_certificate: Option<ClientCertificate>,
    server_name: ServerNameOverride,
}

impl<S> KubeSession<S> {
    pub(crate) fn new(
        transport: KubeRewrite<S>,
        headers: HeaderMap,
        verify: Verify,
        client_certificate: Option<ClientCertificate>,
        server_name: ServerNameOverride,
    ) -> Self {
        Self {
            transport,
            headers,
            verify,
            client_certificate,
            server_name,
        }
    }

    pub fn server(&self) -> &str {
        self.transport.server()
    }

    pub fn namespace(&self) -> &str {
        self.transport.namespace()
    }

    pub fn verify(&self) -> &Verify {
        &self.verify
    }

    pub fn client_certificate(&self) -> Option<&ClientCertificate> {
        self.client_certificate.as_ref()
    }

    /// Headers sent with every request unless the request sets them itself
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn server_name_override(&self) -> &ServerNameOverride {
        &self.server_name
    }

    pub fn request(&self, method: Method, url: impl Into<String>) -> RequestBuilder<'_, S> {
        RequestBuilder {
            session: self,
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn get(&self, url: impl Into<String>) -> RequestBuilder<'_, S> {
        self.request(Method::GET, url)
    }

    /// Merge the session defaults under `headers`, request values win
    fn prepare(
        &self,
        method: Method,
        url: String,
        headers: HeaderMap,
        body: Bytes,
    ) -> PreparedRequest {
        let mut merged = self.headers.clone();
        merged.extend(headers);
        PreparedRequest {
            method,
            url,
            headers: merged,
            body,
        }
    }
}

impl<S, B> KubeSession<S>
where
    S: Service<Request<Full<Bytes>>, Response = Response<B>> + Clone,
    S::Error: Into<BoxError>,
    S::Future: Send + 'static,
    B: 'static,
{
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub async fn send(&self, request: PreparedRequest) -> Result<Response<B>> {
        let response = self.transport.clone().oneshot(request).await?;
        debug!("Response status {}", response.status());
        Ok(response)
    }

    /// GET `url` and decode a successful JSON response
    pub async fn get_json<T>(&self, url: &str) -> Result<T>
    where
        T: DeserializeOwned,
        B: Body,
        B::Error: Into<BoxError>,
    {
        let response = self.get(url).send().await?;
        let status = response.status();
        let body = read_body(response).await?;

        if !status.is_success() {
            return Err(KubeSessionError::Status {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

/// A request being assembled against a session
pub struct RequestBuilder<'a, S> {
    session: &'a KubeSession<S>,
    method: Method,
    url: String,
    headers: HeaderMap,
    body: Bytes,
}

impl<'a, S> RequestBuilder<'a, S> {
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// The request as it will be handed to the transport, before rewriting
    pub fn build(self) -> PreparedRequest {
        self.session
            .prepare(self.method, self.url, self.headers, self.body)
    }
}

impl<'a, S, B> RequestBuilder<'a, S>
where
    S: Service<Request<Full<Bytes>>, Response = Response<B>> + Clone,
    S::Error: Into<BoxError>,
    S::Future: Send + 'static,
    B: 'static,
{
    pub async fn send(self) -> Result<Response<B>> {
        let session = self.session;
        session.send(self.build()).await
    }
}

/// Collect a response body
pub async fn read_body<B>(response: Response<B>) -> Result<Bytes>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let collected = response
        .into_body()
        .collect()
        .await
        .map_err(|e| KubeSessionError::Transport(e.into()))?;
    Ok(collected.to_bytes())
}
