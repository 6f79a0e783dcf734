// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a recording HTTP service, local echo servers and
//! kubeconfig builders.

use crate::kubeconfig::{
    self, AuthInfo, Cluster, Kubeconfig, NamedAuthInfo, NamedCluster, NamedContext,
};
use bytes::Bytes;
use futures::future::BoxFuture;
use http::header::HOST;
use http::{HeaderMap, Method, Request, Response};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use rcgen::{
    BasicConstraints, CertificateParams, DnType, ExtendedKeyUsagePurpose, IsCa, KeyPair,
    KeyUsagePurpose,
};
use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tower::Service;

pub const SERVER: &str = "http://httpbin.org:80/get";
pub const HTTPS_SERVER: &str = "https://httpbin.org:80/get";

/// A request as it reached the network end of a session
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// A mock HTTP service that records every request and answers with predefined
/// responses based on request paths.
#[derive(Clone, Debug, Default)]
pub struct RecordingService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl RecordingService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a response for GET requests matching the path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(("GET".to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();

        if let Some(resp) = responses.get(&(method.to_string(), path.to_string())) {
            return Some(resp.clone());
        }

        for ((m, p), resp) in responses.iter() {
            if m == method && path.starts_with(p) {
                return Some(resp.clone());
            }
        }

        None
    }
}

impl Service<Request<Full<Bytes>>> for RecordingService {
    type Response = Response<Full<Bytes>>;
    type Error = tower::BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Full<Bytes>>) -> Self::Future {
        let response = self.find_response(req.method().as_str(), req.uri().path());
        let requests = self.requests.clone();

        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let body = body.collect().await?.to_bytes();
            requests.lock().unwrap().push(RecordedRequest {
                method: parts.method,
                uri: parts.uri.to_string(),
                headers: parts.headers,
                body,
            });

            let (status, body) = response.unwrap_or_else(|| {
                (
                    404,
                    r#"{"kind":"Status","apiVersion":"v1","status":"Failure","message":"not found","reason":"NotFound","code":404}"#
                        .to_string(),
                )
            });
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Full::new(Bytes::from(body)))?)
        })
    }
}

/// Answer with "<method> <uri> <host header>"
async fn echo(req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
    let host = req
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = format!("{} {} {}", req.method(), req.uri(), host);
    Ok(Response::new(Full::new(Bytes::from(body))))
}

fn serve_connection<IO>(io: IO)
where
    IO: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let _ = http1::Builder::new()
            .serve_connection(TokioIo::new(io), service_fn(echo))
            .await;
    });
}

/// Plain HTTP echo server on a random local port
pub async fn serve_echo() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            serve_connection(stream);
        }
    });
    addr
}

/// A running HTTPS echo server and the PEM of the CA that issued its certificate
pub struct TlsServer {
    pub addr: SocketAddr,
    pub ca_pem: String,
}

/// HTTPS echo server on a random local port. Its certificate is valid for
/// `names` only and is issued by a fresh CA.
pub async fn serve_tls(names: &[&str]) -> TlsServer {
    let ca_key = KeyPair::generate().unwrap();
    let mut ca_params = CertificateParams::new(Vec::<String>::new()).unwrap();
    ca_params
        .distinguished_name
        .push(DnType::CommonName, "kubesession test CA");
    ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    ca_params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];
    let ca = ca_params.self_signed(&ca_key).unwrap();

    let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    let server_key = KeyPair::generate().unwrap();
    let mut server_params = CertificateParams::new(names).unwrap();
    server_params
        .distinguished_name
        .push(DnType::CommonName, "kubesession test server");
    server_params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];
    let server_cert = server_params.signed_by(&server_key, &ca, &ca_key).unwrap();

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = rustls::ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(
            vec![server_cert.der().clone()],
            PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(server_key.serialize_der())),
        )
        .unwrap();
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                // Failed handshakes are expected in verification tests
                if let Ok(tls) = acceptor.accept(stream).await {
                    serve_connection(tls);
                }
            });
        }
    });

    TlsServer {
        addr,
        ca_pem: ca.pem(),
    }
}

/// Return a kubeconfig constructed with the given entries
pub fn make_test_config(
    contexts: Vec<(&str, kubeconfig::Context)>,
    clusters: Vec<(&str, Cluster)>,
    users: Vec<(&str, AuthInfo)>,
    current_context: &str,
) -> Kubeconfig {
    Kubeconfig {
        current_context: Some(current_context.to_string()),
        contexts: contexts
            .into_iter()
            .map(|(name, context)| NamedContext {
                name: name.to_string(),
                context: Some(context),
            })
            .collect(),
        clusters: clusters
            .into_iter()
            .map(|(name, cluster)| NamedCluster {
                name: name.to_string(),
                cluster: Some(cluster),
            })
            .collect(),
        auth_infos: users
            .into_iter()
            .map(|(name, user)| NamedAuthInfo {
                name: name.to_string(),
                auth_info: Some(user),
            })
            .collect(),
        ..Default::default()
    }
}

/// Context pointing at `cluster` without a user or namespace
pub fn context(cluster: &str) -> kubeconfig::Context {
    kubeconfig::Context {
        cluster: cluster.to_string(),
        ..Default::default()
    }
}

pub fn cluster(server: &str) -> Cluster {
    Cluster {
        server: Some(server.to_string()),
        ..Default::default()
    }
}
