// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resolution of a kubeconfig context into session settings

use crate::constants::{DEFAULT_CERTIFICATE_NAME, DEFAULT_NAMESPACE};
use crate::error::{KubeSessionError, Result};
use crate::kubeconfig::{find_cluster, find_context, find_user, user_ref, AuthInfo, Cluster, Kubeconfig};
use crate::session::client::KubeSession;
use crate::session::host::HostKind;
use crate::transport::{
    CertSource, ClientCertificate, HttpsService, KubeRewriteLayer, ServerNameOverride,
    TlsSettings, Verify,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http::header::{AUTHORIZATION, HOST};
use http::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tower::Layer;
use tracing::{debug, info, instrument};

/// Caller choices for [`build_session`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Context to use instead of the document's `current-context`
    pub context: Option<String>,
    /// Namespace used when the context does not set one
    pub namespace: String,
    /// Name to verify the server certificate against when the server is an IP
    pub certificate_name: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            context: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            certificate_name: DEFAULT_CERTIFICATE_NAME.to_string(),
        }
    }
}

impl SessionOptions {
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_certificate_name(mut self, certificate_name: impl Into<String>) -> Self {
        self.certificate_name = certificate_name.into();
        self
    }
}

/// Everything a session needs, resolved from a kubeconfig. Certificate files
/// are referenced, not read.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSession {
    pub server: String,
    pub namespace: String,
    pub verify: Verify,
    pub client_certificate: Option<ClientCertificate>,
    pub headers: HeaderMap,
}

impl ResolvedSession {
    /// Session sending over the pooled hyper client
    pub fn into_session(self) -> KubeSession<HttpsService> {
        let server_name = ServerNameOverride::new();
        let tls = TlsSettings {
            verify: self.verify.clone(),
            client_certificate: self.client_certificate.clone(),
        };
        let service = HttpsService::new(tls, server_name.clone());
        self.assemble(service, server_name)
    }

    /// Session sending through `service` instead of the network
    pub fn into_session_with<S>(self, service: S) -> KubeSession<S> {
        self.assemble(service, ServerNameOverride::new())
    }

    fn assemble<S>(self, service: S, server_name: ServerNameOverride) -> KubeSession<S> {
        let transport =
            KubeRewriteLayer::new(&self.server, &self.namespace, server_name.clone()).layer(service);
        KubeSession::new(
            transport,
            self.headers,
            self.verify,
            self.client_certificate,
            server_name,
        )
    }
}

/// Resolve `options` against `config` and build a ready to use session.
/// No network traffic happens here.
pub fn build_session(
    config: &Kubeconfig,
    options: &SessionOptions,
) -> Result<KubeSession<HttpsService>> {
    Ok(resolve_session(config, options)?.into_session())
}

#[instrument(skip(config, options), fields(context = ?options.context))]
pub fn resolve_session(config: &Kubeconfig, options: &SessionOptions) -> Result<ResolvedSession> {
    let context_name = match options.context.as_deref() {
        Some(name) => name,
        None => config
            .current_context
            .as_deref()
            .ok_or(KubeSessionError::NoCurrentContext)?,
    };

    let context = find_context(config, context_name)
        .ok_or_else(|| KubeSessionError::ContextNotFound(context_name.to_string()))?;

    let cluster = find_cluster(config, &context.cluster)
        .ok_or_else(|| KubeSessionError::ClusterNotFound(context.cluster.clone()))?;
    let server = cluster
        .server
        .as_deref()
        .ok_or_else(|| KubeSessionError::MissingServer(context.cluster.clone()))?;

    // User accounts aren't strictly required
    let anonymous = AuthInfo::default();
    let (user_name, user) = match user_ref(context) {
        Some(name) => (
            name,
            find_user(config, name)
                .ok_or_else(|| KubeSessionError::UserNotFound(name.to_string()))?,
        ),
        None => ("", &anonymous),
    };

    let namespace = context
        .namespace
        .clone()
        .unwrap_or_else(|| options.namespace.clone());

    let mut headers = HeaderMap::new();
    let client_certificate = client_certificate(user_name, user)?;

    if let Some(token) = &user.token {
        headers.insert(
            AUTHORIZATION,
            sensitive(&format!("Bearer {}", token.expose_secret()))?,
        );
    } else if let Some(username) = &user.username {
        let password = user
            .password
            .as_ref()
            .map(|p| p.expose_secret())
            .unwrap_or_default();
        let credentials = format!("{}:{}", username, password);
        headers.insert(
            AUTHORIZATION,
            sensitive(&format!("Basic {}", STANDARD.encode(credentials)))?,
        );
    }

    let mut verify = Verify::Platform;
    if server.starts_with("https://") {
        if cluster.insecure_skip_tls_verify.unwrap_or(false) {
            verify = Verify::Disabled;
        } else {
            // Certificates are usually issued for a name, not the cluster IP
            if HostKind::of_server(server).is_ip() {
                debug!(
                    "Server {} is an IP, verifying against {}",
                    server, options.certificate_name
                );
                headers.insert(HOST, header_value(&options.certificate_name)?);
            }
            if let Some(authority) = certificate_authority(cluster)? {
                verify = Verify::Authority(authority);
            }
        }
    }

    info!(
        "Resolved context {} to server {} in namespace {}",
        context_name, server, namespace
    );

    Ok(ResolvedSession {
        server: server.to_string(),
        namespace,
        verify,
        client_certificate,
        headers,
    })
}

fn client_certificate(user_name: &str, user: &AuthInfo) -> Result<Option<ClientCertificate>> {
    let certificate = cert_source(
        user.client_certificate.as_deref(),
        user.client_certificate_data.as_deref(),
        "client-certificate-data",
    )?;
    let key = cert_source(
        user.client_key.as_deref(),
        user.client_key_data.as_ref().map(|k| k.expose_secret()),
        "client-key-data",
    )?;

    match (certificate, key) {
        (Some(certificate), Some(key)) => Ok(Some(ClientCertificate { certificate, key })),
        (None, None) => Ok(None),
        _ => Err(KubeSessionError::IncompleteClientCertificate(
            user_name.to_string(),
        )),
    }
}

fn certificate_authority(cluster: &Cluster) -> Result<Option<CertSource>> {
    cert_source(
        cluster.certificate_authority.as_deref(),
        cluster.certificate_authority_data.as_deref(),
        "certificate-authority-data",
    )
}

/// Inline base64 data wins over a file path
fn cert_source(path: Option<&str>, data: Option<&str>, field: &str) -> Result<Option<CertSource>> {
    if let Some(data) = data {
        let bytes = STANDARD
            .decode(data.trim())
            .map_err(|e| KubeSessionError::InvalidData {
                field: field.to_string(),
                reason: e.to_string(),
            })?;
        return Ok(Some(CertSource::Inline(bytes)));
    }
    Ok(path.map(CertSource::from))
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| KubeSessionError::InvalidHeader(value.to_string()))
}

fn sensitive(value: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(value)
        .map_err(|_| KubeSessionError::InvalidHeader("<credentials>".to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}
