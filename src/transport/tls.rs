// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! TLS trust and client certificate material, turned into a rustls config on demand

use crate::error::{KubeSessionError, Result};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Where PEM material comes from: a file path or inline bytes from the kubeconfig
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CertSource {
    Path(PathBuf),
    Inline(Vec<u8>),
}

impl CertSource {
    fn read(&self) -> Result<Vec<u8>> {
        match self {
            CertSource::Path(path) => std::fs::read(path).map_err(|e| {
                KubeSessionError::Tls(format!("Failed to read {}: {}", path.display(), e))
            }),
            CertSource::Inline(bytes) => Ok(bytes.clone()),
        }
    }
}

impl From<&str> for CertSource {
    fn from(path: &str) -> Self {
        CertSource::Path(PathBuf::from(path))
    }
}

/// How the server certificate is verified
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Verify {
    /// Chain checked against the bundled webpki roots
    #[default]
    Platform,
    /// No chain and no hostname checks at all
    Disabled,
    /// Chain checked against this authority only
    Authority(CertSource),
}

impl Verify {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Verify::Disabled)
    }
}

/// Client certificate and key presented during the handshake
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientCertificate {
    pub certificate: CertSource,
    pub key: CertSource,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TlsSettings {
    pub verify: Verify,
    pub client_certificate: Option<ClientCertificate>,
}

/// Build the rustls client config. This is where certificate files are first
/// read, so missing or malformed material is reported here.
pub fn build_client_config(settings: &TlsSettings) -> Result<ClientConfig> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let builder = ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()
        .map_err(|e| KubeSessionError::Tls(e.to_string()))?;

    let builder = match &settings.verify {
        Verify::Disabled => {
            debug!("Server certificate verification disabled");
            builder
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(NoVerification(provider)))
        }
        Verify::Platform => {
            let mut roots = RootCertStore::empty();
            roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
            builder.with_root_certificates(roots)
        }
        Verify::Authority(source) => builder.with_root_certificates(load_roots(source)?),
    };

    match &settings.client_certificate {
        Some(pair) => {
            let certs = load_certs(&pair.certificate)?;
            let key = load_key(&pair.key)?;
            builder
                .with_client_auth_cert(certs, key)
                .map_err(|e| KubeSessionError::Tls(format!("Invalid client certificate: {}", e)))
        }
        None => Ok(builder.with_no_client_auth()),
    }
}

fn load_certs(source: &CertSource) -> Result<Vec<CertificateDer<'static>>> {
    let pem = source.read()?;
    let certs = rustls_pemfile::certs(&mut pem.as_slice())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| KubeSessionError::Tls(format!("Invalid PEM certificate: {}", e)))?;

    if certs.is_empty() {
        return Err(KubeSessionError::Tls(format!(
            "No certificates found in {}",
            source_label(source)
        )));
    }
    Ok(certs)
}

fn load_roots(source: &CertSource) -> Result<RootCertStore> {
    let mut roots = RootCertStore::empty();
    for cert in load_certs(source)? {
        roots
            .add(cert)
            .map_err(|e| KubeSessionError::Tls(format!("Invalid certificate authority: {}", e)))?;
    }
    Ok(roots)
}

fn load_key(source: &CertSource) -> Result<PrivateKeyDer<'static>> {
    let pem = source.read()?;
    rustls_pemfile::private_key(&mut pem.as_slice())
        .map_err(|e| KubeSessionError::Tls(format!("Invalid PEM key: {}", e)))?
        .ok_or_else(|| {
            KubeSessionError::Tls(format!(
                "No private key found in {}",
                source_label(source)
            ))
        })
}

fn source_label(source: &CertSource) -> String {
    match source {
        CertSource::Path(path) => path.display().to_string(),
        CertSource::Inline(_) => "inline data".to_string(),
    }
}

/// Accepts any server certificate. Handshake signatures are still checked.
#[derive(Debug)]
struct NoVerification(Arc<CryptoProvider>);

impl ServerCertVerifier for NoVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}
