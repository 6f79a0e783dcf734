// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

/// Boxed error returned by the underlying HTTP transport
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum KubeSessionError {
    #[error("Context not found: {0}")]
    ContextNotFound(String),

    #[error("No context given and kubeconfig has no current-context")]
    NoCurrentContext,

    #[error("Cluster not found: {0}")]
    ClusterNotFound(String),

    #[error("Cluster {0} has no server")]
    MissingServer(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("User {0} must set both a client certificate and a client key")]
    IncompleteClientCertificate(String),

    #[error("Invalid inline data in {field}: {reason}")]
    InvalidData { field: String, reason: String },

    #[error("Failed to parse kubeconfig: {0}")]
    KubeconfigParse(#[from] serde_yaml::Error),

    #[error("Failed to read kubeconfig {path}: {source}")]
    KubeconfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    #[error("TLS configuration error: {0}")]
    Tls(String),

    #[error("Transport error: {0}")]
    Transport(#[source] BoxError),

    #[error("Request failed with status {status}: {body}")]
    Status { status: http::StatusCode, body: String },

    #[error("Failed to decode response: {0}")]
    Json(#[from] serde_json::Error),
}

impl KubeSessionError {
    /// True for errors raised while resolving the kubeconfig, before any request
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            KubeSessionError::ContextNotFound(_)
                | KubeSessionError::NoCurrentContext
                | KubeSessionError::ClusterNotFound(_)
                | KubeSessionError::MissingServer(_)
                | KubeSessionError::UserNotFound(_)
                | KubeSessionError::IncompleteClientCertificate(_)
                | KubeSessionError::InvalidData { .. }
                | KubeSessionError::KubeconfigParse(_)
                | KubeSessionError::KubeconfigRead { .. }
                | KubeSessionError::InvalidHeader(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, KubeSessionError>;
