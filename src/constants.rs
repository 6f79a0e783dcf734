// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Placeholders substituted in request URLs at send time
pub mod placeholders {
    /// Prefix replaced with the cluster server URL
    pub const KUBE_SCHEME: &str = "kube://";
    /// Token replaced with the resolved namespace
    pub const NAMESPACE: &str = "$$NAMESPACE$$";
}

/// Namespace used when neither the caller nor the context sets one
pub const DEFAULT_NAMESPACE: &str = "default";

/// Name the API server certificate is checked against when dialing an IP
pub const DEFAULT_CERTIFICATE_NAME: &str = "kubernetes";

/// Environment variables read by the binary
pub mod env {
    pub const KUBECONFIG: &str = "KUBECONFIG";
    pub const CONTEXT: &str = "KUBE_CONTEXT";
    pub const NAMESPACE: &str = "KUBE_NAMESPACE";
    pub const CERTIFICATE_NAME: &str = "KUBE_CERTIFICATE_NAME";
}
