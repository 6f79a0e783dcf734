// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Request transport: URL rewriting, TLS server name handling and the hyper client.

pub mod https;
pub mod rewrite;
pub mod server_name;
pub mod tls;

pub use https::HttpsService;
pub use rewrite::{rewrite_url, KubeRewrite, KubeRewriteLayer, PreparedRequest};
pub use server_name::ServerNameOverride;
pub use tls::{build_client_config, CertSource, ClientCertificate, TlsSettings, Verify};
