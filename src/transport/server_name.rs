// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Server name used for SNI and certificate verification on TLS connections.
//!
//! A session holds one [`ServerNameOverride`]. The rewriter writes it on each
//! send and the transport reads it to pick the connection pool, one pool per
//! name, each dialing with a [`PinnedServerName`]. A connection is therefore
//! only reused for requests verified against the same name. Concurrent
//! requests carrying different `Host` headers still race on the shared cell:
//! whichever request wrote last decides the pool of the next one to read it.

use http::Uri;
use hyper_rustls::ResolveServerName;
use rustls::pki_types::ServerName;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::trace;

#[derive(Clone, Debug, Default)]
pub struct ServerNameOverride {
    name: Arc<RwLock<Option<String>>>,
}

impl ServerNameOverride {
    pub fn new() -> Self {
        Self::default()
    }

    /// Verify against `name` instead of the URI host
    pub fn set(&self, name: &str) {
        let mut guard = self.name.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(name.to_string());
    }

    /// Go back to verifying against the URI host
    pub fn clear(&self) {
        let mut guard = self.name.write().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }

    pub fn get(&self) -> Option<String> {
        self.name
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Resolver of a single connection pool: always `name` when set, otherwise
/// the host of the dialed URI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PinnedServerName {
    name: Option<String>,
}

impl PinnedServerName {
    pub fn new(name: Option<String>) -> Self {
        Self { name }
    }
}

impl ResolveServerName for PinnedServerName {
    fn resolve(
        &self,
        uri: &Uri,
    ) -> Result<ServerName<'static>, Box<dyn std::error::Error + Sync + Send>> {
        let name = match &self.name {
            Some(name) => name.clone(),
            None => uri_host(uri)
                .ok_or_else(|| format!("URI has no host: {}", uri))?
                .to_string(),
        };
        trace!("Resolved TLS server name {} for {}", name, uri);
        Ok(ServerName::try_from(name)?)
    }
}

/// Host of the URI with IPv6 brackets removed
fn uri_host(uri: &Uri) -> Option<&str> {
    uri.host()
        .map(|h| h.trim_start_matches('[').trim_end_matches(']'))
}
