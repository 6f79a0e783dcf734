// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use http::Uri;
use std::net::IpAddr;
use std::str::FromStr;
use tracing::debug;

/// What the host part of a cluster server URL is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostKind {
    IpAddress(IpAddr),
    Name(String),
    /// The server did not parse as a URL with a host; treated as a name
    Unparseable,
}

impl HostKind {
    /// Classify the host of `server`. Never fails, a malformed server is
    /// reported as [`HostKind::Unparseable`].
    ///
    /// Only the canonical dotted quad and bracketed IPv6 forms count as IP
    /// addresses. Shorthands such as `127.1` or `0x7f.0.0.1` are names.
    pub fn of_server(server: &str) -> Self {
        let uri = match Uri::from_str(server) {
            Ok(uri) => uri,
            Err(e) => {
                debug!("Could not parse server {} ({}), assuming it is not an IP", server, e);
                return HostKind::Unparseable;
            }
        };

        match uri.host() {
            Some(host) => {
                let bare = host.trim_start_matches('[').trim_end_matches(']');
                match IpAddr::from_str(bare) {
                    Ok(ip) => HostKind::IpAddress(ip),
                    Err(_) => HostKind::Name(host.to_string()),
                }
            }
            None => HostKind::Unparseable,
        }
    }

    pub fn is_ip(&self) -> bool {
        matches!(self, HostKind::IpAddress(_))
    }
}
