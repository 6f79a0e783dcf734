// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Building sessions from kubeconfig contexts and issuing requests through them.

pub mod builder;
pub mod client;
pub mod host;

pub use builder::{build_session, resolve_session, ResolvedSession, SessionOptions};
pub use client::{read_body, KubeSession, RequestBuilder};
pub use host::HostKind;
