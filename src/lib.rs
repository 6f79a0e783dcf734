// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod config;
pub mod constants;
pub mod error;
pub mod kubeconfig;
pub mod session;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{KubeSessionError, Result};
pub use kubeconfig::Kubeconfig;
pub use session::{build_session, KubeSession, SessionOptions};
