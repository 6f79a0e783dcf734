// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Reading kubeconfig documents from strings, files and the environment

use crate::constants::env;
use crate::error::{KubeSessionError, Result};
use kube::config::Kubeconfig;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Parse a kubeconfig from YAML (JSON documents are valid YAML too)
pub fn parse_kubeconfig(document: &str) -> Result<Kubeconfig> {
    Ok(serde_yaml::from_str::<Kubeconfig>(document)?)
}

/// Read and parse a kubeconfig file
#[instrument]
pub fn read_kubeconfig(path: &Path) -> Result<Kubeconfig> {
    let document =
        std::fs::read_to_string(path).map_err(|source| KubeSessionError::KubeconfigRead {
            path: path.display().to_string(),
            source,
        })?;
    debug!("Read {} bytes of kubeconfig", document.len());
    parse_kubeconfig(&document)
}

/// First entry of `$KUBECONFIG`, falling back to `~/.kube/config`
pub fn default_kubeconfig_path() -> Option<PathBuf> {
    kubeconfig_path_from(std::env::var_os(env::KUBECONFIG), dirs::home_dir())
}

fn kubeconfig_path_from(
    kubeconfig: Option<std::ffi::OsString>,
    home: Option<PathBuf>,
) -> Option<PathBuf> {
    kubeconfig
        .and_then(|value| std::env::split_paths(&value).find(|p| !p.as_os_str().is_empty()))
        .or_else(|| home.map(|h| h.join(".kube").join("config")))
}
