// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{env, DEFAULT_CERTIFICATE_NAME, DEFAULT_NAMESPACE};
use crate::kubeconfig::{default_kubeconfig_path, read_kubeconfig, Kubeconfig};
use crate::session::SessionOptions;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Binary configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Kubeconfig file; `None` when neither KUBECONFIG nor a home directory is known
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
    pub namespace: String,
    pub certificate_name: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_lookup(
            |key| std::env::var(key).ok(),
            default_kubeconfig_path(),
        ))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>, kubeconfig: Option<PathBuf>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        Config {
            kubeconfig,
            context: non_empty(env::CONTEXT),
            namespace: non_empty(env::NAMESPACE).unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            certificate_name: non_empty(env::CERTIFICATE_NAME)
                .unwrap_or_else(|| DEFAULT_CERTIFICATE_NAME.to_string()),
        }
    }

    pub fn load_kubeconfig(&self) -> Result<Kubeconfig> {
        let path = self
            .kubeconfig
            .as_ref()
            .context("No kubeconfig found: set KUBECONFIG or create ~/.kube/config")?;
        read_kubeconfig(path)
            .with_context(|| format!("Failed to load kubeconfig from {}", path.display()))
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            context: self.context.clone(),
            namespace: self.namespace.clone(),
            certificate_name: self.certificate_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_vars(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned(), Some(PathBuf::from("/tmp/kubeconfig")))
    }

    #[test]
    fn test_defaults() {
        let config = from_vars(&[]);

        assert_eq!(config.context, None);
        assert_eq!(config.namespace, "default");
        assert_eq!(config.certificate_name, "kubernetes");
        assert_eq!(config.session_options(), SessionOptions::default());
    }

    #[test]
    fn test_overrides() {
        let config = from_vars(&[
            (env::CONTEXT, "prod"),
            (env::NAMESPACE, "apps"),
            (env::CERTIFICATE_NAME, "api.internal"),
        ]);
        let options = config.session_options();

        assert_eq!(options.context.as_deref(), Some("prod"));
        assert_eq!(options.namespace, "apps");
        assert_eq!(options.certificate_name, "api.internal");
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let config = from_vars(&[(env::CONTEXT, ""), (env::NAMESPACE, "")]);

        assert_eq!(config.context, None);
        assert_eq!(config.namespace, "default");
    }

    #[test]
    fn test_load_kubeconfig_from_path() {
        let path = std::env::temp_dir().join(format!("kubesession-config-{}.yaml", std::process::id()));
        std::fs::write(&path, "current-context: minikube\n").unwrap();
        let config = Config {
            kubeconfig: Some(path.clone()),
            ..from_vars(&[])
        };

        let kubeconfig = config.load_kubeconfig().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(kubeconfig.current_context.as_deref(), Some("minikube"));
    }

    #[test]
    fn test_load_kubeconfig_without_path() {
        let config = Config {
            kubeconfig: None,
            ..from_vars(&[])
        };

        assert!(config.load_kubeconfig().is_err());
    }
}
