// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::config::{AuthInfo, Cluster, Context, Kubeconfig};

/// Look up a context by name, first match wins
pub fn find_context<'a>(config: &'a Kubeconfig, name: &str) -> Option<&'a Context> {
    config
        .contexts
        .iter()
        .find(|c| c.name == name)
        .and_then(|c| c.context.as_ref())
}

/// Look up a cluster by name, first match wins
pub fn find_cluster<'a>(config: &'a Kubeconfig, name: &str) -> Option<&'a Cluster> {
    config
        .clusters
        .iter()
        .find(|c| c.name == name)
        .and_then(|c| c.cluster.as_ref())
}

/// Look up a user by name, first match wins
pub fn find_user<'a>(config: &'a Kubeconfig, name: &str) -> Option<&'a AuthInfo> {
    config
        .auth_infos
        .iter()
        .find(|u| u.name == name)
        .and_then(|u| u.auth_info.as_ref())
}

/// The user a context refers to. An empty reference means anonymous access.
pub fn user_ref(context: &Context) -> Option<&str> {
    context.user.as_deref().filter(|u| !u.is_empty())
}
