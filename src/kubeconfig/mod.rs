// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubeconfig loading and lookups over the `kube` document model.

pub mod loader;
pub mod lookup;

pub use kube::config::{
    AuthInfo, Cluster, Context, Kubeconfig, NamedAuthInfo, NamedCluster, NamedContext,
};
pub use loader::{default_kubeconfig_path, parse_kubeconfig, read_kubeconfig};
pub use lookup::{find_cluster, find_context, find_user, user_ref};
