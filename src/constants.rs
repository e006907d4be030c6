// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Istio sidecar annotations read and rewritten on pod templates
pub mod annotations {
    /// When set to "true", the istio sidecar is injected at pod creation
    pub const ISTIO_SIDECAR_INJECTION: &str = "sidecar.istio.io/inject";
    pub const ISTIO_SIDECAR_PROXY_CPU: &str = "sidecar.istio.io/proxyCPU";
    pub const ISTIO_SIDECAR_PROXY_CPU_LIMIT: &str = "sidecar.istio.io/proxyCPULimit";
    pub const ISTIO_SIDECAR_PROXY_MEMORY: &str = "sidecar.istio.io/proxyMemory";
    pub const ISTIO_SIDECAR_PROXY_MEMORY_LIMIT: &str = "sidecar.istio.io/proxyMemoryLimit";
}

/// Name of the injected istio sidecar container
pub const ISTIO_PROXY_CONTAINER_NAME: &str = "istio-proxy";

/// Go runtime tuning variables mirrored from container requests
pub mod env {
    pub const GOMAXPROCS: &str = "GOMAXPROCS";
    pub const GOMEMLIMIT: &str = "GOMEMLIMIT";
}

/// Environment variables the engine configuration is loaded from
pub mod config_env {
    pub const RESOURCE_LIMIT_MULTIPLIER: &str = "TORTOISE_RESOURCE_LIMIT_MULTIPLIER";
    pub const MINIMUM_CPU_LIMIT: &str = "TORTOISE_MINIMUM_CPU_LIMIT";
    pub const FEATURE_FLAGS: &str = "TORTOISE_FEATURE_FLAGS";
}
