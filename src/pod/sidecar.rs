// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Istio sidecar resources encoded as pod template annotations.
//!
//! Before injection the `istio-proxy` container does not exist in a pod
//! template; its resources are carried by `sidecar.istio.io/*` annotations.

use crate::constants::{annotations, ISTIO_PROXY_CONTAINER_NAME};
use crate::error::Result;
use crate::pod::resources::{apply_recommendation, LimitPolicy, ModifyOption};
use crate::pod::subject::ResourceSubject;
use crate::types::resource::ResourceKind;
use crate::types::tortoise::Tortoise;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;
use tracing::debug;

/// Check if the istio sidecar injection annotation is set to "true"
pub fn is_sidecar_injected(annotations: &BTreeMap<String, String>) -> bool {
    annotations
        .get(annotations::ISTIO_SIDECAR_INJECTION)
        .is_some_and(|v| v == "true")
}

/// The istio sidecar viewed through its resource annotations
pub struct AnnotationSubject<'a> {
    annotations: &'a mut BTreeMap<String, String>,
}

impl<'a> AnnotationSubject<'a> {
    pub fn new(annotations: &'a mut BTreeMap<String, String>) -> Self {
        Self { annotations }
    }

    fn request_key(resource: ResourceKind) -> &'static str {
        match resource {
            ResourceKind::Cpu => annotations::ISTIO_SIDECAR_PROXY_CPU,
            ResourceKind::Memory => annotations::ISTIO_SIDECAR_PROXY_MEMORY,
        }
    }

    fn limit_key(resource: ResourceKind) -> &'static str {
        match resource {
            ResourceKind::Cpu => annotations::ISTIO_SIDECAR_PROXY_CPU_LIMIT,
            ResourceKind::Memory => annotations::ISTIO_SIDECAR_PROXY_MEMORY_LIMIT,
        }
    }
}

impl ResourceSubject for AnnotationSubject<'_> {
    fn name(&self) -> &str {
        ISTIO_PROXY_CONTAINER_NAME
    }

    fn request(&self, resource: ResourceKind) -> Option<&str> {
        self.annotations
            .get(Self::request_key(resource))
            .map(String::as_str)
    }

    fn limit(&self, resource: ResourceKind) -> Option<&str> {
        self.annotations
            .get(Self::limit_key(resource))
            .map(String::as_str)
    }

    fn set_request(&mut self, resource: ResourceKind, quantity: Quantity) {
        self.annotations
            .insert(Self::request_key(resource).to_string(), quantity.0);
    }

    fn set_limit(&mut self, resource: ResourceKind, quantity: Quantity) {
        self.annotations
            .insert(Self::limit_key(resource).to_string(), quantity.0);
    }
}

/// Apply the `istio-proxy` recommendation to the sidecar annotations of a pod template.
pub fn modify_sidecar_annotations(
    annotations: &mut BTreeMap<String, String>,
    tortoise: &Tortoise,
    limits: &LimitPolicy,
    options: &[ModifyOption],
) -> Result<()> {
    if !is_sidecar_injected(annotations) {
        return Ok(());
    }

    let Some(recommendation) = tortoise.recommended_resources(ISTIO_PROXY_CONTAINER_NAME) else {
        debug!("No recommendation for the istio sidecar, leaving annotations untouched");
        return Ok(());
    };

    apply_recommendation(
        &mut AnnotationSubject::new(annotations),
        recommendation,
        tortoise,
        limits,
        options,
    )?;

    Ok(())
}
