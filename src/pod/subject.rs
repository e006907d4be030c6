// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Anything that carries a named set of resource requests and limits.

use crate::types::resource::ResourceKind;
use k8s_openapi::api::core::v1::Container;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;

/// Requests and limits of one container, wherever they are stored.
///
/// Implemented by literal pod containers and by the annotation encoded
/// istio sidecar of a pod template, so the projection and limit rules are
/// written once for both.
pub trait ResourceSubject {
    /// Container name used to look up recommendations, policy and phase
    fn name(&self) -> &str;

    fn request(&self, resource: ResourceKind) -> Option<&str>;

    fn limit(&self, resource: ResourceKind) -> Option<&str>;

    fn set_request(&mut self, resource: ResourceKind, quantity: Quantity);

    fn set_limit(&mut self, resource: ResourceKind, quantity: Quantity);
}

pub struct ContainerSubject<'a> {
    container: &'a mut Container,
}

impl<'a> ContainerSubject<'a> {
    pub fn new(container: &'a mut Container) -> Self {
        Self { container }
    }
}

impl ResourceSubject for ContainerSubject<'_> {
    fn name(&self) -> &str {
        &self.container.name
    }

    fn request(&self, resource: ResourceKind) -> Option<&str> {
        self.container
            .resources
            .as_ref()
            .and_then(|r| r.requests.as_ref())
            .and_then(|r| r.get(resource.as_str()))
            .map(|q| q.0.as_str())
    }

    fn limit(&self, resource: ResourceKind) -> Option<&str> {
        self.container
            .resources
            .as_ref()
            .and_then(|r| r.limits.as_ref())
            .and_then(|r| r.get(resource.as_str()))
            .map(|q| q.0.as_str())
    }

    fn set_request(&mut self, resource: ResourceKind, quantity: Quantity) {
        self.container
            .resources
            .get_or_insert_with(Default::default)
            .requests
            .get_or_insert_with(BTreeMap::new)
            .insert(resource.as_str().to_string(), quantity);
    }

    fn set_limit(&mut self, resource: ResourceKind, quantity: Quantity) {
        self.container
            .resources
            .get_or_insert_with(Default::default)
            .limits
            .get_or_insert_with(BTreeMap::new)
            .insert(resource.as_str().to_string(), quantity);
    }
}
