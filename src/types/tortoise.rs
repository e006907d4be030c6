// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::resource::ResourceKind;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube::CustomResource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "autoscaling.mercari.com", version = "v1beta3", kind = "Tortoise")]
#[kube(namespaced)]
#[kube(status = "TortoiseStatus")]
#[serde(rename_all = "camelCase")]
pub struct TortoiseSpec {
    pub target_refs: TargetRefs,
    #[serde(default)]
    pub update_mode: UpdateMode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource_policy: Vec<ContainerResourcePolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<DeletionPolicy>,
}

impl Tortoise {
    /// Mutation is only allowed for a Working tortoise in Auto mode
    pub fn is_mutation_enabled(&self) -> bool {
        self.spec.update_mode == UpdateMode::Auto && self.phase() == Some(TortoisePhase::Working)
    }

    pub fn phase(&self) -> Option<TortoisePhase> {
        self.status.as_ref().and_then(|s| s.tortoise_phase)
    }

    /// Get the recommended resource requests for a container, if any
    pub fn recommended_resources(&self, container_name: &str) -> Option<&BTreeMap<String, Quantity>> {
        self.status
            .as_ref()?
            .conditions
            .container_resource_requests
            .iter()
            .find(|r| r.container_name == container_name)
            .map(|r| &r.resource)
    }

    pub fn autoscaling_type(
        &self,
        container_name: &str,
        resource: ResourceKind,
    ) -> Option<AutoscalingType> {
        self.spec
            .resource_policy
            .iter()
            .find(|p| p.container_name == container_name)
            .and_then(|p| p.autoscaling_policy.get(resource.as_str()))
            .copied()
    }

    pub fn resource_phase(
        &self,
        container_name: &str,
        resource: ResourceKind,
    ) -> Option<ContainerResourcePhase> {
        self.status
            .as_ref()?
            .container_resource_phases
            .iter()
            .find(|p| p.container_name == container_name)
            .and_then(|p| p.resource_phases.get(resource.as_str()))
            .copied()
    }

    /// Check whether a container's resource may receive a new request and limit.
    ///
    /// Pairs without a policy or phase entry are not gated; an explicit
    /// non-vertical policy or a GatheringData phase is.
    pub fn is_vertically_mutable(&self, container_name: &str, resource: ResourceKind) -> bool {
        let vertical = self
            .autoscaling_type(container_name, resource)
            .map_or(true, |t| t == AutoscalingType::Vertical);
        let working = self
            .resource_phase(container_name, resource)
            .map_or(true, ContainerResourcePhase::is_working);
        vertical && working
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TargetRefs {
    pub scale_target_ref: CrossVersionObjectReference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal_pod_autoscaler_name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CrossVersionObjectReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    pub kind: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, schemars::JsonSchema)]
pub enum UpdateMode {
    #[default]
    Off,
    Auto,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, schemars::JsonSchema)]
pub enum DeletionPolicy {
    DeleteAll,
    NoDelete,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContainerResourcePolicy {
    pub container_name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub min_allocated_resources: BTreeMap<String, Quantity>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub max_allocated_resources: BTreeMap<String, Quantity>,
    #[serde(default)]
    pub autoscaling_policy: BTreeMap<String, AutoscalingType>,
}

/// Which mechanism is authorized to size a container resource
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, schemars::JsonSchema)]
pub enum AutoscalingType {
    Off,
    Horizontal,
    Vertical,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, schemars::JsonSchema)]
pub enum TortoisePhase {
    Initializing,
    GatheringData,
    Working,
    PartlyWorking,
    Emergency,
    BackToNormal,
}

/// Readiness of one (container, resource) pair.
///
/// The only transition is `GatheringData -> Working`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, schemars::JsonSchema)]
pub enum ContainerResourcePhase {
    #[default]
    GatheringData,
    Working,
}

impl ContainerResourcePhase {
    pub fn is_working(self) -> bool {
        self == ContainerResourcePhase::Working
    }

    pub fn advance(self) -> Self {
        ContainerResourcePhase::Working
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TortoiseStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tortoise_phase: Option<TortoisePhase>,
    #[serde(default)]
    pub conditions: Conditions,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub container_resource_phases: Vec<ContainerResourcePhases>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Conditions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub container_resource_requests: Vec<ContainerResourceRequests>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContainerResourceRequests {
    pub container_name: String,
    #[serde(default)]
    pub resource: BTreeMap<String, Quantity>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContainerResourcePhases {
    pub container_name: String,
    #[serde(default)]
    pub resource_phases: BTreeMap<String, ContainerResourcePhase>,
}
