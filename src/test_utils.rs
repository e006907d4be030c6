// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test fixtures for building Tortoise objects and pod specs.

use crate::types::tortoise::{
    AutoscalingType, ContainerResourcePhase, ContainerResourcePhases, ContainerResourcePolicy,
    ContainerResourceRequests, CrossVersionObjectReference, TargetRefs, Tortoise, TortoisePhase,
    TortoiseSpec, TortoiseStatus, UpdateMode,
};
use k8s_openapi::api::core::v1::{Container, EnvVar, PodSpec, ResourceRequirements};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;

pub fn quantity(value: &str) -> Quantity {
    Quantity(value.to_string())
}

pub fn resource_list(cpu: &str, memory: &str) -> BTreeMap<String, Quantity> {
    BTreeMap::from([
        ("cpu".to_string(), quantity(cpu)),
        ("memory".to_string(), quantity(memory)),
    ])
}

/// A Tortoise named `sample` targeting the `sample` Deployment
pub fn make_tortoise(
    update_mode: UpdateMode,
    phase: Option<TortoisePhase>,
    container_resource_requests: Vec<ContainerResourceRequests>,
) -> Tortoise {
    let mut tortoise = Tortoise::new(
        "sample",
        TortoiseSpec {
            target_refs: TargetRefs {
                scale_target_ref: CrossVersionObjectReference {
                    api_version: Some("apps/v1".to_string()),
                    kind: "Deployment".to_string(),
                    name: "sample".to_string(),
                },
                horizontal_pod_autoscaler_name: None,
            },
            update_mode,
            ..Default::default()
        },
    );
    tortoise.metadata.namespace = Some("default".to_string());
    tortoise.status = Some(TortoiseStatus {
        tortoise_phase: phase,
        ..Default::default()
    });
    if let Some(status) = tortoise.status.as_mut() {
        status.conditions.container_resource_requests = container_resource_requests;
    }
    tortoise
}

/// An Auto-mode, Working tortoise with the given recommendations
pub fn make_working_tortoise(container_resource_requests: Vec<ContainerResourceRequests>) -> Tortoise {
    make_tortoise(
        UpdateMode::Auto,
        Some(TortoisePhase::Working),
        container_resource_requests,
    )
}

pub fn requests(container_name: &str, cpu: &str, memory: &str) -> ContainerResourceRequests {
    ContainerResourceRequests {
        container_name: container_name.to_string(),
        resource: resource_list(cpu, memory),
    }
}

pub fn make_policy(
    container_name: &str,
    cpu: AutoscalingType,
    memory: AutoscalingType,
) -> ContainerResourcePolicy {
    ContainerResourcePolicy {
        container_name: container_name.to_string(),
        autoscaling_policy: BTreeMap::from([
            ("cpu".to_string(), cpu),
            ("memory".to_string(), memory),
        ]),
        ..Default::default()
    }
}

pub fn phases(
    container_name: &str,
    cpu: ContainerResourcePhase,
    memory: ContainerResourcePhase,
) -> ContainerResourcePhases {
    ContainerResourcePhases {
        container_name: container_name.to_string(),
        resource_phases: BTreeMap::from([
            ("cpu".to_string(), cpu),
            ("memory".to_string(), memory),
        ]),
    }
}

/// A container with requests `(cpu, memory)` and limits `(cpu, memory)`
pub fn make_container(name: &str, requests: (&str, &str), limits: (&str, &str)) -> Container {
    Container {
        name: name.to_string(),
        resources: Some(ResourceRequirements {
            requests: Some(resource_list(requests.0, requests.1)),
            limits: Some(resource_list(limits.0, limits.1)),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn with_env(mut container: Container, env: &[(&str, &str)]) -> Container {
    container.env = Some(
        env.iter()
            .map(|(name, value)| EnvVar {
                name: name.to_string(),
                value: Some(value.to_string()),
                ..Default::default()
            })
            .collect(),
    );
    container
}

pub fn make_pod_spec(containers: Vec<Container>) -> PodSpec {
    PodSpec {
        containers,
        ..Default::default()
    }
}

pub fn container_request(container: &Container, resource: &str) -> Option<String> {
    container
        .resources
        .as_ref()
        .and_then(|r| r.requests.as_ref())
        .and_then(|r| r.get(resource))
        .map(|q| q.0.clone())
}

pub fn container_limit(container: &Container, resource: &str) -> Option<String> {
    container
        .resources
        .as_ref()
        .and_then(|r| r.limits.as_ref())
        .and_then(|r| r.get(resource))
        .map(|q| q.0.clone())
}

pub fn env_value(container: &Container, name: &str) -> Option<String> {
    container
        .env
        .as_ref()
        .and_then(|env| env.iter().find(|e| e.name == name))
        .and_then(|e| e.value.clone())
}
