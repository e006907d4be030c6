// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Applies Tortoise recommendations to pod specs and pod templates.

pub mod resources;
pub mod runtime;
pub mod sidecar;
pub mod subject;

pub use resources::{LimitPolicy, ModifyOption};

use crate::config::Config;
use crate::error::{Result, TortoiseError};
use crate::features::FeatureFlag;
use crate::quantity::ParsedQuantity;
use crate::types::tortoise::Tortoise;
use k8s_openapi::api::core::v1::{PodSpec, PodTemplateSpec};
use kube::ResourceExt;
use std::collections::{BTreeMap, BTreeSet};
use subject::ContainerSubject;
use tracing::{debug, instrument};

/// Resource mutation engine, validated once at construction
#[derive(Debug, Clone)]
pub struct PodService {
    limits: LimitPolicy,
    feature_flags: BTreeSet<FeatureFlag>,
}

impl PodService {
    pub fn new(
        resource_limit_multiplier: BTreeMap<String, i64>,
        minimum_cpu_limit: &str,
        feature_flags: impl IntoIterator<Item = FeatureFlag>,
    ) -> Result<Self> {
        if let Some((resource, multiplier)) =
            resource_limit_multiplier.iter().find(|(_, m)| **m <= 0)
        {
            return Err(TortoiseError::InvalidConfig(format!(
                "limit multiplier for {} must be a positive integer, got {}",
                resource, multiplier
            )));
        }

        let minimum_cpu_limit = match minimum_cpu_limit.trim() {
            "" => None,
            value => Some(ParsedQuantity::parse(value).map_err(|e| {
                TortoiseError::InvalidConfig(format!(
                    "minimum CPU limit {:?} is not a valid quantity: {}",
                    value, e
                ))
            })?),
        };

        Ok(Self {
            limits: LimitPolicy::new(resource_limit_multiplier, minimum_cpu_limit),
            feature_flags: feature_flags.into_iter().collect(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.resource_limit_multiplier.clone(),
            &config.minimum_cpu_limit,
            config.feature_flags.iter().copied(),
        )
    }

    pub fn is_enabled(&self, flag: FeatureFlag) -> bool {
        self.feature_flags.contains(&flag)
    }

    /// Apply the tortoise's recommendations to every container of `pod_spec`.
    ///
    /// The pod spec is left untouched when an error is returned.
    #[instrument(skip(self, pod_spec, tortoise), fields(tortoise = %tortoise.name_any()))]
    pub fn modify_pod_spec_resource(
        &self,
        pod_spec: &mut PodSpec,
        tortoise: &Tortoise,
        options: &[ModifyOption],
    ) -> Result<()> {
        if !self.should_modify(tortoise) {
            return Ok(());
        }

        let mut modified = pod_spec.clone();
        self.modify_containers(&mut modified, tortoise, options)?;
        *pod_spec = modified;
        Ok(())
    }

    /// Apply the tortoise's recommendations to a pod template, including the
    /// annotation encoded istio sidecar when injection is enabled.
    #[instrument(skip(self, pod_template, tortoise), fields(tortoise = %tortoise.name_any()))]
    pub fn modify_pod_template_resource(
        &self,
        pod_template: &mut PodTemplateSpec,
        tortoise: &Tortoise,
        options: &[ModifyOption],
    ) -> Result<()> {
        if !self.should_modify(tortoise) {
            return Ok(());
        }

        let mut modified = pod_template.clone();
        if let Some(annotations) = modified
            .metadata
            .as_mut()
            .and_then(|m| m.annotations.as_mut())
        {
            sidecar::modify_sidecar_annotations(annotations, tortoise, &self.limits, options)?;
        }
        if let Some(spec) = modified.spec.as_mut() {
            self.modify_containers(spec, tortoise, options)?;
        }
        *pod_template = modified;
        Ok(())
    }

    fn should_modify(&self, tortoise: &Tortoise) -> bool {
        if !tortoise.is_mutation_enabled() {
            debug!(
                "Tortoise is not working in Auto mode (mode: {:?}, phase: {:?}), skipping",
                tortoise.spec.update_mode,
                tortoise.phase()
            );
            return false;
        }
        true
    }

    fn modify_containers(
        &self,
        pod_spec: &mut PodSpec,
        tortoise: &Tortoise,
        options: &[ModifyOption],
    ) -> Result<()> {
        let adjust_runtime = self.is_enabled(FeatureFlag::GoMemLimitModificationEnabled);

        for container in pod_spec.containers.iter_mut() {
            let Some(recommendation) = tortoise.recommended_resources(&container.name) else {
                debug!("No recommendation for container {}, skipping", container.name);
                continue;
            };

            let applied = resources::apply_recommendation(
                &mut ContainerSubject::new(container),
                recommendation,
                tortoise,
                &self.limits,
                options,
            )?;

            if adjust_runtime {
                runtime::adjust_runtime_env(container, &applied);
            }
        }

        Ok(())
    }
}
