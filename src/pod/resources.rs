// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Request projection and limit derivation for a single resource subject.

use crate::error::{Result, TortoiseError};
use crate::pod::subject::ResourceSubject;
use crate::quantity::{ParsedQuantity, QuantityError};
use crate::types::resource::ResourceKind;
use crate::types::tortoise::Tortoise;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Behavioral modifiers applied to each projected request before limits are derived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifyOption {
    /// Keep the current request when the recommendation is lower
    NoScaleDown,
}

impl ModifyOption {
    fn transform(self, original: ParsedQuantity, proposed: ParsedQuantity) -> ParsedQuantity {
        match self {
            ModifyOption::NoScaleDown => original.max(proposed),
        }
    }
}

/// Compute the new request from the current one and the recommendation.
pub fn project_request(
    original: ParsedQuantity,
    recommended: ParsedQuantity,
    options: &[ModifyOption],
) -> ParsedQuantity {
    options
        .iter()
        .fold(recommended, |proposed, option| option.transform(original, proposed))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitError {
    UndefinedRatio,
    Overflow,
}

/// Limit rules shared by every container: fixed multipliers and a CPU floor.
#[derive(Debug, Clone, Default)]
pub struct LimitPolicy {
    multipliers: BTreeMap<String, i64>,
    minimum_cpu_limit: Option<ParsedQuantity>,
}

impl LimitPolicy {
    pub fn new(multipliers: BTreeMap<String, i64>, minimum_cpu_limit: Option<ParsedQuantity>) -> Self {
        Self {
            multipliers,
            minimum_cpu_limit,
        }
    }

    pub fn multiplier(&self, resource: ResourceKind) -> Option<i64> {
        self.multipliers.get(resource.as_str()).copied()
    }

    /// Derive the new limit for `new_request`.
    ///
    /// Returns `None` when the subject has no limit for the resource and no
    /// multiplier is configured, in which case it stays unlimited.
    pub fn derive_limit(
        &self,
        resource: ResourceKind,
        original_request: ParsedQuantity,
        original_limit: Option<ParsedQuantity>,
        new_request: ParsedQuantity,
    ) -> std::result::Result<Option<ParsedQuantity>, LimitError> {
        let limit = match (self.multiplier(resource), original_limit) {
            (Some(multiplier), _) => new_request
                .checked_mul(multiplier)
                .ok_or(LimitError::Overflow)?,
            (None, Some(_)) if original_request.is_zero() => {
                return Err(LimitError::UndefinedRatio);
            }
            (None, Some(original_limit)) => {
                new_request
                    .checked_scale(original_limit.millis(), original_request.millis())
                    .ok_or(LimitError::Overflow)?
            }
            (None, None) => return Ok(None),
        };

        let limit = match (resource, self.minimum_cpu_limit) {
            (ResourceKind::Cpu, Some(minimum)) if limit < minimum => {
                ParsedQuantity::from_millis(minimum.millis(), limit.format())
            }
            _ => limit,
        };

        Ok(Some(limit))
    }
}

fn malformed(
    subject_name: &str,
    resource: ResourceKind,
    field: &'static str,
) -> impl FnOnce(QuantityError) -> TortoiseError {
    let container = subject_name.to_string();
    move |source| TortoiseError::MalformedResource {
        container,
        resource: resource.to_string(),
        field,
        source,
    }
}

/// Apply a container's recommendation to every eligible resource of `subject`.
///
/// Only resources the subject already requests are touched. Returns the final
/// request of each resource that was applied.
pub fn apply_recommendation<S: ResourceSubject>(
    subject: &mut S,
    recommendation: &BTreeMap<String, Quantity>,
    tortoise: &Tortoise,
    limits: &LimitPolicy,
    options: &[ModifyOption],
) -> Result<BTreeMap<ResourceKind, ParsedQuantity>> {
    let name = subject.name().to_string();
    let mut applied = BTreeMap::new();

    for resource in ResourceKind::ALL {
        let Some(recommended_raw) = recommendation.get(resource.as_str()) else {
            debug!("No {} recommendation for container {}, skipping", resource, name);
            continue;
        };

        if !tortoise.is_vertically_mutable(&name, resource) {
            debug!(
                "Container {} {} is not vertically scaled or still gathering data, skipping",
                name, resource
            );
            continue;
        }

        let Some(original_request) = subject.request(resource) else {
            debug!("Container {} has no {} request, skipping", name, resource);
            continue;
        };
        let original_request = ParsedQuantity::parse(original_request)
            .map_err(malformed(&name, resource, "request"))?;
        let recommended = ParsedQuantity::try_from(recommended_raw)
            .map_err(malformed(&name, resource, "recommendation"))?;
        let original_limit = subject
            .limit(resource)
            .map(|v| ParsedQuantity::parse(v).map_err(malformed(&name, resource, "limit")))
            .transpose()?;

        let new_request = project_request(original_request, recommended, options);
        if new_request == recommended {
            subject.set_request(resource, recommended_raw.clone());
        } else if new_request != original_request {
            subject.set_request(resource, new_request.to_quantity());
        }

        let new_limit = limits
            .derive_limit(resource, original_request, original_limit, new_request)
            .map_err(|e| match e {
                LimitError::UndefinedRatio => TortoiseError::UndefinedLimitRatio {
                    container: name.clone(),
                    resource: resource.to_string(),
                },
                LimitError::Overflow => TortoiseError::Overflow {
                    container: name.clone(),
                    resource: resource.to_string(),
                },
            })?;
        if let Some(limit) = new_limit {
            subject.set_limit(resource, limit.to_quantity());
        }

        info!(
            "Container {} {}: request {} -> {}, limit {} -> {}",
            name,
            resource,
            original_request,
            new_request,
            display_value(original_limit),
            display_value(new_limit)
        );
        applied.insert(resource, new_request);
    }

    Ok(applied)
}

fn display_value(value: Option<ParsedQuantity>) -> String {
    value.map_or_else(|| "<none>".to_string(), |v| v.to_string())
}
