// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::config_env;
use crate::features::FeatureFlag;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::env;

/// Engine configuration loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Fixed limit to request multiplier per resource name, overriding the container's own ratio
    pub resource_limit_multiplier: BTreeMap<String, i64>,
    /// Floor for computed CPU limits, empty when not configured
    pub minimum_cpu_limit: String,
    pub feature_flags: Vec<FeatureFlag>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through a variable lookup function
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let resource_limit_multiplier = lookup(config_env::RESOURCE_LIMIT_MULTIPLIER)
            .map(|v| parse_multipliers(&v))
            .transpose()
            .with_context(|| format!("Invalid {}", config_env::RESOURCE_LIMIT_MULTIPLIER))?
            .unwrap_or_default();

        let minimum_cpu_limit = lookup(config_env::MINIMUM_CPU_LIMIT)
            .map(|v| v.trim().to_string())
            .unwrap_or_default();

        let feature_flags = lookup(config_env::FEATURE_FLAGS)
            .map(|v| parse_feature_flags(&v))
            .transpose()
            .with_context(|| format!("Invalid {}", config_env::FEATURE_FLAGS))?
            .unwrap_or_default();

        Ok(Config {
            resource_limit_multiplier,
            minimum_cpu_limit,
            feature_flags,
        })
    }
}

/// Parse `cpu=3,memory=1` into a multiplier map
fn parse_multipliers(value: &str) -> Result<BTreeMap<String, i64>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| -> Result<(String, i64)> {
            let (name, multiplier) = pair
                .split_once('=')
                .with_context(|| format!("expected resource=multiplier, got {:?}", pair))?;
            let multiplier = multiplier
                .trim()
                .parse::<i64>()
                .with_context(|| format!("multiplier for {} is not an integer", name.trim()))?;
            Ok((name.trim().to_string(), multiplier))
        })
        .collect()
}

fn parse_feature_flags(value: &str) -> Result<Vec<FeatureFlag>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| name.parse::<FeatureFlag>().map_err(anyhow::Error::from))
        .collect()
}
