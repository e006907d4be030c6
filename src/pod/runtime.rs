// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Go runtime knobs that mirror the container requests.

use crate::constants::env;
use crate::quantity::ParsedQuantity;
use crate::types::resource::ResourceKind;
use k8s_openapi::api::core::v1::Container;
use std::collections::BTreeMap;
use tracing::debug;

/// GOMAXPROCS for a CPU request: whole cores rounded up, at least 1
pub fn gomaxprocs(cpu_request: ParsedQuantity) -> i128 {
    cpu_request.value().max(1)
}

/// GOMEMLIMIT for a memory request: the exact byte count
pub fn gomemlimit(memory_request: ParsedQuantity) -> i128 {
    memory_request.value()
}

/// Rewrite existing GOMAXPROCS and GOMEMLIMIT variables of a container.
///
/// `applied` holds the final request of each resource changed in this pass;
/// a variable is only rewritten when its resource is present there.
pub fn adjust_runtime_env(container: &mut Container, applied: &BTreeMap<ResourceKind, ParsedQuantity>) {
    let Some(env_vars) = container.env.as_mut() else {
        return;
    };

    for var in env_vars.iter_mut().filter(|v| v.value_from.is_none()) {
        let value = match var.name.as_str() {
            env::GOMAXPROCS => applied.get(&ResourceKind::Cpu).map(|cpu| gomaxprocs(*cpu)),
            env::GOMEMLIMIT => applied
                .get(&ResourceKind::Memory)
                .map(|memory| gomemlimit(*memory)),
            _ => None,
        };

        if let Some(value) = value {
            debug!(
                "Container {}: setting {} to {}",
                container.name, var.name, value
            );
            var.value = Some(value.to_string());
        }
    }
}
