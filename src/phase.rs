// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Bulk transitions of the per container resource phases.

use crate::types::tortoise::{AutoscalingType, Tortoise};
use kube::ResourceExt;
use tracing::debug;

/// Return a copy of `tortoise` where every vertically scaled (container, resource)
/// pair is in the `Working` phase.
///
/// Only existing phase entries are updated. Pairs with any other policy are left
/// as they are.
pub fn make_all_vertical_container_resource_phase_working(tortoise: &Tortoise) -> Tortoise {
    let mut updated = tortoise.clone();
    let Some(status) = updated.status.as_mut() else {
        return updated;
    };

    for phases in status.container_resource_phases.iter_mut() {
        let Some(policy) = tortoise
            .spec
            .resource_policy
            .iter()
            .find(|p| p.container_name == phases.container_name)
        else {
            continue;
        };

        for (resource, phase) in phases.resource_phases.iter_mut() {
            if policy.autoscaling_policy.get(resource) != Some(&AutoscalingType::Vertical) {
                continue;
            }
            if !phase.is_working() {
                debug!(
                    "Tortoise {}: container {} {} is now Working",
                    tortoise.name_any(),
                    phases.container_name,
                    resource
                );
            }
            *phase = phase.advance();
        }
    }

    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tortoise::ContainerResourcePhases;
    use crate::test_utils::{make_policy, make_working_tortoise, phases};
    use crate::types::resource::ResourceKind;
    use crate::types::tortoise::ContainerResourcePhase::{GatheringData, Working};

    fn with_phases(mut tortoise: Tortoise, entries: Vec<ContainerResourcePhases>) -> Tortoise {
        if let Some(status) = tortoise.status.as_mut() {
            status.container_resource_phases = entries;
        }
        tortoise
    }

    #[test]
    fn test_vertical_resources_become_working() {
        let mut tortoise = make_working_tortoise(vec![]);
        tortoise.spec.resource_policy = vec![
            make_policy("app", AutoscalingType::Horizontal, AutoscalingType::Vertical),
            make_policy("istio-proxy", AutoscalingType::Horizontal, AutoscalingType::Vertical),
        ];
        let tortoise = with_phases(
            tortoise,
            vec![
                phases("app", GatheringData, GatheringData),
                phases("istio-proxy", GatheringData, GatheringData),
            ],
        );

        let updated = make_all_vertical_container_resource_phase_working(&tortoise);

        assert_eq!(
            updated.status.unwrap().container_resource_phases,
            vec![
                phases("app", GatheringData, Working),
                phases("istio-proxy", GatheringData, Working),
            ]
        );
        // The input is not modified
        assert_eq!(
            tortoise.resource_phase("app", ResourceKind::Memory),
            Some(GatheringData)
        );
    }

    #[test]
    fn test_horizontal_entries_untouched() {
        let mut tortoise = make_working_tortoise(vec![]);
        tortoise.spec.resource_policy = vec![make_policy(
            "app",
            AutoscalingType::Horizontal,
            AutoscalingType::Off,
        )];
        let tortoise = with_phases(tortoise, vec![phases("app", Working, GatheringData)]);

        let updated = make_all_vertical_container_resource_phase_working(&tortoise);

        assert_eq!(
            updated.status.unwrap().container_resource_phases,
            vec![phases("app", Working, GatheringData)]
        );
    }

    #[test]
    fn test_missing_entries_are_not_created() {
        let mut tortoise = make_working_tortoise(vec![]);
        tortoise.spec.resource_policy = vec![
            make_policy("app", AutoscalingType::Vertical, AutoscalingType::Horizontal),
            make_policy("istio-proxy", AutoscalingType::Vertical, AutoscalingType::Vertical),
        ];
        let mut app = phases("app", GatheringData, GatheringData);
        app.resource_phases.remove("cpu");
        let tortoise = with_phases(tortoise, vec![app.clone()]);

        let updated = make_all_vertical_container_resource_phase_working(&tortoise);

        assert_eq!(updated.status.unwrap().container_resource_phases, vec![app]);
    }

    #[test]
    fn test_without_status() {
        let mut tortoise = make_working_tortoise(vec![]);
        tortoise.status = None;
        tortoise.spec.resource_policy = vec![make_policy(
            "app",
            AutoscalingType::Vertical,
            AutoscalingType::Vertical,
        )];

        let updated = make_all_vertical_container_resource_phase_working(&tortoise);

        assert!(updated.status.is_none());
    }

    #[test]
    fn test_already_working_is_unchanged() {
        let mut tortoise = make_working_tortoise(vec![]);
        tortoise.spec.resource_policy = vec![make_policy(
            "app",
            AutoscalingType::Vertical,
            AutoscalingType::Vertical,
        )];
        let tortoise = with_phases(tortoise, vec![phases("app", Working, Working)]);

        let updated = make_all_vertical_container_resource_phase_working(&tortoise);

        assert_eq!(
            updated.status.unwrap().container_resource_phases,
            vec![phases("app", Working, Working)]
        );
    }
}
