// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod config;
pub mod constants;
pub mod error;
pub mod features;
pub mod phase;
pub mod pod;
pub mod quantity;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use error::{Result, TortoiseError};
pub use phase::make_all_vertical_container_resource_phase_working;
pub use pod::{ModifyOption, PodService};
