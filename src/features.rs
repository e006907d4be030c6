// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::TortoiseError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureFlag {
    /// Rewrite GOMAXPROCS and GOMEMLIMIT along with the container requests
    GoMemLimitModificationEnabled,
}

impl FeatureFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureFlag::GoMemLimitModificationEnabled => "GoMemLimitModificationEnabled",
        }
    }
}

impl fmt::Display for FeatureFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureFlag {
    type Err = TortoiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GoMemLimitModificationEnabled" => Ok(FeatureFlag::GoMemLimitModificationEnabled),
            other => Err(TortoiseError::InvalidConfig(format!(
                "unknown feature flag {:?}",
                other
            ))),
        }
    }
}
