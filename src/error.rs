// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::quantity::QuantityError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TortoiseError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Container {container}: malformed {resource} {field}: {source}")]
    MalformedResource {
        container: String,
        resource: String,
        field: &'static str,
        #[source]
        source: QuantityError,
    },

    #[error(
        "Container {container}: {resource} limit ratio is undefined because the original request is zero, configure a limit multiplier for {resource}"
    )]
    UndefinedLimitRatio { container: String, resource: String },

    #[error("Container {container}: {resource} arithmetic overflow")]
    Overflow { container: String, resource: String },
}

pub type Result<T> = std::result::Result<T, TortoiseError>;
