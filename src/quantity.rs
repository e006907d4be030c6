// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Exact fixed-point arithmetic on Kubernetes resource quantities.
//!
//! Values are held as signed milli-units so that CPU (`100m`) and memory
//! (`100Mi`) share one representation without floating point rounding.

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

const MILLIS_PER_UNIT: u128 = 1000;
const MAX_EXPONENT: i32 = 30;
const MAX_DIGITS: usize = 30;

const DECIMAL_SUFFIXES: [(i32, &str); 7] = [
    (18, "E"),
    (15, "P"),
    (12, "T"),
    (9, "G"),
    (6, "M"),
    (3, "k"),
    (0, ""),
];

const BINARY_SUFFIXES: [(u32, &str); 6] = [
    (6, "Ei"),
    (5, "Pi"),
    (4, "Ti"),
    (3, "Gi"),
    (2, "Mi"),
    (1, "Ki"),
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    #[error("quantity is empty")]
    Empty,

    #[error("invalid number in quantity {0:?}")]
    InvalidNumber(String),

    #[error("unknown suffix {suffix:?} in quantity {value:?}")]
    UnknownSuffix { value: String, suffix: String },

    #[error("quantity {0:?} is out of range")]
    OutOfRange(String),
}

/// The suffix family a quantity was written in, reused when formatting results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityFormat {
    DecimalSI,
    BinarySI,
    DecimalExponent,
}

enum Scale {
    Decimal(i32),
    Binary(u32),
    Exponent(i32),
}

/// A parsed quantity. Equality and ordering compare the value only.
#[derive(Debug, Clone, Copy)]
pub struct ParsedQuantity {
    millis: i128,
    format: QuantityFormat,
}

impl ParsedQuantity {
    pub fn from_millis(millis: i128, format: QuantityFormat) -> Self {
        Self { millis, format }
    }

    pub fn parse(input: &str) -> Result<Self, QuantityError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(QuantityError::Empty);
        }

        let (negative, rest) = match s.as_bytes()[0] {
            b'-' => (true, &s[1..]),
            b'+' => (false, &s[1..]),
            _ => (false, s),
        };

        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, suffix) = rest.split_at(number_end);

        let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
        if (int_part.is_empty() && frac_part.is_empty())
            || frac_part.contains('.')
            || int_part.len() + frac_part.len() > MAX_DIGITS
        {
            return Err(QuantityError::InvalidNumber(input.to_string()));
        }

        let mut mantissa: i128 = 0;
        for digit in int_part.bytes().chain(frac_part.bytes()) {
            mantissa = mantissa * 10 + i128::from(digit - b'0');
        }

        let (format, scale) = parse_suffix(input, suffix)?;
        let out_of_range = || QuantityError::OutOfRange(input.to_string());

        // value = mantissa / 10^frac_len * scale, expressed in millis
        let frac_len = frac_part.len() as i32;
        let (mut numerator, mut exponent) = match scale {
            Scale::Decimal(e) | Scale::Exponent(e) => (mantissa, e + 3 - frac_len),
            Scale::Binary(n) => {
                let factor = 1024i128.pow(n);
                (
                    mantissa.checked_mul(factor).ok_or_else(out_of_range)?,
                    3 - frac_len,
                )
            }
        };

        let mut denominator: i128 = 1;
        if exponent >= 0 {
            numerator = numerator
                .checked_mul(10i128.checked_pow(exponent as u32).ok_or_else(out_of_range)?)
                .ok_or_else(out_of_range)?;
        } else {
            exponent = -exponent;
            denominator = 10i128.checked_pow(exponent as u32).ok_or_else(out_of_range)?;
        }

        // Sub-milli precision rounds up, as MilliValue does.
        let magnitude = ceil_div(numerator, denominator);
        let millis = if negative { -magnitude } else { magnitude };

        Ok(Self { millis, format })
    }

    pub fn millis(&self) -> i128 {
        self.millis
    }

    /// Whole units, rounded up: cores for CPU, bytes for memory.
    pub fn value(&self) -> i128 {
        if self.millis >= 0 {
            ceil_div(self.millis, MILLIS_PER_UNIT as i128)
        } else {
            -(-self.millis / MILLIS_PER_UNIT as i128)
        }
    }

    pub fn format(&self) -> QuantityFormat {
        self.format
    }

    pub fn is_zero(&self) -> bool {
        self.millis == 0
    }

    pub fn checked_mul(&self, multiplier: i64) -> Option<Self> {
        self.millis
            .checked_mul(i128::from(multiplier))
            .map(|millis| Self::from_millis(millis, self.format))
    }

    /// `self * numerator / denominator`, truncated to the milli-unit.
    pub fn checked_scale(&self, numerator: i128, denominator: i128) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        self.millis
            .checked_mul(numerator)
            .and_then(|n| n.checked_div(denominator))
            .map(|millis| Self::from_millis(millis, self.format))
    }

    pub fn to_quantity(&self) -> Quantity {
        Quantity(self.to_string())
    }
}

fn parse_suffix(input: &str, suffix: &str) -> Result<(QuantityFormat, Scale), QuantityError> {
    let unknown = || QuantityError::UnknownSuffix {
        value: input.to_string(),
        suffix: suffix.to_string(),
    };

    let parsed = match suffix {
        "" => (QuantityFormat::DecimalSI, Scale::Decimal(0)),
        "m" => (QuantityFormat::DecimalSI, Scale::Decimal(-3)),
        "Ki" => (QuantityFormat::BinarySI, Scale::Binary(1)),
        "Mi" => (QuantityFormat::BinarySI, Scale::Binary(2)),
        "Gi" => (QuantityFormat::BinarySI, Scale::Binary(3)),
        "Ti" => (QuantityFormat::BinarySI, Scale::Binary(4)),
        "Pi" => (QuantityFormat::BinarySI, Scale::Binary(5)),
        "Ei" => (QuantityFormat::BinarySI, Scale::Binary(6)),
        s if s.len() > 1 && (s.starts_with('e') || s.starts_with('E')) => {
            let exponent: i32 = s[1..].parse().map_err(|_| unknown())?;
            if exponent.abs() > MAX_EXPONENT {
                return Err(QuantityError::OutOfRange(input.to_string()));
            }
            (QuantityFormat::DecimalExponent, Scale::Exponent(exponent))
        }
        s => {
            let exponent = DECIMAL_SUFFIXES
                .iter()
                .find(|(_, name)| *name == s)
                .map(|(e, _)| *e)
                .ok_or_else(unknown)?;
            (QuantityFormat::DecimalSI, Scale::Decimal(exponent))
        }
    };

    Ok(parsed)
}

fn ceil_div(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    if numerator % denominator != 0 {
        quotient + 1
    } else {
        quotient
    }
}

impl fmt::Display for ParsedQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.millis == 0 {
            return write!(f, "0");
        }

        let sign = if self.millis < 0 { "-" } else { "" };
        let magnitude = self.millis.unsigned_abs();
        if magnitude % MILLIS_PER_UNIT != 0 {
            return write!(f, "{}{}m", sign, magnitude);
        }
        let units = magnitude / MILLIS_PER_UNIT;

        match self.format {
            QuantityFormat::BinarySI if units >= 1024 => {
                for (power, suffix) in BINARY_SUFFIXES {
                    let factor = 1024u128.pow(power);
                    if units % factor == 0 {
                        return write!(f, "{}{}{}", sign, units / factor, suffix);
                    }
                }
                write!(f, "{}{}", sign, units)
            }
            QuantityFormat::DecimalExponent => {
                let (mantissa, exponent) = strip_thousands(units);
                if exponent == 0 {
                    write!(f, "{}{}", sign, mantissa)
                } else {
                    write!(f, "{}{}e{}", sign, mantissa, exponent)
                }
            }
            // Binary values below 1024 are written as decimal.
            _ => {
                let (mantissa, exponent) = strip_thousands(units);
                let suffix = DECIMAL_SUFFIXES
                    .iter()
                    .find(|(e, _)| *e == exponent)
                    .map(|(_, s)| *s)
                    .unwrap_or("");
                write!(f, "{}{}{}", sign, mantissa, suffix)
            }
        }
    }
}

fn strip_thousands(mut units: u128) -> (u128, i32) {
    let mut exponent = 0;
    while units % 1000 == 0 && exponent < 18 {
        units /= 1000;
        exponent += 3;
    }
    (units, exponent)
}

impl TryFrom<&Quantity> for ParsedQuantity {
    type Error = QuantityError;

    fn try_from(quantity: &Quantity) -> Result<Self, Self::Error> {
        Self::parse(&quantity.0)
    }
}

impl PartialEq for ParsedQuantity {
    fn eq(&self, other: &Self) -> bool {
        self.millis == other.millis
    }
}

impl Eq for ParsedQuantity {}

impl PartialOrd for ParsedQuantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ParsedQuantity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.millis.cmp(&other.millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(s: &str) -> ParsedQuantity {
        ParsedQuantity::parse(s).unwrap()
    }

    #[test]
    fn test_parse_cpu_quantities() {
        assert_eq!(q("100m").millis(), 100);
        assert_eq!(q("1").millis(), 1000);
        assert_eq!(q("1.5").millis(), 1500);
        assert_eq!(q("0.5").millis(), 500);
        assert_eq!(q(".25").millis(), 250);
        assert_eq!(q("2k").millis(), 2_000_000);
    }

    #[test]
    fn test_parse_memory_quantities() {
        assert_eq!(q("100Mi").value(), 100 * 1024 * 1024);
        assert_eq!(q("1Gi").value(), 1024 * 1024 * 1024);
        assert_eq!(q("1.5Gi").value(), 1536 * 1024 * 1024);
        assert_eq!(q("128974848").value(), 128_974_848);
        assert_eq!(q("129M").value(), 129_000_000);
        assert_eq!(q("1e3").value(), 1000);
        assert_eq!(q("4Ti").value(), 4 * 1024i128.pow(4));
    }

    #[test]
    fn test_parse_sub_milli_rounds_up() {
        assert_eq!(q("0.0001").millis(), 1);
        assert_eq!(q("1.0001").millis(), 1001);
    }

    #[test]
    fn test_parse_sign() {
        assert_eq!(q("-100m").millis(), -100);
        assert_eq!(q("+1").millis(), 1000);
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert_eq!(ParsedQuantity::parse(""), Err(QuantityError::Empty));
        assert!(matches!(
            ParsedQuantity::parse("abc"),
            Err(QuantityError::InvalidNumber(_))
        ));
        assert!(matches!(
            ParsedQuantity::parse("1.2.3"),
            Err(QuantityError::InvalidNumber(_))
        ));
        assert!(matches!(
            ParsedQuantity::parse("10Xi"),
            Err(QuantityError::UnknownSuffix { .. })
        ));
        assert!(matches!(
            ParsedQuantity::parse("1e99"),
            Err(QuantityError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_format_canonical_strings() {
        assert_eq!(q("600m").to_string(), "600m");
        assert_eq!(q("1500m").to_string(), "1500m");
        assert_eq!(q("1000m").to_string(), "1");
        assert_eq!(q("2000").to_string(), "2k");
        assert_eq!(q("200Mi").to_string(), "200Mi");
        assert_eq!(q("4000Mi").to_string(), "4000Mi");
        assert_eq!(q("1024Mi").to_string(), "1Gi");
        assert_eq!(q("512Ki").to_string(), "512Ki");
        assert_eq!(q("0").to_string(), "0");
        assert_eq!(q("3e3").to_string(), "3e3");
    }

    #[test]
    fn test_format_binary_falls_back_to_decimal() {
        let small = ParsedQuantity::from_millis(512_000, QuantityFormat::BinarySI);
        assert_eq!(small.to_string(), "512");

        let fractional = ParsedQuantity::from_millis(1_500, QuantityFormat::BinarySI);
        assert_eq!(fractional.to_string(), "1500m");
    }

    #[test]
    fn test_ordering_ignores_format() {
        assert_eq!(q("1k"), q("1000"));
        assert_eq!(q("1Ki"), q("1024"));
        assert!(q("200m") > q("100m"));
        assert!(q("1Mi") < q("100Mi"));
    }

    #[test]
    fn test_checked_mul_keeps_format() {
        let limit = q("200Mi").checked_mul(2).unwrap();
        assert_eq!(limit.to_string(), "400Mi");
        assert_eq!(limit.format(), QuantityFormat::BinarySI);
    }

    #[test]
    fn test_checked_scale_preserves_ratio() {
        // 200m * 300m / 100m
        let limit = q("200m").checked_scale(300, 100).unwrap();
        assert_eq!(limit.to_string(), "600m");

        assert!(q("1").checked_scale(1, 0).is_none());
    }

    #[test]
    fn test_checked_scale_handles_cluster_scale_values() {
        // 4 TiB request scaled by a 16 TiB / 2 TiB ratio
        let request = q("4Ti");
        let limit = request
            .checked_scale(q("16Ti").millis(), q("2Ti").millis())
            .unwrap();
        assert_eq!(limit.to_string(), "32Ti");
    }

    #[test]
    fn test_try_from_quantity() {
        let parsed = ParsedQuantity::try_from(&Quantity("250m".to_string())).unwrap();
        assert_eq!(parsed.millis(), 250);
        assert!(ParsedQuantity::try_from(&Quantity("lots".to_string())).is_err());
    }

    #[test]
    fn test_to_quantity() {
        assert_eq!(q("300m").to_quantity(), Quantity("300m".to_string()));
    }
}
