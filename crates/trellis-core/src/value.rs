// crates/trellis-core/src/value.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::StyleError;

/// A dimensional style value: points, a percentage of the reference size,
/// `Auto`, or `Undefined` when nothing was set.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawValue", into = "String")]
pub enum StyleValue {
    #[default]
    Undefined,
    /// Let the solver decide
    Auto,
    /// Fixed length in points
    Point(f32),
    /// Percentage of the reference size, as written (50.0 is half)
    Percent(f32),
}

/// Unit tags used by the packed `u64` form.
const UNIT_UNDEFINED: u32 = 0;
const UNIT_POINT: u32 = 1;
const UNIT_PERCENT: u32 = 2;
const UNIT_AUTO: u32 = 3;

impl StyleValue {
    /// Points; NaN is treated as "not set".
    pub fn point(value: f32) -> Self {
        if value.is_nan() {
            StyleValue::Undefined
        } else {
            StyleValue::Point(value)
        }
    }

    /// Percentage; NaN is treated as "not set".
    pub fn percent(value: f32) -> Self {
        if value.is_nan() {
            StyleValue::Undefined
        } else {
            StyleValue::Percent(value)
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, StyleValue::Auto)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, StyleValue::Undefined)
    }

    /// True for values that carry a number (points or percent).
    pub fn is_defined(&self) -> bool {
        matches!(self, StyleValue::Point(_) | StyleValue::Percent(_))
    }

    /// Resolve against the reference size. Percentages need a defined
    /// reference; `Auto` and `Undefined` never resolve.
    pub fn resolve(&self, reference: Option<f32>) -> Option<f32> {
        match *self {
            StyleValue::Point(value) => Some(value),
            StyleValue::Percent(pct) => reference.map(|size| size * pct / 100.0),
            StyleValue::Auto | StyleValue::Undefined => None,
        }
    }

    /// Same as [`resolve`](Self::resolve) but unresolvable values count as zero.
    pub fn resolve_or_zero(&self, reference: Option<f32>) -> f32 {
        self.resolve(reference).unwrap_or(0.0)
    }

    /// Packs the value into one `u64`: unit tag in the high half, `f32` bits
    /// in the low half.
    pub fn to_bits(self) -> u64 {
        let (unit, value) = match self {
            StyleValue::Undefined => (UNIT_UNDEFINED, f32::NAN),
            StyleValue::Auto => (UNIT_AUTO, f32::NAN),
            StyleValue::Point(value) => (UNIT_POINT, value),
            StyleValue::Percent(value) => (UNIT_PERCENT, value),
        };
        ((unit as u64) << 32) | value.to_bits() as u64
    }

    pub fn from_bits(bits: u64) -> Result<Self, StyleError> {
        let unit = (bits >> 32) as u32;
        let value = f32::from_bits(bits as u32);
        match unit {
            UNIT_UNDEFINED => Ok(StyleValue::Undefined),
            UNIT_AUTO => Ok(StyleValue::Auto),
            UNIT_POINT => Ok(StyleValue::point(value)),
            UNIT_PERCENT => Ok(StyleValue::percent(value)),
            other => Err(StyleError::InvalidUnit(other)),
        }
    }
}

impl FromStr for StyleValue {
    type Err = StyleError;

    /// Accepts "auto", "undefined", "50%", "12px", "12pt" and bare numbers.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        let invalid = || StyleError::InvalidValue(value.to_string());

        match value {
            "auto" => return Ok(StyleValue::Auto),
            "undefined" | "" => return Ok(StyleValue::Undefined),
            _ => {}
        }

        if let Some(pct) = value.strip_suffix('%') {
            return pct.trim().parse::<f32>().map(StyleValue::percent).map_err(|_| invalid());
        }

        let number = value
            .strip_suffix("px")
            .or_else(|| value.strip_suffix("pt"))
            .unwrap_or(value);
        number.trim().parse::<f32>().map(StyleValue::point).map_err(|_| invalid())
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Undefined => write!(f, "undefined"),
            StyleValue::Auto => write!(f, "auto"),
            StyleValue::Point(value) => write!(f, "{}", value),
            StyleValue::Percent(value) => write!(f, "{}%", value),
        }
    }
}

impl From<f32> for StyleValue {
    fn from(value: f32) -> Self {
        StyleValue::point(value)
    }
}

impl From<StyleValue> for String {
    fn from(value: StyleValue) -> Self {
        value.to_string()
    }
}

/// Documents may write lengths either as JSON numbers or as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f32),
    Text(String),
}

impl TryFrom<RawValue> for StyleValue {
    type Error = StyleError;

    fn try_from(raw: RawValue) -> Result<Self, Self::Error> {
        match raw {
            RawValue::Number(value) => Ok(StyleValue::point(value)),
            RawValue::Text(text) => text.parse(),
        }
    }
}
