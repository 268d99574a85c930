//! Indicator values and the fixed indicator set.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const UNAVAILABLE: &str = "unavailable";

/// The six indicators every analysis reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IndicatorKind {
    #[serde(rename = "sma_50")]
    SmaFast,
    #[serde(rename = "sma_200")]
    SmaSlow,
    #[serde(rename = "momentum")]
    Momentum,
    #[serde(rename = "volatility")]
    Volatility,
    #[serde(rename = "return_6m")]
    Return6m,
    #[serde(rename = "return_1m")]
    Return1m,
}

impl IndicatorKind {
    /// All kinds in report order.
    pub const ALL: [IndicatorKind; 6] = [
        Self::SmaFast,
        Self::SmaSlow,
        Self::Momentum,
        Self::Volatility,
        Self::Return6m,
        Self::Return1m,
    ];

    /// Report field name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SmaFast => "sma_50",
            Self::SmaSlow => "sma_200",
            Self::Momentum => "momentum",
            Self::Volatility => "volatility",
            Self::Return6m => "return_6m",
            Self::Return1m => "return_1m",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A computed metric or an explicit marker that it could not be computed.
///
/// Serializes as a JSON number or the string `"unavailable"`; a missing
/// value is never rendered as zero or null.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum IndicatorValue {
    Available(f64),
    #[default]
    Unavailable,
}

impl IndicatorValue {
    /// Wrap a raw result, treating non-finite numbers as unavailable.
    pub fn from_f64(value: f64) -> Self {
        if value.is_finite() {
            Self::Available(value)
        } else {
            Self::Unavailable
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Available(v) => Some(*v),
            Self::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

impl From<Option<f64>> for IndicatorValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Unavailable, Self::from_f64)
    }
}

impl fmt::Display for IndicatorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available(v) => write!(f, "{v:.4}"),
            Self::Unavailable => f.write_str(UNAVAILABLE),
        }
    }
}

impl Serialize for IndicatorValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Available(v) => serializer.serialize_f64(*v),
            Self::Unavailable => serializer.serialize_str(UNAVAILABLE),
        }
    }
}

impl<'de> Deserialize<'de> for IndicatorValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValueVisitor;

        impl Visitor<'_> for ValueVisitor {
            type Value = IndicatorValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a finite number or \"{UNAVAILABLE}\"")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                if v.is_finite() {
                    Ok(IndicatorValue::Available(v))
                } else {
                    Err(E::custom("indicator value must be finite"))
                }
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(IndicatorValue::Available(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(IndicatorValue::Available(v as f64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                if v == UNAVAILABLE {
                    Ok(IndicatorValue::Unavailable)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(v), &self))
                }
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

/// Indicators derived from one price series.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub sma_50: IndicatorValue,
    pub sma_200: IndicatorValue,
    pub momentum: IndicatorValue,
    pub volatility: IndicatorValue,
    pub return_6m: IndicatorValue,
    pub return_1m: IndicatorValue,
}

impl IndicatorSet {
    /// Look up one indicator by kind.
    pub fn get(&self, kind: IndicatorKind) -> IndicatorValue {
        match kind {
            IndicatorKind::SmaFast => self.sma_50,
            IndicatorKind::SmaSlow => self.sma_200,
            IndicatorKind::Momentum => self.momentum,
            IndicatorKind::Volatility => self.volatility,
            IndicatorKind::Return6m => self.return_6m,
            IndicatorKind::Return1m => self.return_1m,
        }
    }

    /// Iterate `(kind, value)` pairs in report order.
    pub fn iter(&self) -> impl Iterator<Item = (IndicatorKind, IndicatorValue)> + '_ {
        IndicatorKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }

    /// Kinds that could not be computed.
    pub fn unavailable(&self) -> Vec<IndicatorKind> {
        self.iter()
            .filter(|(_, value)| !value.is_available())
            .map(|(kind, _)| kind)
            .collect()
    }
}
