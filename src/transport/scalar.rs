//! Decoders for scalars the API does not send in their natural JSON form.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::{Error as DeError, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::domain::{Dimensions, MacAddress, ScalarError, parse_unsigned};

pub const ZERO_DATE: &str = "0000-00-00 00:00:00";
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse `YYYY-MM-DD HH:MM:SS`; the zero date means "unset".
pub fn parse_api_date(value: &str) -> Result<Option<DateTime<Utc>>, ScalarError> {
    if value == ZERO_DATE {
        return Ok(None);
    }
    let err = || ScalarError::new("api date", value);

    // chrono tolerates unpadded fields; the API never sends them.
    let shape_ok = value.len() == ZERO_DATE.len()
        && value
            .bytes()
            .zip(ZERO_DATE.bytes())
            .all(|(b, template)| match template {
                b'0' => b.is_ascii_digit(),
                other => b == other,
            });
    if !shape_ok {
        return Err(err());
    }

    NaiveDateTime::parse_from_str(value, DATE_FORMAT)
        .map(|naive| Some(naive.and_utc()))
        .map_err(|_| err())
}

pub fn format_api_date(value: Option<DateTime<Utc>>) -> String {
    match value {
        Some(date) => date.format(DATE_FORMAT).to_string(),
        None => ZERO_DATE.to_owned(),
    }
}

/// `"1"` is true; any other string is false.
pub fn parse_quoted_bool(value: &str) -> bool {
    value == "1"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Boolean transmitted as a JSON string: only `"1"` is true.
///
/// Any other token, quoted or not, decodes to false; this never fails on
/// well-formed JSON.
pub struct QuotedBool(pub bool);

impl<'de> Deserialize<'de> for QuotedBool {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct QuotedBoolVisitor;

        impl<'de> Visitor<'de> for QuotedBoolVisitor {
            type Value = QuotedBool;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("any JSON value")
            }

            fn visit_str<E: DeError>(self, value: &str) -> Result<Self::Value, E> {
                Ok(QuotedBool(parse_quoted_bool(value)))
            }

            fn visit_bool<E: DeError>(self, _: bool) -> Result<Self::Value, E> {
                Ok(QuotedBool(false))
            }

            fn visit_i64<E: DeError>(self, _: i64) -> Result<Self::Value, E> {
                Ok(QuotedBool(false))
            }

            fn visit_u64<E: DeError>(self, _: u64) -> Result<Self::Value, E> {
                Ok(QuotedBool(false))
            }

            fn visit_f64<E: DeError>(self, _: f64) -> Result<Self::Value, E> {
                Ok(QuotedBool(false))
            }

            fn visit_unit<E: DeError>(self) -> Result<Self::Value, E> {
                Ok(QuotedBool(false))
            }

            fn visit_none<E: DeError>(self) -> Result<Self::Value, E> {
                Ok(QuotedBool(false))
            }

            fn visit_some<D2>(self, deserializer: D2) -> Result<Self::Value, D2::Error>
            where
                D2: Deserializer<'de>,
            {
                IgnoredAny::deserialize(deserializer)?;
                Ok(QuotedBool(false))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(QuotedBool(false))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
                Ok(QuotedBool(false))
            }
        }

        deserializer.deserialize_any(QuotedBoolVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Boolean sent as a JSON bool on some endpoints and as a quoted or bare
/// number on others.
///
/// Decoded through `deserialize_any` so it also works inside untagged enums.
pub struct FlexBool(pub bool);

impl<'de> Deserialize<'de> for FlexBool {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FlexBoolVisitor;

        impl Visitor<'_> for FlexBoolVisitor {
            type Value = FlexBool;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a boolean, a quoted number or a number")
            }

            fn visit_bool<E: DeError>(self, value: bool) -> Result<Self::Value, E> {
                Ok(FlexBool(value))
            }

            fn visit_u64<E: DeError>(self, value: u64) -> Result<Self::Value, E> {
                Ok(FlexBool(value == 1))
            }

            fn visit_str<E: DeError>(self, value: &str) -> Result<Self::Value, E> {
                Ok(FlexBool(parse_quoted_bool(value)))
            }
        }

        deserializer.deserialize_any(FlexBoolVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Zero-date aware timestamp.
pub struct ApiDate(pub Option<DateTime<Utc>>);

impl<'de> Deserialize<'de> for ApiDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        parse_api_date(&value).map(Self).map_err(D::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireMac(pub MacAddress);

impl<'de> Deserialize<'de> for WireMac {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        MacAddress::parse(&value).map(Self).map_err(D::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireDimensions(pub Dimensions);

impl<'de> Deserialize<'de> for WireDimensions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Dimensions::parse(&value).map(Self).map_err(D::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Unsigned integer returned as either a JSON string or a JSON number.
pub struct FlexUint<T>(pub T);

impl<T: Copy> FlexUint<T> {
    pub fn get(self) -> T {
        self.0
    }
}

impl<'de, T: FromStr> Deserialize<'de> for FlexUint<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FlexUintVisitor<T>(PhantomData<T>);

        impl<T: FromStr> Visitor<'_> for FlexUintVisitor<T> {
            type Value = FlexUint<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an unsigned integer as a string or a number")
            }

            fn visit_u64<E: DeError>(self, value: u64) -> Result<Self::Value, E> {
                self.visit_str(&value.to_string())
            }

            fn visit_str<E: DeError>(self, value: &str) -> Result<Self::Value, E> {
                parse_unsigned(value)
                    .map(FlexUint)
                    .ok_or_else(|| E::custom(ScalarError::new("unsigned integer", value)))
            }
        }

        deserializer.deserialize_any(FlexUintVisitor(PhantomData))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
/// Decimal returned as either a JSON string or a JSON number.
pub struct FlexFloat(pub f64);

impl<'de> Deserialize<'de> for FlexFloat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FlexFloatVisitor;

        impl Visitor<'_> for FlexFloatVisitor {
            type Value = FlexFloat;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal as a string or a number")
            }

            fn visit_f64<E: DeError>(self, value: f64) -> Result<Self::Value, E> {
                Ok(FlexFloat(value))
            }

            fn visit_u64<E: DeError>(self, value: u64) -> Result<Self::Value, E> {
                Ok(FlexFloat(value as f64))
            }

            fn visit_i64<E: DeError>(self, value: i64) -> Result<Self::Value, E> {
                Ok(FlexFloat(value as f64))
            }

            fn visit_str<E: DeError>(self, value: &str) -> Result<Self::Value, E> {
                value
                    .trim()
                    .parse::<f64>()
                    .map(FlexFloat)
                    .map_err(|_| E::custom(ScalarError::new("decimal", value)))
            }
        }

        deserializer.deserialize_any(FlexFloatVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
/// Collection serialized by PHP as a list, or as an object once its keys stop
/// being sequential.
pub enum ListOrMap<T> {
    List(Vec<T>),
    Map(BTreeMap<String, T>),
}

impl<T> Default for ListOrMap<T> {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl<T> ListOrMap<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::List(items) => items,
            Self::Map(items) => items.into_values().collect(),
        }
    }

    /// Keyed view; list entries are keyed by their index.
    pub fn into_map(self) -> BTreeMap<String, T> {
        match self {
            Self::List(items) => items
                .into_iter()
                .enumerate()
                .map(|(idx, item)| (idx.to_string(), item))
                .collect(),
            Self::Map(items) => items,
        }
    }
}
