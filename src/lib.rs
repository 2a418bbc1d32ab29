#![deny(clippy::unwrap_used)]

use serde::de::IntoDeserializer;
use serde::Deserialize;

pub mod config;
pub mod control;
pub mod product;

pub fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    let opt = Option::<String>::deserialize(de)?;
    let opt = opt.as_deref();
    match opt {
        None | Some("") | Some("all") | Some("any") => Ok(None),
        Some(s) => T::deserialize(s.into_deserializer()).map(Some),
    }
}

pub fn empty_string_as_none_parse<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: std::str::FromStr,
    <T as std::str::FromStr>::Err: std::fmt::Debug,
{
    let opt = Option::<String>::deserialize(de)?;
    let opt = opt.as_deref();
    match opt {
        None | Some("") | Some("all") | Some("any") => Ok(None),
        Some(s) => s
            .trim()
            .parse()
            .map_err(|err| serde::de::Error::custom(format!("{err:?}")))
            .map(Some),
    }
}
