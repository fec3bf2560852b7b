use std::fmt;

use serde::de::{self, Deserializer, Unexpected};
use serde::{Deserialize, Serialize, Serializer};

/// Marker stored in the `TSU` column when the eruption caused a tsunami.
pub const TSUNAMI_MARKER: &str = "tsu";

/// Highest value on the Volcanic Explosivity Index.
pub const MAX_VEI: u8 = 8;

// ---------------------------------------------------------------------------
// Volcano – one eruption event
// ---------------------------------------------------------------------------

/// A single eruption record (one object of the source dataset).
///
/// Field-level normalization happens while deserializing, so the query layer
/// never sees the string encodings used on disk:
/// * `Year`   – `null`, an empty CSV cell or a missing key become `None`.
/// * `DEATHS` – `""`, `null` or a missing key become `None`.
/// * `TSU`    – `"tsu"` becomes `true`, `""`/`null`/missing become `false`.
/// * `Agent`  – the comma-separated list is split into tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Volcano {
    #[serde(rename = "Name", alias = "name")]
    pub name: String,

    #[serde(rename = "Country", alias = "country")]
    pub country: String,

    /// Morphological type, e.g. "Stratovolcano".
    #[serde(rename = "Type", alias = "type")]
    pub kind: String,

    /// Eruption year; negative for BCE, `None` when the record has none.
    #[serde(rename = "Year", alias = "year", default)]
    pub year: Option<i32>,

    /// Signed degrees, positive in the northern hemisphere.
    #[serde(rename = "Latitude", alias = "latitude")]
    pub latitude: f64,

    #[serde(rename = "VEI", alias = "vei", deserialize_with = "deserialize_vei")]
    pub vei: u8,

    /// Meters above sea level.
    #[serde(rename = "Elevation", alias = "elevation")]
    pub elevation: f64,

    /// Recorded death toll, `None` when unknown.
    #[serde(
        rename = "DEATHS",
        alias = "deaths",
        alias = "Deaths",
        default,
        deserialize_with = "deserialize_deaths",
        serialize_with = "serialize_deaths"
    )]
    pub deaths: Option<u64>,

    #[serde(
        rename = "TSU",
        alias = "tsu",
        alias = "Tsu",
        default,
        deserialize_with = "deserialize_tsunami",
        serialize_with = "serialize_tsunami"
    )]
    pub tsunami: bool,

    /// Causes of death, e.g. `["A", "T"]`.
    #[serde(
        rename = "Agent",
        alias = "agent",
        default,
        deserialize_with = "deserialize_agents",
        serialize_with = "serialize_agents"
    )]
    pub agents: Vec<String>,
}

impl Volcano {
    /// Death toll with unknown counted as zero.
    pub fn deaths_or_zero(&self) -> u64 {
        self.deaths.unwrap_or(0)
    }

    pub fn is_northern(&self) -> bool {
        self.latitude > 0.0
    }
}

impl fmt::Display for Volcano {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.country, self.kind)?;
        match self.year {
            Some(year) => write!(f, " year {year}")?,
            None => write!(f, " year unknown")?,
        }
        write!(f, " VEI {}", self.vei)?;
        if let Some(deaths) = self.deaths {
            write!(f, ", {deaths} deaths")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Deserialization helpers
// ---------------------------------------------------------------------------

fn deserialize_vei<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let vei = u8::deserialize(deserializer)?;
    if vei > MAX_VEI {
        return Err(de::Error::invalid_value(
            Unexpected::Unsigned(u64::from(vei)),
            &"a VEI between 0 and 8",
        ));
    }
    Ok(vei)
}

/// Accepts a digit string, `""` or `null`.  Every format goes through the
/// string check, so a CSV cell like `+5` is rejected just as in JSON.
fn deserialize_deaths<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    const EXPECTED: &str = "a string of decimal digits or an empty string";

    let raw: Option<String> = Option::deserialize(deserializer)?;
    let text = match raw.as_deref() {
        None | Some("") => return Ok(None),
        Some(text) => text,
    };
    // `u64::from_str` also takes a leading '+', which the dataset never uses.
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(de::Error::invalid_value(Unexpected::Str(text), &EXPECTED));
    }
    text.parse::<u64>()
        .map(Some)
        .map_err(|_| de::Error::invalid_value(Unexpected::Str(text), &EXPECTED))
}

fn deserialize_tsunami<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let marker: Option<String> = Option::deserialize(deserializer)?;
    match marker.as_deref() {
        None | Some("") => Ok(false),
        Some(TSUNAMI_MARKER) => Ok(true),
        Some(other) => Err(de::Error::invalid_value(
            Unexpected::Str(other),
            &"\"tsu\" or an empty string",
        )),
    }
}

fn deserialize_agents<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .unwrap_or("")
        .split(',')
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect())
}

// ---------------------------------------------------------------------------
// Serialization helpers (write back the on-disk encoding)
// ---------------------------------------------------------------------------

fn serialize_deaths<S: Serializer>(deaths: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
    match deaths {
        Some(n) => serializer.serialize_str(&n.to_string()),
        None => serializer.serialize_str(""),
    }
}

fn serialize_tsunami<S: Serializer>(tsunami: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *tsunami { TSUNAMI_MARKER } else { "" })
}

fn serialize_agents<S: Serializer>(agents: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&agents.join(","))
}
