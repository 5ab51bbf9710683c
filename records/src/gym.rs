//! Gym records
//!
//! Gyms arrive either as JSON objects or as positional arrays. Both
//! shapes have had a few spellings over time; all of them are accepted
//! and normalized into a single [`GymRecord`].

use anyhow::Result;
use serde_json::{Value, json};

use crate::{ParseError, invalid_value, string_list};

/// A gym as read from a source file, before any validation of names or
/// coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct GymRecord {
    /// Display names; the first one is the primary name
    pub names: Vec<String>,
    pub city: String,
    pub zones: Vec<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub is_ex_eligible: bool,
}

impl GymRecord {
    /// Primary display name
    pub fn name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or("")
    }

    /// Names after the primary one
    pub fn alternate_names(&self) -> &[String] {
        self.names.get(1..).unwrap_or(&[])
    }

    /// Positional form: `[zones, city, names, latitude, longitude, isExEligible]`
    pub fn to_array(&self) -> Value {
        let names = if self.names.len() == 1 {
            json!(self.names[0])
        } else {
            json!(self.names)
        };
        json!([
            self.zones,
            self.city,
            names,
            self.latitude,
            self.longitude,
            self.is_ex_eligible
        ])
    }

    /// Object form
    pub fn to_json(&self) -> Value {
        let mut obj = json!({
            "zones": self.zones,
            "city": self.city,
            "name": self.name(),
            "coord": { "latitude": self.latitude, "longitude": self.longitude },
            "isExEligible": self.is_ex_eligible,
        });
        if !self.alternate_names().is_empty() {
            obj["alternateNames"] = json!(self.alternate_names());
        }
        obj
    }
}

/// Parse a list of gyms from file contents.
pub fn parse_gyms(contents: &str) -> Result<Vec<GymRecord>> {
    let value: Value = serde_json::from_str(contents).map_err(ParseError::from)?;
    let items = value
        .as_array()
        .ok_or_else(|| ParseError::InvalidFormat("gym file must contain an array".to_string()))?;

    items.iter().map(parse_gym_record).collect()
}

/// Parse a single gym record in either object or array form.
pub fn parse_gym_record(value: &Value) -> Result<GymRecord> {
    match value {
        Value::Array(parts) => parse_array(parts),
        Value::Object(_) => parse_object(value),
        other => Err(ParseError::InvalidFormat(format!("unexpected gym record {other}")).into()),
    }
}

fn parse_array(parts: &[Value]) -> Result<GymRecord> {
    // [zones, city, names, latitude, longitude, isExEligible?]
    if parts.len() < 5 {
        return Err(
            ParseError::MissingField("gym array needs at least 5 elements".to_string()).into(),
        );
    }

    let zones = string_list(&parts[0], "zones")?;
    let city = required_str(&parts[1], "city")?;
    let names = string_list_no_split(&parts[2], "names")?;
    let latitude = number(&parts[3], "latitude")?;
    let longitude = number(&parts[4], "longitude")?;
    let is_ex_eligible = match parts.get(5) {
        Some(flag) => ex_flag(flag)?,
        None => false,
    };

    finish(names, city, zones, latitude, longitude, is_ex_eligible)
}

fn parse_object(value: &Value) -> Result<GymRecord> {
    let mut names = match (value.get("name"), value.get("names")) {
        (Some(name), _) => vec![required_str(name, "name")?],
        (None, Some(names)) => string_list_no_split(names, "names")?,
        (None, None) => return Err(ParseError::MissingField("name".to_string()).into()),
    };
    if let Some(alternates) = value.get("alternateNames") {
        names.extend(string_list_no_split(alternates, "alternateNames")?);
    }

    let city = value
        .get("city")
        .ok_or_else(|| ParseError::MissingField("city".to_string()))
        .and_then(|v| required_str(v, "city"))?;

    let zones = match (value.get("zones"), value.get("zone")) {
        (Some(zones), _) | (None, Some(zones)) => string_list(zones, "zones")?,
        (None, None) => return Err(ParseError::MissingField("zones".to_string()).into()),
    };

    let (latitude, longitude) = match value.get("coord") {
        Some(Value::Array(pair)) if pair.len() == 2 => (
            number(&pair[0], "latitude")?,
            number(&pair[1], "longitude")?,
        ),
        Some(coord @ Value::Object(_)) => (
            field_number(coord, "latitude")?,
            field_number(coord, "longitude")?,
        ),
        Some(other) => return Err(invalid_value("coord", other).into()),
        None => (
            field_number(value, "latitude")?,
            field_number(value, "longitude")?,
        ),
    };

    let is_ex_eligible = match value.get("isExEligible") {
        Some(flag) => ex_flag(flag)?,
        None => false,
    };

    finish(names, city, zones, latitude, longitude, is_ex_eligible)
}

fn finish(
    names: Vec<String>,
    city: String,
    zones: Vec<String>,
    latitude: f64,
    longitude: f64,
    is_ex_eligible: bool,
) -> Result<GymRecord> {
    if names.is_empty() {
        return Err(ParseError::MissingField("name".to_string()).into());
    }
    if zones.is_empty() {
        return Err(ParseError::MissingField("zones".to_string()).into());
    }

    Ok(GymRecord {
        names,
        city,
        zones,
        latitude,
        longitude,
        is_ex_eligible,
    })
}

fn required_str(value: &Value, field: &str) -> Result<String, ParseError> {
    value
        .as_str()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| invalid_value(field, value))
}

// Names may legitimately contain commas, so a bare string is a single name.
fn string_list_no_split(value: &Value, field: &str) -> Result<Vec<String>, ParseError> {
    match value {
        Value::String(s) => Ok(vec![s.trim().to_string()]),
        _ => string_list(value, field),
    }
}

fn number(value: &Value, field: &str) -> Result<f64, ParseError> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| invalid_value(field, value)),
        Value::String(s) => s.trim().parse().map_err(|_| invalid_value(field, value)),
        _ => Err(invalid_value(field, value)),
    }
}

fn field_number(obj: &Value, field: &str) -> Result<f64, ParseError> {
    let value = obj
        .get(field)
        .ok_or_else(|| ParseError::MissingField(field.to_string()))?;
    number(value, field)
}

fn ex_flag(value: &Value) -> Result<bool, ParseError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Null => Ok(false),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "" | "false" | "no" => Ok(false),
            "ex" | "true" | "yes" => Ok(true),
            _ => Err(invalid_value("isExEligible", value)),
        },
        _ => Err(invalid_value("isExEligible", value)),
    }
}
