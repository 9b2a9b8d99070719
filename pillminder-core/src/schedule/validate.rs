//! Descriptor validation
//!
//! A batch passes only if every descriptor in it passes. Errors of all
//! descriptors are collected and sorted by origin, then field path.

use serde_json::{Map, Value};
use thiserror::Error;

use super::descriptor::{check_name, ScheduleDescriptor};
use super::recurrence::{HourField, Recurrence};
use crate::config::SLOT_COUNT;

/// One schema violation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{origin}: {}: {message}", field_label(.path))]
pub struct ValidationError {
    /// Where the descriptor came from (file path or batch label)
    pub origin: String,
    /// Field path inside the descriptor, `/name` style; empty for the root
    pub path: String,
    /// What is wrong
    pub message: String,
}

impl ValidationError {
    fn new(origin: &str, path: &str, message: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            path: path.into(),
            message: message.into(),
        }
    }
}

fn field_label(path: &str) -> &str {
    if path.is_empty() {
        "(root)"
    } else {
        path
    }
}

/// Validate every descriptor of a batch
///
/// Returns the parsed descriptors only when all of them are valid.
pub fn validate_batch(
    batch: &[(String, Value)],
    hour_field: HourField,
) -> Result<Vec<ScheduleDescriptor>, Vec<ValidationError>> {
    let mut descriptors = Vec::with_capacity(batch.len());
    let mut errors = Vec::new();

    for (origin, value) in batch {
        match validate_descriptor(origin, value, hour_field) {
            Ok(d) => descriptors.push(d),
            Err(mut e) => errors.append(&mut e),
        }
    }

    if errors.is_empty() {
        Ok(descriptors)
    } else {
        errors.sort_by(|a, b| (&a.origin, &a.path).cmp(&(&b.origin, &b.path)));
        Err(errors)
    }
}

/// Validate one descriptor, reporting every violation
pub fn validate_descriptor(
    origin: &str,
    value: &Value,
    hour_field: HourField,
) -> Result<ScheduleDescriptor, Vec<ValidationError>> {
    let Some(object) = value.as_object() else {
        return Err(vec![ValidationError::new(origin, "", "expected an object")]);
    };

    let mut errors = Vec::new();
    let mut check = |field: &str, result: Result<(), String>| {
        if let Err(message) = result {
            errors.push(ValidationError::new(origin, &format!("/{}", field), message));
        }
    };

    let name = string(object, "name", true);
    check("name", name.clone().and_then(|n| check_name(n.as_deref().unwrap_or(""))));

    let dosage = string(object, "dosage", true);
    check("dosage", dosage.clone().map(drop));

    let slot = match object.get("slot") {
        None => Err("required property missing".to_string()),
        Some(v) => match v.as_u64() {
            Some(s) if (s as usize) < SLOT_COUNT => Ok(s as u8),
            Some(s) => Err(format!("slot {} is outside 0-{}", s, SLOT_COUNT - 1)),
            None => Err(format!("expected an integer, found {}", v)),
        },
    };
    check("slot", slot.clone().map(drop));

    let hour = string(object, "hour", true);
    let day_of_week = string(object, "day_of_week", false);
    if let Ok(Some(h)) = &hour {
        check(
            "hour",
            Recurrence::new(h, None, hour_field)
                .map(drop)
                .map_err(|e| e.to_string()),
        );
    } else {
        check("hour", hour.clone().map(drop));
    }
    if let Ok(Some(d)) = &day_of_week {
        check(
            "day_of_week",
            Recurrence::parse_days(d).map(drop).map_err(|e| e.to_string()),
        );
    } else {
        check("day_of_week", day_of_week.clone().map(drop));
    }

    let special = string(object, "special", false);
    check("special", special.clone().map(drop));

    match (name, dosage, slot, hour, day_of_week, special) {
        (Ok(Some(name)), Ok(Some(dosage)), Ok(slot), Ok(Some(hour)), Ok(day_of_week), Ok(special))
            if errors.is_empty() =>
        {
            Ok(ScheduleDescriptor {
                name,
                dosage,
                slot,
                hour,
                day_of_week,
                special,
            })
        }
        _ => Err(errors),
    }
}

/// Read an optional or required string property
fn string(object: &Map<String, Value>, key: &str, required: bool) -> Result<Option<String>, String> {
    match object.get(key) {
        None if required => Err("required property missing".into()),
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(format!("expected a string, found {}", other)),
    }
}
