// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outbound configuration deltas.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::ProtocolError;
use crate::state::{FieldPath, Fields, Section, UnknownSections, decode_sections};

/// A nested section → field → value delta sent to the unit.
///
/// The unit applies only the fields present; everything else keeps its
/// configured value. Payloads can only address the four known sections.
///
/// # Examples
///
/// ```
/// use ecostream_lib::command::CommandPayload;
/// use ecostream_lib::state::fields;
///
/// let payload = CommandPayload::new()
///     .with(&fields::MAN_OVERRIDE_SET, 140)
///     .with(&fields::MAN_OVERRIDE_SET_TIME, 1800);
///
/// assert_eq!(
///     payload.to_json(),
///     serde_json::json!({"config": {"man_override_set": 140, "man_override_set_time": 1800}})
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CommandPayload {
    sections: BTreeMap<Section, Fields>,
}

impl CommandPayload {
    /// Creates an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a payload from raw JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if `value` is not an object of objects, names
    /// an unknown section, or carries no fields.
    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        let sections = decode_sections(value, UnknownSections::Reject)?;
        let payload = Self { sections };
        if payload.is_empty() {
            return Err(ProtocolError::EmptyPayload);
        }
        Ok(payload)
    }

    /// Adds a field, replacing any previous value for the same path.
    #[must_use]
    pub fn with(mut self, path: &FieldPath, value: impl Into<Value>) -> Self {
        self.set(path, value);
        self
    }

    /// Sets a field in place.
    pub fn set(&mut self, path: &FieldPath, value: impl Into<Value>) {
        self.sections
            .entry(path.section())
            .or_default()
            .insert(path.field().to_string(), value.into());
    }

    /// Adds every field of `other`, which wins on conflicts.
    #[must_use]
    pub fn merged(mut self, other: Self) -> Self {
        for (section, fields) in other.sections {
            self.sections.entry(section).or_default().extend(fields);
        }
        self
    }

    /// Returns the value queued for `path`.
    #[must_use]
    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        self.sections.get(&path.section())?.get(path.field())
    }

    /// Returns the paths carried by the payload.
    #[must_use]
    pub fn paths(&self) -> Vec<FieldPath> {
        self.sections
            .iter()
            .flat_map(|(section, fields)| {
                fields
                    .keys()
                    .map(|field| FieldPath::owned(*section, field.clone()))
            })
            .collect()
    }

    /// Returns the number of fields carried.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.sections.values().map(serde_json::Map::len).sum()
    }

    /// Returns `true` if the payload carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }

    /// Returns the payload as a JSON document.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.sections
                .iter()
                .filter(|(_, fields)| !fields.is_empty())
                .map(|(section, fields)| (section.as_str().to_string(), Value::Object(fields.clone())))
                .collect(),
        )
    }

    /// Serializes the payload into a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::EmptyPayload`] for a payload without fields.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        if self.is_empty() {
            return Err(ProtocolError::EmptyPayload);
        }
        serde_json::to_string(&self.to_json()).map_err(|err| ProtocolError::Encode(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::state::fields;

    #[test]
    fn builds_nested_document() {
        let payload = CommandPayload::new()
            .with(&fields::SUM_COM_ENABLED, true)
            .with(&fields::WIFI_SSID, "home");
        assert_eq!(
            payload.to_json(),
            json!({"comm_wifi": {"ssid": "home"}, "config": {"sum_com_enabled": true}})
        );
        assert_eq!(payload.field_count(), 2);
        assert_eq!(payload.get(&fields::SUM_COM_ENABLED), Some(&json!(true)));
    }

    #[test]
    fn later_values_win() {
        let payload = CommandPayload::new()
            .with(&fields::MAN_OVERRIDE_SET, 100)
            .merged(CommandPayload::new().with(&fields::MAN_OVERRIDE_SET, 200));
        assert_eq!(payload.get(&fields::MAN_OVERRIDE_SET), Some(&json!(200)));
    }

    #[test]
    fn from_value_is_strict() {
        assert!(CommandPayload::from_value(json!({"config": {"schedule_enabled": false}})).is_ok());
        assert_eq!(
            CommandPayload::from_value(json!({"firmware": {"update": true}})),
            Err(ProtocolError::UnknownSection("firmware".to_string()))
        );
        assert_eq!(
            CommandPayload::from_value(json!({"config": {}})),
            Err(ProtocolError::EmptyPayload)
        );
        assert!(CommandPayload::from_value(json!("config")).is_err());
    }

    #[test]
    fn encode_rejects_empty_payload() {
        assert_eq!(CommandPayload::new().encode(), Err(ProtocolError::EmptyPayload));
    }

    #[test]
    fn encode_produces_json_text() {
        let text = CommandPayload::new()
            .with(&fields::MAN_OVERRIDE_BYPASS, 0)
            .encode()
            .unwrap();
        let decoded: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(decoded, json!({"config": {"man_override_bypass": 0}}));
    }

    #[test]
    fn paths_lists_every_field() {
        let payload = CommandPayload::new()
            .with(&fields::MAN_OVERRIDE_BYPASS, 0)
            .with(&fields::MAN_OVERRIDE_BYPASS_TIME, 0);
        assert_eq!(
            payload.paths(),
            vec![fields::MAN_OVERRIDE_BYPASS, fields::MAN_OVERRIDE_BYPASS_TIME]
        );
    }
}
