// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoded inbound messages.

use std::collections::BTreeMap;

use serde_json::Value;

use super::{Fields, Section};
use crate::error::ProtocolError;

/// A decoded, partial snapshot pushed by the unit.
///
/// Decoding is all-or-nothing: either the whole message is accepted or an
/// error is returned and nothing can be merged. Unknown top-level keys are
/// skipped, known sections must be JSON objects.
///
/// # Examples
///
/// ```
/// use ecostream_lib::state::{Section, StateUpdate};
///
/// let update = StateUpdate::parse(r#"{"status":{"qset":140},"firmware":"x"}"#).unwrap();
/// assert_eq!(update.section(Section::Status).unwrap()["qset"], 140);
/// assert!(update.section(Section::Config).is_none());
///
/// assert!(StateUpdate::parse("[1,2]").is_err());
/// assert!(StateUpdate::parse(r#"{"status":3}"#).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    sections: BTreeMap<Section, Fields>,
}

impl StateUpdate {
    /// Decodes a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if the frame is not JSON, not an object, or
    /// carries a known section that is not an object.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Decodes an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// See [`parse`](Self::parse).
    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        let sections = decode_sections(value, UnknownSections::Ignore)?;
        Ok(Self { sections })
    }

    /// Returns the fields carried for `section`, if the message had it.
    #[must_use]
    pub fn section(&self, section: Section) -> Option<&Fields> {
        self.sections.get(&section)
    }

    /// Iterates over the sections carried by the message.
    pub fn sections(&self) -> impl Iterator<Item = (Section, &Fields)> {
        self.sections.iter().map(|(section, fields)| (*section, fields))
    }

    /// Returns the total number of fields carried.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.sections.values().map(serde_json::Map::len).sum()
    }

    /// Returns `true` if the message carried no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }

    pub(crate) fn into_sections(self) -> BTreeMap<Section, Fields> {
        self.sections
    }
}

/// How [`decode_sections`] treats top-level keys outside the known set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnknownSections {
    Ignore,
    Reject,
}

/// Splits a top-level JSON object into known sections.
pub(crate) fn decode_sections(
    value: Value,
    unknown: UnknownSections,
) -> Result<BTreeMap<Section, Fields>, ProtocolError> {
    let top = match value {
        Value::Object(top) => top,
        other => return Err(ProtocolError::NotAnObject(json_kind(&other))),
    };

    let mut sections = BTreeMap::new();
    for (key, body) in top {
        let Some(section) = Section::from_key(&key) else {
            if unknown == UnknownSections::Reject {
                return Err(ProtocolError::UnknownSection(key));
            }
            tracing::trace!(section = %key, "Ignoring unknown section");
            continue;
        };
        match body {
            Value::Object(fields) => {
                sections.insert(section, fields);
            }
            other => {
                return Err(ProtocolError::InvalidSection {
                    section: key,
                    found: json_kind(&other),
                });
            }
        }
    }
    Ok(sections)
}

/// Short name of a JSON value's kind, for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_partial_snapshot() {
        let update = StateUpdate::parse(r#"{"system":{"system_name":"Unit1"}}"#).unwrap();
        assert_eq!(update.field_count(), 1);
        assert_eq!(
            update.section(Section::System).unwrap()["system_name"],
            "Unit1"
        );
    }

    #[test]
    fn unknown_sections_are_skipped() {
        let update = StateUpdate::from_value(json!({
            "firmware": {"version": "1.2"},
            "status": {"qset": 140}
        }))
        .unwrap();
        assert_eq!(update.sections().count(), 1);
    }

    #[test]
    fn rejects_non_object_documents() {
        assert_eq!(
            StateUpdate::parse("42"),
            Err(ProtocolError::NotAnObject("number"))
        );
        assert!(matches!(
            StateUpdate::parse("{not json"),
            Err(ProtocolError::Json(_))
        ));
    }

    #[test]
    fn one_bad_section_rejects_whole_message() {
        let err = StateUpdate::from_value(json!({
            "status": {"qset": 140},
            "config": [1, 2]
        }))
        .unwrap_err();
        assert_eq!(
            err,
            ProtocolError::InvalidSection {
                section: "config".to_string(),
                found: "array",
            }
        );
    }

    #[test]
    fn strict_mode_rejects_unknown_sections() {
        let err = decode_sections(json!({"firmware": {}}), UnknownSections::Reject).unwrap_err();
        assert_eq!(err, ProtocolError::UnknownSection("firmware".to_string()));
    }

    #[test]
    fn empty_object_is_an_empty_update() {
        let update = StateUpdate::parse("{}").unwrap();
        assert!(update.is_empty());
    }
}
