// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Merged device state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{FieldPath, Fields, Section, StateUpdate, fields};

/// Last known value of every field the unit has reported.
///
/// The unit pushes heterogeneous partial snapshots, so the state is built up
/// by [`merge`](Self::merge): a deep union at (section, field) granularity.
/// A field, once observed, keeps its value until a later message carries
/// the same field. Field values are replaced whole, including arrays such as
/// `status.errors`.
///
/// # Examples
///
/// ```
/// use ecostream_lib::state::{DeviceState, StateUpdate, fields};
///
/// let mut state = DeviceState::new();
/// state.merge(StateUpdate::parse(r#"{"status":{"qset":140}}"#).unwrap());
/// state.merge(StateUpdate::parse(r#"{"status":{"bypass_pos":50}}"#).unwrap());
///
/// assert_eq!(state.number(&fields::QSET), Some(140.0));
/// assert_eq!(state.number(&fields::BYPASS_POS), Some(50.0));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceState {
    sections: BTreeMap<Section, Fields>,
}

impl DeviceState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Merge ==========

    /// Merges a decoded message into the state.
    ///
    /// Returns the paths whose value was added or changed. Fields absent
    /// from `update` are never touched.
    ///
    /// # Examples
    ///
    /// ```
    /// use ecostream_lib::state::{DeviceState, StateUpdate};
    ///
    /// let mut state = DeviceState::new();
    /// let update = StateUpdate::parse(r#"{"status":{"qset":140}}"#).unwrap();
    ///
    /// assert_eq!(state.merge(update.clone()).len(), 1);
    /// // Same values again: nothing changed
    /// assert!(state.merge(update).is_empty());
    /// ```
    pub fn merge(&mut self, update: StateUpdate) -> Vec<FieldPath> {
        let mut changed = Vec::new();
        for (section, incoming) in update.into_sections() {
            let known = self.sections.entry(section).or_default();
            for (field, value) in incoming {
                if known.get(&field) != Some(&value) {
                    changed.push(FieldPath::owned(section, field.clone()));
                    known.insert(field, value);
                }
            }
        }
        tracing::trace!(changed = changed.len(), "Merged device update");
        changed
    }

    /// Returns the paths whose value differs between `previous` and `self`.
    #[must_use]
    pub fn diff(&self, previous: &Self) -> Vec<FieldPath> {
        let mut changed = Vec::new();
        for section in Section::ALL {
            let ours = self.sections.get(&section);
            let theirs = previous.sections.get(&section);
            if let Some(ours) = ours {
                for (field, value) in ours {
                    if theirs.and_then(|t| t.get(field)) != Some(value) {
                        changed.push(FieldPath::owned(section, field.clone()));
                    }
                }
            }
            if let Some(theirs) = theirs {
                for field in theirs.keys() {
                    if !ours.is_some_and(|o| o.contains_key(field)) {
                        changed.push(FieldPath::owned(section, field.clone()));
                    }
                }
            }
        }
        changed
    }

    /// Forgets everything.
    pub fn clear(&mut self) {
        self.sections.clear();
    }

    // ========== Raw access ==========

    /// Returns all known fields of a section.
    #[must_use]
    pub fn section(&self, section: Section) -> Option<&Fields> {
        self.sections.get(&section)
    }

    /// Returns the raw value at `path`.
    #[must_use]
    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        self.sections.get(&path.section())?.get(path.field())
    }

    /// Returns `true` if nothing has been observed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.values().all(serde_json::Map::is_empty)
    }

    /// Returns the number of known fields.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.sections.values().map(serde_json::Map::len).sum()
    }

    /// Returns the state as the unit's JSON document shape.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.sections
                .iter()
                .map(|(section, fields)| (section.as_str().to_string(), Value::Object(fields.clone())))
                .collect(),
        )
    }

    // ========== Typed access ==========

    /// Returns a numeric field.
    #[must_use]
    pub fn number(&self, path: &FieldPath) -> Option<f64> {
        self.get(path)?.as_f64()
    }

    /// Returns a numeric field as an integer, if it has no fractional part.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    pub fn integer(&self, path: &FieldPath) -> Option<i64> {
        let value = self.get(path)?;
        if let Some(int) = value.as_i64() {
            return Some(int);
        }
        let float = value.as_f64()?;
        (float.fract() == 0.0 && float.abs() < 9.0e15).then_some(float as i64)
    }

    /// Returns a boolean field. The unit sometimes reports flags as 0/1.
    #[must_use]
    pub fn boolean(&self, path: &FieldPath) -> Option<bool> {
        match self.get(path)? {
            Value::Bool(flag) => Some(*flag),
            Value::Number(number) => number.as_f64().map(|n| n != 0.0),
            _ => None,
        }
    }

    /// Returns a string field.
    #[must_use]
    pub fn text(&self, path: &FieldPath) -> Option<&str> {
        self.get(path)?.as_str()
    }

    /// Returns the unit's name (`system.system_name`).
    #[must_use]
    pub fn system_name(&self) -> Option<&str> {
        self.text(&fields::SYSTEM_NAME)
    }

    /// Returns the active error records from `status.errors`.
    ///
    /// Entries that are not objects with a `type` string are skipped.
    #[must_use]
    pub fn errors(&self) -> Vec<DeviceErrorRecord> {
        self.get(&fields::ERRORS)
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns `true` if an error of the given type is active.
    #[must_use]
    pub fn has_error(&self, kind: &str) -> bool {
        self.errors().iter().any(|record| record.kind == kind)
    }
}

/// One entry of `status.errors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceErrorRecord {
    /// Error type, e.g. `ERROR_FILTER`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Any further attributes the unit attaches.
    #[serde(flatten)]
    pub extra: Fields,
}
