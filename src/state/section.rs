// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire sections and field addressing.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A top-level group of fields in the unit's JSON documents.
///
/// The set is closed: anything else at the top level of an inbound message
/// is ignored, and outbound payloads may only address these sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Wi-Fi link information (`ssid`, `rssi`, `wifi_ip`).
    CommWifi,
    /// Identity and runtime (`system_name`, `uptime`).
    System,
    /// Writable configuration (overrides, setpoints, schedule).
    Config,
    /// Live readings (airflow, sensors, bypass, errors).
    Status,
}

impl Section {
    /// All sections in wire order.
    pub const ALL: [Self; 4] = [Self::CommWifi, Self::System, Self::Config, Self::Status];

    /// Returns the key used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CommWifi => "comm_wifi",
            Self::System => "system",
            Self::Config => "config",
            Self::Status => "status",
        }
    }

    /// Looks up a section by its wire key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|section| section.as_str() == key)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address of a single field, such as `status.qset`.
///
/// # Examples
///
/// ```
/// use ecostream_lib::state::{FieldPath, Section};
///
/// let path = FieldPath::new(Section::Status, "qset");
/// assert_eq!(path.to_string(), "status.qset");
/// assert_eq!("status.qset".parse::<FieldPath>().unwrap(), path);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath {
    section: Section,
    field: Cow<'static, str>,
}

impl FieldPath {
    /// Creates a path to a statically known field.
    #[must_use]
    pub const fn new(section: Section, field: &'static str) -> Self {
        Self {
            section,
            field: Cow::Borrowed(field),
        }
    }

    /// Creates a path to a field discovered at runtime.
    #[must_use]
    pub fn owned(section: Section, field: impl Into<String>) -> Self {
        Self {
            section,
            field: Cow::Owned(field.into()),
        }
    }

    /// Returns the section.
    #[must_use]
    pub fn section(&self) -> Section {
        self.section
    }

    /// Returns the field key within the section.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section, self.field)
    }
}

impl FromStr for FieldPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (section, field) = s
            .split_once('.')
            .ok_or_else(|| format!("expected <section>.<field>, got {s:?}"))?;
        let section = Section::from_key(section).ok_or_else(|| format!("unknown section {section:?}"))?;
        if field.is_empty() {
            return Err(format!("empty field in {s:?}"));
        }
        Ok(Self::owned(section, field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_keys_round_trip() {
        for section in Section::ALL {
            assert_eq!(Section::from_key(section.as_str()), Some(section));
        }
        assert_eq!(Section::from_key("firmware"), None);
    }

    #[test]
    fn serde_uses_wire_keys() {
        let json = serde_json::to_string(&Section::CommWifi).unwrap();
        assert_eq!(json, "\"comm_wifi\"");
    }

    #[test]
    fn static_and_owned_paths_compare_equal() {
        assert_eq!(
            FieldPath::new(Section::Config, "sum_com_temp"),
            FieldPath::owned(Section::Config, "sum_com_temp".to_string())
        );
    }

    #[test]
    fn parse_rejects_malformed_paths() {
        assert!("qset".parse::<FieldPath>().is_err());
        assert!("sensors.qset".parse::<FieldPath>().is_err());
        assert!("status.".parse::<FieldPath>().is_err());
    }
}
