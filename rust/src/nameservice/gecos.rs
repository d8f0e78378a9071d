//! The GECOS (comment) field of a passwd entry.
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Only the first four comma-separated sub-fields carry meaning, anything
/// after the home phone is dropped. The original text is kept in `raw`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Gecos {
    pub full_name: String,
    /// Office or room number.
    pub office: String,
    pub work_phone: String,
    pub home_phone: String,
    pub raw: String,
}

/// A full name split at its first space.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonName {
    pub given_name: String,
    pub surname: String,
}

impl Gecos {
    /// Parse the GECOS field as found in `/etc/passwd`.
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split(',');
        let mut next = || parts.next().unwrap_or_default().to_string();
        Self {
            full_name: next(),
            office: next(),
            work_phone: next(),
            home_phone: next(),
            raw: raw.to_string(),
        }
    }

    /// Split the full name into given name and surname. A single word is
    /// taken as the given name, everything after the first space is the
    /// surname.
    pub fn split_name(&self) -> PersonName {
        match self.full_name.split_once(' ') {
            Some((given_name, surname)) => PersonName {
                given_name: given_name.to_string(),
                surname: surname.to_string(),
            },
            None => PersonName {
                given_name: self.full_name.clone(),
                surname: String::new(),
            },
        }
    }
}
