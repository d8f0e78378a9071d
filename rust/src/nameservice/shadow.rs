//! Helpers for [shadowed password file](https://man7.org/linux/man-pages/man5/shadow.5.html).
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{for_each_entry, open_db, split_fields};
use crate::error::{Error, Result};
use camino::Utf8Path;
use std::collections::HashMap;
use std::io::BufRead;

/// Default location of the shadow file.
pub const SHADOW_PATH: &str = "/etc/shadow";

/// Password aging attributes of a user.
///
/// Values are kept verbatim from the file; an empty value means the
/// attribute is not set.
// Descriptions adapted from the [shadow(3) manual page](https://man7.org/linux/man-pages/man3/shadow.3.html).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShadowEntry {
    /// encrypted password
    pub password: String,
    /// days (from Jan 1, 1970) since password was last changed
    pub last_change: String,
    /// days before which password may not be changed
    pub min: String,
    /// days after which password must be changed
    pub max: String,
    /// days before password is to expire that user is warned of pending password expiration
    pub warning: String,
    /// days after password expires that account is considered inactive and disabled
    pub inactive: String,
    /// date (in days since Jan 1, 1970) when account will be disabled
    pub expire: String,
    /// reserved for future use
    pub flag: String,
}

impl ShadowEntry {
    /// Render the entry as `shadowAccount` attributes, leaving out the unset ones.
    pub fn to_ldif(&self) -> Vec<String> {
        let password = (!self.password.is_empty()).then(|| format!("{{crypt}}{}", self.password));
        let attributes = [
            ("userPassword", password.as_deref().unwrap_or_default()),
            ("shadowLastChange", self.last_change.as_str()),
            ("shadowMin", self.min.as_str()),
            ("shadowMax", self.max.as_str()),
            ("shadowWarning", self.warning.as_str()),
            ("shadowInactive", self.inactive.as_str()),
            ("shadowExpire", self.expire.as_str()),
            ("shadowFlag", self.flag.as_str()),
        ];
        std::iter::once("objectClass: shadowAccount".to_string())
            .chain(
                attributes
                    .iter()
                    .filter(|(_, value)| !value.is_empty())
                    .map(|(attr, value)| format!("{}: {}", attr, value)),
            )
            .collect()
    }
}

/// The shadow entries, looked up by user name.
#[derive(Debug, Clone, Default)]
pub struct ShadowDB {
    entries: HashMap<String, ShadowEntry>,
}

impl ShadowDB {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the entry of `user`.
    pub fn entry_for(&self, user: &str) -> Result<&ShadowEntry> {
        if user.is_empty() {
            return Err(Error::Validation("user"));
        }
        self.entries
            .get(user)
            .ok_or_else(|| Error::NotFound(user.to_string()))
    }
}

pub fn parse_shadow_content(content: impl BufRead) -> Result<ShadowDB> {
    let mut entries = HashMap::new();
    for_each_entry("shadow", content, false, |line| {
        let fields = split_fields(line, 9)?;
        let entry = ShadowEntry {
            password: fields[1].to_string(),
            last_change: fields[2].to_string(),
            min: fields[3].to_string(),
            max: fields[4].to_string(),
            warning: fields[5].to_string(),
            inactive: fields[6].to_string(),
            expire: fields[7].to_string(),
            flag: fields[8].to_string(),
        };
        entries.insert(fields[0].to_string(), entry);
        Ok(())
    })?;
    Ok(ShadowDB { entries })
}

pub fn read_shadow_file(path: impl AsRef<Utf8Path>) -> Result<ShadowDB> {
    let path = path.as_ref();
    let db = parse_shadow_content(open_db(path)?)?;
    tracing::debug!("Loaded {} shadow entries from {}", db.len(), path);
    Ok(db)
}
