//! Helpers for [group file](https://man7.org/linux/man-pages/man5/group.5.html)
//! and its [shadowed counterpart](https://man7.org/linux/man-pages/man5/gshadow.5.html).
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{for_each_entry, open_db, parse_id, split_fields};
use crate::error::{ParseError, Result};
use camino::Utf8Path;
use std::collections::HashMap;
use std::io::BufRead;
use std::ops::RangeInclusive;

/// Default location of the group file.
pub const GROUP_PATH: &str = "/etc/group";
/// Default location of the shadowed group file.
pub const GSHADOW_PATH: &str = "/etc/gshadow";

/// Password values meaning "no password set".
const NO_PASSWORD: &[&str] = &["!", "*"];

// Entry from group file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupEntry {
    pub name: String,
    pub gid: u32,
    pub members: Vec<String>,
    /// Crypted password from the gshadow file, empty if none is set.
    pub password: String,
}

impl GroupEntry {
    /// Parse a single group entry. The legacy password field of the group
    /// file is ignored.
    pub fn parse_line(s: impl AsRef<str>) -> std::result::Result<Self, ParseError> {
        let fields = split_fields(s.as_ref(), 4)?;
        let members = match fields[3] {
            "" => vec![],
            users => users.split(',').map(String::from).collect(),
        };
        Ok(Self {
            name: fields[0].to_string(),
            gid: parse_id("gid", fields[2])?,
            members,
            password: String::new(),
        })
    }

    /// Render the entry as a `posixGroup`.
    ///
    /// `dns_domain` and `mail_host` are accepted for symmetry with the user
    /// renderers and are unused.
    pub fn to_ldif(&self, _dns_domain: &str, _mail_host: &str, base_dn: &str) -> Vec<String> {
        let mut dump = vec![
            format!("dn: cn={},{}", self.name, base_dn),
            "objectClass: posixGroup".to_string(),
            "objectClass: top".to_string(),
            format!("cn: {}", self.name),
            format!("gidNumber: {}", self.gid),
        ];
        dump.extend(self.members.iter().map(|m| format!("memberUid: {}", m)));
        if !self.password.is_empty() {
            dump.push(format!("userPassword: {{crypt}}{}", self.password));
        }
        dump
    }
}

/// Group passwords from the gshadow file, by group name. Groups without a
/// real password are not present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupPasswords(HashMap<String, String>);

impl GroupPasswords {
    pub fn get(&self, group: &str) -> Option<&str> {
        self.0.get(group).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Decode the gshadow content. Only the name and password fields are used.
pub fn parse_gshadow_content(content: impl BufRead) -> Result<GroupPasswords> {
    let mut passwords = HashMap::new();
    for_each_entry("gshadow", content, false, |line| {
        let fields = split_fields(line, 2)?;
        if !NO_PASSWORD.contains(&fields[1]) {
            passwords.insert(fields[0].to_string(), fields[1].to_string());
        }
        Ok(())
    })?;
    Ok(GroupPasswords(passwords))
}

pub fn read_gshadow_file(path: impl AsRef<Utf8Path>) -> Result<GroupPasswords> {
    let path = path.as_ref();
    let passwords = parse_gshadow_content(open_db(path)?)?;
    tracing::debug!("Loaded {} group passwords from {}", passwords.len(), path);
    Ok(passwords)
}

/// Decode the group content, keeping groups whose GID falls inside `gids`
/// and attaching their password from `passwords`.
pub fn parse_group_content(
    content: impl BufRead,
    gids: &RangeInclusive<u32>,
    passwords: &GroupPasswords,
) -> Result<Vec<GroupEntry>> {
    let mut groups = vec![];
    for_each_entry("group", content, true, |line| {
        let mut entry = GroupEntry::parse_line(line)?;
        if !gids.contains(&entry.gid) {
            tracing::trace!("Ignoring group {} ({})", entry.name, entry.gid);
            return Ok(());
        }
        if let Some(password) = passwords.get(&entry.name) {
            entry.password = password.to_string();
        }
        groups.push(entry);
        Ok(())
    })?;
    Ok(groups)
}

pub fn read_group_file(
    path: impl AsRef<Utf8Path>,
    gids: &RangeInclusive<u32>,
    passwords: &GroupPasswords,
) -> Result<Vec<GroupEntry>> {
    let path = path.as_ref();
    let groups = parse_group_content(open_db(path)?, gids, passwords)?;
    tracing::debug!("Loaded {} groups from {}", groups.len(), path);
    Ok(groups)
}

/// Read the gshadow file and then the group file. A missing gshadow file
/// fails the whole read.
pub fn read_groups(
    gids: &RangeInclusive<u32>,
    group_path: impl AsRef<Utf8Path>,
    gshadow_path: impl AsRef<Utf8Path>,
) -> Result<Vec<GroupEntry>> {
    let passwords = read_gshadow_file(gshadow_path)?;
    read_group_file(group_path, gids, &passwords)
}
