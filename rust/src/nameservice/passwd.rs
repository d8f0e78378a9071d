//! Helpers for [password file](https://man7.org/linux/man-pages/man5/passwd.5.html).
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::gecos::Gecos;
use super::{for_each_entry, open_db, parse_id, split_fields};
use crate::error::{ParseError, Result};
use camino::Utf8Path;
use std::io::BufRead;
use std::ops::RangeInclusive;

/// Default location of the password file.
pub const PASSWD_PATH: &str = "/etc/passwd";

const PERSON_CLASSES: &[&str] = &[
    "posixAccount",
    "top",
    "person",
    "organizationalPerson",
    "inetOrgPerson",
];
const ACCOUNT_CLASSES: &[&str] = &["posixAccount", "top", "account"];

/// Entry from passwd file.
///
/// The password field is not kept; the shadow file is authoritative for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswdEntry {
    pub name: String,
    pub uid: u32,
    pub gid: u32,
    pub gecos: Gecos,
    pub home_dir: String,
    pub shell: String,
}

impl PasswdEntry {
    /// Parse a single passwd entry.
    pub fn parse_line(s: impl AsRef<str>) -> std::result::Result<Self, ParseError> {
        let fields = split_fields(s.as_ref(), 7)?;
        Ok(Self {
            name: fields[0].to_string(),
            uid: parse_id("uid", fields[2])?,
            gid: parse_id("gid", fields[3])?,
            gecos: Gecos::parse(fields[4]),
            home_dir: fields[5].to_string(),
            shell: fields[6].to_string(),
        })
    }

    fn dn(&self, base_dn: &str) -> String {
        format!("dn: uid={},ou=People,{}", self.name, base_dn)
    }

    /// Render the entry with the `account` and `posixAccount` object classes.
    pub fn to_account_ldif(&self, base_dn: &str) -> Vec<String> {
        let cn = if self.gecos.full_name.is_empty() {
            &self.name
        } else {
            &self.gecos.full_name
        };
        let mut dump = vec![
            self.dn(base_dn),
            format!("uid: {}", self.name),
            format!("loginShell: {}", self.shell),
            format!("uidNumber: {}", self.uid),
            format!("gidNumber: {}", self.gid),
            format!("homeDirectory: {}", self.home_dir),
            format!("cn: {}", cn),
        ];
        dump.extend(ACCOUNT_CLASSES.iter().map(|c| format!("objectClass: {}", c)));
        if !self.gecos.raw.is_empty() {
            dump.push(format!("gecos: {}", self.gecos.raw));
        }
        dump
    }

    /// Render the entry with the `person`, `organizationalPerson` and
    /// `inetOrgPerson` object classes.
    ///
    /// - `dns_domain` is the domain part of the `mail` attribute.
    /// - `mail_host`, when not empty, adds the `inetLocalMailRecipient`
    ///   attributes.
    /// - `base_dn` is the suffix of the entry DN.
    pub fn to_person_ldif(&self, dns_domain: &str, mail_host: &str, base_dn: &str) -> Vec<String> {
        let mut dump = vec![
            self.dn(base_dn),
            format!("uid: {}", self.name),
            format!("mail: {}@{}", self.name, dns_domain),
        ];

        let gecos = &self.gecos;
        if gecos.raw.is_empty() {
            dump.push(format!("cn: {}", self.name));
        } else {
            let optional = [
                ("telephoneNumber", &gecos.work_phone),
                ("roomNumber", &gecos.office),
                ("homePhone", &gecos.home_phone),
            ];
            for (attr, value) in optional {
                if !value.is_empty() {
                    dump.push(format!("{}: {}", attr, value));
                }
            }
            if !gecos.full_name.is_empty() {
                let name = gecos.split_name();
                dump.push(format!("givenName: {}", name.given_name));
                dump.push(format!("sn: {}", name.surname));
                dump.push(format!("cn: {}", gecos.full_name));
            }
        }

        if !mail_host.is_empty() {
            dump.push(format!("mailRoutingAddress: {}@{}", self.name, mail_host));
            dump.push(format!("mailHost: {}", mail_host));
            dump.push("objectClass: inetLocalMailRecipient".to_string());
        }
        dump.extend(PERSON_CLASSES.iter().map(|c| format!("objectClass: {}", c)));
        dump.push(format!("loginShell: {}", self.shell));
        dump.push(format!("uidNumber: {}", self.uid));
        dump.push(format!("gidNumber: {}", self.gid));
        dump.push(format!("homeDirectory: {}", self.home_dir));
        dump
    }
}

/// Decode all entries, keeping those whose UID and GID both fall inside the
/// given inclusive ranges.
pub fn parse_passwd_content(
    content: impl BufRead,
    uids: &RangeInclusive<u32>,
    gids: &RangeInclusive<u32>,
) -> Result<Vec<PasswdEntry>> {
    let mut passwds = vec![];
    for_each_entry("passwd", content, true, |line| {
        let entry = PasswdEntry::parse_line(line)?;
        if uids.contains(&entry.uid) && gids.contains(&entry.gid) {
            passwds.push(entry);
        } else {
            tracing::trace!("Ignoring user {} ({}:{})", entry.name, entry.uid, entry.gid);
        }
        Ok(())
    })?;
    Ok(passwds)
}

/// Same as [`parse_passwd_content`], reading from `path`.
pub fn read_passwd_file(
    path: impl AsRef<Utf8Path>,
    uids: &RangeInclusive<u32>,
    gids: &RangeInclusive<u32>,
) -> Result<Vec<PasswdEntry>> {
    let path = path.as_ref();
    let passwds = parse_passwd_content(open_db(path)?, uids, gids)?;
    tracing::debug!("Loaded {} users from {}", passwds.len(), path);
    Ok(passwds)
}
