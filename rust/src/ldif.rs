//! Assemble the rendered entries into a single LDIF stream.
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::nameservice::group::GroupEntry;
use crate::nameservice::passwd::PasswdEntry;
use crate::nameservice::shadow::{ShadowDB, ShadowEntry};
use anyhow::{Context, Result};
use std::io::Write;

/// Object classes used for user entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Schema {
    /// `account` + `posixAccount`.
    #[default]
    Account,
    /// `inetOrgPerson` and friends, with mail attributes.
    Person,
}

#[derive(Debug, Clone, Default)]
pub struct LdifOptions {
    pub dns_domain: String,
    pub base_dn: String,
    /// Empty to leave out the `inetLocalMailRecipient` attributes.
    pub mail_host: String,
    pub schema: Schema,
}

/// A user together with its password aging attributes.
pub type UserAccount = (PasswdEntry, ShadowEntry);

/// Attach the shadow entry of every user. Fails on the first user missing
/// from `shadow`, before anything has been written.
pub fn pair_with_shadow(
    users: Vec<PasswdEntry>,
    shadow: &ShadowDB,
) -> crate::Result<Vec<UserAccount>> {
    users
        .into_iter()
        .map(|user| {
            let aging = shadow.entry_for(&user.name)?.clone();
            Ok((user, aging))
        })
        .collect()
}

pub struct Exporter {
    opts: LdifOptions,
}

impl Exporter {
    pub fn new(opts: LdifOptions) -> Self {
        Self { opts }
    }

    fn user_ldif(&self, user: &PasswdEntry) -> Vec<String> {
        let opts = &self.opts;
        match opts.schema {
            Schema::Account => user.to_account_ldif(&opts.base_dn),
            Schema::Person => user.to_person_ldif(&opts.dns_domain, &opts.mail_host, &opts.base_dn),
        }
    }

    /// Write each user followed by its password aging attributes.
    pub fn write_users(&self, writer: &mut impl Write, users: &[UserAccount]) -> Result<()> {
        for (user, aging) in users {
            writeln!(writer, "{}", self.user_ldif(user).join("\n"))?;
            writeln!(writer, "{}", aging.to_ldif().join("\n"))?;
            // Entries are separated by a blank line
            writeln!(writer)?;
        }
        writer
            .flush()
            .with_context(|| "failed to write user entries")
    }

    pub fn write_groups(&self, writer: &mut impl Write, groups: &[GroupEntry]) -> Result<()> {
        let opts = &self.opts;
        for group in groups {
            let dump = group.to_ldif(&opts.dns_domain, &opts.mail_host, &opts.base_dn);
            writeln!(writer, "{}\n", dump.join("\n"))?;
        }
        writer
            .flush()
            .with_context(|| "failed to write group entries")
    }
}
