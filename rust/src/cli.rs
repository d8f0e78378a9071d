//! Command line options and the top level migration flow.
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::ldif::{self, Exporter, LdifOptions, Schema, UserAccount};
use crate::nameservice::group::{self, GroupEntry, GROUP_PATH, GSHADOW_PATH};
use crate::nameservice::passwd::{self, PASSWD_PATH};
use crate::nameservice::shadow::{self, SHADOW_PATH};
use anyhow::{ensure, Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use fn_error_context::context;
use indoc::indoc;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::RangeInclusive;

const AFTER_HELP: &str = indoc! { r#"
    Users come first, each one followed by its shadowAccount attributes,
    then the groups. The password hashes are exported as {crypt} values
    and are never decoded.

    Set RUST_LOG=debug to see which files are read."#
};

/// Convert local Unix accounts to LDIF.
#[derive(Debug, Parser)]
#[clap(name = "migrate-passwd", rename_all = "kebab-case", after_help = AFTER_HELP)]
pub struct Opts {
    /// DNS domain used for the mail attribute.
    #[clap(long, default_value = "foobar.org")]
    dns_domain: String,

    /// Base DN of all entries.
    #[clap(long, default_value = "dc=foobar,dc=org")]
    base_dn: String,

    /// Add inetLocalMailRecipient attributes routing mail to this host.
    #[clap(long, default_value = "")]
    mail_host: String,

    /// Save the LDIF to this file instead of printing it.
    #[clap(long, value_parser)]
    save_to: Option<Utf8PathBuf>,

    /// Minimum UID to migrate.
    #[clap(long, default_value_t = 1000)]
    ignore_uid_below: u32,

    /// Maximum UID to migrate.
    #[clap(long, default_value_t = 2000)]
    ignore_uid_above: u32,

    /// Minimum GID to migrate.
    #[clap(long, default_value_t = 1000)]
    ignore_gid_below: u32,

    /// Maximum GID to migrate.
    #[clap(long, default_value_t = 2000)]
    ignore_gid_above: u32,

    /// Use the inetOrgPerson class with extended attributes instead of account.
    #[clap(long)]
    use_extended: bool,

    #[clap(long, hide = true, default_value = PASSWD_PATH)]
    passwd_file: Utf8PathBuf,

    #[clap(long, hide = true, default_value = GROUP_PATH)]
    group_file: Utf8PathBuf,

    #[clap(long, hide = true, default_value = SHADOW_PATH)]
    shadow_file: Utf8PathBuf,

    #[clap(long, hide = true, default_value = GSHADOW_PATH)]
    gshadow_file: Utf8PathBuf,
}

/// Everything read from the account databases.
struct Accounts {
    users: Vec<UserAccount>,
    groups: Vec<GroupEntry>,
}

impl Opts {
    fn ranges(&self) -> Result<(RangeInclusive<u32>, RangeInclusive<u32>)> {
        ensure!(
            self.ignore_uid_below <= self.ignore_uid_above,
            "--ignore-uid-below ({}) is greater than --ignore-uid-above ({})",
            self.ignore_uid_below,
            self.ignore_uid_above
        );
        ensure!(
            self.ignore_gid_below <= self.ignore_gid_above,
            "--ignore-gid-below ({}) is greater than --ignore-gid-above ({})",
            self.ignore_gid_below,
            self.ignore_gid_above
        );
        Ok((
            self.ignore_uid_below..=self.ignore_uid_above,
            self.ignore_gid_below..=self.ignore_gid_above,
        ))
    }

    fn ldif_options(&self) -> LdifOptions {
        LdifOptions {
            dns_domain: self.dns_domain.clone(),
            base_dn: self.base_dn.clone(),
            mail_host: self.mail_host.clone(),
            schema: if self.use_extended {
                Schema::Person
            } else {
                Schema::Account
            },
        }
    }
}

#[context("Reading account databases")]
fn load_accounts(opts: &Opts) -> Result<Accounts> {
    let (uids, gids) = opts.ranges()?;
    let shadow = shadow::read_shadow_file(&opts.shadow_file)?;
    let users = passwd::read_passwd_file(&opts.passwd_file, &uids, &gids)?;
    let users = ldif::pair_with_shadow(users, &shadow)?;
    let groups = group::read_groups(&gids, &opts.group_file, &opts.gshadow_file)?;
    Ok(Accounts { users, groups })
}

#[context("Writing LDIF")]
fn write_accounts(exporter: &Exporter, accounts: &Accounts, out: &mut impl Write) -> Result<()> {
    exporter.write_users(out, &accounts.users)?;
    exporter.write_groups(out, &accounts.groups)?;
    Ok(())
}

#[context("Creating {}", path)]
fn create_output(path: &Utf8Path) -> Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

/// Run the migration with already parsed options.
pub fn run(opts: &Opts) -> Result<()> {
    // Everything is read and paired before the output is created, so a bad
    // database never leaves partial output.
    let accounts = load_accounts(opts)?;
    tracing::debug!(
        "Exporting {} users and {} groups",
        accounts.users.len(),
        accounts.groups.len()
    );
    let exporter = Exporter::new(opts.ldif_options());
    match opts.save_to.as_deref() {
        Some(path) => {
            let mut out = create_output(path)?;
            write_accounts(&exporter, &accounts, &mut out)
                .with_context(|| format!("Saving to {}", path))
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            write_accounts(&exporter, &accounts, &mut out)
        }
    }
}

/// Primary entrypoint, `argv` includes the program name.
pub fn main(argv: &[&str]) -> Result<i32> {
    let opts = Opts::parse_from(argv.iter().copied());
    run(&opts)?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() -> Result<()> {
        let opts = Opts::try_parse_from(["migrate-passwd"])?;
        assert_eq!(opts.dns_domain, "foobar.org");
        assert_eq!(opts.base_dn, "dc=foobar,dc=org");
        assert_eq!(opts.mail_host, "");
        assert_eq!(opts.save_to, None);
        assert_eq!(opts.ranges()?, (1000..=2000, 1000..=2000));
        assert_eq!(opts.passwd_file, "/etc/passwd");
        assert_eq!(opts.gshadow_file, "/etc/gshadow");
        assert_eq!(opts.ldif_options().schema, Schema::Account);
        Ok(())
    }

    #[test]
    fn test_parse_overrides() -> Result<()> {
        let opts = Opts::try_parse_from([
            "migrate-passwd",
            "--use-extended",
            "--mail-host",
            "mail.example.com",
            "--ignore-uid-below",
            "500",
            "--save-to",
            "/tmp/out.ldif",
        ])?;
        let ldif = opts.ldif_options();
        assert_eq!(ldif.schema, Schema::Person);
        assert_eq!(ldif.mail_host, "mail.example.com");
        assert_eq!(opts.ranges()?.0, 500..=2000);
        assert_eq!(opts.save_to.as_deref(), Some(Utf8Path::new("/tmp/out.ldif")));
        Ok(())
    }

    #[test]
    fn test_inverted_range() -> Result<()> {
        let opts = Opts::try_parse_from(["migrate-passwd", "--ignore-gid-below", "3000"])?;
        let err = opts.ranges().unwrap_err();
        assert_eq!(
            err.to_string(),
            "--ignore-gid-below (3000) is greater than --ignore-gid-above (2000)"
        );
        Ok(())
    }
}
