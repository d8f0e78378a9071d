//! Decoders for the colon-delimited account databases, see
//! [passwd(5)](https://man7.org/linux/man-pages/man5/passwd.5.html),
//! [group(5)](https://man7.org/linux/man-pages/man5/group.5.html) and
//! [shadow(5)](https://man7.org/linux/man-pages/man5/shadow.5.html).
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::error::{Error, ParseError, Result};
use camino::Utf8Path;
use std::fs::File;
use std::io::{BufRead, BufReader};

pub mod gecos;
pub mod group;
pub mod passwd;
pub mod shadow;

/// Open one of the databases for line-by-line decoding.
pub(crate) fn open_db(path: &Utf8Path) -> Result<BufReader<File>> {
    tracing::debug!("Opening {}", path);
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| Error::io(path, e))
}

/// Feed every entry line of `content` to `f`, stopping at the first failure.
///
/// Empty and comment lines are skipped; with `skip_compat` so are the NSS
/// "compat" lines, see "Compatibility mode" in
/// <https://man7.org/linux/man-pages/man5/nsswitch.conf.5.html>.
pub(crate) fn for_each_entry(
    db: &'static str,
    content: impl BufRead,
    skip_compat: bool,
    mut f: impl FnMut(&str) -> std::result::Result<(), ParseError>,
) -> Result<()> {
    for (idx, line) in content.lines().enumerate() {
        let line_num = idx + 1;
        let input = line.map_err(|err| Error::Read {
            db,
            line: line_num,
            err,
        })?;

        if input.is_empty() || input.starts_with('#') {
            continue;
        }
        if skip_compat && (input.starts_with('+') || input.starts_with('-')) {
            tracing::trace!("Skipping {} compat line {}", db, line_num);
            continue;
        }

        f(&input).map_err(|err| Error::Format {
            db,
            line: line_num,
            err,
        })?;
    }
    Ok(())
}

/// Split an entry into its fields, requiring at least `expected` of them.
/// Trailing extra fields are kept but callers ignore them.
pub(crate) fn split_fields(
    line: &str,
    expected: usize,
) -> std::result::Result<Vec<&str>, ParseError> {
    let fields: Vec<&str> = line.split(':').collect();
    if fields.len() < expected {
        return Err(ParseError::FieldCount {
            expected,
            found: fields.len(),
        });
    }
    Ok(fields)
}

/// Parse a numeric ID, inferring the base from its prefix: `0x` hexadecimal,
/// `0o` or a bare leading `0` octal, `0b` binary, decimal otherwise.
pub(crate) fn parse_id(field: &'static str, value: &str) -> std::result::Result<u32, ParseError> {
    let invalid = || ParseError::InvalidNumber {
        field,
        value: value.to_string(),
    };
    let unsigned = value.strip_prefix('+').unwrap_or(value);
    let (digits, radix) = match unsigned.get(..2) {
        Some("0x") | Some("0X") => (&unsigned[2..], 16),
        Some("0o") | Some("0O") => (&unsigned[2..], 8),
        Some("0b") | Some("0B") => (&unsigned[2..], 2),
        _ if unsigned.len() > 1 && unsigned.starts_with('0') => (&unsigned[1..], 8),
        _ => (unsigned, 10),
    };
    // from_str_radix tolerates its own sign, which must not follow a prefix.
    if digits.starts_with(['+', '-']) {
        return Err(invalid());
    }
    u32::from_str_radix(digits, radix).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_id() {
        let valid = [
            ("1000", 1000),
            ("0", 0),
            ("+42", 42),
            ("0x3e8", 1000),
            ("0X3E8", 1000),
            ("01750", 1000),
            ("0o1750", 1000),
            ("0b1111101000", 1000),
            ("4294967295", u32::MAX),
        ];
        for (input, expected) in valid {
            assert_eq!(parse_id("uid", input).unwrap(), expected, "{input}");
        }
        for input in ["", "abc", "-1", "0x", "0x-1", "09", "4294967296", "1 000"] {
            assert_eq!(
                parse_id("gid", input).unwrap_err(),
                ParseError::InvalidNumber {
                    field: "gid",
                    value: input.to_string()
                },
                "{input}"
            );
        }
    }

    #[test]
    fn test_parse_id_unsigned_only() {
        // IDs are u32: no sign and no digit separators.
        for input in ["-2", "-0x10", "1_000", "0x_3e8", "0b1_0"] {
            assert!(
                matches!(
                    parse_id("uid", input),
                    Err(ParseError::InvalidNumber { field: "uid", .. })
                ),
                "{input}"
            );
        }
    }

    #[test]
    fn test_split_fields() {
        assert_eq!(split_fields("a:b:c", 3).unwrap(), vec!["a", "b", "c"]);
        assert_eq!(split_fields("a:b:c:d", 3).unwrap().len(), 4);
        assert_eq!(
            split_fields("a:b", 3).unwrap_err(),
            ParseError::FieldCount {
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_for_each_entry_reports_line() {
        let content = "\n# comment\nok\n+compat\nbad\n";
        let mut seen = vec![];
        let err = for_each_entry("passwd", Cursor::new(content), true, |line| {
            if line == "bad" {
                return Err(ParseError::FieldCount {
                    expected: 7,
                    found: 1,
                });
            }
            seen.push(line.to_string());
            Ok(())
        })
        .unwrap_err();
        assert_eq!(seen, vec!["ok"]);
        match err {
            Error::Format { db, line, .. } => {
                assert_eq!(db, "passwd");
                assert_eq!(line, 5);
            }
            o => panic!("Unexpected {o:?}"),
        }
    }

    #[test]
    fn test_for_each_entry_keeps_compat() {
        let mut seen = vec![];
        for_each_entry("shadow", Cursor::new("+x\n-y\n"), false, |line| {
            seen.push(line.to_string());
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec!["+x", "-y"]);
    }
}
