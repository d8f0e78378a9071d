/*
 * Convert the local Unix account databases into LDIF.
 *
 * SPDX-License-Identifier: Apache-2.0 OR MIT
 */

pub mod cli;
mod error;
pub use self::error::*;
pub mod ldif;
pub mod nameservice;
