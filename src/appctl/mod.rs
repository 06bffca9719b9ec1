//! This module contains parsers for the output of vswitchd "show" commands.
//!
//! Each submodule corresponds to one command of the control interface, and is
//! named as close to that command as allowed by the Rust module system:
//!
//! - `dpif` parses `dpif/show`, a summary of the configured datapaths.
//! - `pmd_rxq` parses `dpif-netdev/pmd-rxq-show`, which describes how receive
//!   queues are spread across poll-mode threads and how busy they keep them.
//!
//! The top-level module contains the text processing utilities which are
//! shared by several commands.

pub mod dpif;
pub mod pmd_rxq;

pub use self::dpif::{Datapath, DatapathSummary, LookupCounters, MaskCounters};
pub use self::pmd_rxq::{Pmd, PmdRxqUsage, Rxq};

use crate::error::{ResponseError, StructureError};
use crate::parser;
use log::debug;
use std::str::{FromStr, SplitWhitespace};


/// Parse a raw `dpif/show` response into datapath records
pub fn parse_datapath_summary(raw: &str) -> Result<Vec<Datapath>, ResponseError> {
    parser::parse_response::<DatapathSummary>(raw)
}

/// Parse a raw `dpif-netdev/pmd-rxq-show` response into poll-mode thread and
/// receive queue records
pub fn parse_pmd_rxq_usage(raw: &str) -> Result<(Vec<Pmd>, Vec<Rxq>), ResponseError> {
    parser::parse_response::<PmdRxqUsage>(raw)
}


/// Parse a space-separated list of `key:value` counters
///
/// Counters are reported as numbers, but not necessarily integers (ratios
/// are also in there). Keys are the load-bearing part: any key outside of
/// `known_keys` means that the output format has changed in a way that we do
/// not understand, which is an error. A value that does not parse, on the
/// other hand, is treated as absent. So are tokens which are not a single
/// `key:value` pair.
///
/// Recognized counters are handed to `record` along with their value.
///
pub(crate) fn parse_counters<F>(group: &'static str,
                                known_keys: &[&str],
                                line: &str,
                                counters: &str,
                                mut record: F) -> Result<(), StructureError>
    where F: FnMut(&str, f64)
{
    for token in counters.split_whitespace() {
        let mut key_value = token.split(':');
        let (key, value) = match (key_value.next(), key_value.next(),
                                  key_value.next()) {
            (Some(key), Some(value), None) => (key, value),
            _ => continue,
        };

        if !known_keys.contains(&key) {
            return Err(StructureError::UnknownCounter {
                group,
                key: key.to_owned(),
                line: line.to_owned(),
            });
        }

        match value.parse::<f64>() {
            Ok(value) => record(key, value),
            Err(_) => debug!("skipping unparseable {} counter {:?}", group, token),
        }
    }
    Ok(())
}


/// Cursor over the whitespace-separated fields of a fixed-layout line
///
/// Every accessor names the field that it expects, so that a mismatch can be
/// reported along with the place where the line stopped making sense.
///
pub(crate) struct Fields<'a> {
    /// Full text of the line, for error reporting
    line: &'a str,

    /// Fields which have not been consumed yet
    tokens: SplitWhitespace<'a>,
}
//
impl<'a> Fields<'a> {
    /// Start iterating over the fields of a line
    pub fn new(line: &'a str) -> Self {
        Self::within(line, line)
    }

    /// Iterate over the fields of part of a line, e.g. without a terminator
    pub fn within(line: &'a str, part: &'a str) -> Self {
        Self {
            line,
            tokens: part.split_whitespace(),
        }
    }

    /// Report that a certain field does not hold what we expected
    pub fn bad_slot(&self, slot: &'static str) -> StructureError {
        StructureError::BadSlot {
            slot,
            line: self.line.to_owned(),
        }
    }

    /// Consume the next field, whatever it is
    pub fn value(&mut self, slot: &'static str) -> Result<&'a str, StructureError> {
        match self.tokens.next() {
            Some(token) => Ok(token),
            None => Err(self.bad_slot(slot)),
        }
    }

    /// Consume the next field, which must be a certain literal
    pub fn literal(&mut self,
                   slot: &'static str,
                   expected: &str) -> Result<(), StructureError> {
        if self.value(slot)? == expected {
            Ok(())
        } else {
            Err(self.bad_slot(slot))
        }
    }

    /// Consume and parse the next field
    pub fn parse<T: FromStr>(&mut self, slot: &'static str) -> Result<T, StructureError> {
        self.value(slot)?.parse().map_err(|_| self.bad_slot(slot))
    }

    /// Consume a labelled value, written either as `label:value` or as
    /// `label: value` depending on how the producer aligned its columns
    pub fn labelled(&mut self, label: &'static str) -> Result<&'a str, StructureError> {
        let token = self.value(label)?;
        let value = token.strip_prefix(label)
                         .and_then(|rest| rest.strip_prefix(':'))
                         .ok_or_else(|| self.bad_slot(label))?;
        if value.is_empty() {
            self.value(label)
        } else {
            Ok(value)
        }
    }

    /// Consume the next field if it is a certain literal, return whether it was
    pub fn skip_if(&mut self, expected: &str) -> bool {
        let mut lookahead = self.tokens.clone();
        if lookahead.next() == Some(expected) {
            self.tokens = lookahead;
            true
        } else {
            false
        }
    }

    /// Check that every field has been consumed
    pub fn end(&mut self) -> Result<(), StructureError> {
        match self.tokens.next() {
            None => Ok(()),
            Some(_) => Err(self.bad_slot("end")),
        }
    }
}
