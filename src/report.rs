//! Two-stage parser for `mtr --report` output
//!
//! Stage one is a cheap dotted-quad scan that throws away banners, headers
//! and unreachable-hop rows before the expensive pattern runs. Stage two is
//! a fully anchored row pattern with one named group per report column; a
//! line either matches as a complete row or contributes nothing. Lines are
//! never errors: anything that fails either stage is skipped.

use crate::error::Result;
use crate::models::HopRecord;
use regex::Regex;
use std::net::Ipv4Addr;

/// Cheap pre-filter: any dotted quad anywhere in the line
const PREMATCH: &str = r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}";

/// Full row pattern, anchored at both ends modulo leading whitespace.
///
/// Columns: hop prefix `N.|--`, address, loss with `%`, sent count, then
/// last/average/best/worst/stdev as fixed-point milliseconds.
const ROW_PATTERN: &str = r"^\s*\d{1,2}\.\|--\s+(?P<ip_addr>\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})\s+(?P<loss>\d{1,3}\.\d+)%\s+(?P<sent>\d+)\s+(?P<last>\d+\.\d+)\s+(?P<average>\d+\.\d+)\s+(?P<best>\d+\.\d+)\s+(?P<worst>\d+\.\d+)\s+(?P<stdev>\d+\.\d+)$";

/// Report parser holding the two compiled patterns
pub struct ReportParser {
    prematch: Regex,
    row: Regex,
}

impl ReportParser {
    /// Compile both stages
    pub fn new() -> Result<Self> {
        Ok(Self {
            prematch: Regex::new(PREMATCH)?,
            row: Regex::new(ROW_PATTERN)?,
        })
    }

    /// Parse a whole report into hop records, in report order
    pub fn parse(&self, raw: &str) -> Vec<HopRecord> {
        raw.lines().filter_map(|line| self.parse_row(line)).collect()
    }

    /// Parse a single line; `None` for anything that is not a complete row
    fn parse_row(&self, line: &str) -> Option<HopRecord> {
        if !self.prematch.is_match(line) {
            return None;
        }

        let captures = self.row.captures(line)?;

        // The textual match allows octets up to 999; the address parse is
        // what enforces the real range.
        let ip_addr: Ipv4Addr = captures["ip_addr"].parse().ok()?;

        Some(HopRecord {
            ip_addr,
            loss: captures["loss"].parse().ok()?,
            sent: captures["sent"].parse().ok()?,
            last: captures["last"].parse().ok()?,
            average: captures["average"].parse().ok()?,
            best: captures["best"].parse().ok()?,
            worst: captures["worst"].parse().ok()?,
            stdev: captures["stdev"].parse().ok()?,
        })
    }
}
