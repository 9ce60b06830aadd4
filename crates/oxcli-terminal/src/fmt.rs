//! Named-placeholder templates for running-config output.
//!
//! A template such as `"set name {value}\n"` names its placeholders, so a
//! translated template may reorder them without touching the emitter.

use std::fmt::Write as _;

/// A typed placeholder value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FmtValue<'a> {
    /// String value. `None` renders as `(null)`.
    Str(Option<&'a str>),
    Int(i32),
    Uint(u32),
    Long(i64),
    Ulong(u64),
}

impl<'a> From<&'a str> for FmtValue<'a> {
    fn from(s: &'a str) -> Self {
        FmtValue::Str(Some(s))
    }
}

impl<'a> From<Option<&'a str>> for FmtValue<'a> {
    fn from(s: Option<&'a str>) -> Self {
        FmtValue::Str(s)
    }
}

impl From<i32> for FmtValue<'_> {
    fn from(v: i32) -> Self {
        FmtValue::Int(v)
    }
}

impl From<u32> for FmtValue<'_> {
    fn from(v: u32) -> Self {
        FmtValue::Uint(v)
    }
}

impl From<i64> for FmtValue<'_> {
    fn from(v: i64) -> Self {
        FmtValue::Long(v)
    }
}

impl From<u64> for FmtValue<'_> {
    fn from(v: u64) -> Self {
        FmtValue::Ulong(v)
    }
}

impl FmtValue<'_> {
    fn write_to(&self, out: &mut String) {
        // Writing into a String cannot fail.
        let _ = match *self {
            FmtValue::Str(Some(s)) => write!(out, "{s}"),
            FmtValue::Str(None) => write!(out, "(null)"),
            FmtValue::Int(v) => write!(out, "{v}"),
            FmtValue::Uint(v) => write!(out, "{v}"),
            FmtValue::Long(v) => write!(out, "{v}"),
            FmtValue::Ulong(v) => write!(out, "{v}"),
        };
    }
}

/// Substitute `{name}` placeholders in `template`.
///
/// Placeholders without a matching parameter are copied unchanged, braces
/// included. A `{` with no closing `}` is copied literally.
pub fn format_template(template: &str, params: &[(&str, FmtValue<'_>)]) -> String {
    let mut out = String::with_capacity(template.len() + 32);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let name = &after[..close];
        match params.iter().find(|(n, _)| *n == name) {
            Some((_, value)) => value.write_to(&mut out),
            None => out.push_str(&rest[open..open + close + 2]),
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}
