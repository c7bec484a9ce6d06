// builder.rs
//
// Copyright (C) 2018-2026  Minnesota Department of Transportation
//
//! MULTI builder
use crate::dms::multi::{MultiVisitor, Value};
use crate::dms::multistring::MultiString;
use std::fmt;

/// Builder for MULTI strings
///
/// Every [MultiVisitor] call appends the canonical form of its value, so
/// parsing a string into a builder produces its normalized encoding.
///
/// [MultiVisitor]: multi/trait.MultiVisitor.html
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MultiBuilder {
    /// Markup buffer
    ms: String,
}

impl From<&str> for MultiBuilder {
    fn from(seed: &str) -> Self {
        MultiBuilder { ms: seed.into() }
    }
}

impl fmt::Display for MultiBuilder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.ms)
    }
}

impl MultiBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        MultiBuilder::default()
    }

    /// Append raw markup (already encoded)
    pub fn append<S: AsRef<str>>(&mut self, ms: S) {
        self.ms.push_str(ms.as_ref());
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        self.ms.clear();
    }

    /// Get the markup built so far
    pub fn as_str(&self) -> &str {
        &self.ms
    }

    /// Check if nothing has been built
    pub fn is_empty(&self) -> bool {
        self.ms.is_empty()
    }

    /// Convert into a MULTI string
    pub fn into_multi_string(self) -> MultiString {
        MultiString::from(self.ms)
    }
}

impl MultiVisitor for MultiBuilder {
    fn value(&mut self, val: Value<'_>) {
        self.ms.push_str(&val.to_string());
    }
}
