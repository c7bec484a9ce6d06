// ntcip-multi
//
// Copyright (C) 2019-2026  Minnesota Department of Transportation
//
//! Rust library for NTCIP 1203 MULTI messages on dynamic message signs.
//!
//! * Parse MULTI into a stream of [visitor] events
//! * Build and rewrite MULTI with a [builder]
//! * Render pages onto a raster
//! * Fill message patterns with lines of text
//!
//! [builder]: dms/struct.MultiBuilder.html
//! [visitor]: dms/multi/trait.MultiVisitor.html
#![forbid(unsafe_code)]

#[macro_use]
extern crate serde_derive;

pub mod dms;
