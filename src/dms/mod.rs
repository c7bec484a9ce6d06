// ntcip_multi::dms
//
// Copyright (C) 2019-2026  Minnesota Department of Transportation
//
//! Dynamic message signs specified by NTCIP 1203.
mod base64;
mod builder;
pub mod config;
mod font;
mod graphic;
pub mod multi;
mod multistring;
mod pagetime;
mod pattern;
mod render;
mod sign;

/// Result type
pub type Result<T> = std::result::Result<T, multi::SyntaxError>;

pub use builder::MultiBuilder;
pub use font::{CharacterEntry, Font, FontError, FontTable};
pub use graphic::{Graphic, GraphicTable};
pub use multistring::MultiString;
pub use pagetime::PageTimes;
pub use pattern::{Abbreviator, MessagePattern, TextRect, WordTable};
pub use render::{Page, PageBuilder, PageRenderer};
pub use sign::{Dms, DmsBuilder};
