// multi.rs
//
// Copyright (C) 2018-2026  Minnesota Department of Transportation
//
//! **M**ark**U**p **L**anguage for **T**ransportation **I**nformation
//!
//! MULTI is used to compose DMS messages.  It consists of text spans and
//! [Tag]s.  Parsing a MULTI string produces a series of calls on a
//! [MultiVisitor], which can build, filter or render the message.
//!
//! Default message values are specified in [MultiCfg].
//!
//! [MultiCfg]: ../config/struct.MultiCfg.html
//! [MultiVisitor]: trait.MultiVisitor.html
//! [Tag]: enum.Tag.html
use enumflags2::BitFlags;
use log::{debug, warn};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// MULTI tag
///
/// Tags are [MULTI] markup enclosed in square brackets, such as `[nl]`.
/// Each tag is bound to one bit of the `dmsSupportedMultiTags` mask.
///
/// [multi]: index.html
#[enumflags2::bitflags]
#[repr(u32)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Tag {
    /// `[cb…]`: Color, Background
    Cb = 1 << 0,
    /// `[cf…]`: Color, Foreground
    Cf = 1 << 1,
    /// `[fl…]`: Flash
    Fl = 1 << 2,
    /// `[fo…]`: Font
    Fo = 1 << 3,
    /// `[g…]`: Graphic
    G = 1 << 4,
    /// `[hc…]`: Hexadecimal Character
    Hc = 1 << 5,
    /// `[jl…]`: Justification, Line
    Jl = 1 << 6,
    /// `[jp…]`: Justification, Page
    Jp = 1 << 7,
    /// `[ms…]`: Manufacturer Specific
    Ms = 1 << 8,
    /// `[mv…]`: Moving Text
    Mv = 1 << 9,
    /// `[nl…]`: New Line
    Nl = 1 << 10,
    /// `[np]`: New Page
    Np = 1 << 11,
    /// `[pt…]`: Page Time
    Pt = 1 << 12,
    /// `[sc…]`: Spacing Character
    Sc = 1 << 13,
    /// `[f1,…]`: Field 1 (Local time, 12 hour)
    F1 = 1 << 14,
    /// `[f2,…]`: Field 2 (Local time, 24 hour)
    F2 = 1 << 15,
    /// `[f3,…]`: Field 3 (Ambient temperature, Celsius)
    F3 = 1 << 16,
    /// `[f4,…]`: Field 4 (Ambient temperature, Fahrenheit)
    F4 = 1 << 17,
    /// `[f5,…]`: Field 5 (Speed, km/h)
    F5 = 1 << 18,
    /// `[f6,…]`: Field 6 (Speed, mph)
    F6 = 1 << 19,
    /// `[f7,…]`: Field 7 (Day of week)
    F7 = 1 << 20,
    /// `[f8,…]`: Field 8 (Day of month)
    F8 = 1 << 21,
    /// `[f9,…]`: Field 9 (Month of year)
    F9 = 1 << 22,
    /// `[f10,…]`: Field 10 (Year, 2 digits)
    F10 = 1 << 23,
    /// `[f11,…]`: Field 11 (Year, 4 digits)
    F11 = 1 << 24,
    /// `[f12,…]`: Field 12 (Local time, 12 hour AM/PM)
    F12 = 1 << 25,
    /// `[f13,…]`: Field 13 (Local time, 12 hour am/pm)
    F13 = 1 << 26,
    /// `[tr…]`: Text Rectangle
    Tr = 1 << 27,
    /// `[cr…]`: Color Rectangle
    Cr = 1 << 28,
    /// `[pb…]`: Page Background
    Pb = 1 << 29,
}

/// Classic color values
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ColorClassic {
    Black,
    Red,
    Yellow,
    Green,
    Cyan,
    Blue,
    Magenta,
    White,
    Orange,
    Amber,
}

/// Color scheme for dynamic message signs
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize,
)]
#[serde(rename_all = "camelCase")]
pub enum ColorScheme {
    /// Monochrome with 1-bit values
    #[default]
    Monochrome1Bit = 1,
    /// Monochrome with 8-bit values
    Monochrome8Bit,
    /// Classic color
    ColorClassic,
    /// 24-bit color
    Color24Bit,
}

/// Color value
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Color {
    /// Color for `Monochrome1Bit`, `Monochrome8Bit`, or `ColorClassic`
    Legacy(u8),
    /// Color for `Color24Bit`
    Rgb(u8, u8, u8),
}

/// A color context combines a scheme with foreground and background colors
#[derive(Clone, Debug)]
pub(crate) struct ColorCtx {
    /// Color scheme
    color_scheme: ColorScheme,
    /// Default foreground RGB color
    fg_default: (u8, u8, u8),
    /// Current foreground color
    fg_current: Color,
    /// Default background RGB color
    bg_default: (u8, u8, u8),
    /// Current background color
    bg_current: Color,
}

/// A rectangular area of a sign
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Rectangle {
    /// Left edge (starting from 1)
    pub x: u16,
    /// Top edge (starting from 1)
    pub y: u16,
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
}

/// Horizontal justification within a line
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum JustificationLine {
    /// Other line justification; deprecated in v2
    Other = 1,
    /// Left line justification
    Left,
    /// Center line justification
    Center,
    /// Right line justification
    Right,
    /// Full line justification
    Full,
}

/// Vertical justification within a page
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum JustificationPage {
    /// Other page justification; deprecated in v2
    Other = 1,
    /// Top page justification
    Top,
    /// Middle page justification
    Middle,
    /// Bottom page justification
    Bottom,
}

/// Travel time over-limit mode
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OverLimitMode {
    /// Blank the message
    Blank,
    /// Prepend over-limit text
    #[default]
    Prepend,
    /// Append over-limit text
    Append,
}

/// Slow traffic warning mode
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SlowWarningMode {
    /// No substitution
    #[default]
    None,
    /// Substitute distance to slow traffic
    Dist,
    /// Substitute speed of slow traffic
    Speed,
}

/// Tolling mode
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TollingMode {
    /// Priced tolling
    Priced,
    /// Lanes open
    Open,
    /// Lanes closed
    Closed,
}

/// Default over-limit text for travel time tags
pub const OVER_LIMIT_TEXT: &str = "OVER ";

/// Default low-availability text for parking tags
const PARKING_LOW_TEXT: &str = "LOW";

/// Default closed text for parking tags
const PARKING_CLOSED_TEXT: &str = "CLOSED";

/// Values are tags or text from a parsed MULTI
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value<'p> {
    /// Background color tag.
    ///
    /// This tag remains for backward compatibility with 1203v1.
    ///
    /// * Optional color (legacy only)
    ColorBackground(Option<Color>),

    /// Foreground color tag
    ///
    /// * Optional color
    ColorForeground(Option<Color>),

    /// Color rectangle tag
    ///
    /// * Dimensions to fill color
    /// * Rectangle color
    ColorRectangle(Rectangle, Color),

    /// Font tag
    ///
    /// * Tuple containing font number and optional version ID (hash)
    Font(Option<(u8, Option<u16>)>),

    /// Graphic tag
    ///
    /// * Graphic number
    /// * Optional tuple containing X and Y position and optional version ID
    Graphic(u8, Option<(u16, u16, Option<u16>)>),

    /// Line justification tag
    JustificationLine(Option<JustificationLine>),

    /// Page justification tag
    JustificationPage(Option<JustificationPage>),

    /// New line tag
    ///
    /// * Optional line spacing
    NewLine(Option<u8>),

    /// New page tag
    NewPage(),

    /// Page background color tag
    ///
    /// * Optional color
    PageBackground(Option<Color>),

    /// Page time tag
    ///
    /// * Optional page-on time
    /// * Optional page-off time
    PageTime(Option<u8>, Option<u8>),

    /// Character spacing start tag
    ///
    /// * Pixel spacing between characters
    SpacingCharacter(u8),

    /// Character spacing end tag
    SpacingCharacterEnd(),

    /// Text value (unescaped)
    Text(&'p str),

    /// Text rectangle tag
    ///
    /// * Dimensions to restrict text
    TextRectangle(Rectangle),

    /// ClearGuide tag
    ///
    /// * DMS name
    /// * Workzone ID
    /// * Minimum statistic value
    /// * Mode
    /// * Route index
    ClearGuide(&'p str, u32, u32, &'p str, u32),

    /// Exit backup warning tag
    ///
    /// * Detector ID
    /// * Occupancy threshold (percent)
    ExitWarning(&'p str, u8),

    /// Message feed tag
    Feed(&'p str),

    /// Incident locator tag
    Locator(&'p str),

    /// Parking area availability tag
    ///
    /// * Parking area ID
    /// * Low availability text
    /// * Closed text
    Parking(&'p str, &'p str, &'p str),

    /// Slow traffic warning tag
    ///
    /// * Warning speed (mph)
    /// * Distance (1/10 mile)
    /// * Substitution mode
    SlowWarning(u8, u16, SlowWarningMode),

    /// Variable speed advisory tag
    SpeedAdvisory(),

    /// Standby tag
    Standby(),

    /// Time action tag
    ///
    /// * Schedule direction
    /// * Time format
    TimeAction(&'p str, &'p str),

    /// Tolling tag
    ///
    /// * Tolling mode
    /// * Toll zone IDs
    Tolling(TollingMode, Vec<&'p str>),

    /// Travel time tag
    ///
    /// * Station ID
    /// * Over-limit mode
    /// * Over-limit text
    TravelTime(&'p str, OverLimitMode, &'p str),
}

/// Syntax errors from parsing or rendering MULTI
#[derive(Clone, Debug, thiserror::Error, Eq, PartialEq)]
pub enum SyntaxError {
    /// An unspecified error
    #[error("other: {0}")]
    Other(&'static str),
    /// Specified tag not supported
    #[error("unsupported tag: {0}")]
    UnsupportedTag(String),
    /// Specified tag value not supported
    #[error("unsupported tag value: {0}")]
    UnsupportedTagValue(String),
    /// Specified text does not fit within text rectangle
    #[error("text too big")]
    TextTooBig,
    /// Specified font not defined
    #[error("font not defined: {0}")]
    FontNotDefined(u8),
    /// Specified character not defined in font
    #[error("character not defined: {0}")]
    CharacterNotDefined(char),
    /// Specified tags conflict with each other
    #[error("tag conflict")]
    TagConflict,
    /// Number of pages not supported
    #[error("too many pages")]
    TooManyPages,
    /// Specified graphic number not defined
    #[error("graphic not defined: {0}")]
    GraphicNotDefined(u8),
}

/// Result type
pub(crate) type Result<T> = std::result::Result<T, SyntaxError>;

/// Visitor for values parsed from a MULTI string
///
/// Every method has a default implementation.  Tag and text methods
/// forward to [value](#method.value), which does nothing by default, so
/// an implementation only overrides what it needs.
pub trait MultiVisitor {
    /// Handle a value with no more specific method
    fn value(&mut self, _val: Value<'_>) {}

    /// Report an unsupported tag or unmatched bracket
    fn unsupported_tag(&mut self, _tag: &str) {}

    /// Add a span of text
    fn add_span(&mut self, span: &str) {
        self.value(Value::Text(span));
    }

    /// Set the (1203v1) background color
    fn set_color_background(&mut self, clr: Option<Color>) {
        self.value(Value::ColorBackground(clr));
    }

    /// Set the page background color
    fn set_page_background(&mut self, clr: Option<Color>) {
        self.value(Value::PageBackground(clr));
    }

    /// Set the foreground color
    fn set_color_foreground(&mut self, clr: Option<Color>) {
        self.value(Value::ColorForeground(clr));
    }

    /// Add a color rectangle
    fn add_color_rectangle(&mut self, rect: Rectangle, clr: Color) {
        self.value(Value::ColorRectangle(rect, clr));
    }

    /// Set the text rectangle
    fn set_text_rectangle(&mut self, rect: Rectangle) {
        self.value(Value::TextRectangle(rect));
    }

    /// Add a graphic
    fn add_graphic(&mut self, num: u8, pos: Option<(u16, u16, Option<u16>)>) {
        self.value(Value::Graphic(num, pos));
    }

    /// Set the font number and version ID
    fn set_font(&mut self, font: Option<(u8, Option<u16>)>) {
        self.value(Value::Font(font));
    }

    /// Set the character spacing
    fn set_char_spacing(&mut self, sc: u8) {
        self.value(Value::SpacingCharacter(sc));
    }

    /// Clear the character spacing
    fn clear_char_spacing(&mut self) {
        self.value(Value::SpacingCharacterEnd());
    }

    /// Set the line justification
    fn set_justification_line(&mut self, jl: Option<JustificationLine>) {
        self.value(Value::JustificationLine(jl));
    }

    /// Set the page justification
    fn set_justification_page(&mut self, jp: Option<JustificationPage>) {
        self.value(Value::JustificationPage(jp));
    }

    /// Add a new line
    fn add_line(&mut self, spacing: Option<u8>) {
        self.value(Value::NewLine(spacing));
    }

    /// Add a new page
    fn add_page(&mut self) {
        self.value(Value::NewPage());
    }

    /// Set the page times (deciseconds)
    fn set_page_times(&mut self, on: Option<u8>, off: Option<u8>) {
        self.value(Value::PageTime(on, off));
    }

    /// Add a ClearGuide advisory
    fn add_clear_guide(
        &mut self,
        dms: &str,
        wid: u32,
        min: u32,
        mode: &str,
        ridx: u32,
    ) {
        self.value(Value::ClearGuide(dms, wid, min, mode, ridx));
    }

    /// Add an exit backup warning
    fn add_exit_warning(&mut self, did: &str, occ: u8) {
        self.value(Value::ExitWarning(did, occ));
    }

    /// Add a message feed
    fn add_feed(&mut self, fid: &str) {
        self.value(Value::Feed(fid));
    }

    /// Add an incident locator
    fn add_locator(&mut self, code: &str) {
        self.value(Value::Locator(code));
    }

    /// Add a parking area availability
    fn add_parking(&mut self, pid: &str, low: &str, closed: &str) {
        self.value(Value::Parking(pid, low, closed));
    }

    /// Add a slow traffic warning
    fn add_slow_warning(&mut self, spd: u8, dist: u16, mode: SlowWarningMode) {
        self.value(Value::SlowWarning(spd, dist, mode));
    }

    /// Add a variable speed advisory
    fn add_speed_advisory(&mut self) {
        self.value(Value::SpeedAdvisory());
    }

    /// Add a standby message
    fn add_standby(&mut self) {
        self.value(Value::Standby());
    }

    /// Add a time action substitution
    fn add_time_action(&mut self, dir: &str, format: &str) {
        self.value(Value::TimeAction(dir, format));
    }

    /// Add a tolling price / status
    fn add_tolling(&mut self, mode: TollingMode, zones: &[&str]) {
        self.value(Value::Tolling(mode, zones.to_vec()));
    }

    /// Add a travel time
    fn add_travel_time(&mut self, sid: &str, mode: OverLimitMode, text: &str) {
        self.value(Value::TravelTime(sid, mode, text));
    }
}

/// Visitor which ignores everything
#[derive(Clone, Copy, Debug, Default)]
pub struct Discard;

impl MultiVisitor for Discard {}

/// Token from a MULTI string
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Token<'p> {
    /// Span of text, with doubled brackets collapsed
    Text(Cow<'p, str>),
    /// Tag contents (without brackets)
    Tag(&'p str),
    /// Unmatched bracket
    Unmatched(&'static str),
}

/// MULTI string tokenizer
#[derive(Clone, Debug)]
pub(crate) struct MultiStr<'p> {
    /// MULTI string
    ms: &'p str,

    /// Current offset
    offset: usize,
}

/// MULTI string splitter
pub(crate) struct MultiSplitter<'p>(MultiStr<'p>);

impl Tag {
    /// Get the tag mnemonic
    pub fn mnemonic(self) -> &'static str {
        use Tag::*;
        match self {
            Cb => "cb",
            Cf => "cf",
            Fl => "fl",
            Fo => "fo",
            G => "g",
            Hc => "hc",
            Jl => "jl",
            Jp => "jp",
            Ms => "ms",
            Mv => "mv",
            Nl => "nl",
            Np => "np",
            Pt => "pt",
            Sc => "sc",
            F1 => "f1",
            F2 => "f2",
            F3 => "f3",
            F4 => "f4",
            F5 => "f5",
            F6 => "f6",
            F7 => "f7",
            F8 => "f8",
            F9 => "f9",
            F10 => "f10",
            F11 => "f11",
            F12 => "f12",
            F13 => "f13",
            Tr => "tr",
            Cr => "cr",
            Pb => "pb",
        }
    }

    /// Lookup a tag by bit position
    pub fn from_bit(bit: u32) -> Option<Self> {
        let bits = 1u32.checked_shl(bit)?;
        BitFlags::<Tag>::from_bits(bits).ok()?.exactly_one()
    }

    /// Decode a supported tag mask
    pub fn from_mask(mask: u32) -> Vec<Self> {
        BitFlags::<Tag>::from_bits_truncate(mask).iter().collect()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// Describe a supported tag mask as a comma-separated list
pub fn describe_tags(mask: u32) -> String {
    let tags = Tag::from_mask(mask);
    if tags.is_empty() {
        "None".into()
    } else {
        tags.iter()
            .map(|t| t.mnemonic())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl ColorClassic {
    /// Get RGB triplet for a classic color
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            ColorClassic::Black => (0x00, 0x00, 0x00),
            ColorClassic::Red => (0xFF, 0x00, 0x00),
            ColorClassic::Yellow => (0xFF, 0xFF, 0x00),
            ColorClassic::Green => (0x00, 0xFF, 0x00),
            ColorClassic::Cyan => (0x00, 0xFF, 0xFF),
            ColorClassic::Blue => (0x00, 0x00, 0xFF),
            ColorClassic::Magenta => (0xFF, 0x00, 0xFF),
            ColorClassic::White => (0xFF, 0xFF, 0xFF),
            ColorClassic::Orange => (0xFF, 0xA5, 0x00),
            ColorClassic::Amber => (0xFF, 0xD0, 0x00),
        }
    }

    /// Maybe convert a u8 into a ColorClassic
    pub fn from_u8(v: u8) -> Option<Self> {
        use ColorClassic::*;
        [
            Black, Red, Yellow, Green, Cyan, Blue, Magenta, White, Orange,
            Amber,
        ]
        .into_iter()
        .find(|c| *c as u8 == v)
    }
}

impl From<ColorClassic> for u8 {
    fn from(c: ColorClassic) -> u8 {
        c as u8
    }
}

impl From<&str> for ColorScheme {
    /// Create a color scheme from a string
    fn from(s: &str) -> Self {
        match s {
            "monochrome1Bit" => ColorScheme::Monochrome1Bit,
            "monochrome8Bit" => ColorScheme::Monochrome8Bit,
            "colorClassic" => ColorScheme::ColorClassic,
            "color24Bit" => ColorScheme::Color24Bit,
            _ => {
                warn!("Unknown color scheme: {}", s);
                ColorScheme::Monochrome1Bit
            }
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Color::Legacy(v) => write!(f, "{v}"),
            Color::Rgb(r, g, b) => write!(f, "{r},{g},{b}"),
        }
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from(rgb: (u8, u8, u8)) -> Self {
        Color::Rgb(rgb.0, rgb.1, rgb.2)
    }
}

impl Color {
    /// Get RGB triplet for a color
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Color::Legacy(v) => ColorCtx::rgb_classic(v).unwrap_or_default(),
            Color::Rgb(r, g, b) => (r, g, b),
        }
    }
}

impl ColorCtx {
    /// Create a new color context
    pub fn new(
        color_scheme: ColorScheme,
        fg_default: (u8, u8, u8),
        bg_default: (u8, u8, u8),
    ) -> Self {
        let fg_current = fg_default.into();
        let bg_current = bg_default.into();
        ColorCtx {
            color_scheme,
            fg_default,
            fg_current,
            bg_default,
            bg_current,
        }
    }

    /// Check a color against the scheme
    fn check(&self, c: Option<Color>, default: (u8, u8, u8)) -> Result<Color> {
        match c {
            Some(c) => match self.rgb(c) {
                Some(_) => Ok(c),
                None => Err(SyntaxError::UnsupportedTagValue(c.to_string())),
            },
            None => Ok(default.into()),
        }
    }

    /// Set the foreground color
    pub fn set_foreground(&mut self, c: Option<Color>) -> Result<()> {
        self.fg_current = self.check(c, self.fg_default)?;
        Ok(())
    }

    /// Get the foreground color
    pub fn foreground(&self) -> Color {
        self.fg_current
    }

    /// Get the foreground RGB color
    pub fn foreground_rgb(&self) -> (u8, u8, u8) {
        self.rgb(self.foreground()).unwrap_or(self.fg_default)
    }

    /// Set the background color
    pub fn set_background(&mut self, c: Option<Color>) -> Result<()> {
        self.bg_current = self.check(c, self.bg_default)?;
        Ok(())
    }

    /// Get the background color
    pub fn background(&self) -> Color {
        self.bg_current
    }

    /// Get the background RGB color
    pub fn background_rgb(&self) -> (u8, u8, u8) {
        self.rgb(self.background()).unwrap_or(self.bg_default)
    }

    /// Get RGB for the specified color.
    pub fn rgb(&self, c: Color) -> Option<(u8, u8, u8)> {
        match (self.color_scheme, c) {
            (ColorScheme::Monochrome1Bit, Color::Legacy(v)) => {
                self.rgb_monochrome_1(v)
            }
            (ColorScheme::Monochrome1Bit, _) => None,
            (ColorScheme::Monochrome8Bit, Color::Legacy(v)) => {
                Some(self.rgb_monochrome_8(v))
            }
            (ColorScheme::Monochrome8Bit, _) => None,
            (_, Color::Legacy(v)) => ColorCtx::rgb_classic(v),
            (ColorScheme::Color24Bit, Color::Rgb(r, g, b)) => Some((r, g, b)),
            // default colors are stored as RGB for every scheme
            (_, Color::Rgb(r, g, b)) => {
                let rgb = (r, g, b);
                (rgb == self.fg_default || rgb == self.bg_default)
                    .then_some(rgb)
            }
        }
    }

    /// Get RGB for a monochrome 1-bit color.
    fn rgb_monochrome_1(&self, v: u8) -> Option<(u8, u8, u8)> {
        match v {
            0 => Some(self.bg_default),
            1 => Some(self.fg_default),
            _ => None,
        }
    }

    /// Get RGB for a monochrome 8-bit color.
    fn rgb_monochrome_8(&self, v: u8) -> (u8, u8, u8) {
        let bg = self.bg_default;
        let fg = self.fg_default;
        let r = ColorCtx::lerp(bg.0, fg.0, v);
        let g = ColorCtx::lerp(bg.1, fg.1, v);
        let b = ColorCtx::lerp(bg.2, fg.2, v);
        (r, g, b)
    }

    /// Get RGB for a classic color.
    fn rgb_classic(v: u8) -> Option<(u8, u8, u8)> {
        ColorClassic::from_u8(v).map(|c| c.rgb())
    }

    /// Interpolate between two color components
    fn lerp(bg: u8, fg: u8, v: u8) -> u8 {
        let d = bg.max(fg) - bg.min(fg);
        let c = d as u32 * v as u32;
        // divide by 255
        let r = (((c + 1) + (c >> 8)) >> 8) as u8;
        bg.min(fg) + r
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

impl Default for Rectangle {
    fn default() -> Self {
        Rectangle::new(1, 1, 0, 0)
    }
}

impl Rectangle {
    /// Create a new rectangle
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Rectangle {
            x,
            y,
            width,
            height,
        }
    }

    /// Extend 0 width and/or height to full rectangle edges
    pub fn extend_width_height(self, full: Self) -> Self {
        let width = if self.width > 0 {
            self.width
        } else {
            full.width.saturating_sub(self.x.saturating_sub(1))
        };
        let height = if self.height > 0 {
            self.height
        } else {
            full.height.saturating_sub(self.y.saturating_sub(1))
        };
        Rectangle::new(self.x, self.y, width, height)
    }

    /// Create intersection between this and another rectangle
    pub fn intersection(self, rhs: Self) -> Self {
        let left = self.x.max(rhs.x);
        let right = self.right().min(rhs.right());
        let top = self.y.max(rhs.y);
        let bottom = self.bottom().min(rhs.bottom());
        let width = u16::try_from(right.saturating_sub(left.into()));
        let height = u16::try_from(bottom.saturating_sub(top.into()));
        match (width, height) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => Rectangle::new(left, top, w, h),
            _ => Rectangle::default(),
        }
    }

    /// Check if a rectangle contains another rectangle
    pub fn contains(self, other: Self) -> bool {
        other.x >= self.x
            && other.right() <= self.right()
            && other.y >= self.y
            && other.bottom() <= self.bottom()
    }

    /// Get the right edge (exclusive)
    fn right(self) -> u32 {
        u32::from(self.x) + u32::from(self.width)
    }

    /// Get the bottom edge (exclusive)
    fn bottom(self) -> u32 {
        u32::from(self.y) + u32::from(self.height)
    }
}

impl fmt::Display for JustificationLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

impl JustificationLine {
    /// Create a line justification from an ordinal
    pub fn from_u8(v: u8) -> Option<Self> {
        use JustificationLine::*;
        [Other, Left, Center, Right, Full]
            .into_iter()
            .find(|j| *j as u8 == v)
    }
}

impl fmt::Display for JustificationPage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

impl JustificationPage {
    /// Create a page justification from an ordinal
    pub fn from_u8(v: u8) -> Option<Self> {
        use JustificationPage::*;
        [Other, Top, Middle, Bottom]
            .into_iter()
            .find(|j| *j as u8 == v)
    }
}

impl fmt::Display for OverLimitMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OverLimitMode::Blank => write!(f, "blank"),
            OverLimitMode::Prepend => write!(f, "prepend"),
            OverLimitMode::Append => write!(f, "append"),
        }
    }
}

impl OverLimitMode {
    /// Parse an over-limit mode
    fn new(v: &str) -> Option<Self> {
        match v.to_ascii_lowercase().as_str() {
            "blank" => Some(OverLimitMode::Blank),
            "prepend" => Some(OverLimitMode::Prepend),
            "append" => Some(OverLimitMode::Append),
            _ => None,
        }
    }
}

impl fmt::Display for SlowWarningMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SlowWarningMode::None => write!(f, "none"),
            SlowWarningMode::Dist => write!(f, "dist"),
            SlowWarningMode::Speed => write!(f, "speed"),
        }
    }
}

impl SlowWarningMode {
    /// Parse a slow warning mode
    fn new(v: &str) -> Option<Self> {
        match v.to_ascii_lowercase().as_str() {
            "none" => Some(SlowWarningMode::None),
            "dist" => Some(SlowWarningMode::Dist),
            "speed" => Some(SlowWarningMode::Speed),
            _ => None,
        }
    }
}

impl fmt::Display for TollingMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TollingMode::Priced => write!(f, "p"),
            TollingMode::Open => write!(f, "o"),
            TollingMode::Closed => write!(f, "c"),
        }
    }
}

impl TollingMode {
    /// Parse a tolling mode
    fn new(v: &str) -> Option<Self> {
        match v {
            "p" | "P" => Some(TollingMode::Priced),
            "o" | "O" => Some(TollingMode::Open),
            "c" | "C" => Some(TollingMode::Closed),
            _ => None,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::ColorBackground(None) => write!(f, "[cb]"),
            Value::ColorBackground(Some(c)) => write!(f, "[cb{c}]"),
            Value::ColorForeground(None) => write!(f, "[cf]"),
            Value::ColorForeground(Some(c)) => write!(f, "[cf{c}]"),
            Value::ColorRectangle(r, c) => write!(f, "[cr{r},{c}]"),
            Value::Font(None) => write!(f, "[fo]"),
            Value::Font(Some((num, None))) => write!(f, "[fo{num}]"),
            Value::Font(Some((num, Some(c)))) => {
                write!(f, "[fo{num},{c:04x}]")
            }
            Value::Graphic(num, None) => write!(f, "[g{num}]"),
            Value::Graphic(num, Some((x, y, None))) => {
                write!(f, "[g{num},{x},{y}]")
            }
            Value::Graphic(num, Some((x, y, Some(c)))) => {
                write!(f, "[g{num},{x},{y},{c:04x}]")
            }
            Value::JustificationLine(Some(j)) => write!(f, "[jl{j}]"),
            Value::JustificationLine(None) => write!(f, "[jl]"),
            Value::JustificationPage(Some(j)) => write!(f, "[jp{j}]"),
            Value::JustificationPage(None) => write!(f, "[jp]"),
            Value::NewLine(Some(x)) => write!(f, "[nl{x}]"),
            Value::NewLine(None) => write!(f, "[nl]"),
            Value::NewPage() => write!(f, "[np]"),
            Value::PageBackground(Some(c)) => write!(f, "[pb{c}]"),
            Value::PageBackground(None) => write!(f, "[pb]"),
            Value::PageTime(Some(x), Some(y)) => write!(f, "[pt{x}o{y}]"),
            Value::PageTime(Some(x), None) => write!(f, "[pt{x}o]"),
            Value::PageTime(None, Some(y)) => write!(f, "[pto{y}]"),
            Value::PageTime(None, None) => write!(f, "[pto]"),
            Value::SpacingCharacter(s) => write!(f, "[sc{s}]"),
            Value::SpacingCharacterEnd() => write!(f, "[/sc]"),
            Value::Text(t) => {
                write!(f, "{}", t.replace('[', "[[").replace(']', "]]"))
            }
            Value::TextRectangle(r) => write!(f, "[tr{r}]"),
            Value::ClearGuide(dms, wid, min, mode, ridx) => {
                write!(f, "[cg{dms},{wid},{min},{mode},{ridx}]")
            }
            Value::ExitWarning(did, occ) => write!(f, "[exit{did},{occ}]"),
            Value::Feed(fid) => write!(f, "[feed{fid}]"),
            Value::Locator(code) => write!(f, "[loc{code}]"),
            Value::Parking(pid, low, closed) => {
                write!(f, "[pa{pid},{low},{closed}]")
            }
            Value::SlowWarning(spd, dist, SlowWarningMode::None) => {
                write!(f, "[slow{spd},{dist}]")
            }
            Value::SlowWarning(spd, dist, mode) => {
                write!(f, "[slow{spd},{dist},{mode}]")
            }
            Value::SpeedAdvisory() => write!(f, "[vsa]"),
            Value::Standby() => write!(f, "[standby]"),
            Value::TimeAction(dir, format) => write!(f, "[ta{dir},{format}]"),
            Value::Tolling(mode, zones) => {
                write!(f, "[tz{mode}")?;
                for zone in zones {
                    write!(f, ",{zone}")?;
                }
                write!(f, "]")
            }
            Value::TravelTime(sid, mode, text) => {
                write!(f, "[tt{sid},{mode},{text}]")
            }
        }
    }
}

impl<'p> From<Value<'p>> for String {
    fn from(v: Value<'p>) -> String {
        format!("{v}")
    }
}

impl<'p> From<&Value<'p>> for String {
    fn from(v: &Value<'p>) -> Self {
        format!("{v}")
    }
}

impl Value<'_> {
    /// Get tag associated with the value
    pub fn tag(&self) -> Option<Tag> {
        use Value::*;
        match self {
            ColorBackground(_) => Some(Tag::Cb),
            ColorForeground(_) => Some(Tag::Cf),
            ColorRectangle(_, _) => Some(Tag::Cr),
            Font(_) => Some(Tag::Fo),
            Graphic(_, _) => Some(Tag::G),
            JustificationLine(_) => Some(Tag::Jl),
            JustificationPage(_) => Some(Tag::Jp),
            NewLine(_) => Some(Tag::Nl),
            NewPage() => Some(Tag::Np),
            PageBackground(_) => Some(Tag::Pb),
            PageTime(_, _) => Some(Tag::Pt),
            SpacingCharacter(_) => Some(Tag::Sc),
            SpacingCharacterEnd() => Some(Tag::Sc),
            TextRectangle(_) => Some(Tag::Tr),
            _ => None,
        }
    }

    /// Check if a value is an action tag (not part of NTCIP 1203)
    pub fn is_action(&self) -> bool {
        use Value::*;
        matches!(
            self,
            ClearGuide(..)
                | ExitWarning(..)
                | Feed(_)
                | Locator(_)
                | Parking(..)
                | SlowWarning(..)
                | SpeedAdvisory()
                | Standby()
                | TimeAction(..)
                | Tolling(..)
                | TravelTime(..)
        )
    }

    /// Check if a value only makes sense at page scope
    pub(crate) fn is_page_scope(&self) -> bool {
        use Value::*;
        matches!(
            self,
            ColorBackground(_)
                | PageBackground(_)
                | ColorRectangle(..)
                | Graphic(..)
                | JustificationPage(_)
                | NewLine(_)
                | NewPage()
                | PageTime(..)
                | TextRectangle(_)
        )
    }

    /// Dispatch the value to the matching visitor method
    pub fn visit<V: MultiVisitor + ?Sized>(self, v: &mut V) {
        match self {
            Value::ColorBackground(c) => v.set_color_background(c),
            Value::ColorForeground(c) => v.set_color_foreground(c),
            Value::ColorRectangle(r, c) => v.add_color_rectangle(r, c),
            Value::Font(fo) => v.set_font(fo),
            Value::Graphic(n, pos) => v.add_graphic(n, pos),
            Value::JustificationLine(jl) => v.set_justification_line(jl),
            Value::JustificationPage(jp) => v.set_justification_page(jp),
            Value::NewLine(ls) => v.add_line(ls),
            Value::NewPage() => v.add_page(),
            Value::PageBackground(c) => v.set_page_background(c),
            Value::PageTime(on, off) => v.set_page_times(on, off),
            Value::SpacingCharacter(sc) => v.set_char_spacing(sc),
            Value::SpacingCharacterEnd() => v.clear_char_spacing(),
            Value::Text(t) => v.add_span(t),
            Value::TextRectangle(r) => v.set_text_rectangle(r),
            Value::ClearGuide(dms, wid, min, mode, ridx) => {
                v.add_clear_guide(dms, wid, min, mode, ridx)
            }
            Value::ExitWarning(did, occ) => v.add_exit_warning(did, occ),
            Value::Feed(fid) => v.add_feed(fid),
            Value::Locator(code) => v.add_locator(code),
            Value::Parking(pid, low, closed) => v.add_parking(pid, low, closed),
            Value::SlowWarning(spd, dist, mode) => {
                v.add_slow_warning(spd, dist, mode)
            }
            Value::SpeedAdvisory() => v.add_speed_advisory(),
            Value::Standby() => v.add_standby(),
            Value::TimeAction(dir, format) => v.add_time_action(dir, format),
            Value::Tolling(mode, zones) => v.add_tolling(mode, &zones),
            Value::TravelTime(sid, mode, text) => {
                v.add_travel_time(sid, mode, text)
            }
        }
    }
}

/// Kinds of tags, keyed by prefix
#[derive(Clone, Copy, Debug)]
enum TagKind {
    ColorBackground,
    ColorForeground,
    ColorRectangle,
    Font,
    Graphic,
    JustificationLine,
    JustificationPage,
    NewLine,
    NewPage,
    PageBackground,
    PageTime,
    SpacingCharacter,
    SpacingCharacterEnd,
    TextRectangle,
    ClearGuide,
    ExitWarning,
    Feed,
    Locator,
    Parking,
    SlowWarning,
    SpeedAdvisory,
    Standby,
    TimeAction,
    Tolling,
    TravelTime,
}

/// Tag prefixes, with longer prefixes first so they are never shadowed
const TAG_PREFIXES: &[(&str, TagKind)] = &[
    ("standby", TagKind::Standby),
    ("exit", TagKind::ExitWarning),
    ("feed", TagKind::Feed),
    ("slow", TagKind::SlowWarning),
    ("/sc", TagKind::SpacingCharacterEnd),
    ("loc", TagKind::Locator),
    ("vsa", TagKind::SpeedAdvisory),
    ("cb", TagKind::ColorBackground),
    ("cf", TagKind::ColorForeground),
    ("cg", TagKind::ClearGuide),
    ("cr", TagKind::ColorRectangle),
    ("fo", TagKind::Font),
    ("jl", TagKind::JustificationLine),
    ("jp", TagKind::JustificationPage),
    ("nl", TagKind::NewLine),
    ("np", TagKind::NewPage),
    ("pa", TagKind::Parking),
    ("pb", TagKind::PageBackground),
    ("pt", TagKind::PageTime),
    ("sc", TagKind::SpacingCharacter),
    ("ta", TagKind::TimeAction),
    ("tr", TagKind::TextRectangle),
    ("tt", TagKind::TravelTime),
    ("tz", TagKind::Tolling),
    ("g", TagKind::Graphic),
];

impl TagKind {
    /// Parse tag parameters (after the prefix)
    fn parse(self, p: &str) -> Option<Value<'_>> {
        use TagKind::*;
        match self {
            ColorBackground => parse_color_background(p),
            ColorForeground => {
                parse_optional_color(p).map(Value::ColorForeground)
            }
            ColorRectangle => parse_color_rectangle(p),
            Font => parse_font(p),
            Graphic => parse_graphic(p),
            JustificationLine => parse_justification_line(p),
            JustificationPage => parse_justification_page(p),
            NewLine => Some(Value::NewLine(p.parse().ok())),
            NewPage => p.is_empty().then_some(Value::NewPage()),
            PageBackground => {
                parse_optional_color(p).map(Value::PageBackground)
            }
            PageTime => parse_page_time(p),
            SpacingCharacter => parse_spacing_character(p),
            SpacingCharacterEnd => {
                p.is_empty().then_some(Value::SpacingCharacterEnd())
            }
            TextRectangle => {
                parse_rectangle(&mut p.splitn(4, ',')).map(Value::TextRectangle)
            }
            ClearGuide => parse_clear_guide(p),
            ExitWarning => parse_exit_warning(p),
            Feed => non_empty(Some(p)).map(Value::Feed),
            Locator => non_empty(Some(p)).map(Value::Locator),
            Parking => parse_parking(p),
            SlowWarning => parse_slow_warning(p),
            SpeedAdvisory => p.is_empty().then_some(Value::SpeedAdvisory()),
            Standby => p.is_empty().then_some(Value::Standby()),
            TimeAction => parse_time_action(p),
            Tolling => parse_tolling(p),
            TravelTime => parse_travel_time(p),
        }
    }
}

/// Parse a color from a tag
///
/// * `v` Iterator of color parameters.
fn parse_color<'a, I>(v: I) -> Option<Color>
where
    I: Iterator<Item = &'a str>,
{
    let mut rgb = v.map(|i| i.parse::<u8>());
    match (rgb.next(), rgb.next(), rgb.next(), rgb.next()) {
        (Some(Ok(r)), Some(Ok(g)), Some(Ok(b)), None) => {
            Some(Color::Rgb(r, g, b))
        }
        (Some(Ok(n)), None, _, _) => Some(Color::Legacy(n)),
        _ => None,
    }
}

/// Parse an optional color (empty for default)
fn parse_optional_color(p: &str) -> Option<Option<Color>> {
    if p.is_empty() {
        Some(None)
    } else {
        parse_color(p.split(',')).map(Some)
    }
}

/// Parse a rectangle from a tag
///
/// * `v` Iterator of rectangle parameters.
fn parse_rectangle<'a, I>(v: &mut I) -> Option<Rectangle>
where
    I: Iterator<Item = &'a str>,
{
    let x = parse_int(v)?;
    let y = parse_int(v)?;
    let w = parse_int(v)?;
    let h = parse_int(v)?;
    (x > 0 && y > 0).then(|| Rectangle::new(x, y, w, h))
}

/// Parse an integer value
fn parse_int<'a, I, T>(v: &mut I) -> Option<T>
where
    I: Iterator<Item = &'a str>,
    T: FromStr,
{
    v.next().and_then(|s| s.parse::<T>().ok())
}

/// Parse a nonzero value
fn parse_nonzero<'a, I, T>(v: &mut I) -> Option<T>
where
    I: Iterator<Item = &'a str>,
    T: FromStr + PartialOrd + Default,
{
    // Use default to check for nonzero
    parse_int(v).filter(|i: &T| *i != T::default())
}

/// Parse a version ID value (4 hexadecimal digits)
fn parse_version_id(v: Option<&str>) -> Option<u16> {
    v.filter(|s| s.len() == 4)
        .and_then(|s| u16::from_str_radix(s, 16).ok())
}

/// Get a parameter if it is not empty
fn non_empty(v: Option<&str>) -> Option<&str> {
    v.filter(|s| !s.is_empty())
}

/// Parse a Color -- Background tag [cb]
fn parse_color_background(p: &str) -> Option<Value<'_>> {
    if p.is_empty() {
        Some(Value::ColorBackground(None))
    } else {
        // 1203 specifies a numeric value between 0 and 999,
        // but anything above 255 does not make sense
        let n = p.parse::<u8>().ok()?;
        Some(Value::ColorBackground(Some(Color::Legacy(n))))
    }
}

/// Parse a Color Rectangle tag [cr]
fn parse_color_rectangle(p: &str) -> Option<Value<'_>> {
    let mut vs = p.splitn(7, ',');
    let rect = parse_rectangle(&mut vs)?;
    let clr = parse_color(vs)?;
    Some(Value::ColorRectangle(rect, clr))
}

/// Parse a Font tag [fo]
fn parse_font(p: &str) -> Option<Value<'_>> {
    if p.is_empty() {
        return Some(Value::Font(None));
    }
    let mut vs = p.splitn(2, ',');
    let num = parse_nonzero(&mut vs)?;
    let vid = parse_version_id(vs.next());
    Some(Value::Font(Some((num, vid))))
}

/// Parse a Graphic tag [g]
fn parse_graphic(p: &str) -> Option<Value<'_>> {
    let mut vs = p.splitn(4, ',');
    let num = parse_nonzero(&mut vs)?;
    let pos = match (vs.next(), vs.next()) {
        (Some(x), Some(y)) => parse_xy(x, y),
        _ => None,
    };
    let vid = parse_version_id(vs.next());
    Some(Value::Graphic(num, pos.map(|(x, y)| (x, y, vid))))
}

/// Parse an x/y pair
fn parse_xy(x: &str, y: &str) -> Option<(u16, u16)> {
    let x = x.parse().ok()?;
    let y = y.parse().ok()?;
    (x > 0 && y > 0).then_some((x, y))
}

/// Parse a Justification -- Line tag [jl]
fn parse_justification_line(p: &str) -> Option<Value<'_>> {
    match p.parse::<u8>() {
        Ok(n) => JustificationLine::from_u8(n)
            .map(|jl| Value::JustificationLine(Some(jl))),
        Err(_) => Some(Value::JustificationLine(None)),
    }
}

/// Parse a Justification -- Page tag [jp]
fn parse_justification_page(p: &str) -> Option<Value<'_>> {
    match p.parse::<u8>() {
        Ok(n) => JustificationPage::from_u8(n)
            .map(|jp| Value::JustificationPage(Some(jp))),
        Err(_) => Some(Value::JustificationPage(None)),
    }
}

/// Parse a Page Time tag [pt]
fn parse_page_time(p: &str) -> Option<Value<'_>> {
    let mut vs = p.splitn(2, |c: char| c == 'o' || c == 'O');
    let on = parse_int(&mut vs);
    let off = parse_int(&mut vs);
    Some(Value::PageTime(on, off))
}

/// Parse a Spacing -- Character tag [sc]
fn parse_spacing_character(p: &str) -> Option<Value<'_>> {
    match p.parse::<u8>() {
        Ok(s) if s < 100 => Some(Value::SpacingCharacter(s)),
        _ => None,
    }
}

/// Parse a ClearGuide tag [cg]
fn parse_clear_guide(p: &str) -> Option<Value<'_>> {
    let mut vs = p.splitn(5, ',');
    let dms = non_empty(vs.next())?;
    let wid = parse_int(&mut vs)?;
    let min = parse_int(&mut vs)?;
    let mode = non_empty(vs.next())?;
    let ridx = parse_int(&mut vs).unwrap_or(0);
    Some(Value::ClearGuide(dms, wid, min, mode, ridx))
}

/// Parse an exit backup warning tag [exit]
fn parse_exit_warning(p: &str) -> Option<Value<'_>> {
    let mut vs = p.splitn(2, ',');
    let did = non_empty(vs.next())?;
    match parse_int(&mut vs) {
        Some(occ) if occ < 100 => Some(Value::ExitWarning(did, occ)),
        _ => None,
    }
}

/// Parse a parking area tag [pa]
fn parse_parking(p: &str) -> Option<Value<'_>> {
    let mut vs = p.splitn(3, ',');
    let pid = non_empty(vs.next())?;
    let low = vs.next().unwrap_or(PARKING_LOW_TEXT);
    let closed = vs.next().unwrap_or(PARKING_CLOSED_TEXT);
    Some(Value::Parking(pid, low, closed))
}

/// Parse a slow traffic warning tag [slow]
fn parse_slow_warning(p: &str) -> Option<Value<'_>> {
    let mut vs = p.splitn(3, ',');
    let spd = parse_int(&mut vs).filter(|s: &u8| *s < 100)?;
    let dist = parse_int(&mut vs)?;
    let mode = vs.next().and_then(SlowWarningMode::new).unwrap_or_default();
    Some(Value::SlowWarning(spd, dist, mode))
}

/// Parse a time action tag [ta]
fn parse_time_action(p: &str) -> Option<Value<'_>> {
    let mut vs = p.splitn(2, ',');
    // schedule direction: next or prior
    let dir = vs
        .next()
        .filter(|d| matches!(*d, "n" | "N" | "p" | "P"))?;
    let format = vs.next().unwrap_or("");
    Some(Value::TimeAction(dir, format))
}

/// Parse a tolling tag [tz]
fn parse_tolling(p: &str) -> Option<Value<'_>> {
    let mut vs = p.split(',');
    let mode = vs.next().and_then(TollingMode::new)?;
    Some(Value::Tolling(mode, vs.collect()))
}

/// Parse a travel time tag [tt]
fn parse_travel_time(p: &str) -> Option<Value<'_>> {
    let mut vs = p.splitn(3, ',');
    let sid = non_empty(vs.next())?;
    let mode = vs.next().and_then(OverLimitMode::new).unwrap_or_default();
    let text = vs.next().unwrap_or(OVER_LIMIT_TEXT);
    Some(Value::TravelTime(sid, mode, text))
}

/// Strip a prefix, ignoring ASCII case
fn strip_prefix_ignore_case<'a>(tag: &'a str, prefix: &str) -> Option<&'a str> {
    let head = tag.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &tag[prefix.len()..])
}

/// Parse a tag (without brackets)
///
/// Returns `Ok(None)` for a recognized tag with unusable parameters.
pub(crate) fn parse_tag(tag: &str) -> Result<Option<Value<'_>>> {
    for (prefix, kind) in TAG_PREFIXES {
        if let Some(params) = strip_prefix_ignore_case(tag, prefix) {
            return Ok(kind.parse(params));
        }
    }
    Err(SyntaxError::UnsupportedTag(tag.into()))
}

/// Collapse doubled brackets in a span of text
fn unescape(text: &str) -> Cow<'_, str> {
    if text.contains("[[") || text.contains("]]") {
        Cow::Owned(text.replace("[[", "[").replace("]]", "]"))
    } else {
        Cow::Borrowed(text)
    }
}

impl<'p> MultiStr<'p> {
    /// Create a new MULTI tokenizer
    pub fn new(ms: &'p str) -> Self {
        debug!("MultiStr::new {}", ms);
        MultiStr { ms, offset: 0 }
    }

    /// Find the next bracket which is not doubled
    fn find_bracket(&self, bracket: u8) -> Option<usize> {
        let bytes = self.ms.as_bytes();
        let mut i = self.offset;
        while i < bytes.len() {
            if bytes[i] == bracket {
                if bytes.get(i + 1) == Some(&bracket) {
                    i += 2;
                    continue;
                }
                return Some(i);
            }
            i += 1;
        }
        None
    }

    /// Chop a slice ending at `end`
    fn chop(&mut self, end: usize) -> &'p str {
        let slice = &self.ms[self.offset..end];
        self.offset = end;
        slice
    }

    /// Chop a text slice ending at `end`
    fn chop_text(&mut self, end: usize) -> (&'p str, Token<'p>) {
        let text = self.chop(end);
        (text, Token::Text(unescape(text)))
    }

    /// Get the next slice and its token
    pub fn next_slice(&mut self) -> Option<(&'p str, Token<'p>)> {
        if self.offset >= self.ms.len() {
            return None;
        }
        let open = self.find_bracket(b'[');
        let close = self.find_bracket(b']');
        let bracket = match (open, close) {
            (Some(o), Some(c)) if c < o => c,
            (Some(o), _) => o,
            (None, Some(c)) => c,
            (None, None) => return Some(self.chop_text(self.ms.len())),
        };
        if bracket > self.offset {
            return Some(self.chop_text(bracket));
        }
        if Some(bracket) == close {
            let slice = self.chop(bracket + 1);
            return Some((slice, Token::Unmatched("]")));
        }
        match self.ms[bracket + 1..].find(']') {
            Some(i) => {
                let end = bracket + 1 + i;
                let slice = self.chop(end + 1);
                Some((slice, Token::Tag(&self.ms[bracket + 1..end])))
            }
            None => {
                let slice = self.chop(bracket + 1);
                Some((slice, Token::Unmatched("[")))
            }
        }
    }
}

impl<'p> Iterator for MultiStr<'p> {
    type Item = Token<'p>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_slice().map(|(_slice, token)| token)
    }
}

impl<'p> Iterator for MultiSplitter<'p> {
    type Item = &'p str;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next_slice().map(|(slice, _token)| slice)
    }
}

/// Parse a MULTI string, calling a visitor for each value
pub fn parse<V: MultiVisitor + ?Sized>(ms: &str, v: &mut V) {
    for token in MultiStr::new(ms) {
        match token {
            Token::Text(text) => v.add_span(&text),
            Token::Unmatched(bracket) => v.unsupported_tag(bracket),
            Token::Tag(tag) => match parse_tag(tag) {
                Ok(Some(val)) => val.visit(v),
                Ok(None) => debug!("dropped tag: [{tag}]"),
                Err(_) => v.unsupported_tag(tag),
            },
        }
    }
}

/// Get an iterator of raw tags/text slices in a MULTI string
pub fn split(ms: &str) -> impl Iterator<Item = &str> {
    MultiSplitter(MultiStr::new(ms))
}
