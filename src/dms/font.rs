// font.rs
//
// Copyright (C) 2018-2026  Minnesota Department of Transportation
//
//! Bitmap fonts for dynamic message signs
use crate::dms::multi::SyntaxError;
use crate::dms::Result;
use log::debug;
use pix::{rgb::SRgb8, Raster};

/// Font error
#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum FontError {
    #[error("Invalid font number")]
    InvalidNumber,

    #[error("Duplicate font number: {0}")]
    DuplicateNumber(u8),

    #[error("Duplicate character number: {0}")]
    DuplicateCharNumber(u16),

    #[error("Invalid height")]
    InvalidHeight,

    #[error("Invalid bitmap size for character: {0}")]
    InvalidCharHeight(u16),
}

/// Character for a bitmap [font]
///
/// [font]: struct.Font.html
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct CharacterEntry {
    /// Character number (code point)
    pub number: u16,
    /// Width in pixels
    pub width: u8,
    /// Bitmap data (by rows, packed bits)
    #[serde(with = "super::base64")]
    pub bitmap: Vec<u8>,
}

/// Bitmap font
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Font {
    /// Font number
    pub number: u8,
    /// Name (max 64 characters)
    #[serde(default)]
    pub name: String,
    /// Height in pixels
    pub height: u8,
    /// Default pixel spacing between characters
    #[serde(default)]
    pub char_spacing: u8,
    /// Default pixel spacing between lines
    #[serde(default)]
    pub line_spacing: u8,
    /// Characters in font
    pub characters: Vec<CharacterEntry>,
}

/// Table of fonts
///
/// This represents the `fontDefinition` of a sign.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct FontTable {
    /// Fonts in table
    fonts: Vec<Font>,
}

impl CharacterEntry {
    /// Check if the bitmap size matches the font height
    fn is_valid(&self, height: u8) -> bool {
        let bits = usize::from(self.width) * usize::from(height);
        self.bitmap.len() == (bits + 7) / 8
    }

    /// Check if a pixel is lit
    pub fn is_pixel_lit(&self, row: usize, col: usize) -> bool {
        let pos = row * usize::from(self.width) + col;
        let bit = 7 - (pos & 0b111);
        self.bitmap
            .get(pos / 8)
            .is_some_and(|by| (by >> bit) & 1 != 0)
    }

    /// Render the character to a raster
    ///
    /// * `page` Raster to render on.
    /// * `x` Left position of character (0-based).
    /// * `y` Top position of character (0-based).
    /// * `height` Font height in pixels.
    /// * `cf` Foreground color.
    fn render_char(
        &self,
        page: &mut Raster<SRgb8>,
        x: i32,
        y: i32,
        height: i32,
        cf: SRgb8,
    ) -> Result<()> {
        let width = i32::from(self.width);
        debug!("render_char: {} @ {x},{y} width: {width}", self.number);
        if x < 0
            || y < 0
            || i64::from(x + width) > i64::from(page.width())
            || i64::from(y + height) > i64::from(page.height())
        {
            return Err(SyntaxError::TextTooBig);
        }
        for yy in 0..height {
            for xx in 0..width {
                if self.is_pixel_lit(yy as usize, xx as usize) {
                    *page.pixel_mut(x + xx, y + yy) = cf;
                }
            }
        }
        Ok(())
    }
}

impl Font {
    /// Validate the font
    pub fn validate(&self) -> std::result::Result<(), FontError> {
        if self.number < 1 {
            return Err(FontError::InvalidNumber);
        }
        if self.height < 1 {
            return Err(FontError::InvalidHeight);
        }
        if let Some(c) =
            self.characters.iter().find(|c| !c.is_valid(self.height))
        {
            return Err(FontError::InvalidCharHeight(c.number));
        }
        for (i, c) in self.characters.iter().enumerate() {
            if self.characters[i + 1..].iter().any(|o| o.number == c.number)
            {
                return Err(FontError::DuplicateCharNumber(c.number));
            }
        }
        Ok(())
    }

    /// Get width (if fixed-width), or 0
    pub fn width(&self) -> u8 {
        let width =
            self.characters.first().map(|c| c.width).unwrap_or_default();
        if self.characters.iter().all(|c| c.width == width) {
            width
        } else {
            0
        }
    }

    /// Get a character
    pub fn character(&self, ch: char) -> Result<&CharacterEntry> {
        u16::try_from(u32::from(ch))
            .ok()
            .and_then(|n| self.characters.iter().find(|c| c.number == n))
            .ok_or(SyntaxError::CharacterNotDefined(ch))
    }

    /// Calculate the width of a span of text
    ///
    /// * `text` Span of text.
    /// * `cs` Character spacing in pixels.
    ///
    /// A width which does not fit in `u16` is `TextTooBig`.
    pub fn text_width(&self, text: &str, cs: Option<u16>) -> Result<u16> {
        let mut width = 0u32;
        let cs = u32::from(cs.unwrap_or_else(|| u16::from(self.char_spacing)));
        for ch in text.chars() {
            let c = self.character(ch)?;
            if width > 0 {
                width += cs;
            }
            width += u32::from(c.width);
            if width > u32::from(u16::MAX) {
                return Err(SyntaxError::TextTooBig);
            }
        }
        u16::try_from(width).map_err(|_| SyntaxError::TextTooBig)
    }

    /// Render a span of text
    ///
    /// * `page` Raster to render on.
    /// * `text` Span of text.
    /// * `x` Left position of first character (0-based).
    /// * `y` Top position of first character (0-based).
    /// * `cs` Character spacing in pixels.
    /// * `cf` Foreground color.
    pub(crate) fn render_text(
        &self,
        page: &mut Raster<SRgb8>,
        text: &str,
        x: i32,
        y: i32,
        cs: i32,
        cf: SRgb8,
    ) -> Result<()> {
        let height = i32::from(self.height);
        debug!("render_text: font {} {text} @ {x},{y}", self.number);
        let mut xx = 0;
        for ch in text.chars() {
            let c = self.character(ch)?;
            if xx > 0 {
                xx += cs;
            }
            c.render_char(page, x + xx, y, height, cf)?;
            xx += i32::from(c.width);
        }
        Ok(())
    }
}

impl FontTable {
    /// Create an empty font table
    pub const fn new() -> Self {
        FontTable { fonts: Vec::new() }
    }

    /// Push a font into the table
    pub fn push(&mut self, font: Font) -> std::result::Result<(), FontError> {
        font.validate()?;
        if self.lookup(font.number).is_some() {
            return Err(FontError::DuplicateNumber(font.number));
        }
        self.fonts.push(font);
        Ok(())
    }

    /// Validate the font table
    pub fn validate(&self) -> std::result::Result<(), FontError> {
        for (i, font) in self.fonts.iter().enumerate() {
            font.validate()?;
            if self.fonts[i + 1..].iter().any(|f| f.number == font.number) {
                return Err(FontError::DuplicateNumber(font.number));
            }
        }
        Ok(())
    }

    /// Lookup a font by number
    pub fn lookup(&self, fnum: u8) -> Option<&Font> {
        self.fonts.iter().find(|f| f.number == fnum)
    }

    /// Lookup a font by name
    pub fn lookup_name(&self, name: &str) -> Option<&Font> {
        self.fonts.iter().find(|f| f.name == name)
    }

    /// Iterate over all fonts
    pub fn iter(&self) -> impl Iterator<Item = &Font> {
        self.fonts.iter()
    }
}

#[cfg(test)]
impl Font {
    /// Build a font where each glyph except space has only its bottom-left
    /// pixel lit
    pub(crate) fn solid(
        number: u8,
        height: u8,
        char_spacing: u8,
        line_spacing: u8,
        chars: &[(char, u8)],
    ) -> Font {
        let characters = chars
            .iter()
            .map(|(ch, width)| {
                let w = usize::from(*width);
                let bits = w * usize::from(height);
                let mut bitmap = vec![0; (bits + 7) / 8];
                if *ch != ' ' {
                    let pos = (usize::from(height) - 1) * w;
                    bitmap[pos / 8] |= 0x80 >> (pos & 7);
                }
                CharacterEntry {
                    number: *ch as u16,
                    width: *width,
                    bitmap,
                }
            })
            .collect();
        Font {
            number,
            name: format!("F{number}"),
            height,
            char_spacing,
            line_spacing,
            characters,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const FONT_JSON: &str = r#"[{
        "number": 1,
        "name": "tiny",
        "height": 2,
        "char_spacing": 1,
        "line_spacing": 2,
        "characters": [
            { "number": 65, "width": 2, "bitmap": "kA==" },
            { "number": 66, "width": 1, "bitmap": "gA==" }
        ]
    }]"#;

    #[test]
    fn json_table() {
        let table: FontTable = serde_json::from_str(FONT_JSON).unwrap();
        table.validate().unwrap();
        let font = table.lookup(1).unwrap();
        assert_eq!(font.height, 2);
        assert!(table.lookup_name("tiny").is_some());
        assert!(table.lookup(2).is_none());
        let a = font.character('A').unwrap();
        assert_eq!(a.bitmap, vec![0x90]);
        assert!(a.is_pixel_lit(0, 0));
        assert!(!a.is_pixel_lit(0, 1));
        assert!(!a.is_pixel_lit(1, 0));
        assert!(a.is_pixel_lit(1, 1));
        assert_eq!(font.width(), 0);
        let json = serde_json::to_string(&table).unwrap();
        assert!(json.contains(r#""bitmap":"kA==""#));
    }

    #[test]
    fn text_width() {
        let font = Font::solid(1, 7, 1, 3, &[('A', 5), ('.', 1)]);
        assert_eq!(font.width(), 0);
        assert_eq!(font.text_width("", None), Ok(0));
        assert_eq!(font.text_width("A", None), Ok(5));
        assert_eq!(font.text_width("AA.", None), Ok(13));
        assert_eq!(font.text_width("AA.", Some(3)), Ok(17));
        assert_eq!(
            font.text_width("AB", None),
            Err(SyntaxError::CharacterNotDefined('B'))
        );
        assert_eq!(
            font.character('\u{1F600}'),
            Err(SyntaxError::CharacterNotDefined('\u{1F600}'))
        );
    }

    #[test]
    fn text_width_overflow() {
        let font = Font::solid(1, 7, 255, 3, &[('W', 255)]);
        assert_eq!(font.text_width(&"W".repeat(128), None), Ok(65_025));
        assert_eq!(font.text_width(&"W".repeat(129), None), Ok(65_535));
        assert_eq!(
            font.text_width(&"W".repeat(130), None),
            Err(SyntaxError::TextTooBig)
        );
        assert_eq!(
            font.text_width(&"W".repeat(300), None),
            Err(SyntaxError::TextTooBig)
        );
    }

    #[test]
    fn validation() {
        let mut font = Font::solid(1, 7, 1, 3, &[('A', 5)]);
        assert_eq!(font.validate(), Ok(()));
        font.characters.push(font.characters[0].clone());
        assert_eq!(font.validate(), Err(FontError::DuplicateCharNumber(65)));
        font.characters.pop();
        font.characters[0].bitmap.push(0);
        assert_eq!(font.validate(), Err(FontError::InvalidCharHeight(65)));
        let mut table = FontTable::new();
        assert_eq!(table.push(Font::default()), Err(FontError::InvalidNumber));
        assert_eq!(table.push(Font::solid(2, 5, 1, 2, &[('A', 4)])), Ok(()));
        assert_eq!(
            table.push(Font::solid(2, 7, 1, 2, &[('A', 4)])),
            Err(FontError::DuplicateNumber(2))
        );
        assert_eq!(table.iter().count(), 1);
    }

    #[test]
    fn render_bounds() {
        let font = Font::solid(1, 7, 1, 3, &[('A', 5)]);
        let clr = SRgb8::new(255, 255, 255);
        let mut page = Raster::with_color(10, 7, SRgb8::new(0, 0, 0));
        assert_eq!(font.render_text(&mut page, "A", 5, 0, 1, clr), Ok(()));
        assert_eq!(page.pixels()[6 * 10 + 5], clr);
        assert_eq!(page.pixels()[6 * 10 + 6], SRgb8::new(0, 0, 0));
        assert_eq!(
            font.render_text(&mut page, "AA", 0, 0, 1, clr),
            Err(SyntaxError::TextTooBig)
        );
        assert_eq!(
            font.render_text(&mut page, "A", 0, 1, 1, clr),
            Err(SyntaxError::TextTooBig)
        );
    }
}
