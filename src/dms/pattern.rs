// pattern.rs
//
// Copyright (C) 2023-2026  Minnesota Department of Transportation
//
//! Message patterns with fillable text rectangles
use crate::dms::builder::MultiBuilder;
use crate::dms::font::Font;
use crate::dms::multi::{
    parse_tag, MultiStr, MultiVisitor, Rectangle, SyntaxError, Token, Value,
};
use crate::dms::sign::Dms;
use crate::dms::Result;
use log::debug;
use std::collections::HashMap;

/// Maximum number of abbreviation attempts for one line
const MAX_ABBREVIATE: usize = 20;

/// Word abbreviation service
pub trait Abbreviator {
    /// Abbreviate one word in a line of text
    ///
    /// Returns `None` when nothing in the line can be abbreviated.
    fn abbreviate(&self, line: &str) -> Option<String>;
}

/// Table of word abbreviations
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct WordTable {
    /// Abbreviations keyed by upper-case word
    words: HashMap<String, String>,
}

impl WordTable {
    /// Create an empty word table
    pub fn new() -> Self {
        WordTable::default()
    }

    /// Add a word with its abbreviation
    pub fn insert(&mut self, word: &str, abbr: &str) {
        let abbr = abbr.trim();
        if !abbr.is_empty() && abbr.len() < word.len() {
            self.words.insert(word.to_uppercase(), abbr.to_uppercase());
        }
    }

    /// Lookup the abbreviation of a word
    pub fn lookup(&self, word: &str) -> Option<&str> {
        self.words.get(&word.to_uppercase()).map(String::as_str)
    }
}

impl Abbreviator for WordTable {
    fn abbreviate(&self, line: &str) -> Option<String> {
        let words: Vec<&str> = line.split(' ').collect();
        let (i, abbr) = words
            .iter()
            .enumerate()
            .filter_map(|(i, w)| self.lookup(w).map(|a| (i, a)))
            .max_by_key(|(i, _)| words[*i].len())?;
        let mut abbreviated = words;
        abbreviated[i] = abbr;
        Some(abbreviated.join(" "))
    }
}

/// Text rectangle within a message pattern
#[derive(Clone, Debug)]
pub struct TextRect<'a> {
    /// Page number (starting from 1)
    pub page: u8,
    /// Rectangle on the sign
    pub rect: Rectangle,
    /// Font number
    pub font_num: u8,
    /// Implied by a page (no `[tr…]` tag)
    pub implied: bool,
    /// Character width (0 for variable)
    char_width: u8,
    /// Character height (0 for variable)
    char_height: u8,
    /// Font
    font: Option<&'a Font>,
    /// Cached glyph widths
    widths: HashMap<char, Option<u16>>,
}

impl<'a> TextRect<'a> {
    /// Create a text rectangle
    fn new(
        dms: &'a Dms,
        page: u8,
        rect: Rectangle,
        font_num: u8,
        implied: bool,
    ) -> Self {
        let vms = dms.vms_cfg();
        TextRect {
            page,
            rect,
            font_num,
            implied,
            char_width: vms.char_width_pixels,
            char_height: vms.char_height_pixels,
            font: dms.font_definition().lookup(font_num),
            widths: HashMap::new(),
        }
    }

    /// Check if another text rectangle covers the same area
    pub fn same_area(&self, other: &TextRect) -> bool {
        self.page == other.page && self.rect == other.rect
    }

    /// Get the number of text lines which fit
    pub fn line_count(&self) -> u16 {
        match self.font {
            Some(font) => {
                let ls = if self.char_height > 1 {
                    0
                } else {
                    u16::from(font.line_spacing)
                };
                let lh = u16::from(font.height) + ls;
                self.rect.height.saturating_add(ls) / lh
            }
            None => 0,
        }
    }

    /// Calculate the pixel width of a line of text
    ///
    /// Character spacing from `[sc…]` tags applies to the gaps after the
    /// tag.  A line with undefined characters is one pixel too wide to fit.
    pub fn calculate_width(&mut self, line: &str) -> u16 {
        let too_wide = self.rect.width.saturating_add(1);
        let font = match self.font {
            Some(font) => font,
            None if line.is_empty() => return 0,
            None => return too_wide,
        };
        // character cells are fixed pitch
        let fixed = self.char_width > 1;
        let default_cs = if fixed { 0 } else { u16::from(font.char_spacing) };
        let mut cs = default_cs;
        let mut width = 0u16;
        for token in MultiStr::new(line) {
            match token {
                Token::Tag(tag) => match parse_tag(tag) {
                    Ok(Some(Value::SpacingCharacter(sc))) if !fixed => {
                        cs = u16::from(sc);
                    }
                    Ok(Some(Value::SpacingCharacterEnd())) => cs = default_cs,
                    _ => (),
                },
                Token::Text(text) => {
                    for ch in text.chars() {
                        let w = *self.widths.entry(ch).or_insert_with(|| {
                            font.character(ch).ok().map(|c| u16::from(c.width))
                        });
                        match w {
                            Some(w) => {
                                if width > 0 {
                                    width = width.saturating_add(cs);
                                }
                                width = width.saturating_add(w);
                            }
                            None => return too_wide,
                        }
                    }
                }
                Token::Unmatched(_) => (),
            }
        }
        width
    }

    /// Check whether a line fits, abbreviating words if necessary
    ///
    /// Returns the line (possibly abbreviated) or `None` if it does not
    /// fit.
    pub fn check_line(
        &mut self,
        line: &str,
        abbrev: Option<&dyn Abbreviator>,
    ) -> Option<String> {
        if self.calculate_width(line) <= self.rect.width {
            return Some(line.to_string());
        }
        let abbrev = abbrev?;
        let mut line = line.to_string();
        for _ in 0..MAX_ABBREVIATE {
            line = abbrev.abbreviate(&line)?;
            if self.calculate_width(&line) <= self.rect.width {
                return Some(line);
            }
        }
        debug!("check_line: no fit for {line}");
        None
    }
}

/// Pattern values are MULTI values or "pseudo-values" from a pattern
#[derive(Debug)]
enum PatValue<'p> {
    /// Span of text (escaped)
    Text(&'p str),
    /// MULTI tag value
    Value(Value<'p>),
    /// Fillable text rectangle
    FillableRect(TextRect<'p>),
}

/// Pattern value iterator
struct PatIter<'p> {
    /// Sign
    dms: &'p Dms,
    /// MULTI pattern
    pattern: MultiStr<'p>,
    /// Value held back after a fillable rectangle
    value: Option<Value<'p>>,
    /// Current page number
    page: u8,
    /// Current font number
    font_num: u8,
    /// Current text rectangle
    rect: TextRect<'p>,
    /// Is the current text rectangle still fillable?
    fillable: bool,
    /// Have we reached the end?
    end: bool,
}

/// Message pattern
///
/// This is a message which can be composed with lines of text.  The *fillable*
/// parts are blank text rectangles or pages:
///
/// * `[tr…]` tag
/// * `[np]` tag
/// * Implicit page at start of message
///
/// To be fillable, a rectangle or page must not contain any text or `[nl]`
/// tags before the next `[tr…]` or `[np]` tag.  A `[fo…]` tag within a
/// rectangle applies to the **next** rectangle or page.
pub struct MessagePattern<'p> {
    /// Sign
    dms: &'p Dms,
    /// MULTI string
    ms: &'p str,
}

impl<'p> PatIter<'p> {
    /// Create a new pattern iterator
    fn new(dms: &'p Dms, ms: &'p str) -> Self {
        let font_num = dms.multi_cfg().default_font;
        let rect = TextRect::new(dms, 1, dms.full_rect(), font_num, true);
        PatIter {
            dms,
            pattern: MultiStr::new(ms),
            value: None,
            page: 1,
            font_num,
            rect,
            fillable: true,
            end: false,
        }
    }

    /// Move to a new text rectangle, checking the previous one
    fn transition(
        &mut self,
        rect: Rectangle,
        implied: bool,
    ) -> Option<TextRect<'p>> {
        let next =
            TextRect::new(self.dms, self.page, rect, self.font_num, implied);
        let prev = std::mem::replace(&mut self.rect, next);
        let fillable = std::mem::replace(&mut self.fillable, true);
        // an explicit rectangle replaces the implied page rectangle
        (fillable && (implied || !prev.implied)).then_some(prev)
    }

    /// Get the next value from the pattern
    fn next_value(&mut self) -> Option<Result<PatValue<'p>>> {
        loop {
            let (raw, token) = match self.pattern.next_slice() {
                Some(slice) => slice,
                None => {
                    self.end = true;
                    let full = self.dms.full_rect();
                    return self
                        .transition(full, true)
                        .map(|r| Ok(PatValue::FillableRect(r)));
                }
            };
            match token {
                Token::Text(_) => {
                    self.fillable = false;
                    return Some(Ok(PatValue::Text(raw)));
                }
                Token::Unmatched(b) => {
                    return Some(Err(SyntaxError::UnsupportedTag(b.into())))
                }
                Token::Tag(tag) => match parse_tag(tag) {
                    Ok(Some(value)) => return Some(Ok(PatValue::Value(value))),
                    Ok(None) => debug!("pattern: dropped tag [{tag}]"),
                    Err(e) => return Some(Err(e)),
                },
            }
        }
    }
}

impl<'p> Iterator for PatIter<'p> {
    type Item = Result<PatValue<'p>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(v) = self.value.take() {
            return Some(Ok(PatValue::Value(v)));
        }
        if self.end {
            return None;
        }
        let value = match self.next_value()? {
            Ok(PatValue::Value(v)) => v,
            other => return Some(other),
        };
        if let Some(tag) = value.tag() {
            if !self.dms.multi_cfg().is_supported(tag) {
                return Some(Err(SyntaxError::UnsupportedTag(value.into())));
            }
        }
        let fillable = match value {
            Value::Font(fo) => {
                let default = self.dms.multi_cfg().default_font;
                self.font_num = fo.map_or(default, |(n, _)| n);
                None
            }
            Value::NewLine(_) => {
                self.fillable = false;
                None
            }
            Value::NewPage() => {
                self.page = self.page.saturating_add(1);
                self.transition(self.dms.full_rect(), true)
            }
            Value::TextRectangle(tr) => {
                let rect = tr.extend_width_height(self.dms.full_rect());
                self.transition(rect, false)
            }
            _ => None,
        };
        match fillable {
            Some(rect) => {
                self.value = Some(value);
                Some(Ok(PatValue::FillableRect(rect)))
            }
            None => Some(Ok(PatValue::Value(value))),
        }
    }
}

/// Take the next slice from a MULTI string, skipping font tags
///
/// Returns the slice, its token and the remainder of the string.
fn next_skip_fonts(ms: &str) -> Option<(&str, Token<'_>, &str)> {
    let mut values = MultiStr::new(ms);
    let mut pos = 0;
    while let Some((raw, token)) = values.next_slice() {
        pos += raw.len();
        if let Token::Tag(tag) = token {
            if let Ok(Some(Value::Font(_))) = parse_tag(tag) {
                continue;
            }
        }
        return Some((raw, token, &ms[pos..]));
    }
    None
}

/// Check if a token can be part of a fillable line
fn is_line_token(token: &Token) -> bool {
    match token {
        Token::Text(_) => true,
        Token::Tag(tag) => matches!(
            parse_tag(tag),
            Ok(Some(
                Value::ColorForeground(_)
                    | Value::JustificationLine(_)
                    | Value::SpacingCharacter(_)
                    | Value::SpacingCharacterEnd()
            ))
        ),
        Token::Unmatched(_) => false,
    }
}

/// Check if a token is a new line tag
fn is_new_line(token: &Token) -> bool {
    match token {
        Token::Tag(tag) => matches!(parse_tag(tag), Ok(Some(Value::NewLine(_)))),
        _ => false,
    }
}

impl<'p> MessagePattern<'p> {
    /// Create a new fillable pattern
    ///
    /// * `dms`: The sign
    /// * `ms`: MULTI string
    pub fn new(dms: &'p Dms, ms: &'p str) -> Self {
        MessagePattern { dms, ms }
    }

    /// Find fillable text rectangles
    ///
    /// Returns no rectangles if the pattern is not valid for the sign.
    pub fn find(&self) -> Vec<TextRect<'p>> {
        let mut rects = Vec::new();
        for value in PatIter::new(self.dms, self.ms) {
            match value {
                Ok(PatValue::FillableRect(rect)) => rects.push(rect),
                Ok(_) => (),
                Err(e) => {
                    debug!("find: {e}");
                    return Vec::new();
                }
            }
        }
        rects
    }

    /// Find widths of fillable text lines
    ///
    /// Returns tuples containing pixel width and font number for each
    /// fillable line in the pattern.
    pub fn widths(&self) -> Vec<(u16, u8)> {
        let mut lines = Vec::new();
        for rect in self.find() {
            for _ in 0..rect.line_count() {
                lines.push((rect.rect.width, rect.font_num));
            }
        }
        lines
    }

    /// Fill lines into "fillable" parts of the pattern
    ///
    /// Returns an empty string if the pattern is not valid for the sign.
    pub fn fill<'l>(&self, mut lines: impl Iterator<Item = &'l str>) -> String {
        let mut font_val = None;
        let mut ms = MultiBuilder::new();
        for value in PatIter::new(self.dms, self.ms) {
            match value {
                Ok(PatValue::Value(Value::Font(fv))) => font_val = Some(fv),
                Ok(PatValue::Value(Value::Feed(_))) => (),
                Ok(PatValue::FillableRect(rect)) => {
                    for i in 0..rect.line_count() {
                        match lines.next() {
                            Some(line) => {
                                if i > 0 {
                                    ms.add_line(None);
                                }
                                ms.append(line);
                            }
                            None => break,
                        }
                    }
                    // defer font tag until lines are filled
                    if let Some(fv) = font_val.take() {
                        ms.set_font(fv);
                    }
                }
                Ok(val) => {
                    if let Some(fv) = font_val.take() {
                        ms.set_font(fv);
                    }
                    match val {
                        PatValue::Text(text) => ms.append(text),
                        PatValue::Value(v) => v.visit(&mut ms),
                        PatValue::FillableRect(_) => (),
                    }
                }
                Err(e) => {
                    debug!("fill: {e}");
                    return String::new();
                }
            }
        }
        if let Some(fv) = font_val {
            ms.set_font(fv);
        }
        ms.to_string()
    }

    /// Split a MULTI string into lines matching the pattern
    ///
    /// Returns string slices for each fillable line in the pattern, padded
    /// or truncated to fit each rectangle.  If the MULTI string does not
    /// match the pattern, no lines are returned.
    pub fn split_lines<'m>(&self, mut ms: &'m str) -> Vec<&'m str> {
        let mut lines = Vec::new();
        for pval in PatIter::new(self.dms, self.ms) {
            let pval = match pval {
                Ok(pval) => pval,
                Err(e) => {
                    debug!("split_lines: {e}");
                    lines.clear();
                    break;
                }
            };
            match pval {
                PatValue::FillableRect(rect) => {
                    let mut n_lines = rect.line_count();
                    let mut values = MultiStr::new(ms);
                    let mut pos = 0;
                    let mut start = 0;
                    let mut end = 0;
                    while let Some((raw, token)) = values.next_slice() {
                        if is_line_token(&token) {
                            pos += raw.len();
                            end = pos;
                        } else if is_new_line(&token) {
                            if n_lines > 0 {
                                lines.push(&ms[start..end]);
                                n_lines -= 1;
                            }
                            pos += raw.len();
                            start = pos;
                            end = pos;
                        } else {
                            break;
                        }
                    }
                    // pad extra lines in rectangle
                    while n_lines > 0 {
                        lines.push(&ms[start..end]);
                        n_lines -= 1;
                        start = end;
                    }
                    ms = &ms[end..];
                }
                PatValue::Value(Value::Font(_)) => {
                    // font tags apply after fillable text
                }
                PatValue::Text(text) => match next_skip_fonts(ms) {
                    Some((raw, Token::Text(_), rest)) if raw == text => {
                        ms = rest;
                    }
                    _ => {
                        lines.clear();
                        break;
                    }
                },
                PatValue::Value(val) => match next_skip_fonts(ms) {
                    Some((_, Token::Tag(tag), rest))
                        if parse_tag(tag) == Ok(Some(val.clone())) =>
                    {
                        ms = rest;
                    }
                    _ => {
                        // abort!  ms does not match pattern
                        lines.clear();
                        break;
                    }
                },
            }
        }
        lines
    }
}
