// multistring.rs
//
// Copyright (C) 2026  Minnesota Department of Transportation
//
//! MULTI string operations
//!
//! Transforms work by parsing through a filtering [MultiBuilder].
//!
//! [MultiBuilder]: struct.MultiBuilder.html
use crate::dms::builder::MultiBuilder;
use crate::dms::multi::{
    parse, parse_tag, split, Color, MultiStr, MultiVisitor, Rectangle, Token,
    Value,
};
use crate::dms::pagetime::PageTimes;
use std::fmt;

/// A MULTI string
///
/// Two strings are equal when their normalized forms are equal.
#[derive(Clone, Debug, Default)]
pub struct MultiString(String);

/// Scope of normalization
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Scope {
    /// Full message
    Message,
    /// Single line
    Line,
    /// Single line, keeping locator tags
    Locator,
}

/// Builder dropping unsupported tags and invalid characters
struct Normalizer {
    mb: MultiBuilder,
    scope: Scope,
}

/// Builder dropping a class of values
struct Filter<F: Fn(&Value<'_>) -> bool> {
    mb: MultiBuilder,
    keep: F,
}

/// Builder replacing page times
struct PageTimeReplacer {
    mb: MultiBuilder,
    on: Option<u8>,
    off: Option<u8>,
}

/// Builder repeating a shared prefix on every page
struct SharedPrefix<'a> {
    mb: MultiBuilder,
    prefix: &'a str,
}

/// Check whether a character is allowed in a MULTI span
fn is_allowed(c: char) -> bool {
    (' '..='~').contains(&c)
}

/// Check whether a raw slice is a tag with the given value kind
fn is_tag(slice: &str, check: fn(&Value<'_>) -> bool) -> bool {
    match MultiStr::new(slice).next() {
        Some(Token::Tag(tag)) => {
            matches!(parse_tag(tag), Ok(Some(v)) if check(&v))
        }
        _ => false,
    }
}

/// Check whether a value is a new page tag
fn is_new_page(v: &Value<'_>) -> bool {
    matches!(v, Value::NewPage())
}

/// Check whether a value is a new line tag
fn is_new_line(v: &Value<'_>) -> bool {
    matches!(v, Value::NewLine(_))
}

/// Check whether a value is a text rectangle tag
fn is_text_rectangle(v: &Value<'_>) -> bool {
    matches!(v, Value::TextRectangle(_))
}

/// Split raw markup into pages
fn raw_pages(ms: &str) -> Vec<String> {
    let mut pages = vec![String::new()];
    for slice in split(ms) {
        if is_tag(slice, is_new_page) {
            pages.push(String::new());
        } else if let Some(page) = pages.last_mut() {
            page.push_str(slice);
        }
    }
    while pages.len() > 1 && pages.last().is_some_and(|p| p.is_empty()) {
        pages.pop();
    }
    pages
}

/// Check validity of MULTI markup
///
/// A tag with unusable parameters makes the markup invalid, even though
/// parsing drops it.
fn check_valid(ms: &str, strict: bool) -> bool {
    MultiStr::new(ms).all(|token| match token {
        Token::Text(text) => text.chars().all(is_allowed),
        Token::Tag(tag) => match parse_tag(tag) {
            Ok(Some(v)) => !(strict && v.is_action()),
            _ => false,
        },
        Token::Unmatched(_) => false,
    })
}

impl Scope {
    /// Check if a value is kept within scope
    fn keeps(self, val: &Value<'_>) -> bool {
        match self {
            Scope::Message => true,
            Scope::Line => !(val.is_page_scope() || val.is_action()),
            Scope::Locator => {
                matches!(val, Value::Locator(_))
                    || !(val.is_page_scope() || val.is_action())
            }
        }
    }
}

impl MultiVisitor for Normalizer {
    fn value(&mut self, val: Value<'_>) {
        if self.scope.keeps(&val) {
            self.mb.value(val);
        }
    }

    fn add_span(&mut self, span: &str) {
        let span: String = span.chars().filter(|c| is_allowed(*c)).collect();
        if !span.is_empty() {
            self.mb.add_span(&span);
        }
    }
}

impl<F: Fn(&Value<'_>) -> bool> MultiVisitor for Filter<F> {
    fn value(&mut self, val: Value<'_>) {
        if (self.keep)(&val) {
            self.mb.value(val);
        }
    }
}

impl MultiVisitor for PageTimeReplacer {
    fn value(&mut self, val: Value<'_>) {
        self.mb.value(val);
    }

    fn set_page_times(&mut self, _on: Option<u8>, _off: Option<u8>) {
        self.mb.set_page_times(self.on, self.off);
    }
}

impl MultiVisitor for SharedPrefix<'_> {
    fn value(&mut self, val: Value<'_>) {
        self.mb.value(val);
    }

    fn add_page(&mut self) {
        self.mb.add_page();
        reset_state(&mut self.mb);
        self.mb.append(self.prefix);
    }
}

/// Reset foreground color, font and justification to defaults
fn reset_state(mb: &mut MultiBuilder) {
    mb.set_color_foreground(None);
    mb.set_font(None);
    mb.set_justification_line(None);
    mb.set_justification_page(None);
}

/// Visitor checking for visible content
struct BlankCheck {
    blank: bool,
}

impl MultiVisitor for BlankCheck {
    fn add_span(&mut self, span: &str) {
        if !span.trim().is_empty() {
            self.blank = false;
        }
    }

    fn set_color_background(&mut self, _clr: Option<Color>) {
        self.blank = false;
    }

    fn set_page_background(&mut self, _clr: Option<Color>) {
        self.blank = false;
    }

    fn add_color_rectangle(&mut self, _rect: Rectangle, _clr: Color) {
        self.blank = false;
    }

    fn add_graphic(&mut self, _num: u8, _pos: Option<(u16, u16, Option<u16>)>) {
        self.blank = false;
    }
}

/// Visitor tracking the font of the last span on each page
struct FontTracker {
    default: u8,
    current: u8,
    fonts: Vec<u8>,
}

impl MultiVisitor for FontTracker {
    fn set_font(&mut self, font: Option<(u8, Option<u16>)>) {
        self.current = font.map_or(self.default, |f| f.0);
    }

    fn add_page(&mut self) {
        self.fonts.push(self.current);
    }

    fn add_span(&mut self, _span: &str) {
        if let Some(last) = self.fonts.last_mut() {
            *last = self.current;
        }
    }
}

/// Visitor collecting text spans
#[derive(Default)]
struct TextCollector(Vec<String>);

impl MultiVisitor for TextCollector {
    fn add_span(&mut self, span: &str) {
        let span = span.trim();
        if !span.is_empty() {
            self.0.push(span.into());
        }
    }
}

impl fmt::Display for MultiString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for MultiString {
    fn from(ms: String) -> Self {
        MultiString(ms)
    }
}

impl From<&str> for MultiString {
    fn from(ms: &str) -> Self {
        MultiString(ms.into())
    }
}

impl AsRef<str> for MultiString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq for MultiString {
    fn eq(&self, other: &Self) -> bool {
        self.normalize() == other.normalize()
    }
}

impl Eq for MultiString {}

impl PartialEq<&str> for MultiString {
    fn eq(&self, other: &&str) -> bool {
        self.normalize() == MultiString::from(*other).normalize()
    }
}

impl MultiString {
    /// Create a new MULTI string
    pub fn new<S: Into<String>>(ms: S) -> Self {
        MultiString(ms.into())
    }

    /// Get the raw markup
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the markup, calling a visitor for each value
    pub fn parse<V: MultiVisitor + ?Sized>(&self, v: &mut V) {
        parse(&self.0, v)
    }

    /// Check if valid (action tags allowed)
    pub fn is_valid(&self) -> bool {
        check_valid(&self.0, false)
    }

    /// Check if valid NTCIP 1203 markup (no action tags)
    pub fn is_valid_multi(&self) -> bool {
        check_valid(&self.0, true)
    }

    /// Check if the message has no visible content
    pub fn is_blank(&self) -> bool {
        let mut check = BlankCheck { blank: true };
        self.parse(&mut check);
        check.blank
    }

    /// Check if the message contains a tolling tag
    pub fn is_tolling(&self) -> bool {
        #[derive(Default)]
        struct Tolling(bool);
        impl MultiVisitor for Tolling {
            fn value(&mut self, val: Value<'_>) {
                self.0 |= matches!(val, Value::Tolling(..));
            }
        }
        let mut tolling = Tolling::default();
        self.parse(&mut tolling);
        tolling.0
    }

    /// Normalize with a scope
    fn normalize_scope(&self, scope: Scope) -> String {
        let mut norm = Normalizer {
            mb: MultiBuilder::new(),
            scope,
        };
        self.parse(&mut norm);
        norm.mb.to_string()
    }

    /// Normalize, dropping unsupported tags and invalid characters
    pub fn normalize(&self) -> String {
        self.normalize_scope(Scope::Message)
    }

    /// Normalize for a single line
    ///
    /// Page-scope tags and action tags are dropped.
    pub fn normalize_line(&self) -> String {
        self.normalize_scope(Scope::Line)
    }

    /// Normalize for a single line, keeping locator tags
    pub fn normalize_locator(&self) -> String {
        self.normalize_scope(Scope::Locator)
    }

    /// Rebuild keeping only some values
    fn filter<F: Fn(&Value<'_>) -> bool>(&self, keep: F) -> String {
        let mut filter = Filter {
            mb: MultiBuilder::new(),
            keep,
        };
        self.parse(&mut filter);
        filter.mb.to_string()
    }

    /// Strip all font tags
    pub fn strip_fonts(&self) -> String {
        self.filter(|v| !matches!(v, Value::Font(_)))
    }

    /// Strip all page time tags
    pub fn strip_page_time(&self) -> String {
        self.filter(|v| !matches!(v, Value::PageTime(..)))
    }

    /// Strip trailing new line tags
    pub fn strip_trailing_lines(&self) -> String {
        let mut slices: Vec<&str> = split(&self.0).collect();
        while slices.last().is_some_and(|s| is_tag(s, is_new_line)) {
            slices.pop();
        }
        slices.concat()
    }

    /// Replace all page times, or prepend one if there are none
    pub fn replace_page_time(&self, on: Option<u8>, off: Option<u8>) -> String {
        if split(&self.0).any(|s| is_tag(s, |v| matches!(v, Value::PageTime(..))))
        {
            let mut rep = PageTimeReplacer {
                mb: MultiBuilder::new(),
                on,
                off,
            };
            self.parse(&mut rep);
            rep.mb.to_string()
        } else {
            let mut mb = MultiBuilder::new();
            mb.set_page_times(on, off);
            mb.append(&self.0);
            mb.to_string()
        }
    }

    /// Add a prefix to every page
    pub fn add_page_prefix(&self, prefix: &str) -> MultiString {
        let mut mb = MultiBuilder::from(prefix);
        for slice in split(&self.0) {
            mb.append(slice);
            if is_tag(slice, is_new_page) {
                mb.append(prefix);
            }
        }
        mb.into_multi_string()
    }

    /// Combine two messages
    ///
    /// When `first` is a single page containing any `[tr…]` tag (not
    /// necessarily at the end), and `second` has no `[tr…]` tag, `first`
    /// is shared by every page of `second`.  Otherwise, `second` is
    /// appended on a new page.
    pub fn make_combined(first: &str, second: &str) -> MultiString {
        let first_ms = MultiString::from(first);
        let shared = first_ms.num_pages() == 1
            && split(first).any(|s| is_tag(s, is_text_rectangle))
            && !split(second).any(|s| is_tag(s, is_text_rectangle));
        let mut mb = MultiBuilder::from(first);
        if shared {
            let mut sp = SharedPrefix { mb, prefix: first };
            parse(second, &mut sp);
            mb = sp.mb;
        } else {
            mb.add_page();
            reset_state(&mut mb);
            parse(second, &mut mb);
        }
        mb.into_multi_string()
    }

    /// Get the number of pages
    pub fn num_pages(&self) -> usize {
        let mut pt = PageTimes::new();
        self.parse(&mut pt);
        pt.page_count()
    }

    /// Get the font number of each page
    ///
    /// * `default` Default font number; 0 yields no pages.
    pub fn fonts(&self, default: u8) -> Vec<u8> {
        if default == 0 {
            return Vec::new();
        }
        let mut tracker = FontTracker {
            default,
            current: default,
            fonts: vec![default],
        };
        self.parse(&mut tracker);
        tracker.fonts
    }

    /// Get the raw markup of one page (starting from 0)
    pub fn page(&self, n: usize) -> String {
        raw_pages(&self.0).into_iter().nth(n).unwrap_or_default()
    }

    /// Get text lines, `n_lines` for each page
    ///
    /// Markup through the last text rectangle of each page is skipped.
    pub fn lines(&self, n_lines: usize) -> Vec<String> {
        let mut lines = Vec::new();
        for page in raw_pages(&self.0) {
            let slices: Vec<&str> = split(&page).collect();
            let start = slices
                .iter()
                .rposition(|s| is_tag(s, is_text_rectangle))
                .map_or(0, |i| i + 1);
            let mut page_lines = vec![String::new()];
            for slice in &slices[start..] {
                if is_tag(slice, is_new_line) {
                    page_lines.push(String::new());
                } else if let Some(line) = page_lines.last_mut() {
                    line.push_str(slice);
                }
            }
            page_lines.resize(n_lines, String::new());
            lines.extend(
                page_lines
                    .iter()
                    .map(|ln| MultiString::from(ln.as_str()).normalize_line()),
            );
        }
        lines
    }

    /// Get the text spans, trimmed and joined with spaces
    pub fn as_text(&self) -> String {
        let mut text = TextCollector::default();
        self.parse(&mut text);
        text.0.join(" ")
    }

    /// Get the words of the text
    pub fn words(&self) -> Vec<String> {
        self.as_text()
            .split(' ')
            .filter(|w| !w.is_empty())
            .map(String::from)
            .collect()
    }

    /// Get page-on times (deciseconds) of each page
    pub fn page_on_times(&self, default: u8) -> Vec<u8> {
        let mut pt = PageTimes::new();
        self.parse(&mut pt);
        pt.page_on_times(default)
    }

    /// Get page-off times (deciseconds) of each page
    pub fn page_off_times(&self, default: u8) -> Vec<u8> {
        let mut pt = PageTimes::new();
        self.parse(&mut pt);
        pt.page_off_times(default)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn norm(ms: &str) -> String {
        MultiString::from(ms).normalize()
    }

    #[test]
    fn normalize_text() {
        assert_eq!(norm("01234567890"), "01234567890");
        assert_eq!(norm("DON'T"), "DON'T");
        assert_eq!(norm("AB|{}{}C{}"), "AB|{}{}C{}");
        assert_eq!(norm("!\"#$%&'()*+,-./"), "!\"#$%&'()*+,-./");
        assert_eq!(norm(":;<=>?@\\^_`{|}~"), ":;<=>?@\\^_`{|}~");
        assert_eq!(norm("\t\u{8}\n\r\u{c}"), "");
        assert_eq!(norm("CAFÉ"), "CAF");
    }

    #[test]
    fn normalize_brackets() {
        assert_eq!(norm("[["), "[[");
        assert_eq!(norm("]]"), "]]");
        assert_eq!(norm("[[NOT TAG]]"), "[[NOT TAG]]");
        assert_eq!(norm("["), "");
        assert_eq!(norm("]"), "");
        assert_eq!(norm("[bad tag"), "bad tag");
        assert_eq!(norm("bad tag]"), "bad tag");
        assert_eq!(norm("bad[tag"), "badtag");
        assert_eq!(norm("bad]tag"), "badtag");
        assert_eq!(norm("bad[ tag[nl]"), "bad");
        assert_eq!(norm("bad ]tag[nl]"), "bad tag[nl]");
    }

    #[test]
    fn normalize_tags() {
        assert_eq!(norm("ABC[bad]DEF"), "ABCDEF");
        assert_eq!(norm("ABC[nl3]DEF"), "ABC[nl3]DEF");
        assert_eq!(norm("ABC[jl4]DEF"), "ABC[jl4]DEF");
        assert_eq!(norm("ABC[jl6]DEF"), "ABCDEF");
        assert_eq!(norm("[fo3,beef]ABC DEF"), "[fo3,beef]ABC DEF");
        assert_eq!(norm("[g1_]"), "");
        assert_eq!(norm("[g1,5,5,beef]"), "[g1,5,5,beef]");
        assert_eq!(norm("[cf0,255,0]"), "[cf0,255,0]");
        assert_eq!(norm("[pt10o]"), "[pt10o]");
        assert_eq!(norm("ABC[sc3]DEF[/sc]GHI"), "ABC[sc3]DEF[/sc]GHI");
        assert_eq!(norm("[tr1,1,0,0]"), "[tr1,1,0,0]");
        assert_eq!(norm("[pb0,128,255]"), "[pb0,128,255]");
        assert_eq!(norm("[ttS100]"), "[ttS100,prepend,OVER ]");
        assert_eq!(norm("[feedL1_2]"), "[feedL1_2]");
        assert_eq!(norm("[NL][Np][FO2]"), "[nl][np][fo2]");
    }

    #[test]
    fn normalize_idempotent() {
        for ms in ["bad ]tag[nl]", "[[A]][jl6][fo2]B[tag]", "X[pt5]Y["] {
            let once = norm(ms);
            assert_eq!(norm(&once), once);
        }
    }

    #[test]
    fn normalize_line() {
        let line = |ms: &str| MultiString::from(ms).normalize_line();
        assert_eq!(line("[cb1]ABC"), "ABC");
        assert_eq!(line("[pb255,255,0]ABC"), "ABC");
        assert_eq!(line("[cf128,128,128]ABC"), "[cf128,128,128]ABC");
        assert_eq!(line("[cr1,1,5,5,3]ABC"), "ABC");
        assert_eq!(line("[fo1]ABC"), "[fo1]ABC");
        assert_eq!(line("[g1]ABC"), "ABC");
        assert_eq!(line("[jl2]ABC"), "[jl2]ABC");
        assert_eq!(line("[jp1]ABC"), "ABC");
        assert_eq!(line("[nl2]ABC"), "ABC");
        assert_eq!(line("[np]ABC"), "ABC");
        assert_eq!(line("[pt5o2]ABC"), "ABC");
        assert_eq!(line("[sc4]ABC[/sc]"), "[sc4]ABC[/sc]");
        assert_eq!(line("[tr1,1,20,20]ABC"), "ABC");
        assert_eq!(line("[feedF0]ABC"), "ABC");
        assert_eq!(line("[locmi]ABC"), "ABC");
        let loc = MultiString::from("[locmi][nl]ABC[vsa]").normalize_locator();
        assert_eq!(loc, "[locmi]ABC");
    }

    #[test]
    fn equality() {
        assert_eq!(MultiString::from(""), MultiString::from(""));
        assert_eq!(MultiString::from("XXX"), "XXX");
        assert_ne!(MultiString::from("XXX"), MultiString::from("XXY"));
        assert_eq!(MultiString::from("[FO1]abc"), "[fo1]abc");
        assert_eq!(MultiString::from("A[bad]B"), "AB");
    }

    #[test]
    fn validity() {
        for ms in [
            "",
            "abc",
            "ABC[nl1]DEF",
            "ABC[fo123]DEF",
            "ABC[jp4]DEF",
            "ABC[pt123o]",
            "ABC[pto123]",
            "[[",
            "]]",
            "!\"#$%&'()*+,-./",
            "[ttS100]ABC",
        ] {
            assert!(MultiString::from(ms).is_valid(), "{ms}");
        }
        for ms in ["ABC[tag]DEF", "[", "]", "\t\u{8}\n\r\u{c}", "[jl6]"] {
            assert!(!MultiString::from(ms).is_valid(), "{ms}");
        }
        assert!(MultiString::from("[nl]ABC").is_valid_multi());
        assert!(!MultiString::from("[ttS100]ABC").is_valid_multi());
        assert!(!MultiString::from("[feedX]").is_valid_multi());
    }

    #[test]
    fn blank() {
        for ms in [
            "",
            " ",
            "\t",
            "[nl]",
            "[np]",
            "[pt1o1]",
            "[jp2]",
            "[jl3]",
            "[fo2]",
            "[sc2]",
            "[tr1,1,20,20]",
        ] {
            assert!(MultiString::from(ms).is_blank(), "{ms}");
        }
        for ms in ["A", "[g1]", "[pb0,1,2]", "[cb1]", "[cr1,1,2,2,1]"] {
            assert!(!MultiString::from(ms).is_blank(), "{ms}");
        }
    }

    #[test]
    fn tolling() {
        assert!(!MultiString::from("ABC[nl]DEF").is_tolling());
        assert!(MultiString::from("[tzp,Z123]").is_tolling());
        assert!(MultiString::from("[tzc,Z123]").is_tolling());
    }

    #[test]
    fn pages() {
        for (ms, n) in [
            ("", 1),
            ("ABC[nl][nl]", 1),
            ("ABC[nl][np]", 2),
            ("ABC[nl][np]DEF[np]", 3),
        ] {
            assert_eq!(MultiString::from(ms).num_pages(), n, "{ms}");
        }
        let ms = MultiString::from("A[np]B[NP]C");
        assert_eq!(ms.page(0), "A");
        assert_eq!(ms.page(2), "C");
        assert_eq!(ms.page(3), "");
    }

    #[test]
    fn lines_single_page() {
        let lines = |ms: &str, n| MultiString::from(ms).lines(n);
        assert_eq!(lines("", 1), vec![""]);
        assert_eq!(lines("ABC[nl]DEF", 2), vec!["ABC", "DEF"]);
        assert_eq!(lines("ABC[nl][nl][nl]", 2), vec!["ABC", ""]);
        assert_eq!(lines("[nl]DEF[nl]GHI", 3), vec!["", "DEF", "GHI"]);
        assert_eq!(lines("ABC[nl]DEF[nl2]GHI", 3), vec!["ABC", "DEF", "GHI"]);
        assert_eq!(lines("ABC[sc3]DEF[/sc]GHI", 1), vec!["ABC[sc3]DEF[/sc]GHI"]);
        assert_eq!(
            lines("ABC[nl]D[j1x]E[j1x]F[nl]GHI", 4),
            vec!["ABC", "DEF", "GHI", ""]
        );
        assert_eq!(
            lines("[jl2]ABC[nl]DEF[g1,1,1]", 2),
            vec!["[jl2]ABC", "DEF"]
        );
        assert_eq!(
            lines("[cf0,0,0]ABC[nl]DE[sc5]F", 2),
            vec!["[cf0,0,0]ABC", "DE[sc5]F"]
        );
        assert_eq!(
            lines("RED MEANS STOP[nl]GREEN MEANS GO", 2),
            vec!["RED MEANS STOP", "GREEN MEANS GO"]
        );
    }

    #[test]
    fn lines_multi_page() {
        let lines = |ms: &str, n| MultiString::from(ms).lines(n);
        assert_eq!(lines("ABC[np]", 2), vec!["ABC", ""]);
        assert_eq!(lines("ABC[np][nl]", 2), vec!["ABC", "", "", ""]);
        assert_eq!(
            lines("ABC[nl][np]DEF[np]GHI", 2),
            vec!["ABC", "", "DEF", "", "GHI", ""]
        );
        assert_eq!(
            lines("ABC[nl]DEF[np]GHI[nl][nl]JKL", 2),
            vec!["ABC", "DEF", "GHI", ""]
        );
        assert_eq!(
            lines("ABC[nl]DEF[np]GHI[nl][nl]JKL", 3),
            vec!["ABC", "DEF", "", "GHI", "", "JKL"]
        );
        assert_eq!(
            lines("ABC[nl][np]DEF[np]", 3),
            vec!["ABC", "", "", "DEF", "", ""]
        );
    }

    #[test]
    fn lines_text_rectangle() {
        let ms = MultiString::from(
            "ABC[tr10,1,50,50]ABC[nl]DEF[np]ABC[tr10,1,50,50]GHI[nl]JKL",
        );
        assert_eq!(ms.lines(2), vec!["ABC", "DEF", "GHI", "JKL"]);
    }

    #[test]
    fn fonts() {
        let fonts = |ms: &str, f| MultiString::from(ms).fonts(f);
        assert!(fonts("", 0).is_empty());
        assert_eq!(fonts("YA1", 255), vec![255]);
        assert_eq!(fonts("YA1[np]YA2", 1), vec![1, 1]);
        assert_eq!(fonts("[fo10]ABC", 1), vec![10]);
        assert_eq!(fonts("[fo2]YA1[np][fo3]YA2", 1), vec![2, 3]);
        assert_eq!(fonts("YA1[np][fo3]YA2", 1), vec![1, 3]);
        assert_eq!(fonts("[fo3]YA1[np]YA2", 1), vec![3, 3]);
        assert_eq!(fonts("[fo3]YA1[np][fo]YA2", 1), vec![3, 1]);
    }

    #[test]
    fn page_times() {
        let ms = MultiString::from("ABC[np][pt14o]DEF");
        assert_eq!(ms.page_on_times(30), vec![30, 14]);
        assert_eq!(ms.page_off_times(0), vec![0, 0]);
        let ms = MultiString::from("[pt13o2]ABC[nl]DEF");
        assert_eq!(ms.page_on_times(30), vec![13]);
        assert_eq!(ms.page_off_times(0), vec![2]);
    }

    #[test]
    fn replace_page_time() {
        let rep = |ms: &str, on, off| {
            MultiString::from(ms).replace_page_time(on, off)
        };
        assert_eq!(rep("YA1[np]YA2", Some(4), None), "[pt4o]YA1[np]YA2");
        assert_eq!(
            rep("[pt3o]YA1[np]OH YA2", Some(4), None),
            "[pt4o]YA1[np]OH YA2"
        );
        assert_eq!(
            rep("[pt3o50]YA1[np][pt22o60]OH YA2", Some(4), Some(50)),
            "[pt4o50]YA1[np][pt4o50]OH YA2"
        );
        let ms = MultiString::from(rep("YA1[np]YA2", Some(4), None));
        assert_eq!(ms.page_on_times(7), vec![4, 4]);
    }

    #[test]
    fn strip() {
        let ms = MultiString::from("[pt20o0][fo2]A[nl][fo3]B[nl][nl]");
        assert_eq!(ms.strip_fonts(), "[pt20o0]A[nl]B[nl][nl]");
        assert_eq!(ms.strip_page_time(), "[fo2]A[nl][fo3]B[nl][nl]");
        assert_eq!(ms.strip_trailing_lines(), "[pt20o0][fo2]A[nl][fo3]B");
        assert_eq!(MultiString::from("A[nl] ").strip_trailing_lines(), "A[nl] ");
    }

    #[test]
    fn page_prefix() {
        let pf = |ms: &str, pf| MultiString::from(ms).add_page_prefix(pf).0;
        assert_eq!(pf("", ""), "");
        assert_eq!(pf("", "PREFIX"), "PREFIX");
        assert_eq!(pf("AAA", "PREFIX"), "PREFIXAAA");
        assert_eq!(pf("[np][np]", "PREFIX"), "PREFIX[np]PREFIX[np]PREFIX");
        assert_eq!(pf("A[np]B[np]C", "PF"), "PFA[np]PFB[np]PFC");
    }

    #[test]
    fn text() {
        let text = |ms: &str| MultiString::from(ms).as_text();
        assert_eq!(text("ABC[fo1]DEF"), "ABC DEF");
        assert_eq!(text("ABC [sc4]DEF[/sc]"), "ABC DEF");
        assert_eq!(text("ABC[nl][nl]DEF"), "ABC DEF");
        assert_eq!(text("ABC[np]DEF"), "ABC DEF");
        assert_eq!(text("[[A]]"), "[A]");
        assert_eq!(
            MultiString::from("SLOW  TRAFFIC[nl]AHEAD").words(),
            vec!["SLOW", "TRAFFIC", "AHEAD"]
        );
    }

    #[test]
    fn combined() {
        let ms = MultiString::make_combined("[tr1,1,50,12]DELAY", "AHEAD");
        assert_eq!(ms.as_str(), "[tr1,1,50,12]DELAYAHEAD");
        assert_eq!(ms.num_pages(), 1);
        let ms = MultiString::make_combined(
            "[tr1,1,50,12]DELAY[tr1,14,50,8]",
            "A[np]B",
        );
        assert_eq!(
            ms.as_str(),
            "[tr1,1,50,12]DELAY[tr1,14,50,8]A[np][cf][fo][jl][jp]\
             [tr1,1,50,12]DELAY[tr1,14,50,8]B"
        );
        let ms = MultiString::make_combined("[fo2]FIRST", "SECOND");
        assert_eq!(ms.as_str(), "[fo2]FIRST[np][cf][fo][jl][jp]SECOND");
        let ms = MultiString::make_combined("A[tr1,1,0,0]", "[tr2,2,0,0]B");
        assert_eq!(ms.as_str(), "A[tr1,1,0,0][np][cf][fo][jl][jp][tr2,2,0,0]B");
    }
}
