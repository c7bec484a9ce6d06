// render.rs
//
// Copyright (C) 2018-2026  Minnesota Department of Transportation
//
//! This module is for NTCIP 1203 DMS rendering.
//!
//! Text is laid out in a tree of blocks (page justification), lines,
//! fragments (line justification) and spans (font / color / spacing).
//! The tree is flushed onto the page raster when a text rectangle or page
//! ends.
use crate::dms::font::{Font, FontTable};
use crate::dms::graphic::GraphicTable;
use crate::dms::multi::{
    parse, Color, ColorClassic, ColorCtx, ColorScheme, JustificationLine,
    JustificationPage, MultiVisitor, Rectangle, SyntaxError, Value,
};
use crate::dms::pagetime::PageTimes;
use crate::dms::Result;
use log::debug;
use pix::{rgb::SRgb8, Raster, Region};

/// Empty font table
static EMPTY_FONTS: FontTable = FontTable::new();

/// Empty graphic table
static EMPTY_GRAPHICS: GraphicTable = GraphicTable::new();

/// Rendered DMS page
pub struct Page {
    /// Page raster
    pub raster: Raster<SRgb8>,

    /// Page-on time (1/10 s)
    pub page_on_time_ds: u8,

    /// Page-off time (1/10 s)
    pub page_off_time_ds: u8,
}

/// Builder for page renderers
#[derive(Clone)]
pub struct PageBuilder<'a> {
    /// Raster width in pixels
    width: u16,
    /// Raster height in pixels
    height: u16,
    /// Character width (0 for variable)
    char_width: u8,
    /// Character height (0 for variable)
    char_height: u8,
    /// Color context
    color_ctx: ColorCtx,
    /// Default font number
    font_num: u8,
    /// Default line justification
    just_line: JustificationLine,
    /// Default page justification
    just_page: JustificationPage,
    /// Default page-on time
    page_on_time_ds: u8,
    /// Default page-off time
    page_off_time_ds: u8,
    /// Font definitions
    fonts: &'a FontTable,
    /// Graphic definitions
    graphics: &'a GraphicTable,
}

/// Text span with the state in effect where it appeared
struct Span<'a> {
    /// Span text
    text: String,
    /// Span font
    font: &'a Font,
    /// Pixel spacing between characters
    char_spacing: u8,
    /// Foreground color
    foreground: SRgb8,
}

/// Spans sharing one line justification
struct Fragment<'a> {
    /// Line justification
    just: JustificationLine,
    /// Spans in fragment
    spans: Vec<Span<'a>>,
}

/// Line of text fragments
struct Line<'a> {
    /// Explicit spacing above the line
    spacing: Option<u8>,
    /// Fragments in line
    fragments: Vec<Fragment<'a>>,
}

/// Lines sharing one page justification
struct Block<'a> {
    /// Page justification
    just: JustificationPage,
    /// Lines in block
    lines: Vec<Line<'a>>,
}

/// Geometry shared while laying out a text rectangle
#[derive(Clone, Copy)]
struct Layout {
    /// Text rectangle
    rect: Rectangle,
    /// Character width (1 for variable)
    char_width: i32,
    /// Character height (1 for variable)
    char_height: i32,
}

/// Page renderer
///
/// Render MULTI events onto rasters, one per page.  After parsing, call
/// [complete](#method.complete) to flush the final page.
pub struct PageRenderer<'a> {
    /// Font definitions
    fonts: &'a FontTable,
    /// Graphic definitions
    graphics: &'a GraphicTable,
    /// Full raster rectangle
    full: Rectangle,
    /// Character width (1 for variable)
    char_width: u16,
    /// Character height (1 for variable)
    char_height: u16,
    /// Color context
    color_ctx: ColorCtx,
    /// Default font number
    default_font: u8,
    /// Current font number
    font_num: u8,
    /// Character spacing override
    char_spacing: Option<u8>,
    /// Default line justification
    default_just_line: JustificationLine,
    /// Current line justification
    just_line: JustificationLine,
    /// Default page justification
    default_just_page: JustificationPage,
    /// Current page justification
    just_page: JustificationPage,
    /// Current text rectangle
    text_rect: Rectangle,
    /// Pending text blocks
    blocks: Vec<Block<'a>>,
    /// Current page raster
    raster: Raster<SRgb8>,
    /// Completed page rasters
    rasters: Vec<Raster<SRgb8>>,
    /// Page times
    page_times: PageTimes,
    /// Default page-on time
    page_on_time_ds: u8,
    /// Default page-off time
    page_off_time_ds: u8,
    /// First error encountered
    error: Option<SyntaxError>,
}

/// Convert an RGB triple to a pixel color
fn srgb((red, green, blue): (u8, u8, u8)) -> SRgb8 {
    SRgb8::new(red, green, blue)
}

impl<'a> PageBuilder<'a> {
    /// Create a new page builder
    pub fn new(width: u16, height: u16) -> Self {
        PageBuilder {
            width,
            height,
            char_width: 0,
            char_height: 0,
            color_ctx: ColorCtx::new(
                ColorScheme::Monochrome1Bit,
                ColorClassic::Amber.rgb(),
                ColorClassic::Black.rgb(),
            ),
            font_num: 1,
            just_line: JustificationLine::Center,
            just_page: JustificationPage::Top,
            page_on_time_ds: 30,
            page_off_time_ds: 0,
            fonts: &EMPTY_FONTS,
            graphics: &EMPTY_GRAPHICS,
        }
    }

    /// Set the character size (0 for variable)
    pub fn with_char_size(mut self, width: u8, height: u8) -> Self {
        self.char_width = width;
        self.char_height = height;
        self
    }

    /// Set the color scheme and default colors
    pub fn with_colors(
        mut self,
        scheme: ColorScheme,
        foreground: (u8, u8, u8),
        background: (u8, u8, u8),
    ) -> Self {
        self.color_ctx = ColorCtx::new(scheme, foreground, background);
        self
    }

    /// Set the default font number
    pub fn with_default_font(mut self, font_num: u8) -> Self {
        self.font_num = font_num;
        self
    }

    /// Set the default justification
    pub fn with_justification(
        mut self,
        just_line: JustificationLine,
        just_page: JustificationPage,
    ) -> Self {
        self.just_line = just_line;
        self.just_page = just_page;
        self
    }

    /// Set the default page times (1/10 s)
    pub fn with_page_times(mut self, on: u8, off: u8) -> Self {
        self.page_on_time_ds = on;
        self.page_off_time_ds = off;
        self
    }

    /// Set the font definitions
    pub fn with_fonts(mut self, fonts: &'a FontTable) -> Self {
        self.fonts = fonts;
        self
    }

    /// Set the graphic definitions
    pub fn with_graphics(mut self, graphics: &'a GraphicTable) -> Self {
        self.graphics = graphics;
        self
    }

    /// Build the page renderer
    pub fn build(self) -> PageRenderer<'a> {
        let full = Rectangle::new(1, 1, self.width, self.height);
        let bg = srgb(self.color_ctx.background_rgb());
        let raster = Raster::with_color(
            u32::from(self.width),
            u32::from(self.height),
            bg,
        );
        PageRenderer {
            fonts: self.fonts,
            graphics: self.graphics,
            full,
            char_width: u16::from(self.char_width.max(1)),
            char_height: u16::from(self.char_height.max(1)),
            color_ctx: self.color_ctx,
            default_font: self.font_num,
            font_num: self.font_num,
            char_spacing: None,
            default_just_line: self.just_line,
            just_line: self.just_line,
            default_just_page: self.just_page,
            just_page: self.just_page,
            text_rect: full,
            blocks: Vec::new(),
            raster,
            rasters: Vec::new(),
            page_times: PageTimes::new(),
            page_on_time_ds: self.page_on_time_ds,
            page_off_time_ds: self.page_off_time_ds,
            error: None,
        }
    }
}

impl<'a> Span<'a> {
    /// Get the span height
    fn height(&self) -> i32 {
        i32::from(self.font.height)
    }

    /// Get the font line spacing
    fn font_spacing(&self) -> i32 {
        i32::from(self.font.line_spacing)
    }

    /// Get the span width
    fn width(&self) -> Result<i32> {
        let cs = Some(u16::from(self.char_spacing));
        Ok(i32::from(self.font.text_width(&self.text, cs)?))
    }

    /// Get spacing between this span and the previous one
    fn spacing(&self, prev: Option<&Span>) -> i32 {
        match prev {
            Some(p) => {
                let total = i32::from(p.char_spacing)
                    + i32::from(self.char_spacing);
                (total + 1) / 2
            }
            None => 0,
        }
    }

    /// Render the span
    ///
    /// * `x` Left edge (1-based).
    /// * `base` Baseline (1-based, just below the glyphs).
    fn render(
        &self,
        raster: &mut Raster<SRgb8>,
        x: i32,
        base: i32,
    ) -> Result<()> {
        let y = base - self.height();
        let cs = i32::from(self.char_spacing);
        self.font
            .render_text(raster, &self.text, x - 1, y - 1, cs, self.foreground)
    }
}

impl<'a> Fragment<'a> {
    /// Create a new fragment
    fn new(just: JustificationLine) -> Self {
        Fragment {
            just,
            spans: Vec::new(),
        }
    }

    /// Get the fragment height
    fn height(&self) -> i32 {
        self.spans.iter().map(Span::height).max().unwrap_or(0)
    }

    /// Get the maximum font line spacing
    fn font_spacing(&self) -> i32 {
        self.spans.iter().map(Span::font_spacing).max().unwrap_or(0)
    }

    /// Get the fragment width
    fn width(&self) -> Result<i32> {
        let mut width = 0;
        let mut prev = None;
        for span in &self.spans {
            width += span.spacing(prev) + span.width()?;
            prev = Some(span);
        }
        Ok(width)
    }

    /// Render the fragment
    fn render(
        &self,
        layout: Layout,
        raster: &mut Raster<SRgb8>,
        base: i32,
    ) -> Result<()> {
        let cw = layout.char_width;
        let width = self.width()?;
        let ex = (i32::from(layout.rect.width) / cw - width / cw) * cw;
        if ex < 0 {
            return Err(SyntaxError::TextTooBig);
        }
        let rx = i32::from(layout.rect.x);
        let left = match self.just {
            JustificationLine::Left => rx,
            JustificationLine::Center => rx + (ex / 2) / cw * cw,
            JustificationLine::Right => rx + ex,
            _ => {
                let v = Value::JustificationLine(Some(self.just));
                return Err(SyntaxError::UnsupportedTagValue(v.into()));
            }
        };
        let mut x = 0;
        let mut prev = None;
        for span in &self.spans {
            x += span.spacing(prev);
            span.render(raster, left + x, base)?;
            x += span.width()?;
            prev = Some(span);
        }
        Ok(())
    }
}

impl<'a> Line<'a> {
    /// Create a new line
    fn new(spacing: Option<u8>) -> Self {
        Line {
            spacing,
            fragments: Vec::new(),
        }
    }

    /// Get the line height
    fn height(&self) -> i32 {
        self.fragments.iter().map(Fragment::height).max().unwrap_or(0)
    }

    /// Get the maximum font line spacing
    fn font_spacing(&self) -> i32 {
        self.fragments
            .iter()
            .map(Fragment::font_spacing)
            .max()
            .unwrap_or(0)
    }

    /// Get spacing between this line and the previous one
    fn spacing(&self, prev: Option<&Line>, layout: Layout) -> i32 {
        if layout.char_height > 1 {
            return 0;
        }
        match (self.spacing, prev) {
            (Some(ls), _) => i32::from(ls),
            (None, Some(p)) => (p.font_spacing() + self.font_spacing() + 1) / 2,
            (None, None) => 0,
        }
    }

    /// Add a span to the line
    fn add_span(
        &mut self,
        just: JustificationLine,
        span: Span<'a>,
    ) -> Result<()> {
        let mut res = Ok(());
        match self.fragments.last() {
            Some(f) if just < f.just => res = Err(SyntaxError::TagConflict),
            Some(f) if just == f.just => (),
            _ => self.fragments.push(Fragment::new(just)),
        }
        if let Some(f) = self.fragments.last_mut() {
            f.spans.push(span);
        }
        res
    }

    /// Render the line
    fn render(
        &self,
        layout: Layout,
        raster: &mut Raster<SRgb8>,
        base: i32,
    ) -> Result<()> {
        for fragment in &self.fragments {
            fragment.render(layout, raster, base)?;
        }
        Ok(())
    }
}

impl<'a> Block<'a> {
    /// Create a new block
    fn new(just: JustificationPage) -> Self {
        Block {
            just,
            lines: vec![Line::new(None)],
        }
    }

    /// Get the block height (lines with text only)
    fn height(&self, layout: Layout) -> i32 {
        let mut height = 0;
        let mut prev = None;
        for line in self.lines.iter().filter(|l| l.height() > 0) {
            height += line.spacing(prev, layout) + line.height();
            prev = Some(line);
        }
        height
    }

    /// Render the block
    fn render(&self, layout: Layout, raster: &mut Raster<SRgb8>) -> Result<()> {
        let ch = layout.char_height;
        let height = self.height(layout);
        let ex = (i32::from(layout.rect.height) / ch - height / ch) * ch;
        if ex < 0 {
            return Err(SyntaxError::TextTooBig);
        }
        let ry = i32::from(layout.rect.y);
        let top = match self.just {
            JustificationPage::Top => ry,
            JustificationPage::Middle => ry + (ex / 2) / ch * ch,
            JustificationPage::Bottom => ry + ex,
            JustificationPage::Other => {
                let v = Value::JustificationPage(Some(self.just));
                return Err(SyntaxError::UnsupportedTagValue(v.into()));
            }
        };
        let mut y = 0;
        let mut prev = None;
        for line in &self.lines {
            y += line.spacing(prev, layout) + line.height();
            line.render(layout, raster, top + y)?;
            prev = Some(line);
        }
        Ok(())
    }
}

impl<'a> PageRenderer<'a> {
    /// Render a MULTI string into pages
    pub fn render(mut self, ms: &str) -> Result<Vec<Page>> {
        parse(ms, &mut self);
        self.complete()
    }

    /// Complete rendering, flushing the final page
    pub fn complete(mut self) -> Result<Vec<Page>> {
        self.render_text();
        if let Some(err) = self.error {
            return Err(err);
        }
        self.rasters.push(self.raster);
        let on = self.page_times.page_on_times(self.page_on_time_ds);
        let off = self.page_times.page_off_times(self.page_off_time_ds);
        Ok(self
            .rasters
            .into_iter()
            .zip(on.into_iter().zip(off))
            .map(|(raster, (page_on_time_ds, page_off_time_ds))| Page {
                raster,
                page_on_time_ds,
                page_off_time_ds,
            })
            .collect())
    }

    /// Latch an error (first one wins)
    fn latch(&mut self, err: SyntaxError) {
        debug!("render error: {err}");
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// Get the current block
    fn current_block(&mut self) -> &mut Block<'a> {
        if self.blocks.is_empty() {
            self.blocks.push(Block::new(self.just_page));
        }
        let last = self.blocks.len() - 1;
        &mut self.blocks[last]
    }

    /// Get the current line
    fn current_line(&mut self) -> &mut Line<'a> {
        let block = self.current_block();
        if block.lines.is_empty() {
            block.lines.push(Line::new(None));
        }
        let last = block.lines.len() - 1;
        &mut block.lines[last]
    }

    /// Make a span with the current state
    fn make_span(&self, text: &str) -> Result<Span<'a>> {
        let fonts = self.fonts;
        let font = fonts
            .lookup(self.font_num)
            .ok_or(SyntaxError::FontNotDefined(self.font_num))?;
        // character cells are fixed pitch
        let char_spacing = if self.char_width > 1 {
            0
        } else {
            self.char_spacing.unwrap_or(font.char_spacing)
        };
        Ok(Span {
            text: text.to_string(),
            font,
            char_spacing,
            foreground: srgb(self.color_ctx.foreground_rgb()),
        })
    }

    /// Push a span onto the current line
    fn push_span(&mut self, text: &str) {
        match self.make_span(text) {
            Ok(span) => {
                let just = self.just_line;
                if let Err(e) = self.current_line().add_span(just, span) {
                    self.latch(e);
                }
            }
            Err(e) => self.latch(e),
        }
    }

    /// Render pending text onto the current raster
    fn render_text(&mut self) {
        let layout = Layout {
            rect: self.text_rect,
            char_width: i32::from(self.char_width),
            char_height: i32::from(self.char_height),
        };
        let blocks = std::mem::take(&mut self.blocks);
        for block in &blocks {
            if let Err(e) = block.render(layout, &mut self.raster) {
                self.latch(e);
            }
        }
    }

    /// Fill the whole raster with the background color
    fn fill_background(&mut self) {
        let bg = srgb(self.color_ctx.background_rgb());
        let w = self.raster.width();
        let h = self.raster.height();
        self.raster.copy_color(Region::new(0, 0, w, h), bg);
    }

    /// Set the background color
    fn set_background(&mut self, clr: Option<Color>) {
        if let Err(e) = self.color_ctx.set_background(clr) {
            debug!("background ignored: {e}");
        }
        self.fill_background();
    }

    /// Check that a text rectangle is usable
    fn check_text_rectangle(&self, rect: Rectangle) -> Result<()> {
        let cw = self.char_width;
        let ch = self.char_height;
        if !self.full.contains(rect)
            || (rect.x - 1) % cw != 0
            || rect.width % cw != 0
            || (rect.y - 1) % ch != 0
            || rect.height % ch != 0
        {
            let v = Value::TextRectangle(rect);
            return Err(SyntaxError::UnsupportedTagValue(v.into()));
        }
        Ok(())
    }
}

/// Render a color rectangle
fn render_rect(
    raster: &mut Raster<SRgb8>,
    full: Rectangle,
    rect: Rectangle,
    clr: SRgb8,
    value: &Value,
) -> Result<()> {
    let rect = rect.extend_width_height(full);
    if rect.x > 0 && rect.y > 0 && full.contains(rect) {
        let rx = i32::from(rect.x) - 1;
        let ry = i32::from(rect.y) - 1;
        let rw = u32::from(rect.width);
        let rh = u32::from(rect.height);
        raster.copy_color(Region::new(rx, ry, rw, rh), clr);
        Ok(())
    } else {
        Err(SyntaxError::UnsupportedTagValue(value.into()))
    }
}

impl<'a> MultiVisitor for PageRenderer<'a> {
    fn unsupported_tag(&mut self, tag: &str) {
        self.latch(SyntaxError::UnsupportedTag(tag.into()));
    }

    fn add_span(&mut self, span: &str) {
        self.push_span(span);
    }

    fn set_color_background(&mut self, clr: Option<Color>) {
        self.set_background(clr);
    }

    fn set_page_background(&mut self, clr: Option<Color>) {
        self.set_background(clr);
    }

    fn set_color_foreground(&mut self, clr: Option<Color>) {
        if let Err(e) = self.color_ctx.set_foreground(clr) {
            debug!("foreground ignored: {e}");
        }
    }

    fn add_color_rectangle(&mut self, rect: Rectangle, clr: Color) {
        let mut ctx = self.color_ctx.clone();
        if let Err(e) = ctx.set_foreground(Some(clr)) {
            debug!("color rectangle ignored: {e}");
            return;
        }
        let value = Value::ColorRectangle(rect, clr);
        let clr = srgb(ctx.foreground_rgb());
        if let Err(e) =
            render_rect(&mut self.raster, self.full, rect, clr, &value)
        {
            self.latch(e);
        }
    }

    fn set_text_rectangle(&mut self, rect: Rectangle) {
        self.render_text();
        let rect = rect.extend_width_height(self.full);
        match self.check_text_rectangle(rect) {
            Ok(()) => self.text_rect = rect,
            Err(e) => self.latch(e),
        }
    }

    fn add_graphic(&mut self, num: u8, pos: Option<(u16, u16, Option<u16>)>) {
        let (x, y) = pos.map_or((1, 1), |(x, y, _)| (x, y));
        let graphics = self.graphics;
        let res = graphics.lookup(num).and_then(|g| {
            g.render_graphic(
                &mut self.raster,
                i32::from(x),
                i32::from(y),
                &self.color_ctx,
            )
        });
        if let Err(e) = res {
            self.latch(e);
        }
    }

    fn set_font(&mut self, font: Option<(u8, Option<u16>)>) {
        self.font_num = font.map_or(self.default_font, |(num, _)| num);
    }

    fn set_char_spacing(&mut self, sc: u8) {
        self.char_spacing = Some(sc);
    }

    fn clear_char_spacing(&mut self) {
        self.char_spacing = None;
    }

    fn set_justification_line(&mut self, jl: Option<JustificationLine>) {
        let jl = jl.unwrap_or(self.default_just_line);
        match jl {
            JustificationLine::Other | JustificationLine::Full => {
                let v = Value::JustificationLine(Some(jl));
                self.latch(SyntaxError::UnsupportedTagValue(v.into()));
            }
            _ => self.just_line = jl,
        }
    }

    fn set_justification_page(&mut self, jp: Option<JustificationPage>) {
        let jp = jp.unwrap_or(self.default_just_page);
        if jp == JustificationPage::Other {
            let v = Value::JustificationPage(Some(jp));
            self.latch(SyntaxError::UnsupportedTagValue(v.into()));
            return;
        }
        self.just_page = jp;
        let current = self.current_block().just;
        if jp < current {
            self.latch(SyntaxError::TagConflict);
        } else if jp > current {
            self.blocks.push(Block::new(jp));
        }
    }

    fn add_line(&mut self, spacing: Option<u8>) {
        if self.current_line().height() == 0 {
            self.push_span("");
        }
        self.current_block().lines.push(Line::new(spacing));
    }

    fn add_page(&mut self) {
        self.render_text();
        let bg = srgb(self.color_ctx.background_rgb());
        let raster = Raster::with_color(
            u32::from(self.full.width),
            u32::from(self.full.height),
            bg,
        );
        self.rasters.push(std::mem::replace(&mut self.raster, raster));
        self.text_rect = self.full;
        self.page_times.add_page();
    }

    fn set_page_times(&mut self, on: Option<u8>, off: Option<u8>) {
        self.page_times.set_page_times(on, off);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dms::graphic::Graphic;

    fn white() -> SRgb8 {
        SRgb8::new(255, 255, 255)
    }

    fn font_table() -> FontTable {
        let mut fonts = FontTable::new();
        fonts
            .push(Font::solid(1, 7, 1, 3, &[('A', 5), ('.', 1), (' ', 5)]))
            .unwrap();
        fonts
            .push(Font::solid(2, 5, 2, 2, &[('A', 4), ('.', 1)]))
            .unwrap();
        fonts
    }

    fn graphic_table() -> GraphicTable {
        let mut graphics = GraphicTable::new();
        graphics
            .push(Graphic {
                number: 1,
                name: "RED".into(),
                height: 1,
                width: 1,
                gtype: ColorScheme::Color24Bit,
                transparent_color: None,
                bitmap: vec![0, 0, 255],
            })
            .unwrap();
        graphics
    }

    fn render_full(ms: &str) -> Result<Vec<Page>> {
        let fonts = font_table();
        let graphics = graphic_table();
        let renderer = PageBuilder::new(60, 30)
            .with_colors(ColorScheme::Color24Bit, (255, 255, 255), (0, 0, 0))
            .with_fonts(&fonts)
            .with_graphics(&graphics)
            .build();
        renderer.render(ms)
    }

    fn render_char(ms: &str) -> Result<Vec<Page>> {
        let fonts = font_table();
        let renderer = PageBuilder::new(100, 21)
            .with_char_size(5, 7)
            .with_colors(ColorScheme::Color24Bit, (255, 255, 255), (0, 0, 0))
            .with_fonts(&fonts)
            .build();
        renderer.render(ms)
    }

    fn lit(page: &Page) -> Vec<usize> {
        page.raster
            .pixels()
            .iter()
            .enumerate()
            .filter(|(_, p)| **p == white())
            .map(|(i, _)| i)
            .collect()
    }

    fn justify_dot(ms: &str, i: usize) {
        let pages = render_full(ms).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(lit(&pages[0]), vec![i], "{ms}");
    }

    #[test]
    fn page_count() {
        assert_eq!(render_full("").unwrap().len(), 1);
        assert_eq!(render_full("A").unwrap().len(), 1);
        assert_eq!(render_full("[np]").unwrap().len(), 2);
        assert_eq!(render_full("A[NP]").unwrap().len(), 2);
        assert_eq!(render_full("A[np]A[np]").unwrap().len(), 3);
    }

    #[test]
    fn page_times() {
        let pages = render_full("A").unwrap();
        assert_eq!(pages[0].page_on_time_ds, 30);
        assert_eq!(pages[0].page_off_time_ds, 0);
        let pages = render_full("[pt25o10]A[np]A").unwrap();
        assert_eq!(pages[0].page_on_time_ds, 25);
        assert_eq!(pages[0].page_off_time_ds, 10);
        assert_eq!(pages[1].page_on_time_ds, 25);
        assert_eq!(pages[1].page_off_time_ds, 10);
        let pages = render_full("A[np][pt40]A").unwrap();
        assert_eq!(pages[0].page_on_time_ds, 30);
        assert_eq!(pages[1].page_on_time_ds, 40);
    }

    #[test]
    fn justify_line() {
        justify_dot("[jl2].", 360);
        justify_dot(".", 389);
        justify_dot("[jl3].", 389);
        justify_dot("[jl4].", 419);
    }

    #[test]
    fn justify_page() {
        justify_dot("[jl2][jp2].", 360);
        justify_dot("[jl2][jp3].", 1020);
        justify_dot("[jl2][jp4].", 1740);
    }

    #[test]
    fn char_spacing() {
        justify_dot("[jl2] .", 366);
        justify_dot("[jl2][sc4] .", 369);
        justify_dot("[jl2][sc4][/sc] .", 366);
    }

    #[test]
    fn line_spacing() {
        justify_dot("[jl2][nl].", 960);
        justify_dot("[jl2][nl1].", 840);
        let pages = render_full("[jl2]A[nl][fo2].").unwrap();
        assert_eq!(lit(&pages[0]), vec![360, 840]);
    }

    #[test]
    fn span_baseline() {
        let pages = render_full("[jl2]A[fo2]A").unwrap();
        assert_eq!(lit(&pages[0]), vec![360, 367]);
    }

    #[test]
    fn text_rectangles() {
        justify_dot("[jl2][tr2,1,10,10].", 361);
        justify_dot("[jl2][tr1,2,10,10].", 420);
        justify_dot("[jl4][tr1,1,10,0].", 369);
        let pages = render_full("[jl2][tr2,1,10,10][np].").unwrap();
        assert_eq!(lit(&pages[1]), vec![360]);
    }

    #[test]
    fn colors() {
        let pages = render_full("[cr1,1,2,2,255,0,0]").unwrap();
        let px = pages[0].raster.pixels();
        let red = SRgb8::new(255, 0, 0);
        assert_eq!(px[0], red);
        assert_eq!(px[1], red);
        assert_eq!(px[2], SRgb8::new(0, 0, 0));
        assert_eq!(px[60], red);
        assert_eq!(px[61], red);
        let pages = render_full("[pb0,0,255][np]").unwrap();
        assert_eq!(pages[0].raster.pixels()[0], SRgb8::new(0, 0, 255));
        assert_eq!(pages[1].raster.pixels()[0], SRgb8::new(0, 0, 255));
        let pages = render_full("[jl2][cf255,0,0].").unwrap();
        assert_eq!(pages[0].raster.pixels()[360], red);
    }

    #[test]
    fn graphics() {
        let pages = render_full("[g1,3,2]").unwrap();
        assert_eq!(pages[0].raster.pixels()[62], SRgb8::new(255, 0, 0));
        assert_eq!(
            render_full("[g1,61,1]").map(|p| p.len()),
            Err(SyntaxError::Other("Graphic too big"))
        );
        assert_eq!(
            render_full("[g5]").map(|p| p.len()),
            Err(SyntaxError::GraphicNotDefined(5))
        );
    }

    #[test]
    fn too_big() {
        assert!(render_full("AAAAAAAAAA").is_ok());
        assert_eq!(
            render_full("AAAAAAAAAAA").map(|p| p.len()),
            Err(SyntaxError::TextTooBig)
        );
        assert!(render_full("A[nl]A[nl]A").is_ok());
        assert_eq!(
            render_full("A[nl]A[nl]A[nl]A").map(|p| p.len()),
            Err(SyntaxError::TextTooBig)
        );
    }

    #[test]
    fn not_defined() {
        assert_eq!(
            render_full("[fo9]A").map(|p| p.len()),
            Err(SyntaxError::FontNotDefined(9))
        );
        assert_eq!(
            render_full("B").map(|p| p.len()),
            Err(SyntaxError::CharacterNotDefined('B'))
        );
        assert_eq!(
            render_full("[xyz]").map(|p| p.len()),
            Err(SyntaxError::UnsupportedTag("xyz".into()))
        );
    }

    #[test]
    fn first_error_wins() {
        assert_eq!(
            render_full("[fo9]A[g5]").map(|p| p.len()),
            Err(SyntaxError::FontNotDefined(9))
        );
        assert_eq!(
            render_full("[g5][fo9]A").map(|p| p.len()),
            Err(SyntaxError::GraphicNotDefined(5))
        );
    }

    #[test]
    fn tag_conflicts() {
        assert!(render_full("[jl2]A[jl4]A").is_ok());
        assert_eq!(
            render_full("[jl4]A[jl2]A").map(|p| p.len()),
            Err(SyntaxError::TagConflict)
        );
        assert!(render_full("[jl4]A[nl][jl2]A").is_ok());
        assert!(render_full("[jp2]A[jp4]A").is_ok());
        assert_eq!(
            render_full("[jp3]A[jp2]A").map(|p| p.len()),
            Err(SyntaxError::TagConflict)
        );
    }

    #[test]
    fn first_of_many_errors() {
        assert_eq!(
            render_full("[jl4]A[jl2]A[fo9]A").map(|p| p.len()),
            Err(SyntaxError::TagConflict)
        );
        assert_eq!(
            render_full("[fo9]A[fo1][jl4]A[jl2]A").map(|p| p.len()),
            Err(SyntaxError::FontNotDefined(9))
        );
    }

    #[test]
    fn unsupported_values() {
        assert!(matches!(
            render_full("[jl1]A"),
            Err(SyntaxError::UnsupportedTagValue(_))
        ));
        assert!(matches!(
            render_full("[jl5]A"),
            Err(SyntaxError::UnsupportedTagValue(_))
        ));
        assert!(matches!(
            render_full("[jp1]A"),
            Err(SyntaxError::UnsupportedTagValue(_))
        ));
        assert!(matches!(
            render_full("[tr1,1,61,30]"),
            Err(SyntaxError::UnsupportedTagValue(_))
        ));
        assert!(matches!(
            render_full("[cr60,30,2,2,255,0,0]"),
            Err(SyntaxError::UnsupportedTagValue(_))
        ));
    }

    #[test]
    fn char_matrix() {
        let pages = render_char("[jl3]A").unwrap();
        assert_eq!(lit(&pages[0]), vec![645]);
        let pages = render_char("[jl2][sc3]AA").unwrap();
        assert_eq!(lit(&pages[0]), vec![600, 605]);
        assert!(render_char("[tr6,8,50,14]A").is_ok());
        assert!(matches!(
            render_char("[tr1,1,12,14]"),
            Err(SyntaxError::UnsupportedTagValue(_))
        ));
        assert!(render_char("A[nl]A[nl]A").is_ok());
        assert_eq!(
            render_char("A[nl]A[nl]A[nl]A").map(|p| p.len()),
            Err(SyntaxError::TextTooBig)
        );
    }
}
