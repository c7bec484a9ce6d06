// sign.rs
//
// Copyright (C) 2018-2026  Minnesota Department of Transportation
//
//! Dynamic message sign configuration and message checks
use crate::dms::config::{MultiCfg, VmsCfg};
use crate::dms::font::{FontError, FontTable};
use crate::dms::graphic::GraphicTable;
use crate::dms::multi::{
    parse, ColorScheme, MultiVisitor, Rectangle, SyntaxError, Value,
};
use crate::dms::pagetime::PageTimes;
use crate::dms::pattern::MessagePattern;
use crate::dms::render::{Page, PageBuilder};
use crate::dms::Result;

/// Builder for DMS
#[derive(Clone, Default)]
pub struct DmsBuilder {
    vms_cfg: VmsCfg,
    font_definition: FontTable,
    multi_cfg: MultiCfg,
    graphic_definition: GraphicTable,
}

/// Dynamic message sign
///
/// This holds the parts of the 1203 Message Information Base (MIB) needed
/// to check and render MULTI messages.
#[derive(Clone)]
pub struct Dms {
    /// Configuration for variable message signs (`vmsCfg`)
    vms_cfg: VmsCfg,
    /// Font definition (`fontDefinition`)
    font_definition: FontTable,
    /// MULTI configuration (`multiCfg`)
    multi_cfg: MultiCfg,
    /// Graphic definition (`graphicDefinition`)
    graphic_definition: GraphicTable,
}

/// Visitor to check tags against the supported tag mask
struct TagChecker<'a> {
    /// MULTI configuration
    multi_cfg: &'a MultiCfg,
    /// First unsupported tag
    error: Option<SyntaxError>,
}

impl<'a> MultiVisitor for TagChecker<'a> {
    fn value(&mut self, val: Value<'_>) {
        if self.error.is_none() {
            if let Some(tag) = val.tag() {
                if !self.multi_cfg.is_supported(tag) {
                    let err = SyntaxError::UnsupportedTag(val.into());
                    self.error = Some(err);
                }
            }
        }
    }
}

impl DmsBuilder {
    /// Set VMS configuration
    pub fn with_vms_cfg(mut self, cfg: VmsCfg) -> Self {
        self.vms_cfg = cfg;
        self
    }

    /// Set font definition
    pub fn with_font_definition(mut self, fonts: FontTable) -> Self {
        self.font_definition = fonts;
        self
    }

    /// Set MULTI configuration
    pub fn with_multi_cfg(mut self, cfg: MultiCfg) -> Self {
        self.multi_cfg = cfg;
        self
    }

    /// Set graphic definition
    pub fn with_graphic_definition(mut self, graphics: GraphicTable) -> Self {
        self.graphic_definition = graphics;
        self
    }

    /// Build the DMS with validation
    pub fn build(self) -> std::result::Result<Dms, FontError> {
        self.font_definition.validate()?;
        let mut graphic_definition = self.graphic_definition;
        graphic_definition.sort();
        Ok(Dms {
            vms_cfg: self.vms_cfg,
            font_definition: self.font_definition,
            multi_cfg: self.multi_cfg,
            graphic_definition,
        })
    }
}

impl Dms {
    /// Create a DMS builder
    pub fn builder() -> DmsBuilder {
        DmsBuilder::default()
    }

    /// Convert back into builder
    pub fn into_builder(self) -> DmsBuilder {
        DmsBuilder {
            vms_cfg: self.vms_cfg,
            font_definition: self.font_definition,
            multi_cfg: self.multi_cfg,
            graphic_definition: self.graphic_definition,
        }
    }

    /// Get VMS configuration
    pub fn vms_cfg(&self) -> &VmsCfg {
        &self.vms_cfg
    }

    /// Get MULTI configuration
    pub fn multi_cfg(&self) -> &MultiCfg {
        &self.multi_cfg
    }

    /// Get font definition
    pub fn font_definition(&self) -> &FontTable {
        &self.font_definition
    }

    /// Get graphic definition
    pub fn graphic_definition(&self) -> &GraphicTable {
        &self.graphic_definition
    }

    /// Get the full sign rectangle
    pub fn full_rect(&self) -> Rectangle {
        Rectangle::new(
            1,
            1,
            self.vms_cfg.sign_width_pixels,
            self.vms_cfg.sign_height_pixels,
        )
    }

    /// Get the default foreground color
    fn foreground_default_rgb(&self) -> (u8, u8, u8) {
        match self.multi_cfg.color_scheme {
            ColorScheme::ColorClassic | ColorScheme::Color24Bit => {
                self.multi_cfg.default_foreground_rgb.rgb()
            }
            _ => self.vms_cfg.monochrome_foreground(),
        }
    }

    /// Get the default background color
    fn background_default_rgb(&self) -> (u8, u8, u8) {
        match self.multi_cfg.color_scheme {
            ColorScheme::ColorClassic | ColorScheme::Color24Bit => {
                self.multi_cfg.default_background_rgb.rgb()
            }
            _ => self.vms_cfg.monochrome_background(),
        }
    }

    /// Check a MULTI string against supported tags and page limit
    pub fn check_multi(&self, ms: &str) -> Result<()> {
        let mut checker = TagChecker {
            multi_cfg: &self.multi_cfg,
            error: None,
        };
        parse(ms, &mut checker);
        if let Some(err) = checker.error {
            return Err(err);
        }
        let mut page_times = PageTimes::new();
        parse(ms, &mut page_times);
        let pages = page_times.page_count();
        if pages > usize::from(self.multi_cfg.max_number_pages) {
            return Err(SyntaxError::TooManyPages);
        }
        Ok(())
    }

    /// Make a page builder for this sign
    pub fn page_builder(&self) -> PageBuilder<'_> {
        let cfg = &self.multi_cfg;
        PageBuilder::new(
            self.vms_cfg.sign_width_pixels,
            self.vms_cfg.sign_height_pixels,
        )
        .with_char_size(
            self.vms_cfg.char_width_pixels,
            self.vms_cfg.char_height_pixels,
        )
        .with_colors(
            cfg.color_scheme,
            self.foreground_default_rgb(),
            self.background_default_rgb(),
        )
        .with_default_font(cfg.default_font)
        .with_justification(
            cfg.default_justification_line,
            cfg.default_justification_page,
        )
        .with_page_times(cfg.default_page_on_time, cfg.default_page_off_time)
        .with_fonts(&self.font_definition)
        .with_graphics(&self.graphic_definition)
    }

    /// Render a MULTI string to a series of pages
    pub fn render_pages(&self, ms: &str) -> Result<Vec<Page>> {
        self.check_multi(ms)?;
        self.page_builder().build().render(ms)
    }

    /// Make a message pattern for filling text rectangles
    pub fn pattern<'p>(&'p self, ms: &'p str) -> MessagePattern<'p> {
        MessagePattern::new(self, ms)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dms::font::Font;
    use crate::dms::multi::{ColorClassic, JustificationLine, Tag};
    use enumflags2::BitFlags;
    use pix::rgb::SRgb8;

    fn make_dms(multi_cfg: MultiCfg) -> Dms {
        let mut fonts = FontTable::new();
        fonts.push(Font::solid(1, 7, 1, 3, &[('A', 5)])).unwrap();
        Dms::builder()
            .with_vms_cfg(VmsCfg {
                char_height_pixels: 0,
                char_width_pixels: 0,
                sign_height_pixels: 7,
                sign_width_pixels: 20,
                ..Default::default()
            })
            .with_font_definition(fonts)
            .with_multi_cfg(multi_cfg)
            .build()
            .unwrap()
    }

    #[test]
    fn invalid_fonts() {
        let mut font = Font::solid(1, 7, 1, 3, &[('A', 5)]);
        font.characters[0].bitmap.push(0);
        let fonts: FontTable =
            serde_json::from_value(serde_json::to_value(vec![font]).unwrap())
                .unwrap();
        let res = Dms::builder().with_font_definition(fonts).build();
        assert_eq!(res.err(), Some(FontError::InvalidCharHeight(65)));
    }

    #[test]
    fn monochrome_colors() {
        let dms = make_dms(MultiCfg {
            default_justification_line: JustificationLine::Left,
            ..Default::default()
        });
        let pages = dms.render_pages("A").unwrap();
        assert_eq!(pages.len(), 1);
        let px = pages[0].raster.pixels();
        assert_eq!(px[6 * 20], SRgb8::new(0xFF, 0xD0, 0x00));
        assert_eq!(px[0], SRgb8::new(0, 0, 0));
    }

    #[test]
    fn classic_colors() {
        let dms = make_dms(MultiCfg {
            color_scheme: ColorScheme::ColorClassic,
            default_background_rgb: ColorClassic::Blue.rgb().into(),
            ..Default::default()
        });
        let pages = dms.render_pages("").unwrap();
        let (r, g, b) = ColorClassic::Blue.rgb();
        assert_eq!(pages[0].raster.pixels()[0], SRgb8::new(r, g, b));
    }

    #[test]
    fn unsupported_tags() {
        let mask = BitFlags::<Tag>::all() & !BitFlags::from(Tag::Tr);
        let dms = make_dms(MultiCfg {
            supported_multi_tags: mask.bits(),
            ..Default::default()
        });
        assert!(dms.render_pages("A[nl]A").is_ok());
        assert_eq!(
            dms.render_pages("[tr1,1,10,7]A").map(|p| p.len()),
            Err(SyntaxError::UnsupportedTag("[tr1,1,10,7]".into()))
        );
    }

    #[test]
    fn too_many_pages() {
        let dms = make_dms(MultiCfg {
            max_number_pages: 2,
            ..Default::default()
        });
        assert_eq!(dms.render_pages("A[np]A").map(|p| p.len()), Ok(2));
        assert_eq!(
            dms.render_pages("A[np]A[np]A").map(|p| p.len()),
            Err(SyntaxError::TooManyPages)
        );
    }

    #[test]
    fn page_times() {
        let dms = make_dms(MultiCfg {
            default_page_on_time: 25,
            default_page_off_time: 5,
            ..Default::default()
        });
        let pages = dms.render_pages("A[np][pt40o0]A").unwrap();
        assert_eq!(pages[0].page_on_time_ds, 25);
        assert_eq!(pages[0].page_off_time_ds, 5);
        assert_eq!(pages[1].page_on_time_ds, 40);
        assert_eq!(pages[1].page_off_time_ds, 0);
    }

    #[test]
    fn builder_round_trip() {
        let dms = make_dms(MultiCfg::default());
        let dms = dms.into_builder().build().unwrap();
        assert_eq!(dms.full_rect(), Rectangle::new(1, 1, 20, 7));
        assert!(dms.font_definition().lookup(1).is_some());
        assert_eq!(dms.vms_cfg().sign_width_pixels, 20);
        assert_eq!(dms.multi_cfg().default_font, 1);
    }
}
