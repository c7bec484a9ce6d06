// config.rs
//
// Copyright (C) 2018-2026  Minnesota Department of Transportation
//
//! Sign configuration
//!
//! Both structures accept partial documents; missing fields take their
//! default values.
use crate::dms::multi::{
    Color, ColorClassic, ColorScheme, JustificationLine, JustificationPage,
    Tag,
};
use enumflags2::BitFlags;

/// VMS configuration (`vmsCfg`)
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct VmsCfg {
    /// Character height (0 for variable) (`vmsCharacterHeightPixels`)
    pub char_height_pixels: u8,
    /// Character width (0 for variable) (`vmsCharacterWidthPixels`)
    pub char_width_pixels: u8,
    /// Sign height (`vmsSignHeightPixels`)
    pub sign_height_pixels: u16,
    /// Sign width (`vmsSignWidthPixels`)
    pub sign_width_pixels: u16,
    /// Monochrome foreground RGB and background RGB (`monochromeColor`)
    pub monochrome_color: [u8; 6],
}

/// MULTI configuration (`multiCfg`)
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct MultiCfg {
    /// Serves as dmsDefaultBackgroundRGB and dmsDefaultBackgroundColor
    pub default_background_rgb: Color,
    /// Serves as dmsDefaultForegroundRGB and dmsDefaultForegroundColor
    pub default_foreground_rgb: Color,
    /// Default font number (`defaultFont`)
    pub default_font: u8,
    /// Default line justification
    pub default_justification_line: JustificationLine,
    /// Default page justification
    pub default_justification_page: JustificationPage,
    /// Default page-on time (deciseconds)
    pub default_page_on_time: u8,
    /// Default page-off time (deciseconds)
    pub default_page_off_time: u8,
    /// Color scheme (`dmsColorScheme`)
    pub color_scheme: ColorScheme,
    /// Supported tag mask (`dmsSupportedMultiTags`)
    pub supported_multi_tags: u32,
    /// Maximum number of pages (`dmsMaxNumberPages`)
    pub max_number_pages: u8,
}

impl Default for VmsCfg {
    fn default() -> Self {
        VmsCfg {
            char_height_pixels: 7,
            char_width_pixels: 5,
            sign_height_pixels: 21,
            sign_width_pixels: 40,
            monochrome_color: [0xFF, 0xD0, 0x00, 0, 0, 0],
        }
    }
}

impl Default for MultiCfg {
    fn default() -> Self {
        MultiCfg {
            default_background_rgb: Color::Legacy(ColorClassic::Black.into()),
            default_foreground_rgb: Color::Legacy(ColorClassic::Amber.into()),
            default_font: 1,
            default_justification_line: JustificationLine::Center,
            default_justification_page: JustificationPage::Top,
            default_page_on_time: 30,
            default_page_off_time: 0,
            color_scheme: ColorScheme::Monochrome1Bit,
            supported_multi_tags: BitFlags::<Tag>::all().bits(),
            max_number_pages: 4,
        }
    }
}

impl VmsCfg {
    /// Get monochrome foreground color
    pub fn monochrome_foreground(&self) -> (u8, u8, u8) {
        let m = &self.monochrome_color;
        (m[0], m[1], m[2])
    }

    /// Get monochrome background color
    pub fn monochrome_background(&self) -> (u8, u8, u8) {
        let m = &self.monochrome_color;
        (m[3], m[4], m[5])
    }
}

impl MultiCfg {
    /// Check whether a tag is supported
    pub fn is_supported(&self, tag: Tag) -> bool {
        BitFlags::<Tag>::from_bits_truncate(self.supported_multi_tags)
            .contains(tag)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = MultiCfg::default();
        assert_eq!(cfg.default_justification_line, JustificationLine::Center);
        assert_eq!(cfg.default_justification_page, JustificationPage::Top);
        assert_eq!(cfg.supported_multi_tags, 0x3FFF_FFFF);
        assert!(cfg.is_supported(Tag::Pb));
        let vms = VmsCfg::default();
        assert_eq!(vms.monochrome_foreground(), ColorClassic::Amber.rgb());
        assert_eq!(vms.monochrome_background(), (0, 0, 0));
    }

    #[test]
    fn partial_json() {
        let cfg: MultiCfg = serde_json::from_str(
            r#"{
                "default_font": 3,
                "color_scheme": "color24Bit",
                "default_foreground_rgb": { "Rgb": [255, 255, 255] },
                "default_justification_line": "Left",
                "supported_multi_tags": 3075
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.default_font, 3);
        assert_eq!(cfg.color_scheme, ColorScheme::Color24Bit);
        assert_eq!(cfg.default_foreground_rgb, Color::Rgb(255, 255, 255));
        assert_eq!(cfg.default_justification_line, JustificationLine::Left);
        assert_eq!(cfg.default_page_on_time, 30);
        assert!(cfg.is_supported(Tag::Nl));
        assert!(cfg.is_supported(Tag::Np));
        assert!(!cfg.is_supported(Tag::Tr));
        let vms: VmsCfg =
            serde_json::from_str(r#"{ "sign_width_pixels": 60 }"#).unwrap();
        assert_eq!(vms.sign_width_pixels, 60);
        assert_eq!(vms.sign_height_pixels, 21);
    }
}
