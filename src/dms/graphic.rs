// graphic.rs
//
// Copyright (C) 2018-2026  Minnesota Department of Transportation
//
//! Graphic image support
use crate::dms::multi::{Color, ColorCtx, ColorScheme, SyntaxError};
use crate::dms::Result;
use log::debug;
use pix::{rgb::SRgb8, Raster};

/// Graphic image (`dmsGraphicEntry`)
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Graphic {
    /// Graphic number (`dmsGraphicNumber`)
    pub number: u8,
    /// Name of graphic (`dmsGraphicName`)
    #[serde(default)]
    pub name: String,
    /// Height in pixels (`dmsGraphicHeight`)
    pub height: u8,
    /// Width in pixels (`dmsGraphicWidth`)
    pub width: u16,
    /// Graphic type (`dmsGraphicType`)
    pub gtype: ColorScheme,
    /// Transparent color
    ///
    /// `dmsGraphicTransparentEnabled` / `dmsGraphicTransparentColor`
    #[serde(default)]
    pub transparent_color: Option<Color>,
    /// Uncompressed bitmap data (`dmsGraphicBitmapTable`)
    #[serde(with = "super::base64")]
    pub bitmap: Vec<u8>,
}

/// A table of graphics
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct GraphicTable {
    /// Graphics in table
    graphics: Vec<Graphic>,
}

impl Graphic {
    /// Check if bitmap length is valid
    fn is_bitmap_valid(&self) -> bool {
        let pix = usize::from(self.height) * usize::from(self.width);
        let len = match self.gtype {
            ColorScheme::Monochrome1Bit => (pix + 7) / 8,
            ColorScheme::Color24Bit => pix * 3,
            _ => pix,
        };
        len == self.bitmap.len()
    }

    /// Check if transparent color type is valid
    fn is_transparent_color_valid(&self) -> bool {
        matches!(
            (self.gtype, self.transparent_color),
            (_, None)
                | (ColorScheme::Monochrome1Bit, Some(Color::Legacy(_)))
                | (ColorScheme::Monochrome8Bit, Some(Color::Legacy(_)))
                | (ColorScheme::ColorClassic, Some(Color::Legacy(_)))
                | (ColorScheme::Color24Bit, Some(Color::Rgb(_, _, _)))
        )
    }

    /// Check if graphic is valid
    pub fn is_valid(&self) -> bool {
        self.number > 0
            && self.height > 0
            && self.width > 0
            && self.is_bitmap_valid()
            && self.is_transparent_color_valid()
    }

    /// Render graphic onto a Raster
    ///
    /// * `x` Left edge (1-based).
    /// * `y` Top edge (1-based).
    pub(crate) fn render_graphic(
        &self,
        page: &mut Raster<SRgb8>,
        x: i32,
        y: i32,
        ctx: &ColorCtx,
    ) -> Result<()> {
        let x = x - 1;
        let y = y - 1;
        let w = i32::from(self.width);
        let h = i32::from(self.height);
        if x < 0
            || y < 0
            || i64::from(x + w) > i64::from(page.width())
            || i64::from(y + h) > i64::from(page.height())
        {
            return Err(SyntaxError::Other("Graphic too big"));
        }
        for yy in 0..h {
            for xx in 0..w {
                if let Some(clr) = self.pixel_fn(xx, yy, ctx) {
                    *page.pixel_mut(x + xx, y + yy) = clr;
                }
            }
        }
        Ok(())
    }

    /// Get one pixel of a graphic
    fn pixel_fn(&self, x: i32, y: i32, ctx: &ColorCtx) -> Option<SRgb8> {
        let offset = (y * i32::from(self.width) + x) as usize;
        match self.gtype {
            ColorScheme::Monochrome1Bit => self.pixel_1(offset, ctx),
            ColorScheme::Monochrome8Bit | ColorScheme::ColorClassic => {
                self.pixel_8(offset, ctx)
            }
            ColorScheme::Color24Bit => self.pixel_24(offset),
        }
    }

    /// Get one pixel of a monochrome 1-bit graphic
    fn pixel_1(&self, offset: usize, ctx: &ColorCtx) -> Option<SRgb8> {
        let by = *self.bitmap.get(offset / 8)?;
        let lit = ((by >> (7 - (offset & 7))) & 1) != 0;
        let (red, green, blue) = match (lit, self.transparent_color) {
            (false, Some(Color::Legacy(0))) => return None,
            (true, Some(Color::Legacy(1))) => return None,
            (false, _) => ctx.background_rgb(),
            (true, _) => ctx.foreground_rgb(),
        };
        Some(SRgb8::new(red, green, blue))
    }

    /// Get one pixel of an 8-bit (monochrome or classic) color graphic
    fn pixel_8(&self, offset: usize, ctx: &ColorCtx) -> Option<SRgb8> {
        let v = *self.bitmap.get(offset)?;
        if self.transparent_color == Some(Color::Legacy(v)) {
            return None;
        }
        match ctx.rgb(Color::Legacy(v)) {
            Some((red, green, blue)) => Some(SRgb8::new(red, green, blue)),
            None => {
                debug!("pixel_8: bad color {v}");
                None
            }
        }
    }

    /// Get one pixel of a 24-bit color graphic
    fn pixel_24(&self, offset: usize) -> Option<SRgb8> {
        let px = self.bitmap.get(offset * 3..offset * 3 + 3)?;
        // BGR order for dmsGraphicBitmapTable with 24-bit color
        let (blue, green, red) = (px[0], px[1], px[2]);
        if self.transparent_color == Some(Color::Rgb(red, green, blue)) {
            return None;
        }
        Some(SRgb8::new(red, green, blue))
    }
}

impl GraphicTable {
    /// Create an empty graphic table
    pub const fn new() -> Self {
        GraphicTable {
            graphics: Vec::new(),
        }
    }

    /// Push a graphic into the table
    pub fn push(&mut self, graphic: Graphic) -> Result<()> {
        if !graphic.is_valid() {
            return Err(SyntaxError::Other("Invalid graphic"));
        }
        if self.graphics.iter().any(|g| g.number == graphic.number) {
            return Err(SyntaxError::Other("Duplicate graphic number"));
        }
        self.graphics.push(graphic);
        Ok(())
    }

    /// Sort by graphic number
    pub fn sort(&mut self) {
        self.graphics.sort_by_key(|g| g.number)
    }

    /// Lookup a graphic by number
    pub fn lookup(&self, gnum: u8) -> Result<&Graphic> {
        self.graphics
            .iter()
            .find(|g| g.number == gnum)
            .ok_or(SyntaxError::GraphicNotDefined(gnum))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dms::multi::ColorClassic;

    fn arrow() -> Graphic {
        Graphic {
            number: 3,
            name: "ARROW".into(),
            height: 2,
            width: 2,
            gtype: ColorScheme::Monochrome1Bit,
            transparent_color: Some(Color::Legacy(0)),
            bitmap: vec![0b1001_0000],
        }
    }

    fn ctx() -> ColorCtx {
        ColorCtx::new(
            ColorScheme::Monochrome1Bit,
            ColorClassic::Amber.rgb(),
            ColorClassic::Black.rgb(),
        )
    }

    #[test]
    fn validity() {
        let mut g = arrow();
        assert!(g.is_valid());
        g.bitmap.push(0);
        assert!(!g.is_valid());
        let mut g = arrow();
        g.transparent_color = Some(Color::Rgb(0, 0, 0));
        assert!(!g.is_valid());
    }

    #[test]
    fn table() {
        let mut table = GraphicTable::default();
        assert_eq!(table.push(arrow()), Ok(()));
        assert_eq!(
            table.push(arrow()),
            Err(SyntaxError::Other("Duplicate graphic number"))
        );
        let mut g = arrow();
        g.number = 1;
        table.push(g).unwrap();
        table.sort();
        assert_eq!(table.lookup(1).unwrap().number, 1);
        assert_eq!(table.lookup(3).unwrap().name, "ARROW");
        assert_eq!(
            table.lookup(2).map(|g| g.number),
            Err(SyntaxError::GraphicNotDefined(2))
        );
    }

    #[test]
    fn render_transparent() {
        let red = SRgb8::new(255, 0, 0);
        let amber = SRgb8::new(0xFF, 0xD0, 0x00);
        let mut page = Raster::with_color(4, 4, red);
        arrow().render_graphic(&mut page, 2, 2, &ctx()).unwrap();
        let px = page.pixels();
        assert_eq!(px[5], amber);
        assert_eq!(px[6], red);
        assert_eq!(px[9], red);
        assert_eq!(px[10], amber);
        assert_eq!(
            arrow().render_graphic(&mut page, 4, 1, &ctx()),
            Err(SyntaxError::Other("Graphic too big"))
        );
    }

    #[test]
    fn render_24_bit() {
        let g = Graphic {
            number: 1,
            name: String::new(),
            height: 1,
            width: 2,
            gtype: ColorScheme::Color24Bit,
            transparent_color: Some(Color::Rgb(0, 0, 255)),
            bitmap: vec![0x10, 0x20, 0x30, 255, 0, 0],
        };
        let black = SRgb8::new(0, 0, 0);
        let mut page = Raster::with_color(2, 1, black);
        g.render_graphic(&mut page, 1, 1, &ctx()).unwrap();
        assert_eq!(page.pixels()[0], SRgb8::new(0x30, 0x20, 0x10));
        assert_eq!(page.pixels()[1], black);
    }
}
