use std::cell::RefCell;
use std::rc::Rc;

use crate::foundation::core::Color;
use crate::foundation::error::{SoftblitError, SoftblitResult};
use crate::foundation::math::expand_to_u8;
use crate::pixels::palette::{Palette, PaletteRef, PaletteStamp};

/// Known pixel layouts.
///
/// Multi-byte pixels are stored little-endian, so `Bgr24` is the byte sequence B, G, R and
/// `Argb8888` is B, G, R, A in memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FormatId {
    /// Synthesized from arbitrary channel masks.
    Unknown,
    Index1Lsb,
    Index1Msb,
    Index4Lsb,
    Index4Msb,
    Index8,
    Rgb332,
    Rgb444,
    Rgb555,
    Bgr555,
    Argb4444,
    Rgba4444,
    Abgr4444,
    Bgra4444,
    Argb1555,
    Rgba5551,
    Abgr1555,
    Bgra5551,
    Rgb565,
    Bgr565,
    Rgb24,
    Bgr24,
    Rgb888,
    Bgr888,
    Argb8888,
    Rgba8888,
    Abgr8888,
    Bgra8888,
}

/// Per-channel bitmasks of a packed pixel.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Masks {
    pub r: u32,
    pub g: u32,
    pub b: u32,
    pub a: u32,
}

impl Masks {
    pub const fn new(r: u32, g: u32, b: u32, a: u32) -> Self {
        Self { r, g, b, a }
    }

    pub fn is_zero(&self) -> bool {
        (self.r | self.g | self.b | self.a) == 0
    }

    fn rgb(&self) -> u32 {
        self.r | self.g | self.b
    }
}

const fn m(r: u32, g: u32, b: u32, a: u32) -> Masks {
    Masks::new(r, g, b, a)
}

impl FormatId {
    /// Every concrete identifier, in declaration order.
    pub const ALL: [FormatId; 27] = [
        FormatId::Index1Lsb,
        FormatId::Index1Msb,
        FormatId::Index4Lsb,
        FormatId::Index4Msb,
        FormatId::Index8,
        FormatId::Rgb332,
        FormatId::Rgb444,
        FormatId::Rgb555,
        FormatId::Bgr555,
        FormatId::Argb4444,
        FormatId::Rgba4444,
        FormatId::Abgr4444,
        FormatId::Bgra4444,
        FormatId::Argb1555,
        FormatId::Rgba5551,
        FormatId::Abgr1555,
        FormatId::Bgra5551,
        FormatId::Rgb565,
        FormatId::Bgr565,
        FormatId::Rgb24,
        FormatId::Bgr24,
        FormatId::Rgb888,
        FormatId::Bgr888,
        FormatId::Argb8888,
        FormatId::Rgba8888,
        FormatId::Abgr8888,
        FormatId::Bgra8888,
    ];

    /// (bits per pixel, bytes per pixel, masks); `None` for [`FormatId::Unknown`].
    fn layout(self) -> Option<(u8, u8, Masks)> {
        use FormatId::*;
        let l = match self {
            Unknown => return None,
            Index1Lsb | Index1Msb => (1, 1, Masks::default()),
            Index4Lsb | Index4Msb => (4, 1, Masks::default()),
            Index8 => (8, 1, Masks::default()),
            Rgb332 => (8, 1, m(0xE0, 0x1C, 0x03, 0)),
            Rgb444 => (12, 2, m(0x0F00, 0x00F0, 0x000F, 0)),
            Rgb555 => (15, 2, m(0x7C00, 0x03E0, 0x001F, 0)),
            Bgr555 => (15, 2, m(0x001F, 0x03E0, 0x7C00, 0)),
            Argb4444 => (16, 2, m(0x0F00, 0x00F0, 0x000F, 0xF000)),
            Rgba4444 => (16, 2, m(0xF000, 0x0F00, 0x00F0, 0x000F)),
            Abgr4444 => (16, 2, m(0x000F, 0x00F0, 0x0F00, 0xF000)),
            Bgra4444 => (16, 2, m(0x00F0, 0x0F00, 0xF000, 0x000F)),
            Argb1555 => (16, 2, m(0x7C00, 0x03E0, 0x001F, 0x8000)),
            Rgba5551 => (16, 2, m(0xF800, 0x07C0, 0x003E, 0x0001)),
            Abgr1555 => (16, 2, m(0x001F, 0x03E0, 0x7C00, 0x8000)),
            Bgra5551 => (16, 2, m(0x003E, 0x07C0, 0xF800, 0x0001)),
            Rgb565 => (16, 2, m(0xF800, 0x07E0, 0x001F, 0)),
            Bgr565 => (16, 2, m(0x001F, 0x07E0, 0xF800, 0)),
            Rgb24 => (24, 3, m(0x0000FF, 0x00FF00, 0xFF0000, 0)),
            Bgr24 => (24, 3, m(0xFF0000, 0x00FF00, 0x0000FF, 0)),
            Rgb888 => (32, 4, m(0x00FF_0000, 0x0000_FF00, 0x0000_00FF, 0)),
            Bgr888 => (32, 4, m(0x0000_00FF, 0x0000_FF00, 0x00FF_0000, 0)),
            Argb8888 => (32, 4, m(0x00FF_0000, 0x0000_FF00, 0x0000_00FF, 0xFF00_0000)),
            Rgba8888 => (32, 4, m(0xFF00_0000, 0x00FF_0000, 0x0000_FF00, 0x0000_00FF)),
            Abgr8888 => (32, 4, m(0x0000_00FF, 0x0000_FF00, 0x00FF_0000, 0xFF00_0000)),
            Bgra8888 => (32, 4, m(0x0000_FF00, 0x00FF_0000, 0xFF00_0000, 0x0000_00FF)),
        };
        Some(l)
    }

    pub fn bits_per_pixel(self) -> u8 {
        self.layout().map_or(0, |l| l.0)
    }

    pub fn bytes_per_pixel(self) -> u8 {
        self.layout().map_or(0, |l| l.1)
    }

    pub fn is_indexed(self) -> bool {
        matches!(
            self,
            FormatId::Index1Lsb
                | FormatId::Index1Msb
                | FormatId::Index4Lsb
                | FormatId::Index4Msb
                | FormatId::Index8
        )
    }

    pub fn has_alpha(self) -> bool {
        self.layout().is_some_and(|l| l.2.a != 0)
    }

    /// Channel masks of a packed layout. Indexed layouts have no masks and yield `None`,
    /// as does [`FormatId::Unknown`].
    pub fn masks(self) -> Option<Masks> {
        self.layout()
            .filter(|_| !self.is_indexed())
            .map(|(_, _, masks)| masks)
    }

    /// Best known identifier for a depth and mask set, [`FormatId::Unknown`] when none fits.
    ///
    /// All-zero masks select the conventional layout for the depth; a 16-bit request with
    /// 15-bit masks resolves to the 15-bit layout.
    pub fn from_masks(bits: u8, masks: Masks) -> FormatId {
        if masks.is_zero() {
            return match bits {
                1 => FormatId::Index1Msb,
                4 => FormatId::Index4Msb,
                8 => FormatId::Index8,
                15 => FormatId::Rgb555,
                16 => FormatId::Rgb565,
                24 => FormatId::Bgr24,
                32 => FormatId::Rgb888,
                _ => FormatId::Unknown,
            };
        }
        let exact = |bits: u8| {
            FormatId::ALL.into_iter().find(|id| {
                id.layout()
                    .is_some_and(|(b, _, mk)| b == bits && mk == masks && !id.is_indexed())
            })
        };
        exact(bits)
            .or_else(|| if bits == 16 { exact(15) } else { None })
            .unwrap_or(FormatId::Unknown)
    }
}

/// One channel of a packed pixel.
///
/// `shift` is the position of the mask's lowest set bit and `loss` is `8 - width`: the number
/// of low bits synthesized when the channel is widened to 8 bits. An absent channel has a
/// zero mask and a loss of 8.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Channel {
    pub mask: u32,
    pub shift: u8,
    pub loss: u8,
}

impl Channel {
    const ABSENT: Channel = Channel {
        mask: 0,
        shift: 0,
        loss: 8,
    };

    fn from_mask(mask: u32) -> SoftblitResult<Self> {
        if mask == 0 {
            return Ok(Self::ABSENT);
        }
        let shift = mask.trailing_zeros();
        let width = (mask >> shift).trailing_ones();
        if (mask >> shift) >> width != 0 {
            return Err(SoftblitError::unsupported_format(format!(
                "channel mask {mask:#010x} is not contiguous"
            )));
        }
        if width > 8 {
            return Err(SoftblitError::unsupported_format(format!(
                "channel mask {mask:#010x} is wider than 8 bits"
            )));
        }
        Ok(Self {
            mask,
            shift: shift as u8,
            loss: (8 - width) as u8,
        })
    }

    pub fn bits(&self) -> u8 {
        8 - self.loss
    }

    #[inline]
    pub(crate) fn decode(&self, pixel: u32) -> u8 {
        expand_to_u8((pixel & self.mask) >> self.shift, self.bits())
    }

    #[inline]
    pub(crate) fn encode(&self, v: u8) -> u32 {
        if self.mask == 0 {
            return 0;
        }
        ((u32::from(v) >> self.loss) << self.shift) & self.mask
    }
}

/// Shared handle to an immutable pixel format.
pub type FormatRef = Rc<PixelFormat>;

/// Memory layout of one pixel.
///
/// Non-indexed formats are deduplicated by [`crate::FormatRegistry`]. Indexed formats are
/// never shared between owners because each may carry a distinct palette.
#[derive(Debug)]
pub struct PixelFormat {
    id: FormatId,
    bits_per_pixel: u8,
    bytes_per_pixel: u8,
    r: Channel,
    g: Channel,
    b: Channel,
    a: Channel,
    palette: RefCell<Option<PaletteRef>>,
}

impl PixelFormat {
    /// Build the descriptor for a known identifier. Indexed identifiers get a fresh palette
    /// sized to `2^bits` (black and white for 1-bit layouts, all white otherwise).
    pub(crate) fn from_id(id: FormatId) -> SoftblitResult<Self> {
        let Some((bits, bytes, masks)) = id.layout() else {
            return Err(SoftblitError::unsupported_format(format!(
                "no layout for {id:?}"
            )));
        };
        let mut fmt = Self::with_masks(id, bits, bytes, masks)?;
        if id.is_indexed() {
            let mut palette = Palette::new(1usize << bits)?;
            if bits == 1 {
                palette.set_colors(0, &[Color::WHITE, Color::BLACK])?;
            }
            fmt.palette = RefCell::new(Some(palette.into_shared()));
        }
        Ok(fmt)
    }

    /// Build the descriptor for an explicit depth and mask set.
    ///
    /// Masks naming a known layout give that layout. Depths of 8 bits or fewer with masks
    /// that name no packed layout give an indexed format whose palette is a ramp derived from
    /// the mask widths. Deeper unmatched masks are synthesized into an [`FormatId::Unknown`]
    /// format when they are consistent.
    pub(crate) fn from_masks(bits: u8, masks: Masks) -> SoftblitResult<Self> {
        let id = FormatId::from_masks(bits, masks);
        if id != FormatId::Unknown {
            return Self::from_id(id);
        }
        if bits <= 8 {
            return Self::ramp_indexed(bits, masks);
        }
        if bits > 32 {
            return Err(SoftblitError::unsupported_format(format!(
                "{bits} bits per pixel"
            )));
        }
        let bytes = bits.div_ceil(8);
        let fmt = Self::with_masks(FormatId::Unknown, bits, bytes, masks)?;
        let all = masks.rgb() | masks.a;
        let overlap = (masks.r & masks.g) | (masks.r & masks.b) | (masks.g & masks.b)
            | (masks.rgb() & masks.a);
        if overlap != 0 || (bits < 32 && all >> bits != 0) {
            return Err(SoftblitError::unsupported_format(format!(
                "inconsistent masks {masks:?} for {bits} bits per pixel"
            )));
        }
        Ok(fmt)
    }

    fn with_masks(id: FormatId, bits: u8, bytes: u8, masks: Masks) -> SoftblitResult<Self> {
        Ok(Self {
            id,
            bits_per_pixel: bits,
            bytes_per_pixel: bytes,
            r: Channel::from_mask(masks.r)?,
            g: Channel::from_mask(masks.g)?,
            b: Channel::from_mask(masks.b)?,
            a: Channel::from_mask(masks.a)?,
            palette: RefCell::new(None),
        })
    }

    fn ramp_indexed(bits: u8, masks: Masks) -> SoftblitResult<Self> {
        let id = match bits {
            1 => FormatId::Index1Msb,
            4 => FormatId::Index4Msb,
            8 => FormatId::Index8,
            _ => {
                return Err(SoftblitError::unsupported_format(format!(
                    "{bits} bits per pixel"
                )));
            }
        };
        let r = Channel::from_mask(masks.r)?;
        let g = Channel::from_mask(masks.g)?;
        let b = Channel::from_mask(masks.b)?;
        let ncolors = 1usize << bits;
        if u64::from(masks.rgb() | masks.a) >> bits != 0 {
            return Err(SoftblitError::unsupported_format(format!(
                "masks {masks:?} exceed {bits} bits per pixel"
            )));
        }
        let ramp: Vec<Color> = (0..ncolors as u32)
            .map(|i| {
                let ch = |c: &Channel| expand_to_u8((i & c.mask) >> c.shift, c.bits());
                Color::rgb(ch(&r), ch(&g), ch(&b))
            })
            .collect();
        let mut palette = Palette::new(ncolors)?;
        palette.set_colors(0, &ramp)?;
        let fmt = Self::with_masks(id, bits, 1, Masks::default())?;
        *fmt.palette.borrow_mut() = Some(palette.into_shared());
        Ok(fmt)
    }

    /// Fresh descriptor with the same layout; indexed layouts get a copy of the palette.
    pub(crate) fn duplicate(&self) -> SoftblitResult<Self> {
        let fmt = Self {
            id: self.id,
            bits_per_pixel: self.bits_per_pixel,
            bytes_per_pixel: self.bytes_per_pixel,
            r: self.r,
            g: self.g,
            b: self.b,
            a: self.a,
            palette: RefCell::new(None),
        };
        if let Some(pal) = self.palette() {
            let copy = pal.borrow().clone();
            *fmt.palette.borrow_mut() = Some(copy.into_shared());
        }
        Ok(fmt)
    }

    pub fn id(&self) -> FormatId {
        self.id
    }

    pub fn bits_per_pixel(&self) -> u8 {
        self.bits_per_pixel
    }

    pub fn bytes_per_pixel(&self) -> u8 {
        self.bytes_per_pixel
    }

    pub fn is_indexed(&self) -> bool {
        self.id.is_indexed()
    }

    pub fn has_alpha(&self) -> bool {
        self.a.mask != 0
    }

    /// Bytes covered by `width` pixels, without row padding.
    pub(crate) fn row_bytes(&self, width: usize) -> usize {
        if self.bits_per_pixel < 8 {
            (width * usize::from(self.bits_per_pixel)).div_ceil(8)
        } else {
            width * usize::from(self.bytes_per_pixel)
        }
    }

    /// Sub-byte layouts: whether the first pixel of a byte sits in its high bits.
    pub fn msb_first(&self) -> bool {
        matches!(self.id, FormatId::Index1Msb | FormatId::Index4Msb)
    }

    pub fn masks(&self) -> Masks {
        Masks::new(self.r.mask, self.g.mask, self.b.mask, self.a.mask)
    }

    pub fn red(&self) -> Channel {
        self.r
    }

    pub fn green(&self) -> Channel {
        self.g
    }

    pub fn blue(&self) -> Channel {
        self.b
    }

    pub fn alpha(&self) -> Channel {
        self.a
    }

    /// Palette attached to an indexed format.
    pub fn palette(&self) -> Option<PaletteRef> {
        self.palette.borrow().clone()
    }

    /// Version of the attached palette, 0 when there is none.
    pub fn palette_version(&self) -> u32 {
        self.palette
            .borrow()
            .as_ref()
            .map_or(0, |p| p.borrow().version())
    }

    /// Identity and revision of the attached palette.
    pub(crate) fn palette_stamp(&self) -> Option<PaletteStamp> {
        self.palette.borrow().as_ref().map(|p| p.borrow().stamp())
    }

    /// Attach (or detach) a palette. The palette must hold exactly `2^bits` entries.
    pub fn set_palette(&self, palette: Option<PaletteRef>) -> SoftblitResult<()> {
        if let Some(pal) = &palette {
            let expected = if self.is_indexed() {
                1usize << self.bits_per_pixel
            } else {
                0
            };
            let got = pal.borrow().len();
            if got != expected {
                return Err(SoftblitError::invalid_argument(format!(
                    "palette of {got} colors does not match {:?}",
                    self.id
                )));
            }
        }
        *self.palette.borrow_mut() = palette;
        Ok(())
    }

    /// Whether two descriptors describe byte-identical pixels (palette contents excluded).
    pub fn same_layout(&self, other: &PixelFormat) -> bool {
        self.id == other.id
            && self.bits_per_pixel == other.bits_per_pixel
            && self.masks() == other.masks()
    }

    /// Pack an opaque color; indexed formats return the nearest palette index.
    pub fn map_rgb(&self, r: u8, g: u8, b: u8) -> u32 {
        match self.palette() {
            Some(pal) if self.is_indexed() => u32::from(pal.borrow().find_color(r, g, b)),
            _ => self.r.encode(r) | self.g.encode(g) | self.b.encode(b) | self.a.mask,
        }
    }

    /// Pack a color with alpha; the alpha is dropped by formats without an alpha channel.
    pub fn map_rgba(&self, r: u8, g: u8, b: u8, a: u8) -> u32 {
        match self.palette() {
            Some(pal) if self.is_indexed() => u32::from(pal.borrow().find_color(r, g, b)),
            _ => self.r.encode(r) | self.g.encode(g) | self.b.encode(b) | self.a.encode(a),
        }
    }

    pub fn map_color(&self, c: Color) -> u32 {
        self.map_rgba(c.r, c.g, c.b, c.a)
    }

    /// Decode a pixel value. Formats without alpha, and indexed formats, decode as opaque.
    pub fn get_rgba(&self, pixel: u32) -> Color {
        if self.is_indexed() {
            let Some(pal) = self.palette() else {
                return Color::rgba(0, 0, 0, 0xFF);
            };
            let pal = pal.borrow();
            return match pal.colors().get(pixel as usize) {
                Some(c) => Color::rgb(c.r, c.g, c.b),
                None => Color::rgba(0, 0, 0, 0xFF),
            };
        }
        let a = if self.has_alpha() {
            self.a.decode(pixel)
        } else {
            0xFF
        };
        Color::rgba(
            self.r.decode(pixel),
            self.g.decode(pixel),
            self.b.decode(pixel),
            a,
        )
    }

    #[inline]
    pub(crate) fn unpack(&self, pixel: u32) -> [u32; 4] {
        let a = if self.a.mask != 0 {
            u32::from(self.a.decode(pixel))
        } else {
            0xFF
        };
        [
            u32::from(self.r.decode(pixel)),
            u32::from(self.g.decode(pixel)),
            u32::from(self.b.decode(pixel)),
            a,
        ]
    }

    #[inline]
    pub(crate) fn pack(&self, rgba: [u32; 4]) -> u32 {
        self.r.encode(rgba[0] as u8)
            | self.g.encode(rgba[1] as u8)
            | self.b.encode(rgba[2] as u8)
            | self.a.encode(rgba[3] as u8)
    }

    /// Pack with every alpha bit set.
    #[inline]
    pub(crate) fn pack_opaque(&self, rgb: [u32; 3]) -> u32 {
        self.r.encode(rgb[0] as u8)
            | self.g.encode(rgb[1] as u8)
            | self.b.encode(rgb[2] as u8)
            | self.a.mask
    }
}

/// Read one little-endian pixel of `bpp` bytes.
#[inline]
pub(crate) fn read_pixel(bytes: &[u8], bpp: usize) -> u32 {
    match bpp {
        1 => u32::from(bytes[0]),
        2 => u32::from(u16::from_le_bytes([bytes[0], bytes[1]])),
        3 => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]),
        _ => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
    }
}

/// Write one little-endian pixel of `bpp` bytes.
#[inline]
pub(crate) fn write_pixel(bytes: &mut [u8], bpp: usize, value: u32) {
    let le = value.to_le_bytes();
    bytes[..bpp].copy_from_slice(&le[..bpp]);
}

/// Read pixel `x` of a row packed at `bits` (1 or 4) bits per pixel.
#[inline]
pub(crate) fn read_packed(row: &[u8], x: usize, bits: u8, msb_first: bool) -> u32 {
    let per_byte = 8 / usize::from(bits);
    let byte = row[x / per_byte];
    let slot = x % per_byte;
    let shift = if msb_first {
        8 - usize::from(bits) * (slot + 1)
    } else {
        usize::from(bits) * slot
    };
    u32::from(byte >> shift) & ((1u32 << bits) - 1)
}

/// Write pixel `x` of a row packed at `bits` (1 or 4) bits per pixel.
#[inline]
pub(crate) fn write_packed(row: &mut [u8], x: usize, bits: u8, msb_first: bool, value: u32) {
    let per_byte = 8 / usize::from(bits);
    let slot = x % per_byte;
    let shift = if msb_first {
        8 - usize::from(bits) * (slot + 1)
    } else {
        usize::from(bits) * slot
    };
    let mask = (((1u32 << bits) - 1) << shift) as u8;
    let byte = &mut row[x / per_byte];
    *byte = (*byte & !mask) | (((value << shift) as u8) & mask);
}

#[cfg(test)]
#[path = "../../tests/unit/pixels/format.rs"]
mod tests;
