//! Blit map, kernel dispatch and the kernel families.
//!
//! A surface's [`map::BlitMap`] caches, per destination, the kernel and lookup table chosen by
//! [`dispatch::select_kernel`]. Kernels operate on a [`BlitJob`]: two row-major pixel slices
//! already offset to the first row of the blit rectangles.

pub(crate) mod alpha;
pub(crate) mod bitmap;
pub(crate) mod copy;
pub(crate) mod direct;
pub(crate) mod dispatch;
pub(crate) mod generated;
pub(crate) mod indexed;
pub(crate) mod map;
pub(crate) mod rle;
pub(crate) mod slow;

use crate::foundation::math::NearestSteps;
use crate::pixels::format::PixelFormat;

bitflags::bitflags! {
    /// Compositing state of a blit source.
    ///
    /// Surface setters derive these; callers normally only read them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
    pub struct BlitFlags: u32 {
        const MODULATE_COLOR = 0x0000_0001;
        const MODULATE_ALPHA = 0x0000_0002;
        const BLEND = 0x0000_0010;
        const ADD = 0x0000_0020;
        const MOD = 0x0000_0040;
        const COLORKEY = 0x0000_0100;
        const NEAREST = 0x0000_0200;
        const RLE_DESIRED = 0x0000_1000;
        const RLE_COLORKEY = 0x0000_2000;
        const RLE_ALPHAKEY = 0x0000_4000;
        const RLE_MASK = Self::RLE_DESIRED.bits() | Self::RLE_COLORKEY.bits() | Self::RLE_ALPHAKEY.bits();
        const BLEND_MASK = Self::BLEND.bits() | Self::ADD.bits() | Self::MOD.bits();
        const MODULATE_MASK = Self::MODULATE_COLOR.bits() | Self::MODULATE_ALPHA.bits();
    }
}

/// Compositing function applied by a blit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum BlendMode {
    /// Replace destination pixels.
    #[default]
    None,
    /// Source-over alpha blending.
    Blend,
    /// Saturating additive.
    Add,
    /// Multiply.
    Mod,
}

impl BlendMode {
    pub(crate) fn flag(self) -> BlitFlags {
        match self {
            BlendMode::None => BlitFlags::empty(),
            BlendMode::Blend => BlitFlags::BLEND,
            BlendMode::Add => BlitFlags::ADD,
            BlendMode::Mod => BlitFlags::MOD,
        }
    }

    pub(crate) fn from_flags(flags: BlitFlags) -> Self {
        if flags.contains(BlitFlags::BLEND) {
            BlendMode::Blend
        } else if flags.contains(BlitFlags::ADD) {
            BlendMode::Add
        } else if flags.contains(BlitFlags::MOD) {
            BlendMode::Mod
        } else {
            BlendMode::None
        }
    }
}

/// Flags plus the modulation color and colorkey a kernel reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CopyParams {
    pub(crate) flags: BlitFlags,
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
    pub(crate) colorkey: u32,
}

impl Default for CopyParams {
    fn default() -> Self {
        Self {
            flags: BlitFlags::empty(),
            r: 0xFF,
            g: 0xFF,
            b: 0xFF,
            a: 0xFF,
            colorkey: 0,
        }
    }
}

/// Precomputed per-index mapping prepared by the blit map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum LookupTable {
    /// Source index (or 3-3-2 quantized color) to destination palette index.
    Indices(Vec<u8>),
    /// Source palette index to packed destination pixel.
    Pixels(Vec<u32>),
}

impl LookupTable {
    #[inline]
    pub(crate) fn get(&self, i: usize) -> u32 {
        match self {
            LookupTable::Indices(v) => v.get(i).map_or(0, |&x| u32::from(x)),
            LookupTable::Pixels(v) => v.get(i).copied().unwrap_or(0),
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            LookupTable::Indices(_) => "indices",
            LookupTable::Pixels(_) => "pixels",
        }
    }
}

/// One kernel invocation.
///
/// `src` and `dst` start at the first row of their rectangles; `src_x`/`dst_x` are pixel
/// columns within those rows. Unscaled kernels may assume `src_w == dst_w` and
/// `src_h == dst_h`.
pub(crate) struct BlitJob<'a> {
    pub(crate) src: &'a [u8],
    pub(crate) src_pitch: usize,
    pub(crate) src_x: usize,
    pub(crate) src_w: usize,
    pub(crate) src_h: usize,
    pub(crate) dst: &'a mut [u8],
    pub(crate) dst_pitch: usize,
    pub(crate) dst_x: usize,
    pub(crate) dst_w: usize,
    pub(crate) dst_h: usize,
    pub(crate) src_fmt: &'a PixelFormat,
    pub(crate) dst_fmt: &'a PixelFormat,
    pub(crate) table: Option<&'a LookupTable>,
    pub(crate) params: CopyParams,
}

impl BlitJob<'_> {
    /// Visit each row pair of an unscaled job as byte slices covering exactly the blit width.
    pub(crate) fn rows(&mut self, mut f: impl FnMut(&[u8], &mut [u8])) {
        let sbpp = usize::from(self.src_fmt.bytes_per_pixel());
        let dbpp = usize::from(self.dst_fmt.bytes_per_pixel());
        let w = self.dst_w;
        for y in 0..self.dst_h {
            let s = y * self.src_pitch + self.src_x * sbpp;
            let d = y * self.dst_pitch + self.dst_x * dbpp;
            f(&self.src[s..s + w * sbpp], &mut self.dst[d..d + w * dbpp]);
        }
    }

    /// Visit each destination row with the source row it samples and the source column of
    /// every destination pixel (16.16 nearest stepping on both axes).
    pub(crate) fn scaled_rows(&mut self, mut f: impl FnMut(&[u8], &[usize], &mut [u8])) {
        let sbpp = usize::from(self.src_fmt.bytes_per_pixel());
        let dbpp = usize::from(self.dst_fmt.bytes_per_pixel());
        let cols: Vec<usize> = NearestSteps::new(self.src_w, self.dst_w).collect();
        let w = self.dst_w;
        for (y, sy) in NearestSteps::new(self.src_h, self.dst_h).enumerate() {
            let s = sy * self.src_pitch + self.src_x * sbpp;
            let d = y * self.dst_pitch + self.dst_x * dbpp;
            f(
                &self.src[s..s + self.src_w * sbpp],
                &cols,
                &mut self.dst[d..d + w * dbpp],
            );
        }
    }
}

#[cfg(test)]
impl<'a> BlitJob<'a> {
    /// Unscaled job over tightly packed `w` x `h` buffers.
    pub(crate) fn tight(
        src: &'a [u8],
        src_fmt: &'a PixelFormat,
        dst: &'a mut [u8],
        dst_fmt: &'a PixelFormat,
        w: usize,
        h: usize,
    ) -> Self {
        let pitch = |fmt: &PixelFormat| fmt.row_bytes(w);
        Self {
            src,
            src_pitch: pitch(src_fmt),
            src_x: 0,
            src_w: w,
            src_h: h,
            dst,
            dst_pitch: pitch(dst_fmt),
            dst_x: 0,
            dst_w: w,
            dst_h: h,
            src_fmt,
            dst_fmt,
            table: None,
            params: CopyParams::default(),
        }
    }
}
