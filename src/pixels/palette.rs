use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::foundation::core::Color;
use crate::foundation::error::{SoftblitError, SoftblitResult};

/// Shared, mutable handle to a palette. Formats and surfaces hold clones of the handle.
pub type PaletteRef = Rc<RefCell<Palette>>;

/// Which palette, at which revision. Blit maps key their lookup tables on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct PaletteStamp {
    id: u64,
    version: u32,
}

fn next_palette_id() -> u64 {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

/// Ordered color table referenced by index from indexed pixels.
///
/// Every mutation bumps [`Palette::version`]; blit maps compare versions to detect stale
/// lookup tables. Version 0 is never produced. Each palette (clones included) also carries a
/// process-unique identity, so two palettes at the same version are never confused.
#[derive(Debug)]
pub struct Palette {
    id: u64,
    colors: Vec<Color>,
    version: u32,
}

impl Clone for Palette {
    fn clone(&self) -> Self {
        Self {
            id: next_palette_id(),
            colors: self.colors.clone(),
            version: self.version,
        }
    }
}

impl PartialEq for Palette {
    fn eq(&self, other: &Self) -> bool {
        self.colors == other.colors
    }
}

impl Eq for Palette {}

impl Palette {
    pub const MAX_COLORS: usize = 256;

    /// Palette of `ncolors` opaque white entries.
    pub fn new(ncolors: usize) -> SoftblitResult<Self> {
        if ncolors == 0 || ncolors > Self::MAX_COLORS {
            return Err(SoftblitError::invalid_argument(format!(
                "palette size {ncolors} out of range 1..={}",
                Self::MAX_COLORS
            )));
        }
        let mut colors = Vec::new();
        colors
            .try_reserve_exact(ncolors)
            .map_err(|_| SoftblitError::out_of_memory("palette"))?;
        colors.resize(ncolors, Color::WHITE);
        Ok(Self {
            id: next_palette_id(),
            colors,
            version: 1,
        })
    }

    pub fn into_shared(self) -> PaletteRef {
        Rc::new(RefCell::new(self))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub(crate) fn stamp(&self) -> PaletteStamp {
        PaletteStamp {
            id: self.id,
            version: self.version,
        }
    }

    /// Overwrite entries starting at `first`.
    pub fn set_colors(&mut self, first: usize, colors: &[Color]) -> SoftblitResult<()> {
        let end = first.checked_add(colors.len()).unwrap_or(usize::MAX);
        if end > self.colors.len() {
            return Err(SoftblitError::invalid_argument(format!(
                "colors {first}..{end} exceed palette of {}",
                self.colors.len()
            )));
        }
        self.colors[first..end].copy_from_slice(colors);
        self.bump();
        Ok(())
    }

    /// Change the number of entries; new entries are white.
    pub(crate) fn resize(&mut self, ncolors: usize) -> SoftblitResult<()> {
        if ncolors == 0 || ncolors > Self::MAX_COLORS {
            return Err(SoftblitError::invalid_argument(format!(
                "palette size {ncolors} out of range 1..={}",
                Self::MAX_COLORS
            )));
        }
        self.colors.resize(ncolors, Color::WHITE);
        self.bump();
        Ok(())
    }

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
        if self.version == 0 {
            self.version = 1;
        }
    }

    /// Index of the entry closest to `(r, g, b)` by squared distance; ties keep the first.
    pub fn find_color(&self, r: u8, g: u8, b: u8) -> u8 {
        let mut smallest = u32::MAX;
        let mut pixel = 0u8;
        for (i, c) in self.colors.iter().enumerate() {
            let rd = i32::from(c.r) - i32::from(r);
            let gd = i32::from(c.g) - i32::from(g);
            let bd = i32::from(c.b) - i32::from(b);
            let distance = (rd * rd + gd * gd + bd * bd) as u32;
            if distance < smallest {
                pixel = i as u8;
                if distance == 0 {
                    break;
                }
                smallest = distance;
            }
        }
        pixel
    }

    /// All entries still white, the state of a palette nobody populated.
    pub fn is_unpopulated(&self) -> bool {
        self.colors
            .iter()
            .all(|c| c.r == 0xFF && c.g == 0xFF && c.b == 0xFF)
    }

    /// The 256-entry 3-3-2 palette used to quantize direct color onto indexed targets.
    pub(crate) fn dither_332() -> Self {
        let colors = (0..=255u32)
            .map(|i| {
                let mut r = i & 0xE0;
                r |= (r >> 3) | (r >> 6);
                let mut g = (i << 3) & 0xE0;
                g |= (g >> 3) | (g >> 6);
                let mut b = i & 0x3;
                b |= b << 2;
                b |= b << 4;
                Color::rgb(r as u8, g as u8, b as u8)
            })
            .collect();
        Self {
            id: next_palette_id(),
            colors,
            version: 1,
        }
    }

    #[cfg(test)]
    pub(crate) fn force_version(&mut self, version: u32) {
        self.version = version;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pixels/palette.rs"]
mod tests;
