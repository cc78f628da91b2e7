use std::sync::atomic::{AtomicU64, Ordering};

use crate::blit::dispatch::{Kernel, select_kernel};
use crate::blit::{CopyParams, LookupTable};
use crate::engine::caps::CpuCaps;
use crate::foundation::core::Color;
use crate::foundation::error::{SoftblitError, SoftblitResult};
use crate::foundation::math::mul_div255;
use crate::pixels::format::PixelFormat;
use crate::pixels::palette::{Palette, PaletteStamp};

/// Process-unique surface identity, used to key cached blit maps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct SurfaceId(u64);

impl SurfaceId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// What a resolution depends on besides the source's own parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct MapKey {
    pub(crate) dst: SurfaceId,
    pub(crate) src_palette: Option<PaletteStamp>,
    pub(crate) dst_palette: Option<PaletteStamp>,
}

#[derive(Debug)]
pub(crate) struct Resolved {
    pub(crate) key: MapKey,
    pub(crate) identity: bool,
    pub(crate) table: Option<LookupTable>,
    /// `None` records an unsupported combination.
    pub(crate) kernel: Option<Kernel>,
}

/// Per-source cache of the last blit resolution.
#[derive(Debug, Default)]
pub(crate) struct BlitMap {
    pub(crate) info: CopyParams,
    resolved: Option<Resolved>,
}

impl BlitMap {
    pub(crate) fn invalidate(&mut self) {
        self.resolved = None;
    }

    #[cfg(test)]
    pub(crate) fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    pub(crate) fn resolved(&self) -> Option<&Resolved> {
        self.resolved.as_ref()
    }

    /// Cached resolution for `key`, computing it first if the cache is empty or keyed
    /// differently. An unsupported combination stays cached and keeps failing until the map is
    /// invalidated or the key changes.
    pub(crate) fn resolve(
        &mut self,
        src: &PixelFormat,
        dst: &PixelFormat,
        key: MapKey,
        caps: CpuCaps,
    ) -> SoftblitResult<&Resolved> {
        let stale = self.resolved.as_ref().is_none_or(|r| r.key != key);
        if stale {
            let (identity, table) = build_table(src, dst, &self.info)?;
            let kernel = select_kernel(src, dst, identity, self.info.flags, caps);
            match kernel {
                Some(k) => tracing::debug!(
                    src = ?src.id(),
                    dst = ?dst.id(),
                    flags = ?self.info.flags,
                    kernel = ?k,
                    identity,
                    table = table.as_ref().map_or("none", LookupTable::kind),
                    "blit map resolved"
                ),
                None => tracing::debug!(
                    src = ?src.id(),
                    dst = ?dst.id(),
                    flags = ?self.info.flags,
                    "no kernel for blit combination"
                ),
            }
            self.resolved = Some(Resolved {
                key,
                identity,
                table,
                kernel,
            });
        }
        match &self.resolved {
            Some(r) if r.kernel.is_some() => Ok(r),
            _ => Err(SoftblitError::unsupported_combination(format!(
                "{:?} -> {:?} with {:?}",
                src.id(),
                dst.id(),
                self.info.flags
            ))),
        }
    }
}

fn palette_colors(fmt: &PixelFormat) -> Vec<Color> {
    fmt.palette()
        .map(|p| p.borrow().colors().to_vec())
        .unwrap_or_default()
}

/// Nearest-color index mapping from `src` into `dst`, `None` when `dst` begins with exactly
/// the colors of `src` (the mapping is then the identity).
fn map_1to1(src: &[Color], dst: &Palette) -> Option<Vec<u8>> {
    if src.len() <= dst.len() && src.iter().zip(dst.colors()).all(|(a, b)| a == b) {
        return None;
    }
    Some(src.iter().map(|c| dst.find_color(c.r, c.g, c.b)).collect())
}

/// Identity flag and lookup table for a source/destination pair.
fn build_table(
    src: &PixelFormat,
    dst: &PixelFormat,
    info: &CopyParams,
) -> SoftblitResult<(bool, Option<LookupTable>)> {
    if src.is_indexed() {
        let colors = palette_colors(src);
        if let Some(dst_pal) = dst.palette() {
            let table = map_1to1(&colors, &dst_pal.borrow());
            let identity = table.is_none() && src.same_layout(dst);
            return Ok((identity, table.map(LookupTable::Indices)));
        }
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(colors.len())
            .map_err(|_| SoftblitError::out_of_memory("palette lookup table"))?;
        pixels.extend(colors.iter().map(|c| {
            dst.map_rgba(
                mul_div255(u32::from(c.r), u32::from(info.r)) as u8,
                mul_div255(u32::from(c.g), u32::from(info.g)) as u8,
                mul_div255(u32::from(c.b), u32::from(info.b)) as u8,
                info.a,
            )
        }));
        return Ok((false, Some(LookupTable::Pixels(pixels))));
    }
    if let Some(dst_pal) = dst.palette() {
        let dither = Palette::dither_332();
        let table = map_1to1(dither.colors(), &dst_pal.borrow());
        return Ok((false, table.map(LookupTable::Indices)));
    }
    Ok((src.same_layout(dst), None))
}

#[cfg(test)]
#[path = "../../tests/unit/blit/map.rs"]
mod tests;
