//! Kernels specialized at compile time for the canonical 32-bit layouts.
//!
//! Each (source, destination) pair gets eight entries, one per combination of modulation,
//! blending and nearest scaling. The arithmetic is shared with the slow path, so a generated
//! kernel and the slow kernel produce identical bytes.

use crate::blit::slow::composite;
use crate::blit::{BlitFlags, BlitJob};
use crate::engine::caps::CpuCaps;
use crate::pixels::format::FormatId;

trait Layout32 {
    const ID: FormatId;
    const R: u32;
    const G: u32;
    const B: u32;
    const A: Option<u32>;
}

macro_rules! layout32 {
    ($name:ident, $r:expr, $g:expr, $b:expr, $a:expr) => {
        struct $name;
        impl Layout32 for $name {
            const ID: FormatId = FormatId::$name;
            const R: u32 = $r;
            const G: u32 = $g;
            const B: u32 = $b;
            const A: Option<u32> = $a;
        }
    };
}

layout32!(Rgb888, 16, 8, 0, None);
layout32!(Bgr888, 0, 8, 16, None);
layout32!(Argb8888, 16, 8, 0, Some(24));
layout32!(Rgba8888, 24, 16, 8, Some(0));
layout32!(Abgr8888, 0, 8, 16, Some(24));
layout32!(Bgra8888, 8, 16, 24, Some(0));

#[inline(always)]
fn unpack<L: Layout32>(p: u32) -> [u32; 4] {
    [
        (p >> L::R) & 0xFF,
        (p >> L::G) & 0xFF,
        (p >> L::B) & 0xFF,
        match L::A {
            Some(s) => (p >> s) & 0xFF,
            None => 0xFF,
        },
    ]
}

#[inline(always)]
fn pack<L: Layout32>(c: [u32; 4]) -> u32 {
    let a = match L::A {
        Some(s) => c[3] << s,
        None => 0,
    };
    (c[0] << L::R) | (c[1] << L::G) | (c[2] << L::B) | a
}

const MODULATE: u32 = 1;
const BLEND: u32 = 2;
const SCALE: u32 = 4;

const fn flags_for(ops: u32) -> BlitFlags {
    let mut bits = 0;
    if ops & MODULATE != 0 {
        bits |= BlitFlags::MODULATE_COLOR.bits() | BlitFlags::MODULATE_ALPHA.bits();
    }
    if ops & BLEND != 0 {
        bits |= BlitFlags::BLEND_MASK.bits();
    }
    if ops & SCALE != 0 {
        bits |= BlitFlags::NEAREST.bits();
    }
    BlitFlags::from_bits_retain(bits)
}

fn blit_auto<S: Layout32, D: Layout32, const OPS: u32>(job: &mut BlitJob<'_>) {
    let params = job.params;
    let flags = params.flags & flags_for(OPS);
    let plain = OPS & (MODULATE | BLEND) == 0;
    let px = |s: &[u8]| u32::from_le_bytes([s[0], s[1], s[2], s[3]]);
    let pixel = |sp: u32, dp: &mut [u8]| {
        let out = if plain {
            pack::<D>(unpack::<S>(sp))
        } else {
            pack::<D>(composite(unpack::<S>(sp), unpack::<D>(px(dp)), flags, &params))
        };
        dp.copy_from_slice(&out.to_le_bytes());
    };
    if OPS & SCALE != 0 {
        job.scaled_rows(|s, cols, d| {
            for (&sx, dp) in cols.iter().zip(d.chunks_exact_mut(4)) {
                pixel(px(&s[sx * 4..]), dp);
            }
        });
    } else {
        job.rows(|s, d| {
            for (sp, dp) in s.chunks_exact(4).zip(d.chunks_exact_mut(4)) {
                pixel(px(sp), dp);
            }
        });
    }
}

pub(crate) struct GeneratedEntry {
    pub(crate) src: FormatId,
    pub(crate) dst: FormatId,
    pub(crate) flags: BlitFlags,
    pub(crate) caps: CpuCaps,
    pub(crate) func: fn(&mut BlitJob<'_>),
}

const fn entry<S: Layout32, D: Layout32, const OPS: u32>() -> GeneratedEntry {
    GeneratedEntry {
        src: S::ID,
        dst: D::ID,
        flags: flags_for(OPS),
        caps: CpuCaps::empty(),
        func: blit_auto::<S, D, OPS>,
    }
}

macro_rules! pair {
    ($s:ident, $d:ident) => {
        [
            entry::<$s, $d, 0>(),
            entry::<$s, $d, MODULATE>(),
            entry::<$s, $d, BLEND>(),
            entry::<$s, $d, { MODULATE | BLEND }>(),
            entry::<$s, $d, SCALE>(),
            entry::<$s, $d, { SCALE | MODULATE }>(),
            entry::<$s, $d, { SCALE | BLEND }>(),
            entry::<$s, $d, { SCALE | MODULATE | BLEND }>(),
        ]
    };
}

macro_rules! table {
    ($($s:ident),* ; $dsts:tt) => {
        [$(table!(@row $s $dsts)),*]
    };
    (@row $s:ident [$($d:ident),*]) => {
        [$(pair!($s, $d)),*]
    };
}

static TABLE: [[[GeneratedEntry; 8]; 3]; 6] = table!(
    Rgb888, Bgr888, Argb8888, Rgba8888, Abgr8888, Bgra8888;
    [Rgb888, Bgr888, Argb8888]
);

/// Flags a generated entry can be asked to honor.
const RELEVANT: BlitFlags = BlitFlags::MODULATE_MASK
    .union(BlitFlags::BLEND_MASK)
    .union(BlitFlags::COLORKEY)
    .union(BlitFlags::NEAREST);

fn entries() -> &'static [GeneratedEntry] {
    TABLE.as_flattened().as_flattened()
}

/// First entry serving `flags` for the pair, as an index usable with [`run`].
pub(crate) fn find(src: FormatId, dst: FormatId, flags: BlitFlags, caps: CpuCaps) -> Option<u16> {
    let wanted = flags & RELEVANT;
    entries()
        .iter()
        .position(|e| {
            e.src == src && e.dst == dst && e.flags.contains(wanted) && caps.contains(e.caps)
        })
        .and_then(|i| u16::try_from(i).ok())
}

pub(crate) fn run(index: u16, job: &mut BlitJob<'_>) {
    if let Some(e) = entries().get(usize::from(index)) {
        (e.func)(job);
    }
}

/// Flags of entry `index`, for diagnostics.
pub(crate) fn entry_flags(index: u16) -> BlitFlags {
    entries()
        .get(usize::from(index))
        .map_or(BlitFlags::empty(), |e| e.flags)
}

#[cfg(test)]
#[path = "../../tests/unit/blit/generated.rs"]
mod tests;
