use super::*;
use crate::blit::{LookupTable, generated, slow};
use crate::engine::caps::CpuCaps;
use crate::foundation::core::Color;
use crate::pixels::format::FormatId;

fn fmt(id: FormatId) -> PixelFormat {
    PixelFormat::from_id(id).unwrap()
}

fn to_bytes(px: &[u32]) -> Vec<u8> {
    px.iter().flat_map(|p| p.to_le_bytes()).collect()
}

#[test]
fn selection() {
    let argb = fmt(FormatId::Argb8888);
    let rgb = fmt(FormatId::Rgb888);
    let rgb565 = fmt(FormatId::Rgb565);
    let idx8 = fmt(FormatId::Index8);
    let b = BlitFlags::BLEND;
    let sa = BlitFlags::MODULATE_ALPHA | BlitFlags::BLEND;

    assert_eq!(select(&argb, &rgb, b), Some(AlphaKernel::Rgb32PixelAlpha));
    assert_eq!(select(&argb, &rgb565, b), Some(AlphaKernel::PixelAlpha));
    assert_eq!(select(&argb, &idx8, b), Some(AlphaKernel::PixelAlphaTo1));
    assert_eq!(select(&rgb, &argb, sa), Some(AlphaKernel::Rgb32SurfaceAlpha));
    assert_eq!(select(&rgb565, &rgb, sa), Some(AlphaKernel::SurfaceAlpha));
    assert_eq!(
        select(&rgb565, &idx8, sa | BlitFlags::COLORKEY),
        Some(AlphaKernel::SurfaceAlphaKeyTo1)
    );
    // per-surface alpha on an alpha source is left to the generic kernels
    assert_eq!(select(&argb, &rgb, sa), None);
    assert_eq!(select(&argb, &rgb, BlitFlags::ADD), None);
    assert_eq!(select(&argb, &rgb, b | BlitFlags::MODULATE_COLOR), None);
}

#[test]
fn pixel_alpha_blends_premultiplied() {
    let sf = fmt(FormatId::Argb8888);
    let df = fmt(FormatId::Argb8888);
    let src = to_bytes(&[0x00FF_FFFF, 0xFFFF_0000, 0x8000_00FF]);
    let mut dst = to_bytes(&[0x1020_3040, 0x1020_3040, 0x10FF_0000]);
    let mut job = BlitJob::tight(&src, &sf, &mut dst, &df, 3, 1);
    run(AlphaKernel::Rgb32PixelAlpha, &mut job);
    let out: Vec<u32> = dst
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    assert_eq!(out[0], 0x1020_3040);
    assert_eq!(out[1], 0xFFFF_0000);
    // r: 127 * 255 / 255 = 127; b: 255 * 128 / 255 = 128; a: 128 + 127 * 16 / 255 = 135
    assert_eq!(out[2], 0x877F_0080);
}

#[test]
fn rgb32_specializations_match_generic_kernels() {
    let pairs = [
        (FormatId::Argb8888, FormatId::Rgb888, BlitFlags::BLEND),
        (FormatId::Argb8888, FormatId::Argb8888, BlitFlags::BLEND),
        (FormatId::Rgb888, FormatId::Argb8888, BlitFlags::BLEND),
        (
            FormatId::Rgb888,
            FormatId::Argb8888,
            BlitFlags::MODULATE_ALPHA | BlitFlags::BLEND,
        ),
    ];
    for (s, d, flags) in pairs {
        let (sf, df) = (fmt(s), fmt(d));
        let special = select(&sf, &df, flags).unwrap();
        let generic = if flags.contains(BlitFlags::MODULATE_ALPHA) {
            AlphaKernel::SurfaceAlpha
        } else {
            AlphaKernel::PixelAlpha
        };
        let src: Vec<u8> = (0..32u32).map(|i| (i * 53 + 7) as u8).collect();
        let base: Vec<u8> = (0..32u32).map(|i| (i * 29 + 3) as u8).collect();
        let mut a = base.clone();
        let mut b = base.clone();
        let mut job = BlitJob::tight(&src, &sf, &mut a, &df, 8, 1);
        job.params.a = 77;
        run(special, &mut job);
        let mut job = BlitJob::tight(&src, &sf, &mut b, &df, 8, 1);
        job.params.a = 77;
        run(generic, &mut job);
        assert_eq!(a, b, "{s:?} -> {d:?} {flags:?}");
    }
}

#[test]
fn surface_alpha_key_onto_palette() {
    let sf = fmt(FormatId::Rgb565);
    let df = fmt(FormatId::Index8);
    df.palette()
        .unwrap()
        .borrow_mut()
        .set_colors(0, &[Color::BLACK])
        .unwrap();
    let src: Vec<u8> = [0xF800u16, 0x001F].iter().flat_map(|p| p.to_le_bytes()).collect();
    let mut dst = [0u8, 0u8];
    let mut table = vec![0u8; 256];
    table[0xE0] = 5;
    let table = LookupTable::Indices(table);
    let mut job = BlitJob::tight(&src, &sf, &mut dst, &df, 2, 1);
    job.table = Some(&table);
    job.params.a = 255;
    job.params.colorkey = 0x001F;
    run(AlphaKernel::SurfaceAlphaKeyTo1, &mut job);
    // red over black at full alpha quantizes to 0xE0; the blue pixel is keyed out
    assert_eq!(dst, [5, 0]);
}

#[test]
fn blend_policy_is_shared_across_kernel_families() {
    let src: Vec<u8> = (0..64u32).map(|i| (i * 53 + 7) as u8).collect();
    let base: Vec<u8> = (0..64u32).map(|i| (i * 29 + 3) as u8).collect();
    for d in [FormatId::Argb8888, FormatId::Rgb888, FormatId::Abgr8888] {
        let (sf, df) = (fmt(FormatId::Argb8888), fmt(d));
        let blend = |kernel: &dyn Fn(&mut BlitJob<'_>)| {
            let mut out = base.clone();
            let mut job = BlitJob::tight(&src, &sf, &mut out, &df, 16, 1);
            job.params.flags = BlitFlags::BLEND;
            kernel(&mut job);
            out
        };
        let generic = blend(&|job: &mut BlitJob<'_>| run(AlphaKernel::PixelAlpha, job));
        let gen_index = generated::find(FormatId::Argb8888, d, BlitFlags::BLEND, CpuCaps::empty())
            .unwrap();
        assert_eq!(blend(&|job: &mut BlitJob<'_>| generated::run(gen_index, job)), generic, "{d:?}");
        assert_eq!(blend(&slow::blit_slow), generic, "{d:?}");
        if let Some(special) = select(&sf, &df, BlitFlags::BLEND) {
            assert_eq!(blend(&|job: &mut BlitJob<'_>| run(special, job)), generic, "{d:?}");
        }
    }
}

#[test]
fn translucent_over_translucent() {
    let f = fmt(FormatId::Argb8888);
    let src = 0x80C8_C8C8u32.to_le_bytes();
    let mut dst = 0x6464_6464u32.to_le_bytes();
    let mut job = BlitJob::tight(&src, &f, &mut dst, &f, 1, 1);
    run(AlphaKernel::Rgb32PixelAlpha, &mut job);
    // 200 * 128 / 255 + 127 * 100 / 255 = 100 + 49; alpha 128 + 49
    assert_eq!(f.get_rgba(u32::from_le_bytes(dst)), Color::rgba(149, 149, 149, 177));
}
