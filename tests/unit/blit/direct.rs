use super::*;
use crate::blit::LookupTable;
use crate::pixels::format::FormatId;

fn fmt(id: FormatId) -> PixelFormat {
    PixelFormat::from_id(id).unwrap()
}

fn sample_pixels(bpp: usize, n: usize) -> Vec<u8> {
    (0..n * bpp).map(|i| (i * 37 + 11) as u8).collect()
}

fn run_kernel(kernel: DirectKernel, sf: &PixelFormat, df: &PixelFormat, src: &[u8], w: usize) -> Vec<u8> {
    let mut dst = vec![0u8; w * usize::from(df.bytes_per_pixel())];
    let mut job = BlitJob::tight(src, sf, &mut dst, df, w, 1);
    run(kernel, &mut job);
    dst
}

#[test]
fn normal_table_order() {
    let none = CpuCaps::empty();
    let e = BlitFlags::empty();
    let pick = |s, d, caps| select(&fmt(s), &fmt(d), false, e, caps);
    assert_eq!(
        pick(FormatId::Rgb888, FormatId::Rgb565, none),
        Some(DirectKernel::Rgb888ToRgb565)
    );
    assert_eq!(
        pick(FormatId::Argb8888, FormatId::Rgb565, none),
        Some(DirectKernel::Rgb888ToRgb565)
    );
    assert_eq!(
        pick(FormatId::Rgb888, FormatId::Rgb555, none),
        Some(DirectKernel::Rgb888ToRgb555)
    );
    assert_eq!(
        pick(FormatId::Rgb888, FormatId::Argb8888, none),
        Some(DirectKernel::Blit4to4MaskAlpha)
    );
    assert_eq!(
        pick(FormatId::Argb8888, FormatId::Abgr8888, none),
        Some(DirectKernel::Swizzle32)
    );
    assert_eq!(
        pick(FormatId::Argb8888, FormatId::Abgr8888, CpuCaps::SIMD128),
        Some(DirectKernel::Swizzle32Wide)
    );
    assert_eq!(
        pick(FormatId::Argb4444, FormatId::Rgba5551, none),
        Some(DirectKernel::CopyAlpha)
    );
    assert_eq!(
        pick(FormatId::Rgb565, FormatId::Bgr24, none),
        Some(DirectKernel::NtoN)
    );
    assert_eq!(pick(FormatId::Bgr24, FormatId::Index8, none), Some(DirectKernel::Nto1));
}

#[test]
fn colorkey_variants() {
    let k = BlitFlags::COLORKEY;
    let none = CpuCaps::empty();
    let rgb565 = fmt(FormatId::Rgb565);
    assert_eq!(select(&rgb565, &rgb565, true, k, none), Some(DirectKernel::Key2to2));
    assert_eq!(
        select(&fmt(FormatId::Argb8888), &fmt(FormatId::Rgba8888), false, k, none),
        Some(DirectKernel::NtoNKeyCopyAlpha)
    );
    assert_eq!(
        select(&fmt(FormatId::Bgr24), &fmt(FormatId::Rgb565), false, k, none),
        Some(DirectKernel::NtoNKey)
    );
    assert_eq!(
        select(&rgb565, &fmt(FormatId::Rgb332), false, k, none),
        Some(DirectKernel::Nto1Key)
    );
    assert_eq!(
        select(&rgb565, &rgb565, false, BlitFlags::MODULATE_COLOR, none),
        None
    );
}

#[test]
fn specialized_kernels_match_generic_conversion() {
    let cases = [
        (DirectKernel::Rgb888ToRgb565, FormatId::Rgb888, FormatId::Rgb565),
        (DirectKernel::Rgb888ToRgb555, FormatId::Argb8888, FormatId::Rgb555),
        (DirectKernel::Blit4to4MaskAlpha, FormatId::Rgb888, FormatId::Argb8888),
        (DirectKernel::Swizzle32, FormatId::Argb8888, FormatId::Bgra8888),
        (DirectKernel::Swizzle32, FormatId::Bgr888, FormatId::Rgba8888),
        (DirectKernel::Swizzle32Wide, FormatId::Argb8888, FormatId::Abgr8888),
        (DirectKernel::Swizzle32Wide, FormatId::Rgba8888, FormatId::Rgb888),
    ];
    for (kernel, s, d) in cases {
        let (sf, df) = (fmt(s), fmt(d));
        let generic = if sf.has_alpha() && df.has_alpha() {
            DirectKernel::CopyAlpha
        } else {
            DirectKernel::NtoN
        };
        // 7 pixels: one full quad plus a tail for the wide kernel
        let src = sample_pixels(usize::from(sf.bytes_per_pixel()), 7);
        assert_eq!(
            run_kernel(kernel, &sf, &df, &src, 7),
            run_kernel(generic, &sf, &df, &src, 7),
            "{kernel:?} {s:?} -> {d:?}"
        );
    }
}

#[test]
fn key_compares_without_alpha_bits() {
    let sf = fmt(FormatId::Argb8888);
    let df = fmt(FormatId::Rgb888);
    let px = [0x80FF_0000u32, 0x0000_FF00];
    let src: Vec<u8> = px.iter().flat_map(|p| p.to_le_bytes()).collect();
    let mut dst = vec![0x11u8; 8];
    let mut job = BlitJob::tight(&src, &sf, &mut dst, &df, 2, 1);
    job.params.colorkey = 0x00FF_0000;
    run(DirectKernel::NtoNKey, &mut job);
    assert_eq!(&dst[..4], &[0x11; 4]);
    assert_eq!(u32::from_le_bytes([dst[4], dst[5], dst[6], dst[7]]), 0x0000_FF00);
}

#[test]
fn three_byte_key_is_little_endian() {
    let f = fmt(FormatId::Bgr24);
    let src = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
    let mut dst = [0u8; 6];
    let mut job = BlitJob::tight(&src, &f, &mut dst, &f, 2, 1);
    job.params.colorkey = 0x0003_0201;
    run(DirectKernel::NtoNKey, &mut job);
    assert_eq!(dst, [0, 0, 0, 0x04, 0x05, 0x06]);
}

#[test]
fn nto1_quantizes_through_table() {
    let sf = fmt(FormatId::Rgb888);
    let df = fmt(FormatId::Index8);
    let src = 0x00FF_FFFFu32.to_le_bytes();
    let mut table = vec![0u8; 256];
    table[0xFF] = 42;
    let table = LookupTable::Indices(table);
    let mut dst = [0u8; 1];
    let mut job = BlitJob::tight(&src, &sf, &mut dst, &df, 1, 1);
    job.table = Some(&table);
    run(DirectKernel::Nto1, &mut job);
    assert_eq!(dst, [42]);
    assert_eq!(index_332([0xFF, 0, 0, 0xFF]), 0xE0);
}
