use super::*;
use crate::pixels::format::{FormatId, PixelFormat};

fn p(flags: BlitFlags) -> CopyParams {
    CopyParams {
        flags,
        ..CopyParams::default()
    }
}

#[test]
fn replace_passes_source_through() {
    let out = composite([1, 2, 3, 4], [9, 9, 9, 9], BlitFlags::empty(), &p(BlitFlags::empty()));
    assert_eq!(out, [1, 2, 3, 4]);
}

#[test]
fn blend_premultiplies_and_mixes_alpha() {
    let out = composite([255, 0, 0, 128], [0, 0, 255, 255], BlitFlags::BLEND, &p(BlitFlags::BLEND));
    // 255 * 128 / 255 = 128; 127 * 255 / 255 = 127
    assert_eq!(out, [128, 0, 127, 255]);
}

#[test]
fn add_saturates_and_mod_multiplies() {
    let add = composite([200, 10, 0, 255], [100, 10, 5, 7], BlitFlags::ADD, &p(BlitFlags::ADD));
    assert_eq!(add, [255, 20, 5, 7]);
    let m = composite([128, 255, 0, 255], [255, 128, 9, 7], BlitFlags::MOD, &p(BlitFlags::MOD));
    assert_eq!(m, [128, 128, 0, 7]);
}

#[test]
fn modulation_applies_before_blending() {
    let mut params = p(BlitFlags::MODULATE_COLOR | BlitFlags::MODULATE_ALPHA);
    params.r = 128;
    params.a = 0;
    let out = composite([255, 255, 255, 255], [0, 0, 0, 0], params.flags, &params);
    assert_eq!(out, [128, 255, 255, 0]);
}

#[test]
fn scales_by_nearest_stepping() {
    let f332 = PixelFormat::from_id(FormatId::Rgb332).unwrap();
    let src = [0x03u8, 0xE0];
    let mut dst = [0u8; 8];
    let mut job = BlitJob::tight(&src, &f332, &mut dst, &f332, 4, 2);
    job.src_w = 2;
    job.src_h = 1;
    job.src_pitch = 2;
    blit_slow(&mut job);
    assert_eq!(dst, [0x03, 0x03, 0xE0, 0xE0, 0x03, 0x03, 0xE0, 0xE0]);
}

#[test]
fn colorkey_compares_raw_pixels() {
    let f = PixelFormat::from_id(FormatId::Bgr24).unwrap();
    let src = [0x10, 0x20, 0x30, 0x40, 0x50, 0x60];
    let mut dst = [0u8; 6];
    let mut job = BlitJob::tight(&src, &f, &mut dst, &f, 2, 1);
    job.params = p(BlitFlags::COLORKEY);
    job.params.colorkey = 0x0030_2010;
    blit_slow(&mut job);
    assert_eq!(dst, [0, 0, 0, 0x40, 0x50, 0x60]);
}
