use super::*;
use crate::engine::caps::CpuCaps;
use crate::engine::context::Engine;
use crate::foundation::core::{Color, Rect};

fn engine() -> Engine {
    Engine::with_caps(CpuCaps::empty())
}

#[test]
fn converts_pixels_into_new_format() {
    let e = engine();
    let mut src = e.create_surface(2, 1, FormatId::Rgb565).unwrap();
    src.put_pixel(0, 0, 0xF800).unwrap();
    src.put_pixel(1, 0, 0x001F).unwrap();
    let out = src.convert_to(FormatId::Argb8888).unwrap();
    assert_eq!(out.format().id(), FormatId::Argb8888);
    assert_eq!(out.get_pixel(0, 0).unwrap(), 0xFFFF_0000);
    assert_eq!(out.get_pixel(1, 0).unwrap(), 0xFF00_00FF);
    assert_eq!(out.blend_mode(), BlendMode::None);
}

#[test]
fn compositing_state_carries_over() {
    let e = engine();
    let mut src = e.create_surface(2, 2, FormatId::Rgb888).unwrap();
    src.set_color_mod(1, 2, 3);
    src.set_alpha_mod(0x80);
    src.set_blend_mode(BlendMode::Add);
    src.set_clip_rect(Some(Rect::new(1, 0, 1, 2)));
    let before = src.flags();

    let out = src.convert_to(FormatId::Rgb565).unwrap();
    assert_eq!(out.color_mod(), (1, 2, 3));
    assert_eq!(out.alpha_mod(), 0x80);
    assert_eq!(out.blend_mode(), BlendMode::Blend);
    assert_eq!(out.clip_rect(), Rect::new(1, 0, 1, 2));

    assert_eq!(src.flags(), before);
    assert_eq!(src.color_mod(), (1, 2, 3));
}

#[test]
fn compositing_is_off_during_the_copy() {
    let e = engine();
    let mut src = e.create_surface(1, 1, FormatId::Argb8888).unwrap();
    src.put_pixel(0, 0, 0x4011_2233).unwrap();
    src.set_color_mod(0, 0, 0);
    let out = src.convert_to(FormatId::Abgr8888).unwrap();
    assert_eq!(out.get_color(0, 0).unwrap(), Color::rgba(0x11, 0x22, 0x33, 0x40));
    assert_eq!(out.blend_mode(), BlendMode::Blend);
}

#[test]
fn colorkey_is_re_expressed() {
    let e = engine();
    let mut src = e.create_surface(1, 1, FormatId::Rgb565).unwrap();
    src.set_color_key(Some(0xF800));
    let out = src.convert_to(FormatId::Rgb888).unwrap();
    assert_eq!(out.color_key(), Some(0x00FF_0000));
    assert_eq!(src.color_key(), Some(0xF800));
}

#[test]
fn colorkey_becomes_alpha_on_32_bit_alpha_formats() {
    let e = engine();
    let mut src = e.create_surface(2, 1, FormatId::Rgb888).unwrap();
    src.put_pixel(0, 0, 0x00FF_00FF).unwrap();
    src.put_pixel(1, 0, 0x0012_3456).unwrap();
    src.set_color_key(Some(0x00FF_00FF));

    let out = src.convert_to(FormatId::Argb8888).unwrap();
    assert_eq!(out.get_pixel(0, 0).unwrap(), 0x00FF_00FF);
    assert_eq!(out.get_pixel(1, 0).unwrap(), 0xFF12_3456);
    assert_eq!(out.color_key(), None);
    assert_eq!(out.blend_mode(), BlendMode::Blend);
}

#[test]
fn unpopulated_destination_palette_is_rejected() {
    let e = engine();
    let mut src = e.create_surface(1, 1, FormatId::Rgb888).unwrap();
    let err = src.convert_to(FormatId::Index8).unwrap_err();
    assert!(matches!(err, SoftblitError::InvalidArgument(_)));
}

#[test]
fn direct_color_quantizes_onto_a_palette() {
    let e = engine();
    let mut src = e.create_surface(2, 1, FormatId::Rgb888).unwrap();
    src.put_pixel(1, 0, 0x00FF_0000).unwrap();
    let target = e.acquire_format(FormatId::Index8).unwrap();
    target
        .palette()
        .unwrap()
        .borrow_mut()
        .set_colors(0, &[Color::BLACK, Color::rgb(0xFF, 0, 0)])
        .unwrap();

    let out = src.convert(&target).unwrap();
    assert_eq!(out.get_pixel(0, 0).unwrap(), 0);
    assert_eq!(out.get_pixel(1, 0).unwrap(), 1);
    let pal = out.palette().unwrap();
    assert_eq!(pal.borrow().colors()[1], Color::rgb(0xFF, 0, 0));
}
