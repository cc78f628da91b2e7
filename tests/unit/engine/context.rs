use super::*;
use crate::SoftblitError;
use crate::foundation::core::Color;

#[test]
fn config_selects_caps_and_load_preference() {
    let cfg = EngineConfig {
        cpu_caps: Some("none".to_string()),
        rle_on_load: true,
    };
    let engine = Engine::from_config(&cfg).unwrap();
    assert_eq!(engine.caps(), CpuCaps::empty());
    assert!(engine.rle_on_load());

    let bad = EngineConfig {
        cpu_caps: Some("mmx".to_string()),
        rle_on_load: false,
    };
    assert!(matches!(
        Engine::from_config(&bad),
        Err(SoftblitError::InvalidArgument(_))
    ));
}

#[test]
fn surfaces_share_registry_formats() {
    let engine = Engine::with_caps(CpuCaps::SIMD128);
    let a = engine.create_surface(1, 1, FormatId::Rgb565).unwrap();
    let b = engine.create_surface(2, 2, FormatId::Rgb565).unwrap();
    assert!(Rc::ptr_eq(&a.format_ref(), &b.format_ref()));
    assert_eq!(engine.formats().live_count(), 1);
    assert_eq!(a.caps(), CpuCaps::SIMD128);
    drop(a);
    drop(b);
    assert_eq!(engine.formats().live_count(), 0);
}

#[test]
fn indexed_surfaces_get_their_own_palette() {
    let engine = Engine::with_caps(CpuCaps::empty());
    let a = engine.create_surface(1, 1, FormatId::Index8).unwrap();
    let b = engine.create_surface(1, 1, FormatId::Index8).unwrap();
    a.palette()
        .unwrap()
        .borrow_mut()
        .set_colors(0, &[Color::BLACK])
        .unwrap();
    assert_eq!(b.palette().unwrap().borrow().colors()[0], Color::WHITE);
}

#[test]
fn masks_pick_packed_or_ramp_formats() {
    let engine = Engine::with_caps(CpuCaps::empty());
    let s = engine
        .create_surface_from_masks(1, 1, 16, Masks::new(0xF800, 0x07E0, 0x001F, 0))
        .unwrap();
    assert_eq!(s.format().id(), FormatId::Rgb565);
    let s = engine
        .create_surface_from_masks(1, 1, 32, Masks::default())
        .unwrap();
    assert_eq!(s.format().id(), FormatId::Rgb888);
    let s = engine
        .create_surface_from_masks(1, 1, 8, Masks::new(0xC0, 0x30, 0x0C, 0))
        .unwrap();
    assert!(s.format().is_indexed());
    assert!(s.palette().is_some());
    assert!(
        engine
            .create_surface_from_masks(1, 1, 16, Masks::new(0xF0F0, 0, 0, 0))
            .is_err()
    );
}

#[test]
fn borrowed_surfaces_use_the_engine_registry() {
    let engine = Engine::with_caps(CpuCaps::empty());
    let mut buf = [0u8; 16];
    let s = engine
        .create_surface_from(&mut buf, 2, 2, 8, FormatId::Argb8888)
        .unwrap();
    assert_eq!(s.pitch(), 8);
    assert_eq!(engine.formats().live_count(), 1);
}
