use super::*;

#[test]
fn new_palette_is_white_and_versioned() {
    let p = Palette::new(4).unwrap();
    assert_eq!(p.len(), 4);
    assert!(p.is_unpopulated());
    assert_eq!(p.version(), 1);
}

#[test]
fn size_bounds_are_enforced() {
    assert!(Palette::new(0).is_err());
    assert!(Palette::new(257).is_err());
    assert!(Palette::new(256).is_ok());
}

#[test]
fn set_colors_bumps_version_and_checks_range() {
    let mut p = Palette::new(2).unwrap();
    p.set_colors(1, &[Color::BLACK]).unwrap();
    assert_eq!(p.version(), 2);
    assert_eq!(p.colors()[1], Color::BLACK);
    assert!(p.set_colors(1, &[Color::BLACK, Color::BLACK]).is_err());
    assert_eq!(p.version(), 2);
}

#[test]
fn version_skips_zero_on_wrap() {
    let mut p = Palette::new(2).unwrap();
    p.force_version(u32::MAX);
    p.set_colors(0, &[Color::BLACK]).unwrap();
    assert_eq!(p.version(), 1);
}

#[test]
fn find_color_prefers_first_on_ties() {
    let mut p = Palette::new(4).unwrap();
    p.set_colors(
        0,
        &[
            Color::rgb(10, 0, 0),
            Color::rgb(0, 10, 0),
            Color::rgb(0, 0, 10),
            Color::rgb(200, 200, 200),
        ],
    )
    .unwrap();
    // equidistant from entries 0, 1 and 2
    assert_eq!(p.find_color(0, 0, 0), 0);
    assert_eq!(p.find_color(0, 9, 0), 1);
    assert_eq!(p.find_color(255, 255, 255), 3);
}

#[test]
fn find_color_exact_match_wins() {
    let mut p = Palette::new(3).unwrap();
    p.set_colors(0, &[Color::rgb(1, 1, 1), Color::rgb(5, 5, 5), Color::rgb(5, 5, 5)])
        .unwrap();
    assert_eq!(p.find_color(5, 5, 5), 1);
}

#[test]
fn dither_palette_spans_cube_corners() {
    let p = Palette::dither_332();
    assert_eq!(p.len(), 256);
    assert_eq!(p.colors()[0], Color::rgb(0, 0, 0));
    assert_eq!(p.colors()[255], Color::rgb(255, 255, 255));
    assert_eq!(p.colors()[0xE0], Color::rgb(255, 0, 0));
    assert_eq!(p.colors()[0x1C], Color::rgb(0, 255, 0));
    assert_eq!(p.colors()[0x03], Color::rgb(0, 0, 255));
}

#[test]
fn stamps_tell_equal_versions_apart() {
    let a = Palette::new(2).unwrap();
    let b = Palette::new(2).unwrap();
    assert_eq!(a.version(), b.version());
    assert_ne!(a.stamp(), b.stamp());

    let copy = a.clone();
    assert_eq!(copy, a);
    assert_ne!(copy.stamp(), a.stamp());
}
