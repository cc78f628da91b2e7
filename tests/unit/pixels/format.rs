use super::*;

#[test]
fn every_packed_identifier_round_trips_through_its_masks() {
    for id in FormatId::ALL {
        match id.masks() {
            Some(masks) => {
                assert_eq!(
                    FormatId::from_masks(id.bits_per_pixel(), masks),
                    id,
                    "{id:?}"
                );
            }
            None => {
                assert!(id.is_indexed(), "{id:?}");
                let back = FormatId::from_masks(id.bits_per_pixel(), Masks::default());
                assert!(back.is_indexed());
                assert_eq!(back.bits_per_pixel(), id.bits_per_pixel());
            }
        }
    }
}

#[test]
fn channel_shift_loss_and_mask_agree() {
    for id in FormatId::ALL {
        let fmt = PixelFormat::from_id(id).unwrap();
        for ch in [fmt.red(), fmt.green(), fmt.blue(), fmt.alpha()] {
            if ch.mask == 0 {
                assert_eq!(ch.loss, 8);
                continue;
            }
            assert_eq!(ch.mask.trailing_zeros(), u32::from(ch.shift), "{id:?}");
            assert_eq!(ch.mask.count_ones(), u32::from(8 - ch.loss), "{id:?}");
        }
    }
}

#[test]
fn sixteen_bit_request_with_fifteen_bit_masks() {
    let id = FormatId::from_masks(16, Masks::new(0x7C00, 0x03E0, 0x001F, 0));
    assert_eq!(id, FormatId::Rgb555);
}

#[test]
fn zero_masks_pick_depth_defaults() {
    assert_eq!(FormatId::from_masks(24, Masks::default()), FormatId::Bgr24);
    assert_eq!(FormatId::from_masks(32, Masks::default()), FormatId::Rgb888);
    assert_eq!(FormatId::from_masks(16, Masks::default()), FormatId::Rgb565);
    assert_eq!(FormatId::from_masks(7, Masks::default()), FormatId::Unknown);
}

#[test]
fn map_then_decode_argb() {
    let fmt = PixelFormat::from_id(FormatId::Argb8888).unwrap();
    let px = fmt.map_rgba(0x12, 0x34, 0x56, 0x78);
    assert_eq!(px, 0x7812_3456);
    assert_eq!(fmt.get_rgba(px), Color::rgba(0x12, 0x34, 0x56, 0x78));
    assert_eq!(fmt.map_rgb(1, 2, 3) >> 24, 0xFF);
}

#[test]
fn map_rgb_565_truncates_and_decode_replicates() {
    let fmt = PixelFormat::from_id(FormatId::Rgb565).unwrap();
    let px = fmt.map_rgb(0xFF, 0x80, 0x07);
    assert_eq!(px, 0xF800 | (0x20 << 5));
    let c = fmt.get_rgba(px);
    assert_eq!((c.r, c.g, c.b, c.a), (0xFF, 0x82, 0x00, 0xFF));
    // decoded values are a fixed point of the forward mapping
    assert_eq!(fmt.map_rgb(c.r, c.g, c.b), px);
}

#[test]
fn indexed_map_uses_palette() {
    let fmt = PixelFormat::from_id(FormatId::Index8).unwrap();
    let pal = fmt.palette().unwrap();
    pal.borrow_mut()
        .set_colors(0, &[Color::rgb(0, 0, 0), Color::rgb(250, 0, 0)])
        .unwrap();
    assert_eq!(fmt.map_rgb(240, 10, 10), 1);
    assert_eq!(fmt.get_rgba(1), Color::rgb(250, 0, 0));
    assert_eq!(fmt.get_rgba(999), Color::rgba(0, 0, 0, 0xFF));
}

#[test]
fn one_bit_default_palette_is_white_then_black() {
    let fmt = PixelFormat::from_id(FormatId::Index1Msb).unwrap();
    let pal = fmt.palette().unwrap();
    let pal = pal.borrow();
    assert_eq!(pal.colors(), &[Color::WHITE, Color::BLACK]);
}

#[test]
fn palette_size_must_match_depth() {
    let fmt = PixelFormat::from_id(FormatId::Index4Msb).unwrap();
    let wrong = Palette::new(256).unwrap().into_shared();
    assert!(fmt.set_palette(Some(wrong)).is_err());
    let right = Palette::new(16).unwrap().into_shared();
    fmt.set_palette(Some(right.clone())).unwrap();
    assert!(Rc::ptr_eq(&fmt.palette().unwrap(), &right));

    let direct = PixelFormat::from_id(FormatId::Rgb888).unwrap();
    assert!(direct.set_palette(Some(right)).is_err());
}

#[test]
fn mask_ramp_palette_for_low_depths() {
    let fmt = PixelFormat::from_masks(8, Masks::new(0xC0, 0x30, 0x0C, 0)).unwrap();
    assert_eq!(fmt.id(), FormatId::Index8);
    let pal = fmt.palette().unwrap();
    let pal = pal.borrow();
    assert_eq!(pal.colors()[0], Color::rgb(0, 0, 0));
    assert_eq!(pal.colors()[0xFC], Color::rgb(255, 255, 255));
    assert_eq!(pal.colors()[0x40], Color::rgb(0x55, 0, 0));
}

#[test]
fn rgb332_masks_stay_packed() {
    let fmt = PixelFormat::from_masks(8, Masks::new(0xE0, 0x1C, 0x03, 0)).unwrap();
    assert_eq!(fmt.id(), FormatId::Rgb332);
    assert!(!fmt.is_indexed());
    assert!(fmt.palette().is_none());
}

#[test]
fn inconsistent_masks_are_rejected() {
    // overlapping channels
    assert!(PixelFormat::from_masks(16, Masks::new(0xFF00, 0x0FF0, 0x000F, 0)).is_err());
    // non-contiguous channel
    assert!(PixelFormat::from_masks(16, Masks::new(0x0505, 0, 0, 0)).is_err());
    // bits beyond depth
    assert!(PixelFormat::from_masks(12, Masks::new(0xF000, 0x0F00, 0x00F0, 0)).is_err());
    // unsupported depth
    assert!(PixelFormat::from_masks(40, Masks::new(1, 2, 4, 0)).is_err());
    assert!(PixelFormat::from_id(FormatId::Unknown).is_err());
}

#[test]
fn pixel_access_is_little_endian() {
    let mut buf = [0u8; 4];
    write_pixel(&mut buf, 3, 0x00AB_CDEF);
    assert_eq!(buf, [0xEF, 0xCD, 0xAB, 0]);
    assert_eq!(read_pixel(&buf, 3), 0x00AB_CDEF);
    write_pixel(&mut buf, 2, 0x1234);
    assert_eq!(read_pixel(&buf, 2), 0x1234);
}

#[test]
fn packed_rows_follow_bit_order() {
    let mut row = [0u8; 2];
    write_packed(&mut row, 0, 1, true, 1);
    write_packed(&mut row, 9, 1, true, 1);
    assert_eq!(row, [0x80, 0x40]);
    assert_eq!(read_packed(&row, 0, 1, true), 1);
    assert_eq!(read_packed(&row, 1, 1, true), 0);
    assert_eq!(read_packed(&row, 9, 1, true), 1);

    let mut row = [0u8; 1];
    write_packed(&mut row, 0, 4, false, 0xA);
    write_packed(&mut row, 1, 4, false, 0x5);
    assert_eq!(row, [0x5A]);
    assert_eq!(read_packed(&row, 1, 4, true), 0xA);
    write_packed(&mut row, 0, 4, false, 0x3);
    assert_eq!(row, [0x53]);
}
