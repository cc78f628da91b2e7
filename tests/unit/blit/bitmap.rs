use super::*;
use crate::blit::LookupTable;
use crate::pixels::format::{FormatId, PixelFormat};

#[test]
fn expands_msb_first_through_table() {
    let src_fmt = PixelFormat::from_id(FormatId::Index1Msb).unwrap();
    let dst_fmt = PixelFormat::from_id(FormatId::Rgb888).unwrap();
    let table = LookupTable::Pixels(vec![0x00FF_FFFF, 0x0000_0000]);
    let src = [0b0110_0000u8];
    let mut dst = [0u8; 16];
    let mut job = BlitJob::tight(&src, &src_fmt, &mut dst, &dst_fmt, 4, 1);
    job.table = Some(&table);
    blit_bitmap(&mut job, PaletteOp::Plain);
    let px: Vec<u32> = dst
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    assert_eq!(px, vec![0x00FF_FFFF, 0, 0, 0x00FF_FFFF]);
}

#[test]
fn lsb_first_and_offset_columns() {
    let src_fmt = PixelFormat::from_id(FormatId::Index1Lsb).unwrap();
    let dst_fmt = PixelFormat::from_id(FormatId::Index8).unwrap();
    let src = [0b0000_0100u8];
    let mut dst = [7u8; 2];
    let mut job = BlitJob::tight(&src, &src_fmt, &mut dst, &dst_fmt, 2, 1);
    job.src_x = 1;
    blit_bitmap(&mut job, PaletteOp::Plain);
    assert_eq!(dst, [0, 1]);
}

#[test]
fn three_byte_destination_and_key() {
    let src_fmt = PixelFormat::from_id(FormatId::Index1Msb).unwrap();
    let dst_fmt = PixelFormat::from_id(FormatId::Bgr24).unwrap();
    let table = LookupTable::Pixels(vec![0x0011_2233, 0x00AA_BBCC]);
    let src = [0b1000_0000u8];
    let mut dst = [0u8; 6];
    let mut job = BlitJob::tight(&src, &src_fmt, &mut dst, &dst_fmt, 2, 1);
    job.table = Some(&table);
    job.params.colorkey = 0;
    blit_bitmap(&mut job, PaletteOp::Key);
    assert_eq!(dst, [0xCC, 0xBB, 0xAA, 0, 0, 0]);
}

#[test]
fn alpha_blends_palette_color() {
    let src_fmt = PixelFormat::from_id(FormatId::Index1Msb).unwrap();
    let dst_fmt = PixelFormat::from_id(FormatId::Rgb565).unwrap();
    let src = [0b1000_0000u8];
    // palette index 1 is black; destination white
    let mut dst = 0xFFFFu16.to_le_bytes();
    let mut job = BlitJob::tight(&src, &src_fmt, &mut dst, &dst_fmt, 1, 1);
    job.params.a = 255;
    blit_bitmap(&mut job, PaletteOp::Alpha);
    assert_eq!(u16::from_le_bytes(dst), 0);
}
