use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::engine::context::Engine;
use crate::foundation::core::Color;
use crate::foundation::error::{SoftblitError, SoftblitResult};
use crate::pixels::format::{FormatId, Masks};
use crate::surface::Surface;

const FILE_HEADER_LEN: u64 = 14;
const INFO_HEADER_LEN: u32 = 40;
const CORE_HEADER_LEN: u32 = 12;

const BI_RGB: u32 = 0;
const BI_RLE8: u32 = 1;
const BI_RLE4: u32 = 2;
const BI_BITFIELDS: u32 = 3;

fn read_u16<R: Read>(r: &mut R) -> SoftblitResult<u16> {
    let mut b = [0u8; 2];
    r.read_exact(&mut b)?;
    Ok(u16::from_le_bytes(b))
}

fn read_u32<R: Read>(r: &mut R) -> SoftblitResult<u32> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b)?;
    Ok(u32::from_le_bytes(b))
}

fn read_i32<R: Read>(r: &mut R) -> SoftblitResult<i32> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b)?;
    Ok(i32::from_le_bytes(b))
}

#[derive(Debug)]
struct Header {
    off_bits: u32,
    header_len: u32,
    width: i32,
    height: i32,
    bits: u16,
    compression: u32,
    colors_used: u32,
}

fn read_header<R: Read>(r: &mut R) -> SoftblitResult<Header> {
    let mut magic = [0u8; 2];
    r.read_exact(&mut magic)?;
    if &magic != b"BM" {
        return Err(SoftblitError::unsupported_format(
            "stream is not a Windows BMP file",
        ));
    }
    let _file_size = read_u32(r)?;
    let _reserved = read_u32(r)?;
    let off_bits = read_u32(r)?;
    let header_len = read_u32(r)?;

    if header_len == CORE_HEADER_LEN {
        let width = i32::from(read_u16(r)?);
        let height = i32::from(read_u16(r)?);
        let _planes = read_u16(r)?;
        let bits = read_u16(r)?;
        return Ok(Header {
            off_bits,
            header_len,
            width,
            height,
            bits,
            compression: BI_RGB,
            colors_used: 0,
        });
    }
    if header_len < INFO_HEADER_LEN {
        return Err(SoftblitError::unsupported_format(format!(
            "BMP info header of {header_len} bytes"
        )));
    }
    let width = read_i32(r)?;
    let height = read_i32(r)?;
    let _planes = read_u16(r)?;
    let bits = read_u16(r)?;
    let compression = read_u32(r)?;
    let _size_image = read_u32(r)?;
    let _x_ppm = read_i32(r)?;
    let _y_ppm = read_i32(r)?;
    let colors_used = read_u32(r)?;
    let _colors_important = read_u32(r)?;
    Ok(Header {
        off_bits,
        header_len,
        width,
        height,
        bits,
        compression,
        colors_used,
    })
}

/// Decode a BMP stream into a new surface.
///
/// Uncompressed 1, 4, 8, 15/16, 24 and 32-bit images are read; 1 and 4-bit images are widened
/// to one byte per pixel. On failure the stream is put back where it was.
#[tracing::instrument(skip_all)]
pub fn load_bmp<R: Read + Seek>(engine: &Engine, reader: &mut R) -> SoftblitResult<Surface<'static>> {
    let start = reader.stream_position()?;
    match decode(engine, reader, start) {
        Ok(surface) => Ok(surface),
        Err(err) => {
            if let Err(seek) = reader.seek(SeekFrom::Start(start)) {
                tracing::debug!(%seek, "could not rewind BMP stream");
            }
            Err(err)
        }
    }
}

fn decode<R: Read + Seek>(engine: &Engine, r: &mut R, start: u64) -> SoftblitResult<Surface<'static>> {
    let h = read_header(r)?;
    if h.width <= 0 || h.height == 0 || h.height == i32::MIN {
        return Err(SoftblitError::invalid_argument(format!(
            "BMP dimensions {}x{}",
            h.width, h.height
        )));
    }
    let top_down = h.height < 0;
    let (width, height) = (h.width.unsigned_abs(), h.height.unsigned_abs());

    let masks = match h.compression {
        BI_RGB => match h.bits {
            15 | 16 => Masks::new(0x7C00, 0x03E0, 0x001F, 0),
            24 | 32 => Masks::new(0x00FF_0000, 0x0000_FF00, 0x0000_00FF, 0),
            _ => Masks::default(),
        },
        BI_BITFIELDS => {
            r.seek(SeekFrom::Start(
                start + FILE_HEADER_LEN + u64::from(INFO_HEADER_LEN),
            ))?;
            let (red, green, blue) = (read_u32(r)?, read_u32(r)?, read_u32(r)?);
            let room = u64::from(h.off_bits) >= FILE_HEADER_LEN + u64::from(INFO_HEADER_LEN) + 16;
            let alpha = if room { read_u32(r)? } else { 0 };
            Masks::new(red, green, blue, alpha)
        }
        BI_RLE8 | BI_RLE4 => {
            return Err(SoftblitError::unsupported_format(
                "compressed BMP files are not supported",
            ));
        }
        other => {
            return Err(SoftblitError::unsupported_format(format!(
                "BMP compression {other}"
            )));
        }
    };

    let file_bits = h.bits;
    let surface_bits = match file_bits {
        1 | 4 | 8 => 8,
        15 | 16 | 24 | 32 => file_bits as u8,
        other => {
            return Err(SoftblitError::unsupported_format(format!(
                "BMP depth of {other} bits"
            )));
        }
    };
    let masks = if file_bits < 8 { Masks::default() } else { masks };
    let mut surface = engine.create_surface_from_masks(width, height, surface_bits, masks)?;

    if let Some(palette) = surface.palette() {
        let max = 1u32 << file_bits.min(8);
        let ncolors = if h.colors_used == 0 { max } else { h.colors_used };
        if ncolors > max {
            return Err(SoftblitError::invalid_argument(format!(
                "BMP palette of {ncolors} colors for a {file_bits}-bit image"
            )));
        }
        r.seek(SeekFrom::Start(
            start + FILE_HEADER_LEN + u64::from(h.header_len),
        ))?;
        let core = h.header_len == CORE_HEADER_LEN;
        let mut colors = Vec::with_capacity(ncolors as usize);
        for _ in 0..ncolors {
            let mut bgr = [0u8; 4];
            let n = if core { 3 } else { 4 };
            r.read_exact(&mut bgr[..n])?;
            colors.push(Color::rgba(bgr[2], bgr[1], bgr[0], bgr[3]));
        }
        let mut pal = palette.borrow_mut();
        if colors.len() < pal.len() {
            pal.resize(colors.len())?;
        }
        pal.set_colors(0, &colors)?;
    }

    r.seek(SeekFrom::Start(start + u64::from(h.off_bits)))?;
    let file_row = (width as usize * usize::from(file_bits)).div_ceil(8);
    let padded = (file_row + 3) & !3;
    let mut line = vec![0u8; padded];
    let pitch = surface.pitch();
    let row_len = surface.format().row_bytes(width as usize);
    let pixels = surface.pixels_for_write();
    for i in 0..height as usize {
        r.read_exact(&mut line)?;
        let y = if top_down { i } else { height as usize - 1 - i };
        let dst = &mut pixels[y * pitch..y * pitch + row_len];
        match file_bits {
            1 | 4 => {
                let per_byte = 8 / usize::from(file_bits);
                let mask = (1u8 << file_bits) - 1;
                for (x, px) in dst.iter_mut().enumerate() {
                    let byte = line[x / per_byte];
                    let shift = 8 - usize::from(file_bits) * (x % per_byte + 1);
                    *px = (byte >> shift) & mask;
                }
            }
            _ => dst.copy_from_slice(&line[..row_len]),
        }
    }

    if engine.rle_on_load() {
        surface.set_rle(true);
    }
    tracing::debug!(
        width,
        height,
        file_bits,
        format = ?surface.format().id(),
        "BMP decoded"
    );
    Ok(surface)
}

/// Decode a BMP file into a new surface.
pub fn load_bmp_file(engine: &Engine, path: impl AsRef<Path>) -> SoftblitResult<Surface<'static>> {
    let mut reader = BufReader::new(File::open(path)?);
    load_bmp(engine, &mut reader)
}

/// Encode `surface` as BMP.
///
/// 8-bit indexed and `Bgr24` surfaces are written as they are, surfaces with alpha as 32-bit
/// `Argb8888` bitfields, everything else as `Bgr24`. Indexed surfaces of other depths are
/// rejected. On failure the stream is put back where it was.
#[tracing::instrument(skip_all, fields(format = ?surface.format().id()))]
pub fn save_bmp<W: Write + Seek>(surface: &mut Surface<'_>, writer: &mut W) -> SoftblitResult<()> {
    let id = surface.format().id();
    let converted;
    let target: &Surface<'_> = match id {
        FormatId::Index8 | FormatId::Bgr24 => surface,
        _ if surface.format().is_indexed() => {
            return Err(SoftblitError::unsupported_format(format!(
                "cannot save {id:?} surface as BMP"
            )));
        }
        _ if surface.format().has_alpha() => {
            converted = surface.convert_to(FormatId::Argb8888)?;
            &converted
        }
        _ => {
            converted = surface.convert_to(FormatId::Bgr24)?;
            &converted
        }
    };
    let start = writer.stream_position()?;
    match write_surface(target, writer, start) {
        Ok(()) => Ok(()),
        Err(err) => {
            if let Err(seek) = writer.seek(SeekFrom::Start(start)) {
                tracing::debug!(%seek, "could not rewind BMP stream");
            }
            Err(err)
        }
    }
}

fn write_surface<W: Write + Seek>(s: &Surface<'_>, w: &mut W, start: u64) -> SoftblitResult<()> {
    let fmt = s.format();
    let bits = u16::from(fmt.bits_per_pixel());
    let bitfields = fmt.has_alpha();
    let colors = s
        .palette()
        .map(|p| p.borrow().colors().to_vec())
        .unwrap_or_default();
    let row_len = fmt.row_bytes(s.width() as usize);
    let padded = (row_len + 3) & !3;
    let image_len = padded * s.height() as usize;
    let off_bits = FILE_HEADER_LEN as usize
        + INFO_HEADER_LEN as usize
        + if bitfields { 16 } else { 0 }
        + colors.len() * 4;
    let overflow = || SoftblitError::invalid_argument("image too large for BMP");
    let off_bits = u32::try_from(off_bits).map_err(|_| overflow())?;
    let image_len = u32::try_from(image_len).map_err(|_| overflow())?;
    let file_len = off_bits.checked_add(image_len).ok_or_else(overflow)?;
    let width = i32::try_from(s.width()).map_err(|_| overflow())?;
    let height = i32::try_from(s.height()).map_err(|_| overflow())?;

    w.write_all(b"BM")?;
    w.write_all(&file_len.to_le_bytes())?;
    w.write_all(&0u32.to_le_bytes())?;
    w.write_all(&off_bits.to_le_bytes())?;

    w.write_all(&INFO_HEADER_LEN.to_le_bytes())?;
    w.write_all(&width.to_le_bytes())?;
    w.write_all(&height.to_le_bytes())?;
    w.write_all(&1u16.to_le_bytes())?;
    w.write_all(&bits.to_le_bytes())?;
    let compression = if bitfields { BI_BITFIELDS } else { BI_RGB };
    w.write_all(&compression.to_le_bytes())?;
    w.write_all(&image_len.to_le_bytes())?;
    w.write_all(&0i32.to_le_bytes())?;
    w.write_all(&0i32.to_le_bytes())?;
    w.write_all(&(colors.len() as u32).to_le_bytes())?;
    w.write_all(&0u32.to_le_bytes())?;

    if bitfields {
        let m = fmt.masks();
        for mask in [m.r, m.g, m.b, m.a] {
            w.write_all(&mask.to_le_bytes())?;
        }
    }
    for c in &colors {
        w.write_all(&[c.b, c.g, c.r, c.a])?;
    }

    let pad = [0u8; 3];
    let pitch = s.pitch();
    let pixels = s.pixels();
    for y in (0..s.height() as usize).rev() {
        w.write_all(&pixels[y * pitch..y * pitch + row_len])?;
        w.write_all(&pad[..padded - row_len])?;
    }
    w.flush()?;
    tracing::debug!(
        bytes = u64::from(file_len),
        start,
        format = ?fmt.id(),
        "BMP encoded"
    );
    Ok(())
}

/// Encode `surface` into a BMP file.
pub fn save_bmp_file(surface: &mut Surface<'_>, path: impl AsRef<Path>) -> SoftblitResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    save_bmp(surface, &mut writer)
}

#[cfg(test)]
#[path = "../../tests/unit/codec/bmp.rs"]
mod tests;
