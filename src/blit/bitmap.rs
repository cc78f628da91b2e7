use crate::blit::BlitJob;
use crate::blit::indexed::{PaletteOp, blit_palette_rows};
use crate::pixels::format::read_packed;

/// 1-bit source expanded through the palette ops of the indexed family.
pub(crate) fn blit_bitmap(job: &mut BlitJob<'_>, op: PaletteOp) {
    let x0 = job.src_x;
    let msb = job.src_fmt.msb_first();
    blit_palette_rows(job, op, |row, i| read_packed(row, x0 + i, 1, msb) as usize);
}

#[cfg(test)]
#[path = "../../tests/unit/blit/bitmap.rs"]
mod tests;
