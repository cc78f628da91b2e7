use crate::blit::BlitJob;
use crate::pixels::format::{read_packed, write_packed};

/// Raw copy between identical layouts.
pub(crate) fn blit_copy(job: &mut BlitJob<'_>) {
    let bits = job.dst_fmt.bits_per_pixel();
    if bits < 8 {
        copy_packed(job, bits);
        return;
    }
    job.rows(|s, d| d.copy_from_slice(s));
}

fn copy_packed(job: &mut BlitJob<'_>, bits: u8) {
    let msb = job.dst_fmt.msb_first();
    for y in 0..job.dst_h {
        let s = &job.src[y * job.src_pitch..];
        let d = &mut job.dst[y * job.dst_pitch..];
        for i in 0..job.dst_w {
            let v = read_packed(s, job.src_x + i, bits, msb);
            write_packed(d, job.dst_x + i, bits, msb, v);
        }
    }
}

/// Move a `row_bytes` x `h` block within one buffer. Rows are visited in the order that keeps
/// not-yet-read source rows intact, and each row move tolerates overlap.
pub(crate) fn move_within(
    buf: &mut [u8],
    pitch: usize,
    src_off: usize,
    dst_off: usize,
    row_bytes: usize,
    h: usize,
) {
    let step = |y: usize, buf: &mut [u8]| {
        let s = src_off + y * pitch;
        buf.copy_within(s..s + row_bytes, dst_off + y * pitch);
    };
    if dst_off > src_off {
        (0..h).rev().for_each(|y| step(y, buf));
    } else {
        (0..h).for_each(|y| step(y, buf));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/blit/copy.rs"]
mod tests;
