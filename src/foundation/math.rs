/// `x * y / 255` with truncating division, the modulation primitive for every blend path.
#[inline]
pub(crate) fn mul_div255(x: u32, y: u32) -> u32 {
    (x * y) / 255
}

/// Widen an `bits`-wide channel value to 8 bits by bit replication.
#[inline]
pub(crate) fn expand_to_u8(v: u32, bits: u8) -> u8 {
    match bits {
        0 => 0,
        8 => v as u8,
        _ => {
            let mut out = v << (8 - u32::from(bits));
            let mut filled = u32::from(bits);
            while filled < 8 {
                out |= out >> filled;
                filled *= 2;
            }
            out as u8
        }
    }
}

/// 16.16 fixed-point nearest-neighbor walk: yields, for each of `dst_len` destination
/// positions, the source index it samples.
///
/// The first destination position always samples source index 0.
#[derive(Clone, Debug)]
pub(crate) struct NearestSteps {
    pos: u32,
    inc: u32,
    src: i64,
    remaining: usize,
}

impl NearestSteps {
    pub(crate) const ONE: u32 = 0x1_0000;

    pub(crate) fn new(src_len: usize, dst_len: usize) -> Self {
        let inc = if dst_len == 0 {
            0
        } else {
            ((src_len as u64) << 16) / dst_len as u64
        };
        Self {
            pos: Self::ONE,
            inc: inc as u32,
            src: -1,
            remaining: dst_len,
        }
    }
}

impl Iterator for NearestSteps {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        while self.pos >= Self::ONE {
            self.src += 1;
            self.pos -= Self::ONE;
        }
        self.pos += self.inc;
        Some(self.src.max(0) as usize)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for NearestSteps {}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
