use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::foundation::error::SoftblitResult;
use crate::pixels::format::{FormatId, FormatRef, Masks, PixelFormat};

/// Deduplicating store of pixel formats.
///
/// Non-indexed formats with a known identifier are shared: acquiring the same identifier twice
/// yields the same handle while any holder keeps it alive. Dropping the last handle releases
/// the format; its slot is reclaimed on the next acquisition. Indexed and mask-synthesized
/// formats are always fresh.
#[derive(Debug, Default)]
pub struct FormatRegistry {
    slots: RefCell<Vec<Weak<PixelFormat>>>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared descriptor for `id`.
    pub fn acquire(&self, id: FormatId) -> SoftblitResult<FormatRef> {
        if id.is_indexed() {
            return Ok(Rc::new(PixelFormat::from_id(id)?));
        }
        let mut slots = self.slots.borrow_mut();
        slots.retain(|w| w.strong_count() > 0);
        if let Some(hit) = slots
            .iter()
            .filter_map(Weak::upgrade)
            .find(|f| f.id() == id)
        {
            return Ok(hit);
        }
        let fmt = Rc::new(PixelFormat::from_id(id)?);
        slots.push(Rc::downgrade(&fmt));
        Ok(fmt)
    }

    /// Descriptor for an explicit depth and mask set, shared when the masks name a known
    /// non-indexed layout.
    pub fn acquire_masks(&self, bits: u8, masks: Masks) -> SoftblitResult<FormatRef> {
        let id = FormatId::from_masks(bits, masks);
        if id != FormatId::Unknown && !id.is_indexed() {
            return self.acquire(id);
        }
        Ok(Rc::new(PixelFormat::from_masks(bits, masks)?))
    }

    /// Descriptor with the same layout as `fmt`: the shared one for non-indexed known layouts,
    /// a fresh copy (palette included) otherwise.
    pub fn acquire_like(&self, fmt: &PixelFormat) -> SoftblitResult<FormatRef> {
        if fmt.id() != FormatId::Unknown && !fmt.is_indexed() {
            return self.acquire(fmt.id());
        }
        Ok(Rc::new(fmt.duplicate()?))
    }

    /// Number of cached formats still referenced somewhere.
    pub fn live_count(&self) -> usize {
        self.slots
            .borrow()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pixels/registry.rs"]
mod tests;
