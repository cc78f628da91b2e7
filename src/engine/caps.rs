use crate::foundation::error::{SoftblitError, SoftblitResult};

bitflags::bitflags! {
    /// Host vector capabilities the kernels may use.
    ///
    /// Capability-gated kernels produce the same bytes as their scalar counterparts; the set
    /// only selects how many pixels a kernel handles per step.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
    pub struct CpuCaps: u32 {
        /// 128-bit vectors (SSE2 on x86, NEON on aarch64).
        const SIMD128 = 1 << 0;
        /// 256-bit vectors (AVX2).
        const SIMD256 = 1 << 1;
    }
}

impl CpuCaps {
    /// Query the running host once.
    #[allow(unused_mut)]
    pub fn detect() -> Self {
        let mut caps = CpuCaps::empty();
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            if std::arch::is_x86_feature_detected!("sse2") {
                caps |= CpuCaps::SIMD128;
            }
            if std::arch::is_x86_feature_detected!("avx2") {
                caps |= CpuCaps::SIMD256;
            }
        }
        #[cfg(target_arch = "aarch64")]
        {
            if std::arch::is_aarch64_feature_detected!("neon") {
                caps |= CpuCaps::SIMD128;
            }
        }
        tracing::debug!(?caps, "detected cpu capabilities");
        caps
    }

    /// Parse a comma separated capability list such as `simd128,simd256`.
    ///
    /// `none` (or an empty string) selects the scalar kernels only. Vendor names `sse2`, `neon`
    /// and `avx2` are accepted as aliases.
    pub fn parse_list(s: &str) -> SoftblitResult<Self> {
        let mut caps = CpuCaps::empty();
        for item in s.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            match item.to_ascii_lowercase().as_str() {
                "none" => {}
                "simd128" | "sse2" | "neon" => caps |= CpuCaps::SIMD128,
                "simd256" | "avx2" => caps |= CpuCaps::SIMD256,
                other => {
                    return Err(SoftblitError::invalid_argument(format!(
                        "unknown cpu capability '{other}'"
                    )));
                }
            }
        }
        Ok(caps)
    }

    /// Widest store, in bytes, the fill loops may issue per step.
    pub(crate) fn store_width(self) -> usize {
        if self.contains(CpuCaps::SIMD256) {
            32
        } else if self.contains(CpuCaps::SIMD128) {
            16
        } else {
            8
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/caps.rs"]
mod tests;
