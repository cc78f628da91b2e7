use anyhow::Context as _;

use crate::engine::caps::CpuCaps;
use crate::foundation::error::SoftblitResult;

/// Environment variable overriding the detected capability set.
pub const CPU_CAPS_ENV: &str = "SOFTBLIT_CPU_CAPS";

/// Engine construction options.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Capability override in [`CpuCaps::parse_list`] syntax. `None` detects the host.
    pub cpu_caps: Option<String>,
    /// Request run-length acceleration on surfaces loaded by the codec.
    pub rle_on_load: bool,
}

impl EngineConfig {
    /// Parse a JSON document such as `{"cpu_caps": "simd128", "rle_on_load": true}`.
    pub fn from_json_str(s: &str) -> SoftblitResult<Self> {
        let cfg: Self = serde_json::from_str(s).context("parse engine config JSON")?;
        Ok(cfg)
    }

    /// Configuration taken from the process environment.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay values found through `lookup` (keyed by environment variable name) onto `self`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(caps) = lookup(CPU_CAPS_ENV) {
            self.cpu_caps = Some(caps);
        }
        self
    }

    /// Capability set this configuration selects.
    pub fn resolve_caps(&self) -> SoftblitResult<CpuCaps> {
        match &self.cpu_caps {
            Some(list) => CpuCaps::parse_list(list),
            None => Ok(CpuCaps::detect()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/config.rs"]
mod tests;
