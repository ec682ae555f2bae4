//! Capability tier classification.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::snapshot::ResourceSnapshot;

/// Minimum discrete VRAM for [`Tier::Elite`].
pub const ELITE_VRAM_MB: u64 = 24 * 1024;
/// Minimum discrete VRAM for [`Tier::High`].
pub const HIGH_VRAM_MB: u64 = 8 * 1024;
/// Minimum system RAM for [`Tier::Balanced`] when no GPU rule matched.
pub const BALANCED_RAM_MB: u64 = 32 * 1024;

/// The five capability buckets a host can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Discrete GPU with 24 GB of VRAM or more.
    Elite,
    /// Discrete GPU with 8–24 GB of VRAM.
    High,
    /// Apple Silicon, whatever the memory size.
    Apple,
    /// 32 GB of RAM or more, no qualifying GPU.
    Balanced,
    /// Everything else.
    Legacy,
}

impl Tier {
    /// Classify a snapshot. First matching rule wins: unified memory, then
    /// discrete VRAM thresholds, then system RAM.
    pub fn classify(snapshot: &ResourceSnapshot) -> Self {
        if snapshot.has_metal() {
            return Tier::Apple;
        }

        if snapshot.has_cuda() {
            if snapshot.vram_mb() >= ELITE_VRAM_MB {
                return Tier::Elite;
            }
            if snapshot.vram_mb() >= HIGH_VRAM_MB {
                return Tier::High;
            }
        }

        if snapshot.system_ram_mb() >= BALANCED_RAM_MB {
            Tier::Balanced
        } else {
            Tier::Legacy
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Tier::Elite => "Elite",
            Tier::High => "High",
            Tier::Apple => "Apple",
            Tier::Balanced => "Balanced",
            Tier::Legacy => "Legacy",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Tier::Elite => "Discrete GPU with 24 GB+ VRAM",
            Tier::High => "Discrete GPU with 8-24 GB VRAM",
            Tier::Apple => "Apple Silicon unified memory",
            Tier::Balanced => "High RAM, limited or no GPU",
            Tier::Legacy => "Low RAM, no GPU",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
