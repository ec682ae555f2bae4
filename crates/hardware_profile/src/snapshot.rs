//! Point-in-time reading of the host's compute resources.

use serde::{Deserialize, Serialize};

/// Megabytes per gigabyte, as used by every capacity conversion in this crate.
pub const MB_PER_GB: f64 = 1024.0;

/// Capability reading of the host, taken once per decision cycle.
///
/// Fields are private so a snapshot cannot be edited after construction; build
/// one through [`crate::collect_snapshot`] or the named constructors below.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    /// GPU-addressable memory in MB. For unified-memory hosts this is an estimate.
    pub(crate) vram_mb: u64,
    /// Total physical memory in MB.
    pub(crate) system_ram_mb: u64,
    /// A discrete CUDA-class GPU answered the management query.
    pub(crate) has_cuda: bool,
    /// The host is a unified-memory (Metal-class) architecture.
    pub(crate) has_metal: bool,
    /// CUDA compute capability, e.g. `8.6` for RTX 30-series parts.
    pub(crate) compute_capability: Option<f64>,
    /// The CPU advertises AVX-512 foundation instructions.
    pub(crate) cpu_avx512: bool,
}

impl ResourceSnapshot {
    /// A host with no usable GPU.
    pub fn cpu_only(system_ram_mb: u64) -> Self {
        Self {
            system_ram_mb,
            ..Self::default()
        }
    }

    /// A host with a discrete CUDA-class GPU.
    pub fn discrete_gpu(
        system_ram_mb: u64,
        vram_mb: u64,
        compute_capability: Option<f64>,
    ) -> Self {
        Self {
            vram_mb,
            system_ram_mb,
            has_cuda: true,
            compute_capability,
            ..Self::default()
        }
    }

    /// A unified-memory host whose GPU shares `vram_mb` of system memory.
    pub fn unified_memory(system_ram_mb: u64, vram_mb: u64) -> Self {
        Self {
            vram_mb,
            system_ram_mb,
            has_metal: true,
            ..Self::default()
        }
    }

    /// Same snapshot with the AVX-512 flag set to `cpu_avx512`.
    pub fn with_avx512(self, cpu_avx512: bool) -> Self {
        Self { cpu_avx512, ..self }
    }

    pub fn vram_mb(&self) -> u64 {
        self.vram_mb
    }

    pub fn system_ram_mb(&self) -> u64 {
        self.system_ram_mb
    }

    pub fn vram_gb(&self) -> f64 {
        self.vram_mb as f64 / MB_PER_GB
    }

    pub fn system_ram_gb(&self) -> f64 {
        self.system_ram_mb as f64 / MB_PER_GB
    }

    pub fn has_cuda(&self) -> bool {
        self.has_cuda
    }

    pub fn has_metal(&self) -> bool {
        self.has_metal
    }

    /// Either kind of GPU was detected.
    pub fn has_gpu(&self) -> bool {
        self.has_cuda || self.has_metal
    }

    pub fn compute_capability(&self) -> Option<f64> {
        self.compute_capability
    }

    pub fn cpu_avx512(&self) -> bool {
        self.cpu_avx512
    }

    /// One-line description used in logs and the profile report.
    pub fn summary(&self) -> String {
        format!(
            "RAM: {}MB, VRAM: {}MB, CUDA: {}, Metal: {}, Compute: {}, AVX-512: {}",
            self.system_ram_mb,
            self.vram_mb,
            self.has_cuda,
            self.has_metal,
            self.compute_capability
                .map_or("n/a".to_string(), |cap| format!("{cap:.1}")),
            self.cpu_avx512,
        )
    }
}
