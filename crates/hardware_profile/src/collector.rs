//! Resource snapshot collection.
//!
//! Collection is split in two: [`gather_host_facts`] performs the OS probes and
//! records their raw answers, [`assemble`] interprets those answers into a
//! [`ResourceSnapshot`]. Only the first step touches the OS.

use std::time::Duration;

use crate::probe::{self, NVIDIA_SMI_ARGS};
use crate::snapshot::ResourceSnapshot;

/// Tunables for snapshot collection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollectorOptions {
    /// Upper bound on how long any single external probe may run.
    pub probe_timeout: Duration,
    /// System RAM assumed when the OS does not report any.
    pub fallback_ram_mb: u64,
    /// Share of system RAM a unified-memory GPU can address.
    pub unified_vram_share: f64,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(2),
            fallback_ram_mb: 8192,
            unified_vram_share: 0.7,
        }
    }
}

/// Raw probe answers, before interpretation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostFacts {
    /// Operating system identifier, as in `std::env::consts::OS`.
    pub os: String,
    /// `uname -m` output, only probed on macOS.
    pub machine: Option<String>,
    /// Total physical memory in bytes.
    pub total_ram_bytes: Option<u64>,
    /// Raw stdout of the discrete-GPU query.
    pub nvidia_smi: Option<String>,
    pub cpu_avx512: bool,
}

impl HostFacts {
    /// The host is Apple Silicon: macOS on an ARM64 machine.
    pub fn is_unified_memory(&self) -> bool {
        self.os == "macos" && self.machine.as_deref().is_some_and(probe::is_arm64_identifier)
    }
}

/// Probe the OS and build a fresh snapshot. Never fails; a probe that does
/// not answer leaves its capability absent.
pub fn collect_snapshot(options: &CollectorOptions) -> ResourceSnapshot {
    let facts = gather_host_facts(options);
    let snapshot = assemble(&facts, options);
    log::info!("Resource snapshot: {}", snapshot.summary());
    snapshot
}

/// Run every OS probe and record what came back.
pub fn gather_host_facts(options: &CollectorOptions) -> HostFacts {
    let os = std::env::consts::OS.to_string();

    let machine = if os == "macos" {
        probe::run_probe("uname", &["-m"], options.probe_timeout)
            .map(|out| out.trim().to_string())
    } else {
        None
    };

    let mut facts = HostFacts {
        os,
        machine,
        total_ram_bytes: probe::total_memory_bytes(),
        nvidia_smi: None,
        cpu_avx512: probe::cpu_has_avx512(),
    };

    // A unified-memory host has no discrete GPU management interface to ask.
    if !facts.is_unified_memory() {
        facts.nvidia_smi = probe::run_probe("nvidia-smi", NVIDIA_SMI_ARGS, options.probe_timeout);
    }

    facts
}

/// Interpret probe answers. Pure: the same facts always give the same snapshot.
pub fn assemble(facts: &HostFacts, options: &CollectorOptions) -> ResourceSnapshot {
    let system_ram_mb = match facts.total_ram_bytes {
        Some(bytes) if bytes >= 1024 * 1024 => bytes / (1024 * 1024),
        _ => {
            log::warn!(
                "System RAM unavailable, assuming {} MB",
                options.fallback_ram_mb
            );
            options.fallback_ram_mb
        }
    };

    let snapshot = if facts.is_unified_memory() {
        let vram_mb = (system_ram_mb as f64 * options.unified_vram_share) as u64;
        ResourceSnapshot::unified_memory(system_ram_mb, vram_mb)
    } else {
        match facts.nvidia_smi.as_deref().map(probe::parse_nvidia_smi) {
            Some(Some(gpu)) => ResourceSnapshot::discrete_gpu(
                system_ram_mb,
                gpu.vram_mb,
                gpu.compute_capability,
            ),
            Some(None) => {
                log::warn!("Discrete GPU query returned unparseable output, treating GPU as absent");
                ResourceSnapshot::cpu_only(system_ram_mb)
            }
            None => ResourceSnapshot::cpu_only(system_ram_mb),
        }
    };

    snapshot.with_avx512(facts.cpu_avx512)
}
