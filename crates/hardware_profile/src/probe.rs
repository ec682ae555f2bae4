//! OS probes. Every probe is best-effort: errors, timeouts and unparseable
//! output all come back as `None`/`false` and are only logged.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use sysinfo::{MemoryRefreshKind, RefreshKind, System};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Arguments for the discrete-GPU query. Example output: `"24576, 8.9"`.
pub const NVIDIA_SMI_ARGS: &[&str] = &[
    "--query-gpu=memory.total,compute_cap",
    "--format=csv,noheader,nounits",
];

/// Run `program` and return its stdout, or `None` if it cannot be started,
/// exits unsuccessfully, or is still running after `timeout`.
///
/// Probe output is expected to be small enough to sit in the pipe buffer until exit.
pub fn run_probe(program: &str, args: &[&str], timeout: Duration) -> Option<String> {
    #[allow(clippy::disallowed_methods)]
    let spawned = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn();

    let mut child = match spawned {
        Ok(child) => child,
        Err(err) => {
            log::debug!("probe `{program}` unavailable: {err}");
            return None;
        }
    };

    let started = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) if status.success() => break,
            Ok(Some(status)) => {
                log::warn!("probe `{program}` exited with {status}");
                return None;
            }
            Ok(None) if started.elapsed() >= timeout => {
                log::warn!("probe `{program}` timed out after {timeout:?}");
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(err) => {
                log::warn!("probe `{program}` could not be polled: {err}");
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
        }
    }

    let mut stdout = Vec::new();
    if let Some(mut pipe) = child.stdout.take() {
        if let Err(err) = pipe.read_to_end(&mut stdout) {
            log::warn!("probe `{program}` output unreadable: {err}");
            return None;
        }
    }
    Some(String::from_utf8_lossy(&stdout).into_owned())
}

/// Total physical memory in bytes, or `None` when the OS reports nothing.
pub fn total_memory_bytes() -> Option<u64> {
    let system = System::new_with_specifics(
        RefreshKind::nothing().with_memory(MemoryRefreshKind::everything()),
    );
    let total = system.total_memory();
    (total > 0).then_some(total)
}

/// Whether the running CPU supports AVX-512F.
pub fn cpu_has_avx512() -> bool {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        std::arch::is_x86_feature_detected!("avx512f")
    }
    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    {
        false
    }
}

/// Parsed answer from the discrete-GPU query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscreteGpuReading {
    pub vram_mb: u64,
    pub compute_capability: Option<f64>,
}

/// Parse `nvidia-smi` CSV output. Only the first GPU is considered, and the
/// VRAM column must be a whole number of MiB for the reading to count.
pub fn parse_nvidia_smi(stdout: &str) -> Option<DiscreteGpuReading> {
    let line = stdout.trim().lines().next()?;
    let mut columns = line.split(',').map(str::trim);

    let vram_mb = columns.next()?.parse::<u64>().ok()?;
    // Older drivers print `[N/A]` here.
    let compute_capability = columns
        .next()
        .and_then(|cap| cap.parse::<f64>().ok())
        .filter(|cap| cap.is_finite() && *cap > 0.0);

    Some(DiscreteGpuReading {
        vram_mb,
        compute_capability,
    })
}

/// Whether a `uname -m` style identifier names an ARM64 machine.
pub fn is_arm64_identifier(machine: &str) -> bool {
    matches!(machine.trim(), "arm64" | "aarch64")
}
