//! Inference backend selection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::snapshot::ResourceSnapshot;

/// An inference engine the process manager can start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Backend {
    /// Batched, throughput-oriented GPU serving (vLLM).
    #[serde(rename = "vllm")]
    HighThroughputGpu,
    /// Memory-frugal single-stream GPU execution (ExLlamaV2).
    #[serde(rename = "exllamav2")]
    MemoryEfficientGpu,
    /// Apple Silicon execution (MLX).
    #[serde(rename = "mlx")]
    UnifiedMemoryGpu,
    /// Runs anywhere, with CPU offload (llama.cpp).
    #[serde(rename = "llama_cpp")]
    UniversalCpu,
}

impl Backend {
    /// Select with the default [`BackendPolicy`].
    pub fn select(snapshot: &ResourceSnapshot, target_size_gb: f64) -> Self {
        BackendPolicy::default().select(snapshot, target_size_gb)
    }

    /// Stable identifier of the engine, as used on the wire.
    pub fn engine_id(&self) -> &'static str {
        match self {
            Backend::HighThroughputGpu => "vllm",
            Backend::MemoryEfficientGpu => "exllamav2",
            Backend::UnifiedMemoryGpu => "mlx",
            Backend::UniversalCpu => "llama_cpp",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Backend::HighThroughputGpu => "vLLM (high throughput)",
            Backend::MemoryEfficientGpu => "ExLlamaV2 (memory efficient)",
            Backend::UnifiedMemoryGpu => "MLX (Apple Silicon)",
            Backend::UniversalCpu => "llama.cpp (universal/CPU)",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.engine_id())
    }
}

/// Tunables for backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendPolicy {
    /// VRAM must exceed the workload size times this factor before the
    /// throughput-oriented backend is chosen. Covers activation buffers and
    /// allocator fragmentation on top of the raw weights.
    pub headroom_factor: f64,
}

impl Default for BackendPolicy {
    fn default() -> Self {
        Self {
            headroom_factor: 1.2,
        }
    }
}

impl BackendPolicy {
    /// Pick a backend for a workload of `target_size_gb`. Total: every input
    /// yields exactly one backend.
    pub fn select(&self, snapshot: &ResourceSnapshot, target_size_gb: f64) -> Backend {
        if snapshot.has_metal() {
            return Backend::UnifiedMemoryGpu;
        }

        if snapshot.has_cuda() {
            let vram_gb = snapshot.vram_gb();
            if vram_gb > target_size_gb * self.headroom_factor {
                return Backend::HighThroughputGpu;
            }
            if vram_gb >= target_size_gb {
                return Backend::MemoryEfficientGpu;
            }
        }

        Backend::UniversalCpu
    }
}

/// CMake arguments for building llama.cpp with the acceleration the host supports.
pub fn llama_cpp_cmake_args(snapshot: &ResourceSnapshot) -> &'static str {
    if snapshot.has_metal() {
        "-DLLAMA_METAL=on"
    } else if snapshot.has_cuda() {
        "-DLLAMA_CUBLAS=on"
    } else {
        "-DLLAMA_BLAS=off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_generous_vram_selects_high_throughput() {
        let snapshot = ResourceSnapshot::discrete_gpu(65536, 24576, Some(8.9));
        assert_eq!(Backend::select(&snapshot, 5.5), Backend::HighThroughputGpu);
    }

    #[test]
    fn test_tight_vram_selects_memory_efficient() {
        let snapshot = ResourceSnapshot::discrete_gpu(16384, 6144, Some(8.6));
        assert_eq!(Backend::select(&snapshot, 5.5), Backend::MemoryEfficientGpu);
    }

    #[test]
    fn test_exact_fit_is_memory_efficient() {
        let snapshot = ResourceSnapshot::discrete_gpu(16384, 8192, None);
        assert_eq!(Backend::select(&snapshot, 8.0), Backend::MemoryEfficientGpu);
    }

    #[test]
    fn test_headroom_boundary_is_exclusive() {
        // 12 GB == 10 GB * 1.2 is not strictly greater.
        let snapshot = ResourceSnapshot::discrete_gpu(32768, 12288, None);
        assert_eq!(Backend::select(&snapshot, 10.0), Backend::MemoryEfficientGpu);
        assert_eq!(Backend::select(&snapshot, 9.9), Backend::HighThroughputGpu);
    }

    #[test]
    fn test_undersized_gpu_falls_back_to_cpu() {
        let snapshot = ResourceSnapshot::discrete_gpu(32768, 4096, Some(7.5));
        assert_eq!(Backend::select(&snapshot, 5.5), Backend::UniversalCpu);
    }

    #[test]
    fn test_no_gpu_is_cpu() {
        assert_eq!(
            Backend::select(&ResourceSnapshot::cpu_only(131072), 1.0),
            Backend::UniversalCpu
        );
        assert_eq!(
            Backend::select(&ResourceSnapshot::default(), 0.0),
            Backend::UniversalCpu
        );
    }

    #[test]
    fn test_unified_memory_always_selects_mlx() {
        let snapshot = ResourceSnapshot::unified_memory(16384, 11468);
        assert_eq!(Backend::select(&snapshot, 5.5), Backend::UnifiedMemoryGpu);
        assert_eq!(Backend::select(&snapshot, 500.0), Backend::UnifiedMemoryGpu);

        let conflicting = ResourceSnapshot {
            has_cuda: true,
            ..snapshot
        };
        assert_eq!(Backend::select(&conflicting, 5.5), Backend::UnifiedMemoryGpu);
    }

    #[test]
    fn test_custom_headroom_factor() {
        let policy = BackendPolicy {
            headroom_factor: 2.0,
        };
        let snapshot = ResourceSnapshot::discrete_gpu(32768, 10240, None);
        assert_eq!(policy.select(&snapshot, 5.5), Backend::MemoryEfficientGpu);
        assert_eq!(policy.select(&snapshot, 4.0), Backend::HighThroughputGpu);
    }

    #[test]
    fn test_engine_ids_match_serde_names() {
        for backend in [
            Backend::HighThroughputGpu,
            Backend::MemoryEfficientGpu,
            Backend::UnifiedMemoryGpu,
            Backend::UniversalCpu,
        ] {
            let json = serde_json::to_string(&backend).unwrap();
            assert_eq!(json, format!("\"{}\"", backend.engine_id()));
        }
    }

    #[test]
    fn test_llama_cpp_cmake_args() {
        assert_eq!(
            llama_cpp_cmake_args(&ResourceSnapshot::unified_memory(16384, 11468)),
            "-DLLAMA_METAL=on"
        );
        assert_eq!(
            llama_cpp_cmake_args(&ResourceSnapshot::discrete_gpu(16384, 8192, None)),
            "-DLLAMA_CUBLAS=on"
        );
        assert_eq!(
            llama_cpp_cmake_args(&ResourceSnapshot::cpu_only(16384)),
            "-DLLAMA_BLAS=off"
        );
    }
}
