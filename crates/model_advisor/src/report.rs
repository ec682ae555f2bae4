//! Text and JSON rendering of advisor results.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use hardware_profile::{Backend, BackendPolicy, ResourceSnapshot, Tier, llama_cpp_cmake_args};
use model_catalog::ModelCatalog;
use model_recommender::ScoredVariant;
use serde::Serialize;

/// What the advisor knows about the host and what it would run on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostReport {
    pub summary: String,
    pub snapshot: ResourceSnapshot,
    pub tier: Tier,
    pub tier_description: &'static str,
    pub llama_cpp_cmake_args: &'static str,
    pub target_size_gb: f64,
    pub backend: Backend,
}

impl HostReport {
    pub fn new(snapshot: ResourceSnapshot, target_size_gb: f64, policy: &BackendPolicy) -> Self {
        let tier = Tier::classify(&snapshot);
        Self {
            summary: snapshot.summary(),
            snapshot,
            tier,
            tier_description: tier.description(),
            llama_cpp_cmake_args: llama_cpp_cmake_args(&snapshot),
            target_size_gb,
            backend: policy.select(&snapshot, target_size_gb),
        }
    }

    pub fn render_profile(&self) -> String {
        let mut out = String::new();
        writeln!(out, "Hardware:  {}", self.summary).ok();
        writeln!(out, "Tier:      {} ({})", self.tier, self.tier_description).ok();
        writeln!(out, "llama.cpp: CMAKE_ARGS=\"{}\"", self.llama_cpp_cmake_args).ok();
        out
    }

    /// The lines printed when the advisor runs without a subcommand.
    pub fn render_startup(&self) -> String {
        let mut out = String::new();
        writeln!(out, "Hardware: {}", self.summary).ok();
        writeln!(out, "Tier:     {}", self.tier).ok();
        writeln!(
            out,
            "Backend:  {} for a {:.1} GB workload",
            self.backend.display_name(),
            self.target_size_gb
        )
        .ok();
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BackendReport {
    pub target_size_gb: f64,
    pub backend: Backend,
    pub display_name: &'static str,
}

impl BackendReport {
    pub fn new(snapshot: &ResourceSnapshot, target_size_gb: f64, policy: &BackendPolicy) -> Self {
        let backend = policy.select(snapshot, target_size_gb);
        Self {
            target_size_gb,
            backend,
            display_name: backend.display_name(),
        }
    }

    pub fn render(&self) -> String {
        format!(
            "{} ({}) for a {:.1} GB workload\n",
            self.display_name, self.backend, self.target_size_gb
        )
    }
}

pub fn render_recommendations(ranked: &[ScoredVariant]) -> String {
    if ranked.is_empty() {
        return "No catalog variant fits in available memory.\n".to_string();
    }

    let mut out = String::new();
    for (rank, entry) in ranked.iter().enumerate() {
        writeln!(
            out,
            "{:>2}. {:5.1}  {} [{}] {:.1} GB",
            rank + 1,
            entry.score,
            display_name(entry),
            entry.variant.quant,
            entry.variant.size_gb,
        )
        .ok();
        writeln!(out, "           {}", entry.rationale).ok();
    }
    out
}

pub fn render_catalog(catalog: &ModelCatalog) -> String {
    let mut out = String::new();
    for model in catalog.models() {
        let quants: Vec<&str> = model
            .variants
            .iter()
            .map(|variant| variant.quant.as_str())
            .collect();
        writeln!(
            out,
            "{}  {}  {:.1}B  ctx {}  MMLU {:.1}  [{}]",
            model.id,
            model.name,
            model.params_b,
            model.context_window,
            model.benchmarks.mmlu,
            quants.join(", ")
        )
        .ok();
    }
    out
}

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize report")
}

fn display_name(entry: &ScoredVariant) -> &str {
    if entry.model_name.is_empty() {
        &entry.model_id
    } else {
        &entry.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model_catalog::Variant;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_host_report_for_apple_silicon() {
        let snapshot = ResourceSnapshot::unified_memory(16384, 11468);
        let report = HostReport::new(snapshot, 5.5, &BackendPolicy::default());

        assert_eq!(report.tier, Tier::Apple);
        assert_eq!(report.backend, Backend::UnifiedMemoryGpu);
        assert_eq!(report.llama_cpp_cmake_args, "-DLLAMA_METAL=on");
        assert_eq!(
            report.render_profile(),
            "Hardware:  RAM: 16384MB, VRAM: 11468MB, CUDA: false, Metal: true, Compute: n/a, AVX-512: false\n\
             Tier:      Apple (Apple Silicon unified memory)\n\
             llama.cpp: CMAKE_ARGS=\"-DLLAMA_METAL=on\"\n"
        );
    }

    #[test]
    fn test_host_report_json_uses_engine_ids() {
        let snapshot = ResourceSnapshot::discrete_gpu(65536, 6144, Some(8.6));
        let report = HostReport::new(snapshot, 5.5, &BackendPolicy::default());
        let json: serde_json::Value = serde_json::from_str(&to_json(&report).unwrap()).unwrap();

        assert_eq!(json["backend"], "exllamav2");
        assert_eq!(json["tier"], "Balanced");
        assert_eq!(json["llama_cpp_cmake_args"], "-DLLAMA_CUBLAS=on");
        assert_eq!(json["snapshot"]["vram_mb"], 6144);
    }

    #[test]
    fn test_backend_report() {
        let snapshot = ResourceSnapshot::discrete_gpu(65536, 24576, Some(8.9));
        let report = BackendReport::new(&snapshot, 5.5, &BackendPolicy::default());
        assert_eq!(report.backend, Backend::HighThroughputGpu);
        assert!(report.render().contains("(vllm) for a 5.5 GB workload"));
    }

    #[test]
    fn test_render_recommendations() {
        assert_eq!(
            render_recommendations(&[]),
            "No catalog variant fits in available memory.\n"
        );

        let ranked = vec![ScoredVariant {
            model_id: "phi-3-mini-4k".into(),
            model_name: String::new(),
            variant: Variant {
                quant: "Q4_K_M".into(),
                size_gb: 2.4,
                accuracy_retention: 0.97,
            },
            score: 87.3,
            rationale: "base 67.3".into(),
        }];
        assert_eq!(
            render_recommendations(&ranked),
            " 1.  87.3  phi-3-mini-4k [Q4_K_M] 2.4 GB\n           base 67.3\n"
        );
    }

    #[test]
    fn test_render_builtin_catalog() {
        let catalog = ModelCatalog::builtin().unwrap();
        let rendered = render_catalog(&catalog);
        assert_eq!(rendered.lines().count(), 4);
        assert!(rendered.starts_with("llama-3-8b-instruct  Llama 3 (8B)  8.0B  ctx 8192  MMLU 68.4  [Q4_K_M, Q8_0, F16]"));
    }
}
