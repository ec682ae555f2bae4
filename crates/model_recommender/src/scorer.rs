use hardware_profile::ResourceSnapshot;
use model_catalog::{Model, Variant};
use serde::Serialize;

use crate::policy::ScoringPolicy;

pub const INSUFFICIENT_MEMORY: &str = "insufficient memory";

/// Upper bound of every score. Not configurable.
pub const MAX_SCORE: f64 = 100.0;

/// The terms that make up a non-zero score, kept so the result can be explained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreComponents {
    /// VRAM on GPU hosts, system RAM otherwise.
    pub available_gb: f64,
    pub safe_budget_gb: f64,
    /// Primary benchmark scaled by the variant's accuracy retention.
    pub base: f64,
    pub kv_cache_gb: f64,
    pub headroom_gb: f64,
    pub memory_adjustment: f64,
    pub hardware_bonus: f64,
}

impl ScoreComponents {
    /// Sum of the terms before clamping.
    pub fn total(&self) -> f64 {
        self.base + self.memory_adjustment + self.hardware_bonus
    }

    pub fn rationale(&self, value: f64) -> String {
        format!(
            "base {:.1}, headroom {:.1} GB of {:.1} GB safe budget after {:.1} GB KV cache ({:+.0}), hardware {:+.0}, score {:.1}",
            self.base,
            self.headroom_gb,
            self.safe_budget_gb,
            self.kv_cache_gb,
            self.memory_adjustment,
            self.hardware_bonus,
            value,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantScore {
    /// Always within `[0, MAX_SCORE]`.
    pub value: f64,
    /// `None` when the variant was rejected by the hard memory cutoff.
    pub components: Option<ScoreComponents>,
    pub rationale: String,
}

impl VariantScore {
    fn insufficient_memory() -> Self {
        Self {
            value: 0.0,
            components: None,
            rationale: INSUFFICIENT_MEMORY.to_string(),
        }
    }
}

/// Score how well `variant` of `model` suits the host described by `snapshot`.
///
/// A variant larger than the available memory basis scores exactly zero.
/// Anything that fits is scored from its retained accuracy, adjusted by how
/// much memory would remain after loading it and by quantization/hardware
/// affinity, then clamped.
pub fn score_variant(
    snapshot: &ResourceSnapshot,
    model: &Model,
    variant: &Variant,
    policy: &ScoringPolicy,
) -> VariantScore {
    let available_gb = if snapshot.has_gpu() {
        snapshot.vram_gb()
    } else {
        snapshot.system_ram_gb()
    };

    if variant.size_gb > available_gb {
        return VariantScore::insufficient_memory();
    }

    let safe_budget_gb = (available_gb - policy.os_reserve_gb).max(policy.safe_budget_floor_gb);
    let base = model.retained_accuracy(variant);
    let kv_cache_gb = policy.kv_cache_reservation_gb(model);
    let headroom_gb = safe_budget_gb - variant.size_gb - kv_cache_gb;
    let memory_adjustment = policy.headroom_adjustment(headroom_gb);

    let mut hardware_bonus = 0.0;
    if snapshot.has_metal() {
        hardware_bonus += policy
            .unified_memory_affinity
            .bonus_for(variant, headroom_gb);
    }
    if snapshot.has_cuda() {
        hardware_bonus += policy
            .discrete_gpu_affinity
            .bonus_for(variant, headroom_gb);
    }

    let components = ScoreComponents {
        available_gb,
        safe_budget_gb,
        base,
        kv_cache_gb,
        headroom_gb,
        memory_adjustment,
        hardware_bonus,
    };
    let value = clamp_score(components.total());

    VariantScore {
        value,
        rationale: components.rationale(value),
        components: Some(components),
    }
}

fn clamp_score(total: f64) -> f64 {
    if total.is_nan() {
        return 0.0;
    }
    total.clamp(0.0, MAX_SCORE)
}
