//! Named scoring constants. These are tuning heuristics; any of them can be
//! overridden from configuration.

use model_catalog::{Model, Variant};
use serde::{Deserialize, Serialize};

/// Every constant the variant scorer uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    /// Memory held back for the OS and display before measuring headroom.
    pub os_reserve_gb: f64,
    /// Safe budget used when the reserve would leave nothing.
    pub safe_budget_floor_gb: f64,
    /// KV-cache/runtime reservation for models at or below `large_model_params_b`.
    pub kv_cache_small_gb: f64,
    /// KV-cache/runtime reservation for larger models.
    pub kv_cache_large_gb: f64,
    pub large_model_params_b: f64,
    /// Headroom strictly above this earns `generous_headroom_bonus`.
    pub generous_headroom_gb: f64,
    pub generous_headroom_bonus: f64,
    /// Headroom strictly above this (and not generous) earns `moderate_headroom_bonus`.
    pub moderate_headroom_gb: f64,
    pub moderate_headroom_bonus: f64,
    /// Applied to anything tighter than `moderate_headroom_gb`.
    pub tight_headroom_penalty: f64,
    /// Quantization that runs well on unified-memory GPUs.
    pub unified_memory_affinity: QuantAffinity,
    /// Quantization that runs well on discrete GPUs with room to spare.
    pub discrete_gpu_affinity: QuantAffinity,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            os_reserve_gb: 2.0,
            safe_budget_floor_gb: 0.5,
            kv_cache_small_gb: 0.5,
            kv_cache_large_gb: 1.0,
            large_model_params_b: 10.0,
            generous_headroom_gb: 2.0,
            generous_headroom_bonus: 20.0,
            moderate_headroom_gb: 0.5,
            moderate_headroom_bonus: 10.0,
            tight_headroom_penalty: -30.0,
            unified_memory_affinity: QuantAffinity {
                quant: "Q4_K_M".to_string(),
                bonus: 10.0,
                min_headroom_gb: None,
            },
            discrete_gpu_affinity: QuantAffinity {
                quant: "Q8_0".to_string(),
                bonus: 5.0,
                min_headroom_gb: Some(4.0),
            },
        }
    }
}

impl ScoringPolicy {
    /// Two-bucket estimate of KV-cache and runtime memory by parameter count.
    pub fn kv_cache_reservation_gb(&self, model: &Model) -> f64 {
        if model.is_larger_than(self.large_model_params_b) {
            self.kv_cache_large_gb
        } else {
            self.kv_cache_small_gb
        }
    }

    /// Map remaining headroom into a bonus or penalty.
    pub fn headroom_adjustment(&self, headroom_gb: f64) -> f64 {
        if headroom_gb > self.generous_headroom_gb {
            self.generous_headroom_bonus
        } else if headroom_gb > self.moderate_headroom_gb {
            self.moderate_headroom_bonus
        } else {
            self.tight_headroom_penalty
        }
    }
}

/// An additive bonus for a quantization paired with a kind of hardware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantAffinity {
    pub quant: String,
    pub bonus: f64,
    /// The bonus only applies when headroom is strictly above this.
    #[serde(default)]
    pub min_headroom_gb: Option<f64>,
}

impl QuantAffinity {
    pub fn bonus_for(&self, variant: &Variant, headroom_gb: f64) -> f64 {
        let roomy = self
            .min_headroom_gb
            .is_none_or(|min_headroom| headroom_gb > min_headroom);
        if roomy && variant.quant_matches(&self.quant) {
            self.bonus
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn model(params_b: f64) -> Model {
        Model {
            params_b,
            ..Model::default()
        }
    }

    fn variant(quant: &str) -> Variant {
        Variant {
            quant: quant.into(),
            ..Variant::default()
        }
    }

    #[test]
    fn test_kv_cache_buckets() {
        let policy = ScoringPolicy::default();
        assert_eq!(policy.kv_cache_reservation_gb(&model(7.0)), 0.5);
        assert_eq!(policy.kv_cache_reservation_gb(&model(10.0)), 0.5);
        assert_eq!(policy.kv_cache_reservation_gb(&model(13.0)), 1.0);
    }

    #[test]
    fn test_headroom_bands() {
        let policy = ScoringPolicy::default();
        assert_eq!(policy.headroom_adjustment(8.0), 20.0);
        assert_eq!(policy.headroom_adjustment(2.0), 10.0);
        assert_eq!(policy.headroom_adjustment(0.6), 10.0);
        assert_eq!(policy.headroom_adjustment(0.5), -30.0);
        assert_eq!(policy.headroom_adjustment(-3.0), -30.0);
    }

    #[test]
    fn test_affinity_headroom_gate() {
        let policy = ScoringPolicy::default();
        assert_eq!(policy.discrete_gpu_affinity.bonus_for(&variant("Q8_0"), 4.5), 5.0);
        assert_eq!(policy.discrete_gpu_affinity.bonus_for(&variant("Q8_0"), 4.0), 0.0);
        assert_eq!(policy.discrete_gpu_affinity.bonus_for(&variant("F16"), 12.0), 0.0);
        assert_eq!(policy.unified_memory_affinity.bonus_for(&variant("q4_k_m"), -1.0), 10.0);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let policy: ScoringPolicy = serde_json::from_str(indoc! {r#"
            {
              "os_reserve_gb": 4.0,
              "unified_memory_affinity": { "quant": "Q5_K_M", "bonus": 8.0 }
            }
        "#})
        .unwrap();

        assert_eq!(policy.os_reserve_gb, 4.0);
        assert_eq!(policy.unified_memory_affinity.quant, "Q5_K_M");
        assert_eq!(policy.unified_memory_affinity.min_headroom_gb, None);
        assert_eq!(policy.tight_headroom_penalty, -30.0);
        assert_eq!(policy.discrete_gpu_affinity, ScoringPolicy::default().discrete_gpu_affinity);
    }
}
