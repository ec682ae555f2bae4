use hardware_profile::ResourceSnapshot;
use model_catalog::{ModelCatalog, Variant};
use serde::Serialize;

use crate::policy::ScoringPolicy;
use crate::scorer::score_variant;

/// A catalog variant that survived admission, with its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredVariant {
    pub model_id: String,
    pub model_name: String,
    pub variant: Variant,
    pub score: f64,
    pub rationale: String,
}

/// Score every variant in `catalog` and return the admitted ones, best first.
///
/// Variants scoring exactly zero are dropped. Equal scores keep catalog order.
pub fn rank_variants(
    snapshot: &ResourceSnapshot,
    catalog: &ModelCatalog,
    policy: &ScoringPolicy,
) -> Vec<ScoredVariant> {
    let mut ranked: Vec<ScoredVariant> = catalog
        .variants()
        .filter_map(|(model, variant)| {
            let score = score_variant(snapshot, model, variant, policy);
            if score.value == 0.0 {
                log::debug!(
                    "Skipping {} {}: {}",
                    model.id,
                    variant.quant,
                    score.rationale
                );
                return None;
            }
            Some(ScoredVariant {
                model_id: model.id.clone(),
                model_name: model.name.clone(),
                variant: variant.clone(),
                score: score.value,
                rationale: score.rationale,
            })
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    log::debug!(
        "Ranked {} of {} variants",
        ranked.len(),
        catalog.variant_count()
    );
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn assert_well_ranked(ranked: &[ScoredVariant]) {
        for pair in ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score, "{pair:?}");
        }
        assert!(ranked.iter().all(|entry| entry.score > 0.0));
    }

    #[test]
    fn test_builtin_catalog_on_cpu_host() {
        let catalog = ModelCatalog::builtin().unwrap();
        let ranked = rank_variants(
            &ResourceSnapshot::cpu_only(12288),
            &catalog,
            &ScoringPolicy::default(),
        );

        assert_well_ranked(&ranked);
        assert!(!ranked.is_empty());
        assert!(ranked.len() < catalog.variant_count());
        assert!(ranked.iter().all(|entry| entry.variant.size_gb <= 12.0));
    }

    #[test]
    fn test_nothing_fits_on_empty_snapshot() {
        let catalog = ModelCatalog::builtin().unwrap();
        let ranked = rank_variants(
            &ResourceSnapshot::default(),
            &catalog,
            &ScoringPolicy::default(),
        );
        assert_eq!(ranked, Vec::new());
    }

    #[test]
    fn test_ranking_order_and_ties() {
        let catalog = ModelCatalog::from_json_str(indoc! {r#"
            {
              "models": [
                {
                  "id": "first",
                  "name": "First",
                  "params_b": 7.0,
                  "benchmarks": { "mmlu": 60.0, "gsm8k": 0.0 },
                  "variants": [
                    { "quant": "Q4_K_M", "size_gb": 4.0, "accuracy_retention": 1.0 },
                    { "quant": "F16", "size_gb": 60.0, "accuracy_retention": 1.0 }
                  ]
                },
                {
                  "id": "second",
                  "name": "Second",
                  "params_b": 7.0,
                  "benchmarks": { "mmlu": 70.0, "gsm8k": 0.0 },
                  "variants": [
                    { "quant": "Q4_K_M", "size_gb": 4.0, "accuracy_retention": 1.0 }
                  ]
                },
                {
                  "id": "third",
                  "name": "Third",
                  "params_b": 7.0,
                  "benchmarks": { "mmlu": 60.0, "gsm8k": 0.0 },
                  "variants": [
                    { "quant": "Q4_K_M", "size_gb": 4.0, "accuracy_retention": 1.0 }
                  ]
                },
                { "id": "empty", "variants": [] }
              ]
            }
        "#})
        .unwrap();

        let ranked = rank_variants(
            &ResourceSnapshot::cpu_only(32768),
            &catalog,
            &ScoringPolicy::default(),
        );
        assert_well_ranked(&ranked);

        let order: Vec<(&str, f64)> = ranked
            .iter()
            .map(|entry| (entry.model_id.as_str(), entry.score))
            .collect();
        assert_eq!(order, vec![("second", 90.0), ("first", 80.0), ("third", 80.0)]);
        assert_eq!(ranked[0].model_name, "Second");
    }

    #[test]
    fn test_clamped_zero_is_not_recommended() {
        // Fits, but the tight-headroom penalty drives it to zero.
        let catalog = ModelCatalog::from_json_str(indoc! {r#"
            {
              "models": [
                {
                  "id": "weak",
                  "params_b": 7.0,
                  "benchmarks": { "mmlu": 20.0 },
                  "variants": [{ "quant": "Q4_K_M", "size_gb": 7.5, "accuracy_retention": 1.0 }]
                }
              ]
            }
        "#})
        .unwrap();
        let ranked = rank_variants(
            &ResourceSnapshot::cpu_only(8192),
            &catalog,
            &ScoringPolicy::default(),
        );
        assert!(ranked.is_empty());
    }
}
