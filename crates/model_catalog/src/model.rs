use serde::{Deserialize, Deserializer, Serialize};

/// A named base model and the builds available for it.
///
/// Missing or `null` fields deserialize as their default rather than failing
/// the document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Model {
    /// Unique identifier, e.g. `llama-3-8b-instruct`.
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub family: String,
    /// Parameter count in billions.
    #[serde(deserialize_with = "null_as_default")]
    pub params_b: f64,
    /// Context window in tokens.
    #[serde(deserialize_with = "null_as_default")]
    pub context_window: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub benchmarks: Benchmarks,
    /// May be empty, in which case the model never produces a recommendation.
    #[serde(deserialize_with = "null_as_default")]
    pub variants: Vec<Variant>,
}

/// Full-precision accuracy scores, on a 0–100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Benchmarks {
    /// Primary metric; drives the base score.
    #[serde(deserialize_with = "null_as_default")]
    pub mmlu: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub gsm8k: f64,
}

/// One quantization/build of a model.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Variant {
    /// Quantization label, e.g. `Q4_K_M`, `Q8_0`, `F16`.
    #[serde(deserialize_with = "null_as_default")]
    pub quant: String,
    /// Resident size in GB.
    #[serde(deserialize_with = "null_as_default")]
    pub size_gb: f64,
    /// Fraction of full-precision accuracy preserved, nominally 0.0–1.0.
    #[serde(deserialize_with = "null_as_default")]
    pub accuracy_retention: f64,
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Model {
    /// Primary benchmark score of this model scaled by a variant's retention.
    pub fn retained_accuracy(&self, variant: &Variant) -> f64 {
        self.benchmarks.mmlu * variant.accuracy_retention
    }

    pub fn is_larger_than(&self, params_b: f64) -> bool {
        self.params_b > params_b
    }
}

impl Variant {
    pub fn quant_matches(&self, quant: &str) -> bool {
        self.quant.eq_ignore_ascii_case(quant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retained_accuracy() {
        let model = Model {
            benchmarks: Benchmarks {
                mmlu: 70.0,
                gsm8k: 0.0,
            },
            ..Model::default()
        };
        let variant = Variant {
            quant: "Q4_K_M".into(),
            size_gb: 4.0,
            accuracy_retention: 0.5,
        };
        assert_eq!(model.retained_accuracy(&variant), 35.0);
    }

    #[test]
    fn test_quant_matching_ignores_case() {
        let variant = Variant {
            quant: "q8_0".into(),
            ..Variant::default()
        };
        assert!(variant.quant_matches("Q8_0"));
        assert!(!variant.quant_matches("Q4_K_M"));
    }
}
