//! model_recommender: Scores catalog variants against a host snapshot.
//!
//! Every function here is pure: the same snapshot, catalog and
//! [`ScoringPolicy`] always produce the same ranking.

mod policy;
mod ranker;
mod scorer;

pub use policy::{QuantAffinity, ScoringPolicy};
pub use ranker::{ScoredVariant, rank_variants};
pub use scorer::{INSUFFICIENT_MEMORY, MAX_SCORE, ScoreComponents, VariantScore, score_variant};
