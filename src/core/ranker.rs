use crate::core::{filters::matches_bike_types, scoring::calculate_fit_score};
use crate::models::{RiderProfile, ScoredCandidate, ScoringWeights, VehicleRecord};

/// Result of ranking the catalog for one profile
#[derive(Debug)]
pub struct RankResult {
    pub picks: Vec<ScoredCandidate>,
    /// Vehicles that survived the hard filter
    pub eligible: usize,
}

/// Shortlist ranker: hard filter, score, stable sort, truncate
///
/// Equal scores keep catalog order, so identical input always produces
/// identical output.
#[derive(Debug, Clone)]
pub struct Ranker {
    weights: ScoringWeights,
}

impl Ranker {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }

    /// Top `profile.k` vehicles matching the profile's styles
    pub fn rank(&self, catalog: &[VehicleRecord], profile: &RiderProfile) -> RankResult {
        let mut picks: Vec<ScoredCandidate> = catalog
            .iter()
            .filter(|vehicle| matches_bike_types(vehicle, profile))
            .map(|vehicle| self.score(vehicle, profile))
            .collect();

        let eligible = picks.len();
        sort_by_score(&mut picks);
        picks.truncate(usize::from(profile.k));

        RankResult { picks, eligible }
    }

    /// Every vehicle ranked, ignoring the style filter and `k`
    pub fn rank_unfiltered(&self, catalog: &[VehicleRecord], profile: &RiderProfile) -> Vec<ScoredCandidate> {
        let mut all: Vec<ScoredCandidate> = catalog
            .iter()
            .map(|vehicle| self.score(vehicle, profile))
            .collect();
        sort_by_score(&mut all);
        all
    }

    pub fn score(&self, vehicle: &VehicleRecord, profile: &RiderProfile) -> ScoredCandidate {
        let (score, reasons) = calculate_fit_score(vehicle, profile, &self.weights);
        ScoredCandidate {
            vehicle: vehicle.clone(),
            score,
            reasons,
        }
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

/// Descending by score; `sort_by` is stable so ties keep input order
fn sort_by_score(candidates: &mut [ScoredCandidate]) {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
