use crate::core::{
    catalog::Catalog,
    merge::{Assembler, MergeSources},
    normalizer::{merge_patch, normalize_profile, DEFAULT_CHAT_K, DEFAULT_K},
    ranker::Ranker,
};
use crate::models::{
    ExternalCandidate, ItemView, Plan, PlanAction, RecommendRequest, RiderProfile, ScoringWeights,
};
use crate::models::requests::string_list;

/// Final result of one recommendation request
#[derive(Debug)]
pub struct Shortlist {
    pub items: Vec<ItemView>,
    pub profile: RiderProfile,
    /// Catalog vehicles that passed the style filter
    pub eligible: usize,
}

impl Shortlist {
    pub fn count(&self) -> usize {
        self.items.len()
    }
}

/// Outcome of applying a chat plan to a profile
#[derive(Debug)]
pub struct ChatOutcome {
    pub profile: RiderProfile,
    /// Present only when the plan asked for a recommendation
    pub shortlist: Option<Shortlist>,
}

/// Request-scope orchestration: normalize → rank → merge
///
/// Holds only configuration; the catalog is passed in per call and never
/// mutated, so one instance can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct Recommender {
    ranker: Ranker,
    default_k: u8,
    chat_default_k: u8,
    top_up: bool,
}

impl Recommender {
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            ranker: Ranker::new(weights),
            default_k: DEFAULT_K,
            chat_default_k: DEFAULT_CHAT_K,
            top_up: false,
        }
    }

    pub fn with_default_k(mut self, default_k: u8, chat_default_k: u8) -> Self {
        self.default_k = default_k;
        self.chat_default_k = chat_default_k;
        self
    }

    /// Fill the shortlist from the whole catalog when the style filter leaves too few
    pub fn with_top_up(mut self, top_up: bool) -> Self {
        self.top_up = top_up;
        self
    }

    pub fn chat_default_k(&self) -> u8 {
        self.chat_default_k
    }

    /// Handle a raw recommend request body
    pub fn recommend_request(&self, catalog: &Catalog, request: &RecommendRequest) -> Shortlist {
        let profile = normalize_profile(&request.profile, self.default_k);
        self.recommend(catalog, &profile, &request.pin_ids, &request.external_items)
    }

    /// Build the shortlist for an already normalized profile
    pub fn recommend(
        &self,
        catalog: &Catalog,
        profile: &RiderProfile,
        pin_ids: &[String],
        externals: &[ExternalCandidate],
    ) -> Shortlist {
        let ranked = self.ranker.rank(catalog.records(), profile);
        let eligible = ranked.eligible;

        let top_up = if self.top_up {
            self.ranker.rank_unfiltered(catalog.records(), profile)
        } else {
            Vec::new()
        };

        let items = Assembler::new(catalog, profile, &self.ranker).assemble(
            MergeSources {
                pin_ids,
                externals,
                ranked: ranked.picks,
                top_up,
            },
            usize::from(profile.k),
        );

        tracing::debug!(
            "Shortlist: {} items ({} pins, {} externals, {} eligible of {})",
            items.len(),
            pin_ids.len(),
            externals.len(),
            eligible,
            catalog.len()
        );

        Shortlist {
            items,
            profile: profile.clone(),
            eligible,
        }
    }

    /// Apply a chat plan: profile patches in order, then an optional recommendation
    ///
    /// A plan without actions leaves the profile untouched and recommends nothing.
    pub fn apply_plan(&self, catalog: &Catalog, current: &RiderProfile, plan: &Plan) -> ChatOutcome {
        let mut profile = current.clone();
        let mut pin_ids: Vec<String> = Vec::new();
        let mut externals: Vec<ExternalCandidate> = Vec::new();

        for action in &plan.actions {
            match action {
                PlanAction::UpdateProfile { patch } => {
                    profile = merge_patch(&profile, patch, self.chat_default_k);
                }
                PlanAction::Recommend { pin_ids: pins, items } => {
                    pin_ids.extend(string_list(pins));
                    externals.extend(ExternalCandidate::list_from_value(items));
                }
                PlanAction::Unknown => {}
            }
        }

        let shortlist = plan
            .wants_recommendation()
            .then(|| self.recommend(catalog, &profile, &pin_ids, &externals));

        ChatOutcome { profile, shortlist }
    }
}

impl Default for Recommender {
    fn default() -> Self {
        Self::new(ScoringWeights::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BikeType, Experience, VehicleRecord};
    use serde_json::json;

    fn create_catalog() -> Catalog {
        let bike = |id: &str, category: BikeType, seat: f64| VehicleRecord {
            id: Some(id.to_string()),
            name: id.to_string(),
            manufacturer: "Testmoto".to_string(),
            category: Some(category),
            seat_height_mm: Some(seat),
            wet_weight_kg: Some(165.0),
            abs: true,
            ..Default::default()
        };
        Catalog::from_records(vec![
            bike("sport_a", BikeType::Sportbike, 780.0),
            bike("sport_b", BikeType::Sportbike, 800.0),
            bike("cruiser_a", BikeType::Cruiser, 690.0),
            bike("naked_a", BikeType::Naked, 785.0),
        ])
    }

    #[test]
    fn test_recommend_request_uses_default_k() {
        let recommender = Recommender::default();
        let request = RecommendRequest::from_value(json!({"height_cm": 170}));

        let shortlist = recommender.recommend_request(&create_catalog(), &request);

        assert_eq!(shortlist.profile.k, DEFAULT_K);
        assert_eq!(shortlist.count(), 3);
        assert_eq!(shortlist.eligible, 4);
    }

    #[test]
    fn test_top_up_reaches_k() {
        let request = RecommendRequest::from_value(json!({"bike_types": ["cruiser"], "k": 3}));

        let strict = Recommender::default().recommend_request(&create_catalog(), &request);
        assert_eq!(strict.count(), 1);

        let topped = Recommender::default()
            .with_top_up(true)
            .recommend_request(&create_catalog(), &request);
        assert_eq!(topped.count(), 3);
        assert_eq!(topped.items[0].vehicle.id.as_deref(), Some("cruiser_a"));
    }

    #[test]
    fn test_apply_plan_patches_then_recommends() {
        let recommender = Recommender::default();
        let current = normalize_profile(&json!({"bike_types": ["cruiser"]}), DEFAULT_CHAT_K);
        let plan = Plan::from_value(&json!({
            "topic": "MOTO_DOMAIN",
            "actions": [
                {"type": "UPDATE_PROFILE", "patch": {"bike_types": ["sportbike"]}},
                {"type": "UPDATE_PROFILE", "patch": {"experience": "little_experience"}},
                {"type": "RECOMMEND", "items": [{"label": "BMW G 310 R"}]}
            ]
        }));

        let outcome = recommender.apply_plan(&create_catalog(), &current, &plan);

        assert_eq!(outcome.profile.bike_types, vec![BikeType::Sportbike]);
        assert_eq!(outcome.profile.experience, Experience::LittleExperience);
        let shortlist = outcome.shortlist.unwrap();
        assert_eq!(shortlist.count(), 2);
        assert_eq!(shortlist.items[0].vehicle.manufacturer, "BMW");
        assert_eq!(shortlist.items[1].vehicle.id.as_deref(), Some("sport_a"));
    }

    #[test]
    fn test_empty_plan_changes_nothing() {
        let recommender = Recommender::default();
        let current = normalize_profile(&json!({"height_cm": 182}), DEFAULT_CHAT_K);

        let outcome = recommender.apply_plan(&create_catalog(), &current, &Plan::default());

        assert_eq!(outcome.profile, current);
        assert!(outcome.shortlist.is_none());
    }
}
