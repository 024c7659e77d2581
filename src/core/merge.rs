use std::collections::HashSet;

use crate::core::{catalog::Catalog, ranker::Ranker, scoring::build_reasons};
use crate::models::{
    BikeType, DedupKey, ExternalCandidate, ItemSource, ItemView, RiderProfile, ScoredCandidate,
    VehicleRecord,
};

/// The candidate streams of one request, highest priority first
#[derive(Debug, Default)]
pub struct MergeSources<'a> {
    pub pin_ids: &'a [String],
    pub externals: &'a [ExternalCandidate],
    pub ranked: Vec<ScoredCandidate>,
    /// Lowest priority; only filled when catalog top-up is enabled
    pub top_up: Vec<ScoredCandidate>,
}

/// Combines pinned, external and rule-ranked candidates into the shortlist
///
/// Sources are drained in priority order. The first occurrence of a dedup
/// key wins, later duplicates are dropped, and draining stops at `k`.
pub struct Assembler<'a> {
    catalog: &'a Catalog,
    profile: &'a RiderProfile,
    ranker: &'a Ranker,
}

impl<'a> Assembler<'a> {
    pub fn new(catalog: &'a Catalog, profile: &'a RiderProfile, ranker: &'a Ranker) -> Self {
        Self {
            catalog,
            profile,
            ranker,
        }
    }

    pub fn assemble(&self, sources: MergeSources<'_>, k: usize) -> Vec<ItemView> {
        let mut shortlist = Shortlist::new(k);

        // Pins: catalog lookup, unknown ids are skipped
        for id in sources.pin_ids {
            if shortlist.is_full() {
                break;
            }
            match self.catalog.get(id) {
                Some(vehicle) => {
                    let scored = self.ranker.score(vehicle, self.profile);
                    shortlist.offer(ItemView::from_scored(scored, ItemSource::Pinned));
                }
                None => tracing::debug!("Pinned id {} not in catalog, skipping", id),
            }
        }

        for external in sources.externals {
            if shortlist.is_full() {
                break;
            }
            if let Some(vehicle) = normalize_external(external) {
                let reasons = build_reasons(&vehicle, self.profile);
                shortlist.offer(ItemView {
                    vehicle,
                    score: None,
                    reasons,
                    source: ItemSource::External,
                });
            }
        }

        let rule_picks = sources
            .ranked
            .into_iter()
            .map(|c| ItemView::from_scored(c, ItemSource::Ranked))
            .chain(
                sources
                    .top_up
                    .into_iter()
                    .map(|c| ItemView::from_scored(c, ItemSource::Catalog)),
            );
        for item in rule_picks {
            if shortlist.is_full() {
                break;
            }
            shortlist.offer(item);
        }

        shortlist.items
    }
}

/// Ordered, duplicate-free, size-capped item list
struct Shortlist {
    items: Vec<ItemView>,
    seen: HashSet<DedupKey>,
    cap: usize,
}

impl Shortlist {
    fn new(cap: usize) -> Self {
        Self {
            items: Vec::with_capacity(cap),
            seen: HashSet::new(),
            cap,
        }
    }

    fn is_full(&self) -> bool {
        self.items.len() >= self.cap
    }

    /// Append unless full or already emitted
    fn offer(&mut self, item: ItemView) -> bool {
        if self.is_full() || !self.seen.insert(item.dedup_key()) {
            return false;
        }
        self.items.push(item);
        true
    }
}

/// Map an external suggestion onto the catalog field names
///
/// Returns `None` when the suggestion names no model at all. A missing
/// manufacturer is taken from the first word of the model label.
pub fn normalize_external(external: &ExternalCandidate) -> Option<VehicleRecord> {
    let name = external.text(&["name", "model", "label", "title"])?;

    let manufacturer = external
        .text(&["manufacturer", "brand", "make", "mfr"])
        .or_else(|| name.split_whitespace().next().map(str::to_string))
        .unwrap_or_default();

    let seat_height_mm = external
        .number(&["seat_height_mm"])
        .or_else(|| external.number(&["seat_height_cm"]).map(|cm| cm * 10.0));

    let mut vehicle = VehicleRecord {
        id: external.text(&["id"]),
        name,
        manufacturer,
        category: external
            .text(&["category", "type", "style"])
            .and_then(|c| BikeType::parse(&c)),
        engine_cc: external.number(&["engine_cc", "displacement_cc", "cc"]),
        seat_height_mm,
        wet_weight_kg: external.number(&["wet_weight_kg", "weight_kg"]),
        abs: external.flag(&["abs"]).unwrap_or(false),
        max_speed_mph: external.number(&["max_speed_mph", "top_speed_mph"]),
        zero_to_sixty_s: external.number(&["zero_to_sixty_s", "zero_to_sixty", "0_60_s"]),
        official_url: external.text(&["official_url", "url"]),
        mfr_domain: external.text(&["mfr_domain", "domain"]),
        image_query: external.text(&["image_query", "query"]),
        local_image: external.text(&["local_image"]),
    };

    if vehicle.image_query.is_none() {
        vehicle.image_query = Some(vehicle.label());
    }

    Some(vehicle)
}
