use crate::models::{Experience, RiderProfile, ScoringWeights, VehicleRecord};

/// Inseam estimate as a fraction of body height
const INSEAM_RATIO: f64 = 0.45;
/// Seat/inseam gap (mm) at which the seat fit term reaches zero
const SEAT_TOLERANCE_MM: f64 = 120.0;
const SEAT_FIT_REASON_THRESHOLD: f64 = 0.7;
/// Absorbs rounding in the inseam estimate at the reason threshold
const FIT_EPSILON: f64 = 1e-9;

const LIGHT_WEIGHT_KG: f64 = 150.0;
const HEAVY_WEIGHT_KG: f64 = 210.0;
const LIGHTWEIGHT_REASON_KG: f64 = 172.0;

const FAST_TOP_SPEED_MPH: f64 = 115.0;
const QUICK_ZERO_TO_SIXTY_S: f64 = 5.0;
const POWER_DAMPER: f64 = 0.9;

pub const MAX_REASONS: usize = 5;

pub const REASON_ABS: &str = "has ABS";
pub const REASON_LIGHTWEIGHT: &str = "lightweight";
pub const REASON_SEAT_FIT: &str = "seat height close to estimated inseam";
pub const REASON_GENERIC: &str = "good overall fit for beginners";

/// Calculate a fitness score and the reasons behind it
///
/// Scoring formula:
/// score = (
///     seat_fit * 0.60 +        # seat height close to estimated inseam
///     weight_fit * 0.25 +      # lighter is easier to handle
///     abs_bonus * 0.05         # abs == true
/// ) * power_guard              # 0.9 per "too fast" trait, beginners only
pub fn calculate_fit_score(
    vehicle: &VehicleRecord,
    profile: &RiderProfile,
    weights: &ScoringWeights,
) -> (f64, Vec<String>) {
    let seat = seat_fit(vehicle.seat_height_mm, profile.height_cm);
    let weight = weight_fit(vehicle.wet_weight_kg);
    let abs = if vehicle.abs { 1.0 } else { 0.0 };

    let total = (seat * weights.seat_fit + weight * weights.weight + abs * weights.abs)
        * power_guard(vehicle, profile.experience);

    (total, build_reasons(vehicle, profile))
}

/// Reasons for recommending a vehicle, strongest safety argument first
///
/// Only conditions that actually hold are reported; when none does a single
/// generic reason is returned so the list is never empty.
pub fn build_reasons(vehicle: &VehicleRecord, profile: &RiderProfile) -> Vec<String> {
    let mut reasons: Vec<String> = Vec::new();
    let mut push = |reason: &str| {
        if reasons.len() < MAX_REASONS && !reasons.iter().any(|r| r == reason) {
            reasons.push(reason.to_string());
        }
    };

    if vehicle.abs {
        push(REASON_ABS);
    }
    if vehicle
        .wet_weight_kg
        .is_some_and(|kg| kg <= LIGHTWEIGHT_REASON_KG)
    {
        push(REASON_LIGHTWEIGHT);
    }
    if vehicle.seat_height_mm.is_some()
        && seat_fit(vehicle.seat_height_mm, profile.height_cm) >= SEAT_FIT_REASON_THRESHOLD - FIT_EPSILON
    {
        push(REASON_SEAT_FIT);
    }

    if reasons.is_empty() {
        reasons.push(REASON_GENERIC.to_string());
    }
    reasons
}

/// Estimated inseam in millimeters
#[inline]
pub fn estimated_inseam_mm(height_cm: u16) -> f64 {
    f64::from(height_cm) * 10.0 * INSEAM_RATIO
}

/// Seat height fit (0-1), linear falloff around the estimated inseam
#[inline]
pub fn seat_fit(seat_height_mm: Option<f64>, height_cm: u16) -> f64 {
    let Some(seat) = seat_height_mm else {
        return 0.0;
    };
    let gap = (seat - estimated_inseam_mm(height_cm)).abs();
    (1.0 - gap / SEAT_TOLERANCE_MM).max(0.0)
}

/// Weight suitability (0-1): 1 at 150 kg or less, 0 at 210 kg or more
#[inline]
pub fn weight_fit(wet_weight_kg: Option<f64>) -> f64 {
    let Some(kg) = wet_weight_kg else {
        return 0.0;
    };
    ((HEAVY_WEIGHT_KG - kg) / (HEAVY_WEIGHT_KG - LIGHT_WEIGHT_KG)).clamp(0.0, 1.0)
}

/// Multiplicative dampener for riders without any experience
#[inline]
pub fn power_guard(vehicle: &VehicleRecord, experience: Experience) -> f64 {
    if experience != Experience::NoExperience {
        return 1.0;
    }

    let mut factor = 1.0;
    if vehicle.max_speed_mph.is_some_and(|mph| mph >= FAST_TOP_SPEED_MPH) {
        factor *= POWER_DAMPER;
    }
    if vehicle
        .zero_to_sixty_s
        .is_some_and(|s| s <= QUICK_ZERO_TO_SIXTY_S)
    {
        factor *= POWER_DAMPER;
    }
    factor
}
