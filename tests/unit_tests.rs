// Unit tests for RideReady scoring and normalization

use rideready::core::normalizer::{BUDGET_USD_RANGE, HEIGHT_CM_RANGE, K_RANGE, MAX_BIKE_TYPES};
use rideready::core::scoring::{
    build_reasons, power_guard, seat_fit, weight_fit, REASON_ABS, REASON_GENERIC,
    REASON_LIGHTWEIGHT, REASON_SEAT_FIT,
};
use rideready::core::{calculate_fit_score, matches_bike_types, normalize_profile};
use rideready::models::{BikeType, Experience, RiderProfile, ScoringWeights, VehicleRecord};
use serde_json::{json, Value};

fn create_profile(experience: Experience, height_cm: u16) -> RiderProfile {
    RiderProfile {
        experience,
        height_cm,
        budget_usd: 6000,
        bike_types: vec![],
        k: 3,
    }
}

fn create_vehicle(abs: bool, seat_mm: Option<f64>, weight_kg: Option<f64>) -> VehicleRecord {
    VehicleRecord {
        id: Some("test".to_string()),
        name: "Test".to_string(),
        manufacturer: "Testmoto".to_string(),
        category: Some(BikeType::Standard),
        seat_height_mm: seat_mm,
        wet_weight_kg: weight_kg,
        abs,
        ..Default::default()
    }
}

/// Messy values a client might send for any numeric field
fn messy_numbers() -> Vec<Value> {
    vec![
        Value::Null,
        json!(true),
        json!(-50),
        json!(0),
        json!(3),
        json!(7.9),
        json!(175),
        json!(1e12),
        json!(-1e12),
        json!("180"),
        json!(" 9000 "),
        json!("tall"),
        json!([170]),
        json!({"cm": 170}),
    ]
}

#[test]
fn test_normalization_bounds_hold_for_messy_input() {
    let experiences = vec![
        Value::Null,
        json!("no_experience"),
        json!("LITTLE_EXPERIENCE"),
        json!("expert"),
        json!(3),
    ];
    let bike_types = vec![
        Value::Null,
        json!("cruiser"),
        json!("Cruiser, naked"),
        json!(["sportbike", "SPORTBIKE", "scooter", 4, "naked", "touring", "adventure", "dual_sport", "standard"]),
        json!({"type": "cruiser"}),
    ];

    for number in messy_numbers() {
        for experience in &experiences {
            for types in &bike_types {
                let raw = json!({
                    "experience": experience,
                    "height_cm": number,
                    "budget_usd": number,
                    "k": number,
                    "bike_types": types,
                });

                let profile = normalize_profile(&raw, 3);

                assert!(HEIGHT_CM_RANGE.contains(&i64::from(profile.height_cm)), "{:?}", raw);
                assert!(BUDGET_USD_RANGE.contains(&i64::from(profile.budget_usd)), "{:?}", raw);
                assert!(K_RANGE.contains(&i64::from(profile.k)), "{:?}", raw);
                assert!(profile.bike_types.len() <= MAX_BIKE_TYPES);
                for (i, t) in profile.bike_types.iter().enumerate() {
                    assert!(BikeType::ALL.contains(t));
                    assert!(!profile.bike_types[..i].contains(t), "duplicate type in {:?}", raw);
                }
            }
        }
    }
}

#[test]
fn test_normalization_of_non_object_body() {
    for raw in [Value::Null, json!([1, 2]), json!("profile"), json!(42)] {
        let profile = normalize_profile(&raw, 2);
        assert_eq!(profile.experience, Experience::NoExperience);
        assert_eq!(profile.height_cm, 170);
        assert_eq!(profile.budget_usd, 6000);
        assert_eq!(profile.k, 2);
        assert!(profile.bike_types.is_empty());
    }
}

#[test]
fn test_bike_type_order_is_first_seen() {
    let profile = normalize_profile(&json!({"bike_types": ["naked", "cruiser", "naked"]}), 3);
    assert_eq!(profile.bike_types, vec![BikeType::Naked, BikeType::Cruiser]);
}

#[test]
fn test_seat_fit_perfect_and_out_of_tolerance() {
    // 170 cm rider -> 765 mm estimated inseam
    assert!((seat_fit(Some(765.0), 170) - 1.0).abs() < 1e-9);
    assert!((seat_fit(Some(825.0), 170) - 0.5).abs() < 1e-9);
    assert_eq!(seat_fit(Some(900.0), 170), 0.0);
    assert_eq!(seat_fit(None, 170), 0.0);
}

#[test]
fn test_weight_fit_ramp() {
    assert_eq!(weight_fit(Some(140.0)), 1.0);
    assert_eq!(weight_fit(Some(150.0)), 1.0);
    assert!((weight_fit(Some(180.0)) - 0.5).abs() < 1e-9);
    assert_eq!(weight_fit(Some(210.0)), 0.0);
    assert_eq!(weight_fit(Some(260.0)), 0.0);
    assert_eq!(weight_fit(None), 0.0);
}

#[test]
fn test_score_formula() {
    let vehicle = create_vehicle(true, Some(765.0), Some(150.0));
    let profile = create_profile(Experience::NoExperience, 170);

    let (score, _) = calculate_fit_score(&vehicle, &profile, &ScoringWeights::default());

    assert!((score - 0.9).abs() < 1e-9, "score was {}", score);
}

#[test]
fn test_power_guard_only_for_no_experience() {
    let mut vehicle = create_vehicle(true, Some(780.0), Some(168.0));
    vehicle.max_speed_mph = Some(118.0);
    vehicle.zero_to_sixty_s = Some(4.9);

    assert!((power_guard(&vehicle, Experience::NoExperience) - 0.81).abs() < 1e-9);
    assert_eq!(power_guard(&vehicle, Experience::LittleExperience), 1.0);

    let weights = ScoringWeights::default();
    let (beginner, _) = calculate_fit_score(&vehicle, &create_profile(Experience::NoExperience, 175), &weights);
    let (some, _) = calculate_fit_score(&vehicle, &create_profile(Experience::LittleExperience, 175), &weights);
    assert!(beginner < some);
}

#[test]
fn test_missing_fields_do_not_crash_scoring() {
    let vehicle = VehicleRecord {
        name: "Mystery".to_string(),
        ..Default::default()
    };
    let (score, reasons) = calculate_fit_score(
        &vehicle,
        &create_profile(Experience::NoExperience, 170),
        &ScoringWeights::default(),
    );

    assert_eq!(score, 0.0);
    assert_eq!(reasons, vec![REASON_GENERIC.to_string()]);
}

#[test]
fn test_reasons_are_always_true() {
    let seats = [None, Some(650.0), Some(760.0), Some(800.0), Some(900.0)];
    let weights = [None, Some(140.0), Some(172.0), Some(173.0), Some(240.0)];

    for abs in [true, false] {
        for seat in seats {
            for weight in weights {
                for height in (140..=210).step_by(10) {
                    let vehicle = create_vehicle(abs, seat, weight);
                    let profile = create_profile(Experience::NoExperience, height);
                    let reasons = build_reasons(&vehicle, &profile);

                    assert!(!reasons.is_empty());
                    for reason in &reasons {
                        match reason.as_str() {
                            REASON_ABS => assert!(vehicle.abs),
                            REASON_LIGHTWEIGHT => assert!(weight.is_some_and(|kg| kg <= 172.0)),
                            REASON_SEAT_FIT => assert!(seat_fit(seat, height) >= 0.7 - 1e-9),
                            REASON_GENERIC => assert_eq!(reasons.len(), 1),
                            other => panic!("unexpected reason {}", other),
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn test_reason_order() {
    let vehicle = create_vehicle(true, Some(765.0), Some(160.0));
    let reasons = build_reasons(&vehicle, &create_profile(Experience::NoExperience, 170));

    assert_eq!(reasons, vec![REASON_ABS, REASON_LIGHTWEIGHT, REASON_SEAT_FIT]);
}

#[test]
fn test_style_filter() {
    let vehicle = create_vehicle(true, None, None);
    let mut profile = create_profile(Experience::NoExperience, 170);
    assert!(matches_bike_types(&vehicle, &profile));

    profile.bike_types = vec![BikeType::Cruiser];
    assert!(!matches_bike_types(&vehicle, &profile));

    profile.bike_types.push(BikeType::Standard);
    assert!(matches_bike_types(&vehicle, &profile));
}
