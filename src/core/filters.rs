use crate::models::{RiderProfile, VehicleRecord};

/// Check if a vehicle belongs to one of the rider's preferred styles
///
/// An empty preference list means "no preference" and keeps everything.
/// Vehicles without a valid category only pass in that case.
#[inline]
pub fn matches_bike_types(vehicle: &VehicleRecord, profile: &RiderProfile) -> bool {
    if !profile.has_type_preference() {
        return true;
    }

    vehicle
        .category
        .is_some_and(|category| profile.bike_types.contains(&category))
}
