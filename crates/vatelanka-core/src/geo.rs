//! Great-circle distance and the nearby-vehicle filter.

use crate::types::{Coordinate, NearbyVehicle, VehiclePosition};

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Radius within which a truck counts as nearby.
pub const DEFAULT_NEARBY_RADIUS_M: u32 = 1_000;

/// Haversine distance between two points, rounded to the nearest metre.
#[must_use]
pub fn haversine_m(a: Coordinate, b: Coordinate) -> u32 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let delta_phi = (b.latitude - a.latitude).to_radians();
    let delta_lambda = (b.longitude - a.longitude).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        (EARTH_RADIUS_M * c).round() as u32
    }
}

/// Vehicles within `radius_m` of `home`, sorted ascending by distance.
///
/// Trucks with no reported location, or whose route status is neither
/// active nor paused, are excluded before any distance computation. Each
/// call is a full recompute over the latest snapshot.
#[must_use]
pub fn nearby(
    home: Coordinate,
    vehicles: &[VehiclePosition],
    radius_m: u32,
) -> Vec<NearbyVehicle> {
    let mut result: Vec<NearbyVehicle> = vehicles
        .iter()
        .filter(|v| v.route_status.is_on_route())
        .filter_map(|v| {
            let location = v.current_location?;
            let distance_m = haversine_m(home, location);
            (distance_m <= radius_m).then(|| NearbyVehicle {
                vehicle: v.clone(),
                distance_m,
            })
        })
        .collect();
    result.sort_by_key(|n| n.distance_m);
    result
}
