// geo.rs
// Purpose: Great-circle distance between two fuel-log positions

const EARTH_RADIUS_KM: f64 = 6371.0;
pub const NM_PER_KM: f64 = 0.539957;

/// Haversine distance in nautical miles between two `(lat, lon)` pairs in degrees.
pub fn great_circle_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());

    let s1 = (d_lat / 2.0).sin();
    let s2 = (d_lon / 2.0).sin();
    let c = 2.0 * (s1 * s1 + phi1.cos() * phi2.cos() * s2 * s2).sqrt().asin();

    EARTH_RADIUS_KM * c * NM_PER_KM
}

/// Same as [`great_circle_nm`] but 0 when either position is incomplete.
pub fn distance_between(a: (Option<f64>, Option<f64>), b: (Option<f64>, Option<f64>)) -> f64 {
    match (a, b) {
        ((Some(lat1), Some(lon1)), (Some(lat2), Some(lon2))) => {
            great_circle_nm(lat1, lon1, lat2, lon2)
        }
        _ => 0.0,
    }
}
