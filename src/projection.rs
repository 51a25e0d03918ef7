//! Local planar approximation between geographic degrees and kilometers.
//!
//! All grid geometry is laid out on a flat-earth approximation around the
//! region center: one degree of latitude is 111 km, one degree of longitude
//! is 111 km scaled by `cos(latitude)`. Valid only over extents of a few
//! kilometers; the authoritative radius filter uses true great-circle
//! distance instead (see [`crate::filter`]).

/// Kilometers per degree of latitude (and of longitude at the equator).
pub const KM_PER_DEGREE: f64 = 111.0;

/// Degrees of latitude and longitude per kilometer at the given latitude.
///
/// Precondition: `cos(lat) != 0`, i.e. the latitude is not a pole. Config
/// validation rejects polar centers before any geometry is built.
pub fn degrees_per_km(lat: f64) -> (f64, f64) {
    let lat_deg_per_km = 1.0 / KM_PER_DEGREE;
    let lon_deg_per_km = 1.0 / (KM_PER_DEGREE * lat.to_radians().cos());
    (lat_deg_per_km, lon_deg_per_km)
}

/// Apply a kilometer offset to a center coordinate, linearly.
///
/// Returns `(lat, lon)` in degrees. North and east are positive.
pub fn offset_km(center_lat: f64, center_lon: f64, d_lat_km: f64, d_lon_km: f64) -> (f64, f64) {
    let (lat_deg_per_km, lon_deg_per_km) = degrees_per_km(center_lat);
    (
        center_lat + d_lat_km * lat_deg_per_km,
        center_lon + d_lon_km * lon_deg_per_km,
    )
}

/// Approximate distance in kilometers for a degree-space offset.
///
/// Treats both axes at the 111 km/degree latitude scale, with no longitude
/// correction. Used only for the grid boundary trim, never for the area
/// filter.
pub fn km_distance(d_lat_deg: f64, d_lon_deg: f64) -> f64 {
    (d_lat_deg * d_lat_deg + d_lon_deg * d_lon_deg).sqrt() * KM_PER_DEGREE
}
