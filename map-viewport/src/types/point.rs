use serde::Deserialize;
use walkers::Position;

/// A point of interest subject to field inspection, as supplied by the
/// backing data source. Coordinates may be missing or NaN; such points are
/// kept in the list but never drawn.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Point {
    pub id: String,
    pub name: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub category: String,
    pub business_type: String,
    #[serde(default)]
    pub ward_id: Option<String>,
    #[serde(default)]
    pub district_id: Option<String>,
    #[serde(default)]
    pub province_id: Option<String>,
}

impl Point {
    /// The drawable position of the point. `(0, 0)` is a valid coordinate
    /// pair; only missing or non-finite values yield `None`.
    pub fn position(&self) -> Option<Position> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                Some(Position::from_lat_lon(lat, lng))
            }
            _ => None,
        }
    }

    /// Position usable for centroid math. Unlike [`Point::position`], the
    /// `(0, 0)` placeholder is excluded so it never drags a mean off-shore.
    pub fn centroid_position(&self) -> Option<Position> {
        self.position()
            .filter(|p| !(p.lat() == 0.0 && p.lon() == 0.0))
    }
}
