use serde::Deserialize;
use walkers::Position;

/// Represents the geographical boundaries of a map view, defined by minimum
/// and maximum latitude and longitude.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MapBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl MapBounds {
    /// Smallest box containing every given position, or `None` for an empty
    /// iterator.
    pub fn from_positions<I>(positions: I) -> Option<MapBounds>
    where
        I: IntoIterator<Item = Position>,
    {
        let mut iter = positions.into_iter();
        let first = iter.next()?;
        let mut bounds = MapBounds {
            min_lat: first.lat(),
            max_lat: first.lat(),
            min_lon: first.lon(),
            max_lon: first.lon(),
        };
        for pos in iter {
            bounds.min_lat = bounds.min_lat.min(pos.lat());
            bounds.max_lat = bounds.max_lat.max(pos.lat());
            bounds.min_lon = bounds.min_lon.min(pos.lon());
            bounds.max_lon = bounds.max_lon.max(pos.lon());
        }
        Some(bounds)
    }

    pub fn center(&self) -> Position {
        Position::from_lat_lon(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Checks whether a given position is within the map bounds.
    pub fn contains(&self, pos: &Position) -> bool {
        pos.lat() >= self.min_lat
            && pos.lat() <= self.max_lat
            && pos.lon() >= self.min_lon
            && pos.lon() <= self.max_lon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_cover_all_positions() {
        let bounds = MapBounds::from_positions(vec![
            Position::from_lat_lon(21.0, 105.8),
            Position::from_lat_lon(20.5, 106.2),
            Position::from_lat_lon(21.4, 105.5),
        ])
        .unwrap();

        assert_eq!(bounds.min_lat, 20.5);
        assert_eq!(bounds.max_lat, 21.4);
        assert_eq!(bounds.min_lon, 105.5);
        assert_eq!(bounds.max_lon, 106.2);
        assert!(bounds.contains(&Position::from_lat_lon(21.0, 105.8)));
        assert!(!bounds.contains(&Position::from_lat_lon(10.0, 105.8)));
    }

    #[test]
    fn empty_iterator_has_no_bounds() {
        assert!(MapBounds::from_positions(Vec::new()).is_none());
    }
}
