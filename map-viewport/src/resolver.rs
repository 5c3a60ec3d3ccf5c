use std::collections::HashMap;
use std::path::Path;

use logger::Logger;
use serde::Deserialize;
use walkers::Position;

use crate::types::{MapBounds, Point};

/// A trait that defines the remote jurisdiction-coordinate service. This
/// seam lets the dashboard run against the production service, a local
/// coordinate table, or a test double.
pub trait JurisdictionLookup {
    fn lookup(&mut self, jurisdiction_id: &str) -> Result<Option<LookupRecord>, LookupError>;
}

/// What the coordinate service knows about a jurisdiction.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupRecord {
    pub center: Position,
    pub bounds: Option<MapBounds>,
}

/// A usable camera target for a jurisdiction.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCenter {
    pub center: Position,
    pub bounds: Option<MapBounds>,
}

/// Resolves a center/bounds for a jurisdiction id, preferring a centroid
/// computed from the points currently on screen over a remote lookup.
pub struct CoordinateResolver<L: JurisdictionLookup> {
    lookup: L,
    logger: Option<Logger>,
}

impl<L: JurisdictionLookup> CoordinateResolver<L> {
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    pub fn lookup_mut(&mut self) -> &mut L {
        &mut self.lookup
    }

    /// Fallback chain, short-circuiting on the first success:
    ///
    /// 1. mean of the current points' valid, non-zero coordinates (no
    ///    remote call is made when any exist);
    /// 2. remote lookup by id, returning its bounds when it has them;
    /// 3. the point-derived mean again, covering points that arrived while
    ///    the remote leg ran.
    ///
    /// `None` means "no usable location", never an error.
    pub fn resolve_jurisdiction_center(
        &mut self,
        jurisdiction_id: &str,
        current_points: &[Point],
    ) -> Option<ResolvedCenter> {
        if let Some(center) = points_mean(current_points) {
            return Some(ResolvedCenter {
                center,
                bounds: None,
            });
        }

        match self.lookup.lookup(jurisdiction_id) {
            Ok(Some(record)) => {
                return Some(ResolvedCenter {
                    center: record.center,
                    bounds: record.bounds,
                });
            }
            Ok(None) => {}
            Err(e) => {
                if let Some(log) = &self.logger {
                    let _ = log.warn(
                        &format!("coordinate lookup for {} failed: {}", jurisdiction_id, e),
                        false,
                    );
                }
            }
        }

        points_mean(current_points).map(|center| ResolvedCenter {
            center,
            bounds: None,
        })
    }
}

/// Mean of the centroid-eligible coordinates, `None` when there are none.
fn points_mean(points: &[Point]) -> Option<Position> {
    let mut lat_sum = 0.0;
    let mut lon_sum = 0.0;
    let mut count = 0usize;
    for position in points.iter().filter_map(Point::centroid_position) {
        lat_sum += position.lat();
        lon_sum += position.lon();
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some(Position::from_lat_lon(
        lat_sum / count as f64,
        lon_sum / count as f64,
    ))
}

/// Jurisdiction coordinate table loaded from CSV, standing in for the remote
/// coordinate service. Expected columns: `id,lat,lon` plus the optional
/// `min_lat,max_lat,min_lon,max_lon` bounding box.
pub struct TableLookup {
    entries: HashMap<String, LookupRecord>,
}

#[derive(Debug, Deserialize)]
struct LookupRow {
    id: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    min_lat: Option<f64>,
    #[serde(default)]
    max_lat: Option<f64>,
    #[serde(default)]
    min_lon: Option<f64>,
    #[serde(default)]
    max_lon: Option<f64>,
}

impl TableLookup {
    pub fn from_csv_path(path: &Path) -> Result<Self, LookupError> {
        let mut reader = csv::Reader::from_path(path).map_err(LookupError::from)?;
        let mut entries = HashMap::new();
        for result in reader.deserialize() {
            let row: LookupRow = result.map_err(LookupError::from)?;
            let bounds = match (row.min_lat, row.max_lat, row.min_lon, row.max_lon) {
                (Some(min_lat), Some(max_lat), Some(min_lon), Some(max_lon)) => Some(MapBounds {
                    min_lat,
                    max_lat,
                    min_lon,
                    max_lon,
                }),
                _ => None,
            };
            entries.insert(
                row.id,
                LookupRecord {
                    center: Position::from_lat_lon(row.lat, row.lon),
                    bounds,
                },
            );
        }
        Ok(Self { entries })
    }
}

impl JurisdictionLookup for TableLookup {
    fn lookup(&mut self, jurisdiction_id: &str) -> Result<Option<LookupRecord>, LookupError> {
        Ok(self.entries.get(jurisdiction_id).cloned())
    }
}

#[derive(Debug)]
pub enum LookupError {
    Csv(csv::Error),
    Unavailable(String),
}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupError::Csv(e) => write!(f, "Lookup table error: {}", e),
            LookupError::Unavailable(msg) => write!(f, "Lookup unavailable: {}", msg),
        }
    }
}

impl std::error::Error for LookupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LookupError::Csv(e) => Some(e),
            LookupError::Unavailable(_) => None,
        }
    }
}

impl From<csv::Error> for LookupError {
    fn from(err: csv::Error) -> Self {
        LookupError::Csv(err)
    }
}
