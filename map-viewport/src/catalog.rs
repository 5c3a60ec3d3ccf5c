use std::collections::HashMap;

use serde::Deserialize;
use walkers::Position;

use crate::types::{JurisdictionSelection, MapBounds};

/// Administrative level of a boundary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    Ward,
    District,
    Province,
}

/// One administrative jurisdiction known to the catalog.
///
/// An entry may carry only registry metadata (name, parent district,
/// optional centroid) without polygon data; such entries still anchor team
/// markers but never produce an overlay.
#[derive(Debug, Clone)]
pub struct JurisdictionBoundary {
    pub id: String,
    pub kind: BoundaryKind,
    pub name: String,
    pub parent_district: Option<String>,
    /// Ordered `(lat, lon)` vertices. Empty for metadata-only entries.
    pub polygon: Vec<(f64, f64)>,
    pub bbox: Option<MapBounds>,
    pub centroid: Option<Position>,
}

impl JurisdictionBoundary {
    /// Builds an entry, deriving the bounding box and centroid from the
    /// polygon vertices when they are not supplied.
    pub fn from_polygon(
        id: impl Into<String>,
        kind: BoundaryKind,
        name: impl Into<String>,
        parent_district: Option<String>,
        polygon: Vec<(f64, f64)>,
    ) -> Self {
        let bbox = polygon_bbox(&polygon);
        let centroid = polygon_centroid(&polygon);
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            parent_district,
            polygon,
            bbox,
            centroid,
        }
    }

    /// A drawable polygon needs at least a triangle.
    pub fn has_polygon(&self) -> bool {
        self.polygon.len() >= 3
    }
}

/// Read-only registry of jurisdiction boundaries, loaded once at startup.
#[derive(Debug, Default)]
pub struct BoundaryCatalog {
    entries: HashMap<String, JurisdictionBoundary>,
}

#[derive(Debug, Deserialize)]
struct BoundaryDoc {
    boundaries: Vec<BoundaryRecord>,
}

#[derive(Debug, Deserialize)]
struct BoundaryRecord {
    id: String,
    kind: BoundaryKind,
    name: String,
    #[serde(default)]
    parent_district: Option<String>,
    #[serde(default)]
    polygon: Vec<[f64; 2]>,
    #[serde(default)]
    bbox: Option<MapBounds>,
    #[serde(default)]
    centroid: Option<[f64; 2]>,
}

impl BoundaryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the catalog from its JSON document. Bounding boxes and
    /// centroids absent from the document are derived from the polygon.
    pub fn from_json_str(doc: &str) -> Result<Self, CatalogError> {
        let doc: BoundaryDoc = serde_json::from_str(doc).map_err(CatalogError::from)?;
        let mut catalog = Self::new();
        for record in doc.boundaries {
            let polygon: Vec<(f64, f64)> =
                record.polygon.iter().map(|v| (v[0], v[1])).collect();
            let bbox = record.bbox.or_else(|| polygon_bbox(&polygon));
            let centroid = record
                .centroid
                .map(|c| Position::from_lat_lon(c[0], c[1]))
                .or_else(|| polygon_centroid(&polygon));
            catalog.insert(JurisdictionBoundary {
                id: record.id,
                kind: record.kind,
                name: record.name,
                parent_district: record.parent_district,
                polygon,
                bbox,
                centroid,
            });
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, boundary: JurisdictionBoundary) {
        self.entries.insert(boundary.id.clone(), boundary);
    }

    pub fn get(&self, id: &str) -> Option<&JurisdictionBoundary> {
        self.entries.get(id)
    }

    pub fn centroid_of(&self, id: &str) -> Option<Position> {
        self.entries.get(id).and_then(|b| b.centroid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The boundary an overlay should draw for the given selection: the
    /// ward's polygon when cataloged, otherwise the district's (which also
    /// covers a selected ward without polygon data), otherwise none.
    pub fn resolve_effective(
        &self,
        selection: &JurisdictionSelection,
    ) -> Option<&JurisdictionBoundary> {
        if let Some(ward_id) = &selection.ward_id {
            if let Some(boundary) = self.entries.get(ward_id) {
                if boundary.has_polygon() {
                    return Some(boundary);
                }
            }
        }
        if let Some(district_id) = &selection.district_id {
            if let Some(boundary) = self.entries.get(district_id) {
                if boundary.has_polygon() {
                    return Some(boundary);
                }
            }
        }
        None
    }
}

fn polygon_bbox(polygon: &[(f64, f64)]) -> Option<MapBounds> {
    MapBounds::from_positions(
        polygon
            .iter()
            .map(|(lat, lon)| Position::from_lat_lon(*lat, *lon)),
    )
}

fn polygon_centroid(polygon: &[(f64, f64)]) -> Option<Position> {
    if polygon.is_empty() {
        return None;
    }
    let n = polygon.len() as f64;
    let lat = polygon.iter().map(|(lat, _)| lat).sum::<f64>() / n;
    let lon = polygon.iter().map(|(_, lon)| lon).sum::<f64>() / n;
    Some(Position::from_lat_lon(lat, lon))
}

#[derive(Debug)]
pub enum CatalogError {
    Parse(serde_json::Error),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Parse(e) => write!(f, "Catalog parse error: {}", e),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Parse(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Parse(err)
    }
}
