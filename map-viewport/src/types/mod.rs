mod point;
pub use point::Point;

mod team;
pub use team::Team;

mod jurisdiction;
pub use jurisdiction::JurisdictionSelection;

mod map_bounds;
pub use map_bounds::MapBounds;
