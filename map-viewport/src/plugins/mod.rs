pub mod boundary;
pub mod points;
pub mod teams;

pub use boundary::BoundaryHighlight;
pub use points::PointMarkers;
pub use teams::TeamMarkers;
