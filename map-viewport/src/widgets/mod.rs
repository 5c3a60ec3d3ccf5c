mod point_callout;
pub use point_callout::WidgetPointCallout;
