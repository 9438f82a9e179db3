pub mod cost;
pub mod params;
