pub mod coordinates;
pub mod distance_unit;
pub mod station;
