pub mod error;
pub mod filter;
pub mod nearest_neighbours;
pub mod request;
pub mod source;
pub mod stations_frame;
