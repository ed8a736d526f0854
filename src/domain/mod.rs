pub mod grid;
pub mod position;
pub mod rng;
pub mod rules;
pub mod tile;
