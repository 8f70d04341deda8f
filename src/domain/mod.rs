pub mod ai;
pub mod entity;
pub mod grid;
pub mod hole;
pub mod physics;
pub mod rules;
pub mod tile;
