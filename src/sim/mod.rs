pub mod event;
pub mod level;
pub mod scheduler;
pub mod step;
pub mod world;
