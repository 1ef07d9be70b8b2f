pub mod dataset;
pub mod render;
pub mod runner;
pub mod simulation;

pub use dataset::{GraphData, TopicGraph};
pub use runner::SimulationRunner;
pub use simulation::{ForceSimulation, LayoutSnapshot, SimulationParams};
