pub mod agent;
pub mod display;
