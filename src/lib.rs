pub mod cli;
pub mod config;
pub mod generator;
pub mod llm;
pub mod types;
pub mod utils;
pub mod workspace;

// Re-export commonly used types
pub use config::Config;
pub use generator::workflow::launch;
