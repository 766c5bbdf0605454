pub mod flatten;
pub mod json_repair;
pub mod text;
