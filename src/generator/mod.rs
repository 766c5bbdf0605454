pub mod context;
pub mod conversation;
pub mod questionnaire;
pub mod research;
pub mod workflow;

#[cfg(test)]
pub mod testing;
