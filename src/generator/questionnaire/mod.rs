//! 问卷：检索、意图分析、答案预填与前置访谈

pub mod filler;
pub mod intent;
pub mod prerequisites;
pub mod retriever;
