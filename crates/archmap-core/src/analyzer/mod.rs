pub mod facts;
pub mod pipeline;
pub mod walker;
