pub mod pipeline;
pub mod roster;
pub mod summary;
