// Core data models for growstage

pub mod counts;
pub mod stage;

pub use counts::*;
pub use stage::*;
