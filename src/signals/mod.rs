pub mod composite;

pub use composite::{confidence_for, direction_for, evaluate, Signal, MAX_SCORE};
