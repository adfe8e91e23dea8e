pub mod engine;

pub use engine::{Evaluation, IntonationEngine, Severity};
