pub mod engine;
pub mod error;
pub mod selection;

pub use engine::{calculate_gpa, compute_gpa, GpaResult, SubjectContribution};
pub use error::ConfigError;
pub use selection::{Selection, SelectionMap};
