pub mod types;

pub use types::{
    CheckResult, ResolutionMethod, ResolvedPosition, Severity, TextFragment, Violation,
};
