pub use crate::errors::{ErrorType, RegrunError};

pub mod annotations;
pub mod cli;
pub mod config;
pub mod directive;
pub mod discovery;
pub mod errors;
pub mod fixture;
pub mod harness;
pub mod options;
pub mod syntax;

pub use crate::directive::{Directive, ListOp, Verb};
pub use crate::fixture::{FixtureId, TestCase};
