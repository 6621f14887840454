//! Fitting of interatomic-potential parameters against reference data.
//!
//! The pieces chain the way [fit::fit] wires them: a [params::ParamBuilder]
//! persists each trial parameter set, [evaluate::evaluate] drives an
//! [lmp::Engine] over the reference configurations, [error::errorfxn]
//! scores the result against [record::ReferenceStructure] targets, and an
//! [optimize::Optimizer] searches for the parameter vector minimizing that
//! score.

use std::{error::Error, fmt::Display};

use lmp::LammpsError;

pub mod error;
pub mod evaluate;
pub mod fit;
pub mod optimize;
pub mod params;
pub mod record;

pub use error::{Weight, Weights, errorfxn};
pub use evaluate::{EvalOptions, EvalResult, Request, evaluate};
pub use fit::{FitParams, FitResult, fit};
pub use optimize::{Minimum, NelderMead, Optimizer};
pub use params::{ParamBuilder, ParamTable};
pub use record::{ReferenceStructure, reference_values};

#[derive(Debug, PartialEq)]
pub enum FitError {
    /// the request names no scripts, systems, or payloads
    EmptyRequest,
    /// payload materialization needs a live session
    PayloadsUnsupported,
    /// force extraction needs a live session
    ForcesUnsupported,
    /// velocity injection needs a live session
    VelocitiesUnsupported,
    /// a weighted column is absent from the values or the references
    MissingColumn(String),
    /// an elementwise weight array does not match its column
    WeightShape {
        column: String,
        expected: usize,
        got: usize,
    },
    /// compared columns disagree in length
    ColumnShape {
        column: String,
        expected: usize,
        got: usize,
    },
    /// a parameter name the builder cannot resolve
    UnknownParameter(String),
    NoParameters,
    ParamParse(String),
    Io(String, std::io::ErrorKind),
    Engine(LammpsError),
    Optimizer(String),
}

impl Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for FitError {}

impl From<LammpsError> for FitError {
    fn from(e: LammpsError) -> Self {
        Self::Engine(e)
    }
}
