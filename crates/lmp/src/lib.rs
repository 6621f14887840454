//! Driving layer for the LAMMPS molecular dynamics engine.
//!
//! Two ways of running the engine are supported: an [Interactive] session
//! wrapping a live library binding supplied by the caller, and a [Batch]
//! runner that invokes a LAMMPS executable once per call and parses the
//! resulting log. Both produce the same observables (potential energy,
//! diagonal stress components, optionally per-atom forces) in the working
//! units of [units::UnitSet].

use std::{error::Error, fmt::Display};

use jiff::civil::Date;

pub mod config;
pub mod potential;
pub mod run;
pub mod script;
pub mod session;
pub mod system;
pub mod units;
pub mod version;

pub use config::{Overrides, RunParams, run_params};
pub use potential::{PairPotential, Potential};
pub use run::Batch;
pub use session::{Interactive, Phase, RawRun, Session};
pub use system::{Cell, System};
pub use units::UnitSet;
pub use version::{Syntax, check_version, version_date};

#[derive(Debug, PartialEq)]
pub enum LammpsError {
    /// the system's cell is not in LAMMPS triangular form
    NotNormalized,
    /// unit style not in the conversion table
    UnknownUnits(String),
    /// the engine's release date could not be determined
    VersionUnresolved(String),
    /// a session operation was requested in the wrong phase
    OutOfOrder {
        op: &'static str,
        phase: Phase,
    },
    /// payload or configuration carried no pair commands
    MissingPairInfo,
    /// position array length does not match the atom count
    AtomMismatch {
        natoms: usize,
        len: usize,
    },
    /// velocity array length does not match the position array
    VelocityMismatch {
        natoms: usize,
        len: usize,
    },
    NoAtoms,
    /// failure reported by the library binding
    Session(String),
    /// failed to launch the executable or touch its scratch files
    Spawn(String, std::io::ErrorKind),
    /// the executable exited with a failure status
    Exited(String),
    /// the engine wrote an error message into its log
    ErrorInOutput(String),
    MalformedLog(String),
    /// a required thermo column is missing from the log
    ThermoNotFound(String),
}

impl Display for LammpsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for LammpsError {}

/// A handle on the engine, supplied by the caller. Interactive sessions are
/// required for force extraction, velocity injection, and payload
/// materialization; batch handles only need an executable on disk.
pub enum Engine {
    Interactive(Interactive),
    Batch(Batch),
}

impl Engine {
    pub fn interactive(
        session: Box<dyn Session>,
    ) -> Result<Self, LammpsError> {
        Ok(Self::Interactive(Interactive::new(session)?))
    }

    /// resolve `exe`'s version and build a batch handle. fatal if the
    /// version cannot be determined
    pub fn batch(
        exe: impl Into<std::path::PathBuf>,
    ) -> Result<Self, LammpsError> {
        Ok(Self::Batch(Batch::new(exe)?))
    }

    /// batch handle with a known release date, skipping the version check
    pub fn batch_with_date(
        exe: impl Into<std::path::PathBuf>,
        date: Date,
    ) -> Self {
        Self::Batch(Batch::with_date(exe, date))
    }
}
