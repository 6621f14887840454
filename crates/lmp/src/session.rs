//! The interactive engine adapter: a raw [Session] binding supplied by the
//! caller, wrapped in an explicit configuration state machine.

use crate::{
    LammpsError,
    config::RunParams,
    units::UnitSet,
    version::{Syntax, version_date},
};

/// The library boundary of a live engine session. Implementations are
/// injected by the caller; this crate never constructs one on its own.
pub trait Session {
    /// execute one engine command
    fn command(&mut self, cmd: &str) -> Result<(), LammpsError>;

    /// execute a multi-line command block
    fn commands(&mut self, script: &str) -> Result<(), LammpsError> {
        for line in script.lines() {
            self.command(line)?;
        }
        Ok(())
    }

    /// bulk atom creation: one type index and three coordinates per atom,
    /// optional flattened velocities
    fn create_atoms(
        &mut self,
        atype: &[u32],
        x: &[f64],
        v: Option<&[f64]>,
    ) -> Result<(), LammpsError>;

    /// engine version as a `yyyymmdd` integer
    fn version(&self) -> i64;

    /// the currently configured unit style
    fn units(&self) -> Result<String, LammpsError>;

    fn natoms(&self) -> usize;

    /// current value of a thermo keyword, engine units
    fn thermo(&self, keyword: &str) -> Result<f64, LammpsError>;

    /// per-atom forces, engine units
    fn forces(&self) -> Result<Vec<[f64; 3]>, LammpsError>;
}

/// Where a session is in the box/atoms/potential/run sequence. Operations
/// requested out of order are rejected here rather than left to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    BoxDefined,
    AtomsCreated,
    PotentialApplied,
    Evaluated,
}

/// Observables from one zero-step evaluation, in working units.
#[derive(Clone, Debug, PartialEq)]
pub struct RawRun {
    pub e_pot_total: f64,
    pub e_pot_atom: f64,
    pub p_xx: f64,
    pub p_yy: f64,
    pub p_zz: f64,
    pub forces: Option<Vec<[f64; 3]>>,
}

/// A live session plus the syntax policy for its release, resolved once at
/// construction.
pub struct Interactive {
    session: Box<dyn Session>,
    syntax: Syntax,
    phase: Phase,
}

pub(crate) fn boundary_str(pbc: [bool; 3]) -> String {
    pbc.map(|p| if p { "p" } else { "m" }).join(" ")
}

impl Interactive {
    pub fn new(session: Box<dyn Session>) -> Result<Self, LammpsError> {
        let date = version_date(session.version())?;
        Ok(Self {
            session,
            syntax: Syntax::for_date(date),
            phase: Phase::Uninitialized,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    fn expect(
        &self,
        op: &'static str,
        phase: Phase,
    ) -> Result<(), LammpsError> {
        if self.phase != phase {
            return Err(LammpsError::OutOfOrder {
                op,
                phase: self.phase,
            });
        }
        Ok(())
    }

    /// Clear the session entirely, returning it to the uninitialized phase.
    pub fn reset(&mut self) -> Result<(), LammpsError> {
        self.session.command("clear")?;
        self.phase = Phase::Uninitialized;
        Ok(())
    }

    /// Clear the session and define a fresh box. Entry point of the setup
    /// sequence, so it is allowed from any phase.
    pub fn define_box(
        &mut self,
        units: &str,
        atom_style: &str,
        pbc: [bool; 3],
        region: &[f64; 9],
        natypes: usize,
    ) -> Result<(), LammpsError> {
        self.session.command("clear")?;
        if self.syntax.box_tilt_large {
            self.session.command("box tilt large")?;
        }
        self.session.command(&format!("units {units}"))?;
        self.session.command(&format!("atom_style {atom_style}"))?;
        self.session
            .command(&format!("boundary {}", boundary_str(pbc)))?;
        let [xlo, xhi, ylo, yhi, zlo, zhi, xy, xz, yz] = region;
        self.session.command(&format!(
            "region box prism {xlo} {xhi} {ylo} {yhi} {zlo} {zhi} {xy} {xz} {yz}"
        ))?;
        self.session.command(&format!("create_box {natypes} box"))?;
        self.phase = Phase::BoxDefined;
        Ok(())
    }

    pub fn create_atoms(
        &mut self,
        atype: &[u32],
        x: &[f64],
        v: Option<&[f64]>,
    ) -> Result<(), LammpsError> {
        self.expect("create_atoms", Phase::BoxDefined)?;
        if atype.is_empty() {
            return Err(LammpsError::NoAtoms);
        }
        if x.len() != 3 * atype.len() {
            return Err(LammpsError::AtomMismatch {
                natoms: atype.len(),
                len: x.len(),
            });
        }
        if let Some(v) = v {
            if v.len() != x.len() {
                return Err(LammpsError::VelocityMismatch {
                    natoms: atype.len(),
                    len: v.len(),
                });
            }
        }
        self.session.create_atoms(atype, x, v)?;
        self.phase = Phase::AtomsCreated;
        Ok(())
    }

    pub fn apply_potential(
        &mut self,
        pair_info: &str,
    ) -> Result<(), LammpsError> {
        self.expect("apply_potential", Phase::AtomsCreated)?;
        self.session.commands(pair_info)?;
        self.phase = Phase::PotentialApplied;
        Ok(())
    }

    /// Integrate zero timesteps to force one thermodynamic and force
    /// evaluation, with a fixed full-precision output format.
    pub fn run_zero(&mut self) -> Result<(), LammpsError> {
        self.expect("run_zero", Phase::PotentialApplied)?;
        self.session
            .command("thermo_style custom step pxx pyy pzz pe")?;
        self.session.command("thermo_modify format float %.13e")?;
        self.session.command("fix nve all nve")?;
        self.session.command("run 0")?;
        self.phase = Phase::Evaluated;
        Ok(())
    }

    /// Run a complete prepared script verbatim. The script is trusted to
    /// set up and evaluate a configuration on its own.
    pub fn run_script(&mut self, script: &str) -> Result<(), LammpsError> {
        self.session.commands(script)?;
        self.phase = Phase::Evaluated;
        Ok(())
    }

    /// Materialize a configuration from its primitive parameters and
    /// evaluate it: the whole define/create/apply/run sequence.
    pub fn run_params(
        &mut self,
        params: &RunParams,
    ) -> Result<(), LammpsError> {
        self.define_box(
            &params.units,
            &params.atom_style,
            params.pbc,
            &params.region,
            params.natypes,
        )?;
        self.create_atoms(&params.atype, &params.x, params.v.as_deref())?;
        let Some(pair_info) = &params.pair_info else {
            return Err(LammpsError::MissingPairInfo);
        };
        self.apply_potential(pair_info)?;
        self.run_zero()
    }

    /// Extract the observables of the last evaluation, converted to working
    /// units using the session's own unit style.
    pub fn extract(
        &mut self,
        include_forces: bool,
    ) -> Result<RawRun, LammpsError> {
        self.expect("extract", Phase::Evaluated)?;
        let units = UnitSet::for_style(&self.session.units()?)?;
        let natoms = self.session.natoms();
        if natoms == 0 {
            return Err(LammpsError::NoAtoms);
        }
        let pe = self.session.thermo("pe")? * units.energy;
        let forces = if include_forces {
            let raw = self.session.forces()?;
            Some(raw.iter().map(|f| f.map(|c| c * units.force)).collect())
        } else {
            None
        };
        Ok(RawRun {
            e_pot_total: pe,
            e_pot_atom: pe / natoms as f64,
            p_xx: self.session.thermo("pxx")? * units.pressure,
            p_yy: self.session.thermo("pyy")? * units.pressure,
            p_zz: self.session.thermo("pzz")? * units.pressure,
            forces,
        })
    }
}

#[cfg(test)]
mod tests;
