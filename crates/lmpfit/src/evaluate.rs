//! The evaluation dispatcher: drive an engine handle over a batch of
//! configurations and return one uniformly shaped result table.

use lmp::{
    Engine, LammpsError,
    config::{Overrides, RunParams, run_params},
    potential::Potential,
    script::build_combined_script,
    session::RawRun,
    system::System,
    units::UnitSet,
};
use serde::{Deserialize, Serialize};

use crate::FitError;

/// One evaluation request. The three kinds are mutually exclusive by
/// construction; payloads are the form that can cross a process boundary.
pub enum Request<'a> {
    /// complete input scripts, run verbatim, one configuration each
    Scripts(&'a [String]),
    /// reference systems sharing one potential
    Systems {
        systems: &'a [System],
        potential: &'a dyn Potential,
    },
    /// pre-extracted primitive parameter records
    Payloads(&'a [RunParams]),
}

impl Request<'_> {
    pub fn len(&self) -> usize {
        match self {
            Request::Scripts(s) => s.len(),
            Request::Systems { systems, .. } => systems.len(),
            Request::Payloads(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EvalOptions {
    /// extract per-atom forces (interactive sessions only)
    pub include_forces: bool,
    /// inject system velocities when materializing configurations
    /// (interactive sessions only)
    pub include_velocities: bool,
    /// declared unit style of script-mode output on a batch handle
    pub units: String,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            include_forces: false,
            include_velocities: false,
            units: "metal".to_string(),
        }
    }
}

/// Result table: one row per requested configuration, in request order,
/// working units throughout. Either complete or never returned.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalResult {
    pub e_pot_total: Vec<f64>,
    pub e_pot_atom: Vec<f64>,
    pub p_xx: Vec<f64>,
    pub p_yy: Vec<f64>,
    pub p_zz: Vec<f64>,
    pub forces: Option<Vec<Vec<[f64; 3]>>>,
}

impl EvalResult {
    fn with_capacity(n: usize, forces: bool) -> Self {
        Self {
            e_pot_total: Vec::with_capacity(n),
            e_pot_atom: Vec::with_capacity(n),
            p_xx: Vec::with_capacity(n),
            p_yy: Vec::with_capacity(n),
            p_zz: Vec::with_capacity(n),
            forces: forces.then(|| Vec::with_capacity(n)),
        }
    }

    pub fn len(&self) -> usize {
        self.e_pot_total.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&mut self, raw: RawRun) {
        self.e_pot_total.push(raw.e_pot_total);
        self.e_pot_atom.push(raw.e_pot_atom);
        self.p_xx.push(raw.p_xx);
        self.p_yy.push(raw.p_yy);
        self.p_zz.push(raw.p_zz);
        if let (Some(forces), Some(f)) = (&mut self.forces, raw.forces) {
            forces.push(f);
        }
    }

    /// flattened column by interchange name, if present
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        match name {
            "E_pot_total" => Some(self.e_pot_total.clone()),
            "E_pot_atom" => Some(self.e_pot_atom.clone()),
            "P_xx" => Some(self.p_xx.clone()),
            "P_yy" => Some(self.p_yy.clone()),
            "P_zz" => Some(self.p_zz.clone()),
            "F" => self.forces.as_ref().map(|forces| {
                forces
                    .iter()
                    .flat_map(|cfg| cfg.iter().flatten().copied())
                    .collect()
            }),
            _ => None,
        }
    }
}

/// Evaluate every configuration in `request` on `lmp`. Contract checks run
/// before the engine is touched, and any failure mid-batch aborts the whole
/// call; there is no partial result.
pub fn evaluate(
    lmp: &mut Engine,
    request: &Request,
    opts: &EvalOptions,
) -> Result<EvalResult, FitError> {
    if request.is_empty() {
        return Err(FitError::EmptyRequest);
    }
    match lmp {
        Engine::Interactive(lmp) => {
            let mut results =
                EvalResult::with_capacity(request.len(), opts.include_forces);
            match request {
                Request::Scripts(scripts) => {
                    for script in *scripts {
                        lmp.run_script(script)?;
                        results.push(lmp.extract(opts.include_forces)?);
                    }
                }
                Request::Systems { systems, potential } => {
                    for system in *systems {
                        let params = run_params(
                            system,
                            Some(*potential),
                            &Overrides::default(),
                            opts.include_velocities,
                            true,
                        )?;
                        lmp.run_params(&params)?;
                        results.push(lmp.extract(opts.include_forces)?);
                    }
                }
                Request::Payloads(payloads) => {
                    for params in *payloads {
                        lmp.run_params(params)?;
                        results.push(lmp.extract(opts.include_forces)?);
                    }
                }
            }
            Ok(results)
        }
        Engine::Batch(lmp) => {
            if matches!(request, Request::Payloads(_)) {
                return Err(FitError::PayloadsUnsupported);
            }
            if opts.include_forces {
                return Err(FitError::ForcesUnsupported);
            }
            if opts.include_velocities {
                return Err(FitError::VelocitiesUnsupported);
            }
            let (script, units) = match request {
                Request::Scripts(scripts) => {
                    (scripts.join("\n"), opts.units.clone())
                }
                Request::Systems { systems, potential } => (
                    build_combined_script(
                        systems,
                        *potential,
                        lmp.syntax(),
                    )?,
                    potential.units().to_string(),
                ),
                Request::Payloads(_) => unreachable!(),
            };
            let units = UnitSet::for_style(&units)?;
            let rows = lmp.run(&script)?;
            if rows.len() != request.len() {
                return Err(FitError::Engine(LammpsError::MalformedLog(
                    format!(
                        "expected {} thermo blocks, found {}",
                        request.len(),
                        rows.len()
                    ),
                )));
            }
            let mut results = EvalResult::with_capacity(rows.len(), false);
            for row in rows {
                results.push(RawRun {
                    e_pot_total: row.pot_eng * units.energy,
                    e_pot_atom: row.pe_atom * units.energy,
                    p_xx: row.pxx * units.pressure,
                    p_yy: row.pyy * units.pressure,
                    p_zz: row.pzz * units.pressure,
                    forces: None,
                });
            }
            Ok(results)
        }
    }
}
