//! Reduction of a [System] plus [Potential] into the primitive parameters
//! needed to materialize the configuration inside the engine, for both the
//! interactive and batch paths.

use serde::{Deserialize, Serialize};

use crate::{
    LammpsError, potential::Potential, system::System, units::UnitSet,
};

/// The primitive parameter set for one configuration. Distances and
/// velocities are already in the engine units of `units`. Serializes, so a
/// payload can cross a process boundary where a [System] handle cannot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunParams {
    pub units: String,
    pub atom_style: String,
    pub pbc: [bool; 3],
    pub natypes: usize,
    /// `region prism` parameters: xlo, xhi, ylo, yhi, zlo, zhi, xy, xz, yz
    pub region: [f64; 9],
    pub atype: Vec<u32>,
    /// flattened positions, 3 per atom
    pub x: Vec<f64>,
    /// flattened velocities, 3 per atom
    pub v: Option<Vec<f64>>,
    pub symbols: Vec<String>,
    pub masses: Vec<f64>,
    pub pair_info: Option<String>,
}

/// Explicit per-call overrides. An override beats the potential's value,
/// which beats the default (`metal`, `atomic`, the system's own type count).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Overrides {
    pub units: Option<String>,
    pub atom_style: Option<String>,
    pub natypes: Option<usize>,
}

/// Build the primitive parameters for `system`. Fails with no side effects
/// if the cell is not in LAMMPS form or the resolved unit style is unknown.
pub fn run_params(
    system: &System,
    potential: Option<&dyn Potential>,
    overrides: &Overrides,
    include_velocities: bool,
    with_pair_info: bool,
) -> Result<RunParams, LammpsError> {
    if !system.cell.is_lammps_norm() {
        return Err(LammpsError::NotNormalized);
    }

    let units = overrides
        .units
        .clone()
        .or_else(|| potential.map(|p| p.units().to_string()))
        .unwrap_or_else(|| "metal".to_string());
    let atom_style = overrides
        .atom_style
        .clone()
        .or_else(|| potential.map(|p| p.atom_style().to_string()))
        .unwrap_or_else(|| "atomic".to_string());
    let natypes = overrides
        .natypes
        .or_else(|| {
            potential.map(|p| p.normalize_symbols(&system.symbols).len())
        })
        .unwrap_or_else(|| system.natypes());

    let us = UnitSet::for_style(&units)?;
    let region = system
        .cell
        .region_params()
        .map(|b| UnitSet::from_working(b, us.distance));
    let x = system
        .pos
        .iter()
        .flatten()
        .map(|&c| UnitSet::from_working(c, us.distance))
        .collect();
    let v = if include_velocities {
        system.vel.as_ref().map(|vel| {
            vel.iter()
                .flatten()
                .map(|&c| UnitSet::from_working(c, us.velocity))
                .collect()
        })
    } else {
        None
    };
    let pair_info = if with_pair_info {
        potential.map(|p| p.pair_info(&system.symbols, &system.masses))
    } else {
        None
    };

    Ok(RunParams {
        units,
        atom_style,
        pbc: system.pbc,
        natypes,
        region,
        atype: system.atype.clone(),
        x,
        v,
        symbols: system.symbols.clone(),
        masses: system.masses.clone(),
        pair_info,
    })
}
