//! Reference structures: an atomic system bundled with the target values it
//! should reproduce, all in working units.

use lmp::system::System;
use serde::{Deserialize, Serialize};

use crate::evaluate::EvalResult;

/// One first-principles reference configuration. Per-atom force labels, if
/// any, ride on `system.forces`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceStructure {
    pub system: System,
    pub e_pot_total: f64,
    pub e_pot_atom: f64,
    pub p_xx: f64,
    pub p_yy: f64,
    pub p_zz: f64,
}

/// Assemble the comparison table for a set of reference structures. The `F`
/// column is present only when every structure carries force labels.
pub fn reference_values(refs: &[ReferenceStructure]) -> EvalResult {
    EvalResult {
        e_pot_total: refs.iter().map(|r| r.e_pot_total).collect(),
        e_pot_atom: refs.iter().map(|r| r.e_pot_atom).collect(),
        p_xx: refs.iter().map(|r| r.p_xx).collect(),
        p_yy: refs.iter().map(|r| r.p_yy).collect(),
        p_zz: refs.iter().map(|r| r.p_zz).collect(),
        forces: refs
            .iter()
            .map(|r| r.system.forces.clone())
            .collect::<Option<Vec<_>>>(),
    }
}
