//! The potential-descriptor boundary: everything the engine layer needs to
//! know to apply an interatomic potential to a configuration.

use serde::{Deserialize, Serialize};

/// Implemented by potential records. `pair_info` generates the engine
/// command block (mass, pair_style, pair_coeff) for a species list.
pub trait Potential {
    /// the `units` style the potential's parameters are expressed in
    fn units(&self) -> &str;

    fn atom_style(&self) -> &str;

    /// map a system's symbols onto the potential's own symbol set. the
    /// length of the result is the number of atom types the potential
    /// defines for those symbols
    fn normalize_symbols(&self, symbols: &[String]) -> Vec<String> {
        symbols.to_vec()
    }

    fn pair_info(&self, symbols: &[String], masses: &[f64]) -> String;
}

/// A plain pair-style potential: one `pair_style` line and a fixed set of
/// `pair_coeff` lines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PairPotential {
    pub units: String,
    pub atom_style: String,
    pub pair_style: String,
    pub pair_coeffs: Vec<String>,
}

impl PairPotential {
    pub fn new(
        units: &str,
        atom_style: &str,
        pair_style: &str,
        pair_coeffs: Vec<String>,
    ) -> Self {
        Self {
            units: units.to_string(),
            atom_style: atom_style.to_string(),
            pair_style: pair_style.to_string(),
            pair_coeffs,
        }
    }

    /// the zero-interaction potential: every configuration evaluates to
    /// zero energy and stress
    pub fn none() -> Self {
        Self::new("metal", "atomic", "none", Vec::new())
    }
}

impl Potential for PairPotential {
    fn units(&self) -> &str {
        &self.units
    }

    fn atom_style(&self) -> &str {
        &self.atom_style
    }

    fn pair_info(&self, _symbols: &[String], masses: &[f64]) -> String {
        use std::fmt::Write;
        let mut info = String::new();
        for (i, mass) in masses.iter().enumerate() {
            writeln!(info, "mass {} {mass}", i + 1).unwrap();
        }
        writeln!(info, "pair_style {}", self.pair_style).unwrap();
        for coeff in &self.pair_coeffs {
            writeln!(info, "pair_coeff {coeff}").unwrap();
        }
        info
    }
}
