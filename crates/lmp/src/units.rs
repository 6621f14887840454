//! Conversion between LAMMPS unit styles and the working units used for
//! comparisons: angstrom, eV, eV/angstrom, GPa, and angstrom/picosecond.

use crate::LammpsError;

/// eV per kcal/mol
const KCAL: f64 = 0.04336410424180094;
/// eV per Joule
const JOULE: f64 = 6.241509074460763e18;
/// GPa per bar
const BAR: f64 = 1e-4;
/// GPa per atmosphere
const ATM: f64 = 1.01325e-4;

/// Multiplicative factors taking engine-native values into working units.
/// Divide to go the other way, as [Self::from_working] does for the
/// quantities that are pushed *into* the engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitSet {
    pub distance: f64,
    pub velocity: f64,
    pub energy: f64,
    pub force: f64,
    pub pressure: f64,
}

impl UnitSet {
    /// look up the conversion factors for a LAMMPS `units` style.
    /// currently covers `lj`, `real`, `metal`, and `si`
    pub fn for_style(style: &str) -> Result<Self, LammpsError> {
        let set = match style {
            "lj" => Self {
                distance: 1.0,
                velocity: 1.0,
                energy: 1.0,
                force: 1.0,
                pressure: 1.0,
            },
            "real" => Self {
                distance: 1.0,
                velocity: 1e3,
                energy: KCAL,
                force: KCAL,
                pressure: ATM,
            },
            "metal" => Self {
                distance: 1.0,
                velocity: 1.0,
                energy: 1.0,
                force: 1.0,
                pressure: BAR,
            },
            "si" => Self {
                distance: 1e10,
                velocity: 1e-2,
                energy: JOULE,
                force: JOULE * 1e-10,
                pressure: 1e-9,
            },
            _ => return Err(LammpsError::UnknownUnits(style.to_string())),
        };
        Ok(set)
    }

    /// convert a working-unit value into engine units given the factor for
    /// its quantity (one of the fields of `self`)
    pub fn from_working(value: f64, factor: f64) -> f64 {
        value / factor
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use test_case::test_case;

    use super::*;

    #[test_case("lj" ; "lj")]
    #[test_case("real" ; "real")]
    #[test_case("metal" ; "metal")]
    #[test_case("si" ; "si")]
    fn known_styles(style: &str) {
        UnitSet::for_style(style).unwrap();
    }

    #[test]
    fn unknown_style() {
        assert_eq!(
            UnitSet::for_style("micro"),
            Err(LammpsError::UnknownUnits("micro".to_string()))
        );
    }

    #[test]
    fn metal_pressure() {
        // 1 bar = 1e-4 GPa
        let u = UnitSet::for_style("metal").unwrap();
        assert_abs_diff_eq!(1e5 * u.pressure, 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(u.energy, 1.0);
    }

    #[test]
    fn real_energy() {
        let u = UnitSet::for_style("real").unwrap();
        // 23.06 kcal/mol is about 1 eV
        assert_abs_diff_eq!(23.06054 * u.energy, 1.0, epsilon = 1e-5);
        // velocities come back in angstrom/fs
        assert_abs_diff_eq!(u.velocity, 1e3);
    }

    #[test]
    fn si_force() {
        let u = UnitSet::for_style("si").unwrap();
        // 1 nN = 6.2415 eV/angstrom
        assert_abs_diff_eq!(1e-9 * u.force, 0.6241509074, epsilon = 1e-9);
    }

    #[test]
    fn round_trip() {
        let u = UnitSet::for_style("real").unwrap();
        let v = UnitSet::from_working(2.5, u.velocity);
        assert_abs_diff_eq!(v * u.velocity, 2.5, epsilon = 1e-12);
    }
}
