//! Minimal atomic-system types consumed by the configuration builder.
//! Systems are loaded by the caller and never mutated here.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// Simulation cell as row vectors plus an origin, all in angstroms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub vects: Matrix3<f64>,
    pub origin: Vector3<f64>,
}

impl Cell {
    /// orthorhombic cell with edge lengths `lx`, `ly`, `lz`
    pub fn orthorhombic(lx: f64, ly: f64, lz: f64) -> Self {
        Self::triclinic(lx, ly, lz, 0.0, 0.0, 0.0)
    }

    /// triclinic cell from LAMMPS edge lengths and tilt factors
    pub fn triclinic(
        lx: f64,
        ly: f64,
        lz: f64,
        xy: f64,
        xz: f64,
        yz: f64,
    ) -> Self {
        Self {
            vects: Matrix3::new(
                lx, 0.0, 0.0, //
                xy, ly, 0.0, //
                xz, yz, lz,
            ),
            origin: Vector3::zeros(),
        }
    }

    /// LAMMPS requires a = (lx,0,0), b = (xy,ly,0), c = (xz,yz,lz) with
    /// positive edge lengths
    pub fn is_lammps_norm(&self) -> bool {
        let m = &self.vects;
        m[(0, 1)] == 0.0
            && m[(0, 2)] == 0.0
            && m[(1, 2)] == 0.0
            && m[(0, 0)] > 0.0
            && m[(1, 1)] > 0.0
            && m[(2, 2)] > 0.0
    }

    pub fn xlo(&self) -> f64 {
        self.origin[0]
    }

    pub fn ylo(&self) -> f64 {
        self.origin[1]
    }

    pub fn zlo(&self) -> f64 {
        self.origin[2]
    }

    pub fn xhi(&self) -> f64 {
        self.xlo() + self.vects[(0, 0)]
    }

    pub fn yhi(&self) -> f64 {
        self.ylo() + self.vects[(1, 1)]
    }

    pub fn zhi(&self) -> f64 {
        self.zlo() + self.vects[(2, 2)]
    }

    pub fn xy(&self) -> f64 {
        self.vects[(1, 0)]
    }

    pub fn xz(&self) -> f64 {
        self.vects[(2, 0)]
    }

    pub fn yz(&self) -> f64 {
        self.vects[(2, 1)]
    }

    /// the nine parameters of a `region prism` command:
    /// (xlo, xhi, ylo, yhi, zlo, zhi, xy, xz, yz)
    pub fn region_params(&self) -> [f64; 9] {
        [
            self.xlo(),
            self.xhi(),
            self.ylo(),
            self.yhi(),
            self.zlo(),
            self.zhi(),
            self.xy(),
            self.xz(),
            self.yz(),
        ]
    }
}

/// One atomic configuration: cell, periodicity, species, positions, and
/// optional per-atom velocities and reference forces. Type indices are
/// 1-based as in the engine; `symbols` and `masses` are per type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct System {
    pub cell: Cell,
    pub pbc: [bool; 3],
    pub atype: Vec<u32>,
    pub pos: Vec<[f64; 3]>,
    pub vel: Option<Vec<[f64; 3]>>,
    pub forces: Option<Vec<[f64; 3]>>,
    pub symbols: Vec<String>,
    pub masses: Vec<f64>,
}

impl System {
    pub fn natoms(&self) -> usize {
        self.atype.len()
    }

    pub fn natypes(&self) -> usize {
        self.symbols.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fcc_al() -> System {
        let a = 4.05;
        System {
            cell: Cell::orthorhombic(a, a, a),
            pbc: [true; 3],
            atype: vec![1; 4],
            pos: vec![
                [0.0, 0.0, 0.0],
                [0.0, 2.025, 2.025],
                [2.025, 0.0, 2.025],
                [2.025, 2.025, 0.0],
            ],
            vel: None,
            forces: None,
            symbols: vec!["Al".to_string()],
            masses: vec![26.9815385],
        }
    }

    #[test]
    fn region() {
        let sys = fcc_al();
        assert_eq!(
            sys.cell.region_params(),
            [0.0, 4.05, 0.0, 4.05, 0.0, 4.05, 0.0, 0.0, 0.0]
        );
        assert!(sys.cell.is_lammps_norm());
        assert_eq!(sys.natoms(), 4);
        assert_eq!(sys.natypes(), 1);
    }

    #[test]
    fn tilted() {
        let cell = Cell::triclinic(4.0, 4.0, 4.0, 1.5, 0.0, 0.0);
        assert!(cell.is_lammps_norm());
        assert_eq!(cell.xy(), 1.5);
    }

    #[test]
    fn not_norm() {
        let mut cell = Cell::orthorhombic(4.0, 4.0, 4.0);
        cell.vects[(0, 1)] = 0.1;
        assert!(!cell.is_lammps_norm());

        let degenerate = Cell::orthorhombic(4.0, 0.0, 4.0);
        assert!(!degenerate.is_lammps_norm());
    }
}
