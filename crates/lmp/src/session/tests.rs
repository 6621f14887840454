use std::{cell::RefCell, rc::Rc};

use approx::assert_abs_diff_eq;

use super::*;
use crate::{
    config::{Overrides, run_params},
    potential::PairPotential,
    system::{Cell, System},
};

/// recording stub standing in for a live engine binding
#[derive(Debug, Default)]
struct State {
    commands: Vec<String>,
    atype: Vec<u32>,
    x: Vec<f64>,
    v: Option<Vec<f64>>,
    pe: f64,
    pxx: f64,
    pyy: f64,
    pzz: f64,
    forces: Vec<[f64; 3]>,
}

struct StubSession {
    version: i64,
    state: Rc<RefCell<State>>,
}

fn stub(version: i64) -> (Box<dyn Session>, Rc<RefCell<State>>) {
    let state = Rc::new(RefCell::new(State::default()));
    (
        Box::new(StubSession {
            version,
            state: Rc::clone(&state),
        }),
        state,
    )
}

impl Session for StubSession {
    fn command(&mut self, cmd: &str) -> Result<(), LammpsError> {
        self.state.borrow_mut().commands.push(cmd.to_string());
        Ok(())
    }

    fn create_atoms(
        &mut self,
        atype: &[u32],
        x: &[f64],
        v: Option<&[f64]>,
    ) -> Result<(), LammpsError> {
        let mut state = self.state.borrow_mut();
        state.atype = atype.to_vec();
        state.x = x.to_vec();
        state.v = v.map(<[f64]>::to_vec);
        Ok(())
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn units(&self) -> Result<String, LammpsError> {
        // report whatever the last units command configured
        let state = self.state.borrow();
        let units = state
            .commands
            .iter()
            .rev()
            .find_map(|c| c.strip_prefix("units "))
            .unwrap_or("metal");
        Ok(units.to_string())
    }

    fn natoms(&self) -> usize {
        self.state.borrow().atype.len()
    }

    fn thermo(&self, keyword: &str) -> Result<f64, LammpsError> {
        let state = self.state.borrow();
        match keyword {
            "pe" => Ok(state.pe),
            "pxx" => Ok(state.pxx),
            "pyy" => Ok(state.pyy),
            "pzz" => Ok(state.pzz),
            _ => Err(LammpsError::Session(keyword.to_string())),
        }
    }

    fn forces(&self) -> Result<Vec<[f64; 3]>, LammpsError> {
        Ok(self.state.borrow().forces.clone())
    }
}

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
fn out_of_order() {
    let (session, _) = stub(20230615);
    let mut lmp = Interactive::new(session).unwrap();
    assert_eq!(
        lmp.create_atoms(&[1], &[0.0, 0.0, 0.0], None),
        Err(LammpsError::OutOfOrder {
            op: "create_atoms",
            phase: Phase::Uninitialized,
        })
    );
    assert_eq!(
        lmp.extract(false).unwrap_err(),
        LammpsError::OutOfOrder {
            op: "extract",
            phase: Phase::Uninitialized,
        }
    );
}

#[test]
fn bad_version() {
    let (session, _) = stub(20220000);
    assert!(matches!(
        Interactive::new(session),
        Err(LammpsError::VersionUnresolved(_))
    ));
}

#[test]
fn tilt_command_pre_threshold() {
    let (session, state) = stub(20210929);
    let mut lmp = Interactive::new(session).unwrap();
    lmp.define_box("metal", "atomic", [true; 3], &[0.0; 9], 1)
        .unwrap();
    assert!(
        state
            .borrow()
            .commands
            .contains(&"box tilt large".to_string())
    );
}

#[test]
fn no_tilt_command_post_threshold() {
    let (session, state) = stub(20230615);
    let mut lmp = Interactive::new(session).unwrap();
    lmp.define_box("metal", "atomic", [true; 3], &[0.0; 9], 1)
        .unwrap();
    assert!(
        !state
            .borrow()
            .commands
            .contains(&"box tilt large".to_string())
    );
}

#[test]
fn round_trip() {
    let sys = fcc_al();
    let pot = PairPotential::none();
    let params =
        run_params(&sys, Some(&pot), &Overrides::default(), false, true)
            .unwrap();

    let (session, state) = stub(20230615);
    let mut lmp = Interactive::new(session).unwrap();
    lmp.run_params(&params).unwrap();
    assert_eq!(lmp.phase(), Phase::Evaluated);

    // the engine sees the same atoms the system described
    let state = state.borrow();
    assert_eq!(state.atype, sys.atype);
    assert_eq!(state.x.len(), 3 * sys.natoms());
    for (got, want) in state.x.iter().zip(sys.pos.iter().flatten()) {
        assert_abs_diff_eq!(*got, *want);
    }
    let commands = state.commands.join("\n");
    assert!(commands.contains("units metal"));
    assert!(commands.contains("boundary p p p"));
    assert!(commands.contains("region box prism 0 4.05 0 4.05 0 4.05 0 0 0"));
    assert!(commands.contains("create_box 1 box"));
    assert!(commands.contains("pair_style none"));
    assert!(commands.contains("thermo_modify format float %.13e"));
    assert!(commands.contains("run 0"));
}

#[test]
fn missing_pair_info() {
    let sys = fcc_al();
    let params =
        run_params(&sys, None, &Overrides::default(), false, false).unwrap();
    let (session, _) = stub(20230615);
    let mut lmp = Interactive::new(session).unwrap();
    assert_eq!(
        lmp.run_params(&params),
        Err(LammpsError::MissingPairInfo)
    );
}

#[test]
fn atom_length_checks() {
    let (session, _) = stub(20230615);
    let mut lmp = Interactive::new(session).unwrap();
    lmp.define_box("metal", "atomic", [true; 3], &[0.0; 9], 1)
        .unwrap();
    assert_eq!(
        lmp.create_atoms(&[1, 1], &[0.0; 3], None),
        Err(LammpsError::AtomMismatch { natoms: 2, len: 3 })
    );
    assert_eq!(
        lmp.create_atoms(&[1], &[0.0; 3], Some(&[0.0; 6])),
        Err(LammpsError::VelocityMismatch { natoms: 1, len: 6 })
    );
}

#[test]
fn extract_converts_units() {
    let (session, state) = stub(20230615);
    {
        let mut s = state.borrow_mut();
        s.pe = 2.0;
        s.pxx = 1e5;
        s.pyy = -2e4;
        s.pzz = 0.0;
        s.forces = vec![[1.0, 0.0, 0.0]; 4];
    }
    let sys = fcc_al();
    let pot = PairPotential::none();
    let params =
        run_params(&sys, Some(&pot), &Overrides::default(), false, true)
            .unwrap();
    let mut lmp = Interactive::new(session).unwrap();
    lmp.run_params(&params).unwrap();

    let raw = lmp.extract(true).unwrap();
    assert_abs_diff_eq!(raw.e_pot_total, 2.0);
    assert_abs_diff_eq!(raw.e_pot_atom, 0.5);
    // bars in, GPa out
    assert_abs_diff_eq!(raw.p_xx, 10.0, epsilon = 1e-12);
    assert_abs_diff_eq!(raw.p_yy, -2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(raw.p_zz, 0.0);
    let forces = raw.forces.unwrap();
    assert_eq!(forces.len(), 4);
    assert_abs_diff_eq!(forces[0][0], 1.0);
}

#[test]
fn reset_discards_the_configuration() {
    let (session, _) = stub(20230615);
    let mut lmp = Interactive::new(session).unwrap();
    lmp.run_script("run 0").unwrap();
    lmp.reset().unwrap();
    assert_eq!(lmp.phase(), Phase::Uninitialized);
    assert!(matches!(
        lmp.extract(false),
        Err(LammpsError::OutOfOrder { .. })
    ));
}

#[test]
fn script_mode_reaches_evaluated() {
    let (session, state) = stub(20230615);
    let mut lmp = Interactive::new(session).unwrap();
    lmp.run_script("units metal\nrun 0").unwrap();
    assert_eq!(lmp.phase(), Phase::Evaluated);
    assert_eq!(
        state.borrow().commands,
        vec!["units metal".to_string(), "run 0".to_string()]
    );
}
