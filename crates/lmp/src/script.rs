//! Rendering of complete zero-step input scripts for batch invocations.

use crate::{
    LammpsError,
    config::{Overrides, RunParams, run_params},
    potential::Potential,
    session::boundary_str,
    system::System,
    version::Syntax,
};

use serde::{Deserialize, Serialize};

/// An input-script template with `{{.key}}` directives.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub header: String,
}

impl Template {
    pub fn from(s: &str) -> Self {
        Self {
            header: s.to_string(),
        }
    }

    /// replace each `{{.key}}` directive with its value
    pub fn fill(&self, vars: &[(&str, &str)]) -> String {
        let mut body = self.header.clone();
        for (key, val) in vars {
            body = body.replace(&format!("{{{{.{key}}}}}"), val);
        }
        body
    }
}

/// One evaluation block: rebuild the configuration from scratch, run zero
/// steps, and report the same thermo columns as the interactive path.
const RUN_ZERO: &str = "\
clear
{{.box_tilt_large}}units {{.units}}
atom_style {{.atom_style}}

boundary {{.boundary}}
region box prism {{.region}}
create_box {{.natypes}} box
{{.atoms}}

{{.pair_info}}

variable peatom equal pe/atoms

thermo_style custom step pxx pyy pzz pe v_peatom
thermo_modify format float %.13e

fix nve all nve
run 0
";

/// Render the zero-step block for one configuration.
pub fn build_script(params: &RunParams, syntax: Syntax) -> String {
    use std::fmt::Write;
    let mut atoms = String::new();
    for (i, t) in params.atype.iter().enumerate() {
        writeln!(
            atoms,
            "create_atoms {t} single {} {} {}",
            params.x[3 * i],
            params.x[3 * i + 1],
            params.x[3 * i + 2],
        )
        .unwrap();
    }
    let region = params
        .region
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    Template::from(RUN_ZERO).fill(&[
        (
            "box_tilt_large",
            if syntax.box_tilt_large {
                "box tilt large\n"
            } else {
                ""
            },
        ),
        ("units", &params.units),
        ("atom_style", &params.atom_style),
        ("boundary", &boundary_str(params.pbc)),
        ("region", &region),
        ("natypes", &params.natypes.to_string()),
        ("atoms", atoms.trim_end()),
        ("pair_info", params.pair_info.as_deref().unwrap_or("").trim_end()),
    ])
}

/// Render one block per system, sharing `potential`, for a single engine
/// invocation. Each block re-specifies units, box, atoms, and potential on
/// its own.
pub fn build_combined_script(
    systems: &[System],
    potential: &dyn Potential,
    syntax: Syntax,
) -> Result<String, LammpsError> {
    let mut script = String::new();
    for system in systems {
        let params = run_params(
            system,
            Some(potential),
            &Overrides::default(),
            false,
            true,
        )?;
        script.push_str(&build_script(&params, syntax));
        script.push('\n');
    }
    Ok(script)
}
