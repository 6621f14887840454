//! The batch engine adapter: one executable invocation per call, observables
//! parsed from the log it leaves behind.

use std::{
    fs,
    path::PathBuf,
    process::Command,
    sync::OnceLock,
};

use jiff::civil::Date;
use regex::Regex;

use crate::{
    LammpsError,
    version::{Syntax, check_version},
};

/// Final thermo row of one simulation block, engine units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Thermo {
    pub pot_eng: f64,
    pub pe_atom: f64,
    pub pxx: f64,
    pub pyy: f64,
    pub pzz: f64,
}

/// A LAMMPS executable plus the syntax policy for its release date.
pub struct Batch {
    exe: PathBuf,
    date: Date,
    syntax: Syntax,
}

impl Batch {
    /// Resolve `exe`'s release date and build a handle. An unresolvable
    /// version is fatal here, before any evaluation is attempted.
    pub fn new(exe: impl Into<PathBuf>) -> Result<Self, LammpsError> {
        let exe = exe.into();
        let date = check_version(&exe)?;
        Ok(Self::with_date(exe, date))
    }

    /// build a handle for an executable whose release date is already known
    pub fn with_date(exe: impl Into<PathBuf>, date: Date) -> Self {
        Self {
            exe: exe.into(),
            date,
            syntax: Syntax::for_date(date),
        }
    }

    pub fn date(&self) -> Date {
        self.date
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    /// Run `script` in a scratch directory and return one [Thermo] row per
    /// simulation block, in script order.
    pub fn run(&self, script: &str) -> Result<Vec<Thermo>, LammpsError> {
        let spawn_err = |e: std::io::Error| {
            LammpsError::Spawn(self.exe.display().to_string(), e.kind())
        };
        let dir = tempfile::tempdir().map_err(spawn_err)?;
        let infile = dir.path().join("run0.in");
        let logfile = dir.path().join("log.lammps");
        fs::write(&infile, script).map_err(spawn_err)?;
        log::debug!(
            "running {} in {}",
            self.exe.display(),
            dir.path().display()
        );
        let out = Command::new(&self.exe)
            .arg("-in")
            .arg(&infile)
            .arg("-log")
            .arg(&logfile)
            .arg("-screen")
            .arg("none")
            .current_dir(dir.path())
            .output()
            .map_err(spawn_err)?;
        if !out.status.success() {
            return Err(LammpsError::Exited(
                String::from_utf8_lossy(&out.stderr).trim().to_string(),
            ));
        }
        let text = fs::read_to_string(&logfile).map_err(spawn_err)?;
        parse_log(&text)
    }
}

static LOG_CELL: OnceLock<[Regex; 3]> = OnceLock::new();

/// Parse a log into one [Thermo] per completed simulation block: the last
/// data row between each thermo header and its `Loop time` line.
pub fn parse_log(log: &str) -> Result<Vec<Thermo>, LammpsError> {
    let [header_re, loop_re, error_re] = LOG_CELL.get_or_init(|| {
        [
            Regex::new(r"^\s*Step\s").unwrap(),
            Regex::new(r"^Loop time of").unwrap(),
            Regex::new(r"^ERROR").unwrap(),
        ]
    });

    let mut blocks = Vec::new();
    let mut columns: Option<Vec<&str>> = None;
    let mut last_row: Option<Vec<f64>> = None;
    for line in log.lines() {
        if error_re.is_match(line) {
            return Err(LammpsError::ErrorInOutput(line.to_string()));
        } else if header_re.is_match(line) {
            columns = Some(line.split_whitespace().collect());
            last_row = None;
        } else if loop_re.is_match(line) {
            let Some(names) = columns.take() else {
                continue;
            };
            let Some(row) = last_row.take() else {
                return Err(LammpsError::MalformedLog(
                    "thermo block with no data rows".to_string(),
                ));
            };
            blocks.push(extract(&names, &row)?);
        } else if let Some(names) = &columns {
            let fields: Vec<f64> = line
                .split_whitespace()
                .map_while(|s| s.parse().ok())
                .collect();
            if fields.len() == names.len() {
                last_row = Some(fields);
            }
        }
    }
    if columns.is_some() {
        // a header was opened but the run never finished
        return Err(LammpsError::MalformedLog(
            "unterminated thermo block".to_string(),
        ));
    }
    if blocks.is_empty() {
        return Err(LammpsError::MalformedLog(
            "no thermo output found".to_string(),
        ));
    }
    Ok(blocks)
}

fn extract(names: &[&str], row: &[f64]) -> Result<Thermo, LammpsError> {
    let col = |name: &str| {
        names
            .iter()
            .position(|&n| n == name)
            .map(|i| row[i])
            .ok_or_else(|| LammpsError::ThermoNotFound(name.to_string()))
    };
    Ok(Thermo {
        pot_eng: col("PotEng")?,
        pe_atom: col("v_peatom")?,
        pxx: col("Pxx")?,
        pyy: col("Pyy")?,
        pzz: col("Pzz")?,
    })
}
