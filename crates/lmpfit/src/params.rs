//! The parameter-builder boundary: the only mutation surface the fit driver
//! has for trial parameters, plus a flat table implementation.

use std::{fmt::Display, fs, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::FitError;

/// Implemented by potential parameter builders. `update_parameter_values`
/// must reject names it cannot resolve rather than ignore them.
pub trait ParamBuilder {
    fn update_parameter_values(
        &mut self,
        values: &[(String, f64)],
    ) -> Result<(), FitError>;

    /// persist the current parameter set where the engine will read it
    fn save_paramfile(&self, path: &Path) -> Result<(), FitError>;

    /// current values for `names`, in order
    fn get_parameter_values(
        &self,
        names: &[String],
    ) -> Result<Vec<f64>, FitError>;
}

/// A flat name/value parameter table. Parses from and serializes to
/// whitespace-separated `name value` lines.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamTable {
    pub names: Vec<String>,
    pub values: Vec<f64>,
}

impl ParamTable {
    pub fn new(names: Vec<String>, values: Vec<f64>) -> Self {
        Self { names, values }
    }

    pub fn from_literal(names: Vec<&str>, values: Vec<f64>) -> Self {
        Self {
            names: names.iter().map(|s| s.to_string()).collect(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        assert_eq!(self.names.len(), self.values.len());
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

impl FromStr for ParamTable {
    type Err = FitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut names = Vec::new();
        let mut values = Vec::new();
        for line in s.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<_> = line.split_whitespace().collect();
            let &[name, value] = fields.as_slice() else {
                return Err(FitError::ParamParse(line.to_string()));
            };
            names.push(name.to_string());
            values.push(
                value
                    .parse()
                    .map_err(|_| FitError::ParamParse(line.to_string()))?,
            );
        }
        Ok(Self { names, values })
    }
}

impl Display for ParamTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (name, value) in self.names.iter().zip(&self.values) {
            writeln!(f, "{name} {value:.12}")?;
        }
        Ok(())
    }
}

impl ParamBuilder for ParamTable {
    fn update_parameter_values(
        &mut self,
        values: &[(String, f64)],
    ) -> Result<(), FitError> {
        for (name, value) in values {
            let Some(i) = self.position(name) else {
                return Err(FitError::UnknownParameter(name.clone()));
            };
            self.values[i] = *value;
        }
        Ok(())
    }

    fn save_paramfile(&self, path: &Path) -> Result<(), FitError> {
        fs::write(path, self.to_string()).map_err(|e| {
            FitError::Io(path.display().to_string(), e.kind())
        })
    }

    fn get_parameter_values(
        &self,
        names: &[String],
    ) -> Result<Vec<f64>, FitError> {
        names
            .iter()
            .map(|name| {
                self.position(name)
                    .map(|i| self.values[i])
                    .ok_or_else(|| FitError::UnknownParameter(name.clone()))
            })
            .collect()
    }
}
