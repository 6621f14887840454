//! The scalar goodness-of-fit metric comparing evaluated observables to
//! their reference values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{FitError, evaluate::EvalResult};

/// Weight for one column. A scalar applies to every element; an array pairs
/// one weight with each element of the flattened column, and NaN or
/// non-positive entries exclude just their element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Weight {
    Scalar(f64),
    Each(Vec<f64>),
}

/// Column name to weight. Columns not named here never enter the error.
pub type Weights = BTreeMap<String, Weight>;

/// Compute `sum(((value - ref) / weight)^2)` over the weighted columns.
///
/// A scalar weight that is NaN or non-positive disables its whole column.
/// Non-finite terms are dropped from the sum. Naming a column absent from
/// either table is an error; so is an array weight whose length does not
/// match its column. Inputs are never mutated, and the result is
/// independent of column and row order.
pub fn errorfxn(
    values: &EvalResult,
    ref_values: &EvalResult,
    weights: &Weights,
) -> Result<f64, FitError> {
    let mut error = 0.0;
    for (key, weight) in weights {
        if let Weight::Scalar(w) = weight {
            if w.is_nan() || *w <= 0.0 {
                continue;
            }
        }

        let value = values
            .column(key)
            .ok_or_else(|| FitError::MissingColumn(key.clone()))?;
        let ref_value = ref_values
            .column(key)
            .ok_or_else(|| FitError::MissingColumn(key.clone()))?;
        if value.len() != ref_value.len() {
            return Err(FitError::ColumnShape {
                column: key.clone(),
                expected: value.len(),
                got: ref_value.len(),
            });
        }

        match weight {
            Weight::Scalar(w) => {
                error += value
                    .iter()
                    .zip(&ref_value)
                    .map(|(v, r)| ((v - r) / w).powi(2))
                    .filter(|t| t.is_finite())
                    .sum::<f64>();
            }
            Weight::Each(ws) => {
                if ws.len() != value.len() {
                    return Err(FitError::WeightShape {
                        column: key.clone(),
                        expected: value.len(),
                        got: ws.len(),
                    });
                }
                error += value
                    .iter()
                    .zip(&ref_value)
                    .zip(ws)
                    .filter(|(_, w)| !w.is_nan() && **w > 0.0)
                    .map(|((v, r), w)| ((v - r) / w).powi(2))
                    .filter(|t| t.is_finite())
                    .sum::<f64>();
            }
        }
    }
    Ok(error)
}
