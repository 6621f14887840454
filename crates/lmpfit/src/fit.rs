//! The outer fitting loop: repeated (update parameters, persist, evaluate,
//! score) under a numerical optimizer until its stopping criterion.

use std::path::Path;

use crate::{
    FitError,
    error::{Weights, errorfxn},
    evaluate::EvalResult,
    optimize::{Minimum, Optimizer},
    params::ParamBuilder,
};

/// The parameters to vary: plain names for an unbounded search, or ordered
/// name/bounds pairs. Bounds pass through to the optimizer unmodified.
#[derive(Clone, Debug, PartialEq)]
pub enum FitParams {
    Names(Vec<String>),
    Bounds(Vec<(String, (f64, f64))>),
}

impl FitParams {
    fn names(&self) -> Vec<String> {
        match self {
            FitParams::Names(names) => names.clone(),
            FitParams::Bounds(pairs) => {
                pairs.iter().map(|(n, _)| n.clone()).collect()
            }
        }
    }

    fn bounds(&self) -> Option<Vec<(f64, f64)>> {
        match self {
            FitParams::Names(_) => None,
            FitParams::Bounds(pairs) => {
                Some(pairs.iter().map(|(_, b)| *b).collect())
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FitResult {
    /// best-known value for each fitted parameter, in input order
    pub params: Vec<(String, f64)>,
    /// the optimizer's final error value
    pub error: f64,
}

/// Fit the named parameters of `builder` so that `evaluate`'s observables
/// match `ref_values` under `weights`.
///
/// Each objective call updates the builder, persists the parameter file to
/// `paramfile` for the engine to read, runs `evaluate`, and scores the
/// result; calls are strictly sequential because the parameter file and any
/// live session are single-writer resources owned by this fit. The error at
/// the initial parameter vector is evaluated and reported before the search
/// starts, and any failure there aborts the whole fit. Production callers
/// close `evaluate` over [crate::evaluate::evaluate] with their engine
/// handle and request.
pub fn fit<B, E, O>(
    builder: &mut B,
    paramfile: &Path,
    params: &FitParams,
    mut evaluate: E,
    ref_values: &EvalResult,
    weights: &Weights,
    optimizer: &O,
) -> Result<FitResult, FitError>
where
    B: ParamBuilder + ?Sized,
    E: FnMut() -> Result<EvalResult, FitError>,
    O: Optimizer + ?Sized,
{
    let names = params.names();
    if names.is_empty() {
        return Err(FitError::NoParameters);
    }
    let bounds = params.bounds();
    let x0 = builder.get_parameter_values(&names)?;

    let mut objective = |x: &[f64]| -> Result<f64, FitError> {
        let trial: Vec<(String, f64)> = names
            .iter()
            .cloned()
            .zip(x.iter().copied())
            .collect();
        builder.update_parameter_values(&trial)?;
        builder.save_paramfile(paramfile)?;
        let values = evaluate()?;
        errorfxn(&values, ref_values, weights)
    };

    let init_error = objective(&x0)?;
    log::info!("initial error is {init_error}");

    let Minimum { x, fval } =
        optimizer.minimize(&mut objective, &x0, bounds.as_deref())?;
    log::info!("final error is {fval}");

    Ok(FitResult {
        params: names.into_iter().zip(x).collect(),
        error: fval,
    })
}
