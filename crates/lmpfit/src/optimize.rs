//! The optimizer boundary. The fit driver only sees [Optimizer::minimize],
//! so the search algorithm can be swapped without touching it.

use std::{cell::RefCell, rc::Rc};

use argmin::core::{CostFunction, Executor, State};
use argmin::solver::neldermead::NelderMead as ArgminNelderMead;

use crate::FitError;

/// A fallible objective. The first error aborts the minimization and is
/// returned unchanged.
pub type Objective<'a> = &'a mut dyn FnMut(&[f64]) -> Result<f64, FitError>;

#[derive(Clone, Debug, PartialEq)]
pub struct Minimum {
    pub x: Vec<f64>,
    pub fval: f64,
}

/// Black-box minimization of a fallible objective, one trial vector at a
/// time, never concurrently.
pub trait Optimizer {
    fn minimize(
        &self,
        objective: Objective,
        x0: &[f64],
        bounds: Option<&[(f64, f64)]>,
    ) -> Result<Minimum, FitError>;
}

/// Nelder-Mead downhill simplex. Bounds are honored by clamping each trial
/// point into the box before the objective sees it.
#[derive(Clone, Debug, PartialEq)]
pub struct NelderMead {
    pub max_iters: u64,
    /// terminate once the standard deviation of the simplex's cost values
    /// falls below this
    pub sd_tolerance: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            max_iters: 1000,
            sd_tolerance: 1e-10,
        }
    }
}

fn clamp(x: &[f64], bounds: Option<&[(f64, f64)]>) -> Vec<f64> {
    match bounds {
        Some(bounds) => x
            .iter()
            .zip(bounds)
            .map(|(&v, &(lo, hi))| v.clamp(lo, hi))
            .collect(),
        None => x.to_vec(),
    }
}

/// initial simplex around `x0`: each vertex perturbs one coordinate by 5%,
/// or by 2.5e-4 where it is zero
fn simplex(x0: &[f64]) -> Vec<Vec<f64>> {
    let mut points = vec![x0.to_vec()];
    for i in 0..x0.len() {
        let mut p = x0.to_vec();
        if p[i] != 0.0 {
            p[i] *= 1.05;
        } else {
            p[i] = 2.5e-4;
        }
        points.push(p);
    }
    points
}

struct Problem<'a, 'b> {
    objective: RefCell<Objective<'a>>,
    bounds: Option<&'b [(f64, f64)]>,
    failure: Rc<RefCell<Option<FitError>>>,
}

impl CostFunction for Problem<'_, '_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(
        &self,
        param: &Self::Param,
    ) -> Result<Self::Output, argmin::core::Error> {
        let x = clamp(param, self.bounds);
        let mut objective = self.objective.borrow_mut();
        match (*objective)(&x) {
            Ok(v) => Ok(v),
            Err(e) => {
                let msg = e.to_string();
                *self.failure.borrow_mut() = Some(e);
                Err(argmin::core::Error::msg(msg))
            }
        }
    }
}

impl Optimizer for NelderMead {
    fn minimize(
        &self,
        objective: Objective,
        x0: &[f64],
        bounds: Option<&[(f64, f64)]>,
    ) -> Result<Minimum, FitError> {
        if x0.is_empty() {
            return Err(FitError::NoParameters);
        }
        let failure = Rc::new(RefCell::new(None));
        let problem = Problem {
            objective: RefCell::new(objective),
            bounds,
            failure: Rc::clone(&failure),
        };
        let solver = ArgminNelderMead::new(simplex(&clamp(x0, bounds)))
            .with_sd_tolerance(self.sd_tolerance)
            .map_err(|e| FitError::Optimizer(e.to_string()))?;
        let res = Executor::new(problem, solver)
            .configure(|state| state.max_iters(self.max_iters))
            .run();
        // an objective failure beats whatever argmin wrapped it in
        if let Some(err) = failure.borrow_mut().take() {
            return Err(err);
        }
        let res = res.map_err(|e| FitError::Optimizer(e.to_string()))?;
        let state = res.state();
        let best = state
            .get_best_param()
            .ok_or_else(|| {
                FitError::Optimizer("no best parameters".to_string())
            })?
            .clone();
        Ok(Minimum {
            x: clamp(&best, bounds),
            fval: state.get_best_cost(),
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn quadratic() {
        let mut f = |x: &[f64]| -> Result<f64, FitError> {
            Ok((x[0] - 2.0).powi(2) + (x[1] + 3.0).powi(2))
        };
        let got = NelderMead::default()
            .minimize(&mut f, &[0.5, 0.5], None)
            .unwrap();
        assert_abs_diff_eq!(got.x[0], 2.0, epsilon = 1e-4);
        assert_abs_diff_eq!(got.x[1], -3.0, epsilon = 1e-4);
        assert_abs_diff_eq!(got.fval, 0.0, epsilon = 1e-8);
    }

    #[test]
    fn bounded_minimum_lands_on_the_box() {
        let mut f =
            |x: &[f64]| -> Result<f64, FitError> { Ok((x[0] - 2.0).powi(2)) };
        let got = NelderMead::default()
            .minimize(&mut f, &[8.0], Some(&[(5.0, 10.0)]))
            .unwrap();
        assert_abs_diff_eq!(got.x[0], 5.0, epsilon = 1e-3);
        assert_abs_diff_eq!(got.fval, 9.0, epsilon = 1e-4);
    }

    #[test]
    fn objective_failure_surfaces_unchanged() {
        let mut f = |_: &[f64]| -> Result<f64, FitError> {
            Err(FitError::EmptyRequest)
        };
        let got = NelderMead::default().minimize(&mut f, &[1.0], None);
        assert_eq!(got, Err(FitError::EmptyRequest));
    }

    #[test]
    fn no_parameters() {
        let mut f = |_: &[f64]| -> Result<f64, FitError> { Ok(0.0) };
        let got = NelderMead::default().minimize(&mut f, &[], None);
        assert_eq!(got, Err(FitError::NoParameters));
    }
}
