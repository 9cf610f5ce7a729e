//! Posterior draws produced by an external sampler.
//!
//! Every variable is a dense `(chain, draw, element)` array. Scalar parameters
//! (`Intercept`, `Days`, ...) have a single element; per-observation variables
//! (`Reaction_mean`) have one element per row of the observation table.

use std::collections::BTreeMap;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, PlotError};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawVariable {
    n_chains: usize,
    n_draws: usize,
    n_elems: usize,
    values: Vec<f64>,
}

/// Sampled values of one posterior variable.
///
/// `values` is laid out chain-major, then draw, then element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawVariable", into = "RawVariable")]
pub struct PosteriorVariable {
    n_chains: usize,
    n_draws: usize,
    n_elems: usize,
    values: Vec<f64>,
}

impl PosteriorVariable {
    pub fn new(n_chains: usize, n_draws: usize, n_elems: usize, values: Vec<f64>) -> Result<Self, PlotError> {
        if n_chains == 0 || n_draws == 0 || n_elems == 0 {
            return Err(PlotError::new(
                ErrorKind::Shape,
                "Posterior variables need at least one chain, draw and element.",
            ));
        }
        let expected = n_chains * n_draws * n_elems;
        if values.len() != expected {
            return Err(PlotError::new(
                ErrorKind::Shape,
                format!(
                    "Expected {expected} values for shape ({n_chains}, {n_draws}, {n_elems}), got {}.",
                    values.len()
                ),
            ));
        }
        Ok(Self {
            n_chains,
            n_draws,
            n_elems,
            values,
        })
    }

    /// Build a scalar variable from one vector of draws per chain.
    pub fn scalar(chains: Vec<Vec<f64>>) -> Result<Self, PlotError> {
        let n_chains = chains.len();
        let n_draws = chains.first().map(Vec::len).unwrap_or(0);
        if chains.iter().any(|c| c.len() != n_draws) {
            return Err(PlotError::new(ErrorKind::Shape, "Chains have different draw counts."));
        }
        Self::new(n_chains, n_draws, 1, chains.into_iter().flatten().collect())
    }

    /// Build a vector-valued variable from `chains[chain][draw][element]`.
    pub fn from_nested(chains: Vec<Vec<Vec<f64>>>) -> Result<Self, PlotError> {
        let n_chains = chains.len();
        let n_draws = chains.first().map(Vec::len).unwrap_or(0);
        let n_elems = chains
            .first()
            .and_then(|c| c.first())
            .map(Vec::len)
            .unwrap_or(0);
        let consistent = chains
            .iter()
            .all(|c| c.len() == n_draws && c.iter().all(|d| d.len() == n_elems));
        if !consistent {
            return Err(PlotError::new(ErrorKind::Shape, "Ragged posterior draws."));
        }
        let values = chains.into_iter().flatten().flatten().collect();
        Self::new(n_chains, n_draws, n_elems, values)
    }

    pub fn n_chains(&self) -> usize {
        self.n_chains
    }

    pub fn n_draws(&self) -> usize {
        self.n_draws
    }

    pub fn n_elems(&self) -> usize {
        self.n_elems
    }

    pub fn n_samples(&self) -> usize {
        self.n_chains * self.n_draws
    }

    /// One value, or `None` when any index is out of range.
    pub fn get(&self, chain: usize, draw: usize, elem: usize) -> Option<f64> {
        if chain >= self.n_chains || draw >= self.n_draws || elem >= self.n_elems {
            return None;
        }
        Some(self.at(chain, draw, elem))
    }

    fn at(&self, chain: usize, draw: usize, elem: usize) -> f64 {
        self.values[(chain * self.n_draws + draw) * self.n_elems + elem]
    }

    /// Mean over every chain, draw and element.
    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// All samples of one element, in stacked sample order.
    pub fn element_samples(&self, elem: usize) -> Result<Vec<f64>, PlotError> {
        if elem >= self.n_elems {
            return Err(PlotError::new(
                ErrorKind::Shape,
                format!("Element {elem} out of range for {} elements.", self.n_elems),
            ));
        }
        Ok((0..self.n_samples())
            .map(|s| self.at(s % self.n_chains, s / self.n_chains, elem))
            .collect())
    }

    /// `(element, sample)` matrix with chains and draws flattened.
    ///
    /// Sample `s` is draw `s / n_chains` of chain `s % n_chains`, the order
    /// produced by stacking `("draw", "chain")` into one `samples` axis.
    pub fn stacked(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.n_elems, self.n_samples(), |elem, s| {
            self.at(s % self.n_chains, s / self.n_chains, elem)
        })
    }
}

impl TryFrom<RawVariable> for PosteriorVariable {
    type Error = PlotError;

    fn try_from(raw: RawVariable) -> Result<Self, Self::Error> {
        Self::new(raw.n_chains, raw.n_draws, raw.n_elems, raw.values)
    }
}

impl From<PosteriorVariable> for RawVariable {
    fn from(var: PosteriorVariable) -> Self {
        RawVariable {
            n_chains: var.n_chains,
            n_draws: var.n_draws,
            n_elems: var.n_elems,
            values: var.values,
        }
    }
}

/// Named posterior variables sharing one `(chain, draw)` grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, PosteriorVariable>",
    into = "BTreeMap<String, PosteriorVariable>"
)]
pub struct Posterior {
    variables: BTreeMap<String, PosteriorVariable>,
}

impl Posterior {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable, checking that its chain/draw counts match the others.
    pub fn with_variable(mut self, name: impl Into<String>, var: PosteriorVariable) -> Result<Self, PlotError> {
        let name = name.into();
        if let Some(other) = self.variables.values().next() {
            if other.n_chains != var.n_chains || other.n_draws != var.n_draws {
                return Err(PlotError::new(
                    ErrorKind::Shape,
                    format!(
                        "Variable '{name}' has {} chains x {} draws, posterior has {} x {}.",
                        var.n_chains, var.n_draws, other.n_chains, other.n_draws
                    ),
                ));
            }
        }
        self.variables.insert(name, var);
        Ok(self)
    }

    pub fn variable(&self, name: &str) -> Result<&PosteriorVariable, PlotError> {
        self.variables.get(name).ok_or_else(|| {
            PlotError::new(
                ErrorKind::MissingVariable,
                format!("Posterior has no variable `{name}`."),
            )
        })
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &PosteriorVariable)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn n_chains(&self) -> usize {
        self.variables.values().next().map(|v| v.n_chains).unwrap_or(0)
    }

    /// Draws per chain (the `draw` dimension).
    pub fn n_draws(&self) -> usize {
        self.variables.values().next().map(|v| v.n_draws).unwrap_or(0)
    }
}

impl TryFrom<BTreeMap<String, PosteriorVariable>> for Posterior {
    type Error = PlotError;

    fn try_from(variables: BTreeMap<String, PosteriorVariable>) -> Result<Self, Self::Error> {
        variables
            .into_iter()
            .try_fold(Posterior::new(), |post, (name, var)| post.with_variable(name, var))
    }
}

impl From<Posterior> for BTreeMap<String, PosteriorVariable> {
    fn from(post: Posterior) -> Self {
        post.variables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stacked_orders_samples_draw_major() {
        // 2 chains x 2 draws x 2 elements; value encodes (chain, draw, elem).
        let var = PosteriorVariable::from_nested(vec![
            vec![vec![0.0, 1.0], vec![10.0, 11.0]],
            vec![vec![100.0, 101.0], vec![110.0, 111.0]],
        ])
        .unwrap();

        let m = var.stacked();
        assert_eq!(m.shape(), (2, 4));
        // (draw 0, chain 0), (draw 0, chain 1), (draw 1, chain 0), (draw 1, chain 1)
        assert_eq!(m.row(0).iter().copied().collect::<Vec<_>>(), vec![0.0, 100.0, 10.0, 110.0]);
        assert_eq!(var.element_samples(1).unwrap(), vec![1.0, 101.0, 11.0, 111.0]);
    }

    #[test]
    fn out_of_range_lookups_do_not_panic() {
        let var = PosteriorVariable::from_nested(vec![vec![vec![0.0, 1.0], vec![10.0, 11.0]]]).unwrap();
        assert_eq!(var.get(0, 1, 1), Some(11.0));
        assert_eq!(var.get(1, 0, 0), None);
        assert_eq!(var.get(0, 2, 0), None);
        assert_eq!(var.get(0, 0, 2), None);
        assert_eq!(var.element_samples(2).unwrap_err().kind(), ErrorKind::Shape);
    }

    #[test]
    fn mean_covers_all_chains() {
        let var = PosteriorVariable::scalar(vec![vec![1.0, 2.0], vec![3.0, 6.0]]).unwrap();
        assert!((var.mean() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn mismatched_draw_counts_are_rejected() {
        let a = PosteriorVariable::scalar(vec![vec![1.0, 2.0]]).unwrap();
        let b = PosteriorVariable::scalar(vec![vec![1.0, 2.0, 3.0]]).unwrap();
        let err = Posterior::new()
            .with_variable("a", a)
            .unwrap()
            .with_variable("b", b)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);
    }

    #[test]
    fn missing_variable_is_reported_by_name() {
        let err = Posterior::new().variable("Intercept").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingVariable);
        assert!(err.to_string().contains("Intercept"));
    }
}
