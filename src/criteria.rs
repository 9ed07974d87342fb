//! Optimality criteria used to score candidate designs
//!
//! All criteria follow a "higher score is better" convention:
//!
//! | criterion      | score                                                   |
//! |----------------|---------------------------------------------------------|
//! | `a-optimality` | `- trace((M^T M)^-1)`                                    |
//! | `d-optimality` | `det(M^T M)`                                            |
//! | `e-optimality` | `min eigenvalue(M^T M)`                                 |
//! | `g-optimality` | `- max_i m_i^T (M^T M)^-1 m_i` (max leverage)           |
//! | `maximin`      | `min_{i<j} ||x_i - x_j||`                               |
//!
//! where `M` is the regression matrix of the linear model on the design (see
//! [crate::utils::regressors]) and `m_i` its ith row.
//!
//! A design whose information matrix is singular or near singular cannot be scored
//! by matrix-based criteria: it gets the worst score, `-inf`.
use crate::errors::{Result, SamplingError};
use crate::utils::{information_matrix, min_pdist, regressors};
use linfa::Float;
use linfa_linalg::eigh::*;
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix2};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Relative threshold on the information matrix eigenvalues below which
/// the matrix is considered singular: `min eig <= SINGULARITY_TOL * max eig`
pub const SINGULARITY_TOL: f64 = 1e-10;

/// Design optimality criteria
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serializable", serde(rename_all = "kebab-case"))]
pub enum OptimalityCriterion {
    /// Minimizes the average variance of the parameter estimates
    AOptimality,
    /// Maximizes the determinant of the information matrix
    DOptimality,
    /// Maximizes the smallest eigenvalue of the information matrix
    EOptimality,
    /// Minimizes the maximum prediction variance over the design points.
    ///
    /// The maximum leverage over the design points is a lower bound of the maximum
    /// prediction variance over the whole region, which for a linear model is reached
    /// at a corner of the unit hypercube.
    GOptimality,
    /// Maximizes the smallest distance between two points of the design
    #[default]
    Maximin,
}

impl OptimalityCriterion {
    /// All available criteria
    pub const ALL: [OptimalityCriterion; 5] = [
        OptimalityCriterion::AOptimality,
        OptimalityCriterion::DOptimality,
        OptimalityCriterion::EOptimality,
        OptimalityCriterion::GOptimality,
        OptimalityCriterion::Maximin,
    ];

    /// Name of the criterion
    pub fn name(&self) -> &'static str {
        match self {
            OptimalityCriterion::AOptimality => "a-optimality",
            OptimalityCriterion::DOptimality => "d-optimality",
            OptimalityCriterion::EOptimality => "e-optimality",
            OptimalityCriterion::GOptimality => "g-optimality",
            OptimalityCriterion::Maximin => "maximin",
        }
    }

    /// Whether the criterion is computed from the information matrix of the design
    pub fn is_matrix_based(&self) -> bool {
        !matches!(self, OptimalityCriterion::Maximin)
    }

    /// Worst possible score, given to designs which cannot be scored
    pub fn worst<F: Float>() -> F {
        F::neg_infinity()
    }

    /// Scores the given (ns, nx) normalized design, the higher the better.
    ///
    /// `intercept` specifies whether matrix-based criteria consider a linear model
    /// with an intercept term. Degenerate designs get [OptimalityCriterion::worst] score.
    pub fn score<F: Float>(
        &self,
        doe: &ArrayBase<impl Data<Elem = F>, Ix2>,
        intercept: bool,
    ) -> F {
        let score = match self {
            OptimalityCriterion::Maximin => Some(min_pdist(doe)),
            _ => self.matrix_score(doe, intercept),
        };
        match score {
            Some(score) if !score.is_nan() => score,
            _ => Self::worst(),
        }
    }

    /// Matrix-based score, `None` when the eigen decomposition fails or the information
    /// matrix is near singular.
    fn matrix_score<F: Float>(
        &self,
        doe: &ArrayBase<impl Data<Elem = F>, Ix2>,
        intercept: bool,
    ) -> Option<F> {
        let info = InformationSpectrum::new(doe, intercept)?;
        let score = match self {
            OptimalityCriterion::AOptimality => -info.eigvals.mapv(|l| F::one() / l).sum(),
            OptimalityCriterion::DOptimality => info.eigvals.product(),
            OptimalityCriterion::EOptimality => info.min_eigval(),
            OptimalityCriterion::GOptimality => -info.max_leverage(&regressors(doe, intercept)),
            OptimalityCriterion::Maximin => min_pdist(doe),
        };
        Some(score)
    }
}

impl fmt::Display for OptimalityCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for OptimalityCriterion {
    type Err = SamplingError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_lowercase();
        OptimalityCriterion::ALL
            .into_iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| {
                SamplingError::InvalidArgument(format!(
                    "unknown optimality criterion '{}', expected one of {}",
                    s,
                    OptimalityCriterion::ALL.map(|c| c.name()).join(", ")
                ))
            })
    }
}

/// Eigen decomposition of a non singular information matrix
struct InformationSpectrum<F: Float> {
    eigvals: Array1<F>,
    eigvecs: Array2<F>,
}

impl<F: Float> InformationSpectrum<F> {
    fn new(doe: &ArrayBase<impl Data<Elem = F>, Ix2>, intercept: bool) -> Option<Self> {
        let (eigvals, eigvecs) = information_matrix(doe, intercept).eigh_into().ok()?;
        let max = eigvals.fold(F::neg_infinity(), |m, &l| m.max(l));
        let min = eigvals.fold(F::infinity(), |m, &l| m.min(l));
        if !max.is_finite() || !min.is_finite() || min <= F::cast(SINGULARITY_TOL) * max {
            return None;
        }
        Some(InformationSpectrum { eigvals, eigvecs })
    }

    fn min_eigval(&self) -> F {
        self.eigvals.fold(F::infinity(), |m, &l| m.min(l))
    }

    /// Largest diagonal term of the hat matrix `M (M^T M)^-1 M^T`
    fn max_leverage(&self, m: &Array2<F>) -> F {
        let z = m.dot(&self.eigvecs);
        let scaled = z.mapv(|v| v * v) / &self.eigvals;
        scaled
            .sum_axis(Axis(1))
            .fold(F::neg_infinity(), |h, &v| h.max(v))
    }
}
