use crate::criteria::OptimalityCriterion;
use crate::errors::{Result, SamplingError};
use crate::locator::RecyclingPolicy;
use linfa::{Float, ParamGuard};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Default number of candidate designs generated by a search
pub const DEFAULT_N_ITERATIONS: usize = 1000;
/// Default tolerance (in normalized units) used to decide whether an existing point
/// lies within the trust region
pub const DEFAULT_TOLERANCE: f64 = 1e-8;

/// A set of validated trust region sampler parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct SamplerValidParams<F: Float> {
    /// Number of points of the design
    pub(crate) n_points: usize,
    /// Criterion used to select the best candidate design
    pub(crate) criterion: OptimalityCriterion,
    /// Number of candidate designs generated (aka iteration budget)
    pub(crate) n_iterations: usize,
    /// Whether matrix-based criteria consider a linear model with intercept
    pub(crate) intercept: bool,
    /// Containment tolerance for existing points, in normalized units
    pub(crate) tolerance: F,
    /// Policy used when too many existing points lie within the trust region
    pub(crate) recycling: RecyclingPolicy,
    /// Whether candidate designs are scored in parallel
    pub(crate) parallel: bool,
}

impl<F: Float> SamplerValidParams<F> {
    /// Get number of points of the design
    pub fn n_points(&self) -> usize {
        self.n_points
    }

    /// Get optimality criterion
    pub fn criterion(&self) -> OptimalityCriterion {
        self.criterion
    }

    /// Get number of candidate designs
    pub fn n_iterations(&self) -> usize {
        self.n_iterations
    }

    /// Get whether an intercept is used by matrix-based criteria
    pub fn intercept(&self) -> bool {
        self.intercept
    }

    /// Get containment tolerance
    pub fn tolerance(&self) -> F {
        self.tolerance
    }

    /// Get recycling policy
    pub fn recycling(&self) -> RecyclingPolicy {
        self.recycling
    }

    /// Get whether scoring is done in parallel
    pub fn parallel(&self) -> bool {
        self.parallel
    }
}

/// Trust region sampler parameters
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct SamplerParams<F: Float>(SamplerValidParams<F>);

impl<F: Float> SamplerParams<F> {
    /// Parameters to sample `n_points` points, other parameters take default values:
    /// * criterion: [OptimalityCriterion::Maximin],
    /// * n_iterations: [DEFAULT_N_ITERATIONS],
    /// * intercept: `true`,
    /// * tolerance: [DEFAULT_TOLERANCE],
    /// * recycling: [RecyclingPolicy::Strict],
    /// * parallel: `false`.
    pub fn new(n_points: usize) -> Self {
        SamplerParams(SamplerValidParams {
            n_points,
            criterion: OptimalityCriterion::default(),
            n_iterations: DEFAULT_N_ITERATIONS,
            intercept: true,
            tolerance: F::cast(DEFAULT_TOLERANCE),
            recycling: RecyclingPolicy::default(),
            parallel: false,
        })
    }

    /// Set the number of points of the design
    pub fn n_points(mut self, n_points: usize) -> Self {
        self.0.n_points = n_points;
        self
    }

    /// Set the optimality criterion
    pub fn criterion(mut self, criterion: OptimalityCriterion) -> Self {
        self.0.criterion = criterion;
        self
    }

    /// Set the number of candidate designs generated during the search.
    ///
    /// The whole budget is always consumed, there is no early stopping.
    pub fn n_iterations(mut self, n_iterations: usize) -> Self {
        self.0.n_iterations = n_iterations;
        self
    }

    /// Set whether matrix-based criteria consider a linear model with intercept
    pub fn intercept(mut self, intercept: bool) -> Self {
        self.0.intercept = intercept;
        self
    }

    /// Set the containment tolerance (normalized units) applied to existing points.
    ///
    /// Existing points lying outside the trust region by less than the tolerance
    /// are recycled and clamped onto the region boundary.
    pub fn tolerance(mut self, tolerance: F) -> Self {
        self.0.tolerance = tolerance;
        self
    }

    /// Set the policy applied when more existing points than `n_points` lie within the region
    pub fn recycling(mut self, recycling: RecyclingPolicy) -> Self {
        self.0.recycling = recycling;
        self
    }

    /// Set whether candidate designs are scored in parallel.
    ///
    /// Candidates are still drawn sequentially from the random generator, hence
    /// results do not depend on this setting.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.0.parallel = parallel;
        self
    }
}

impl<F: Float> From<SamplerValidParams<F>> for SamplerParams<F> {
    fn from(valid: SamplerValidParams<F>) -> Self {
        SamplerParams(valid)
    }
}

impl<F: Float> ParamGuard for SamplerParams<F> {
    type Checked = SamplerValidParams<F>;
    type Error = SamplingError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.n_points == 0 {
            return Err(SamplingError::InvalidArgument(
                "number of points should be strictly positive".to_string(),
            ));
        }
        if self.0.n_iterations == 0 {
            return Err(SamplingError::InvalidArgument(
                "number of iterations should be strictly positive".to_string(),
            ));
        }
        if !self.0.tolerance.is_finite() || self.0.tolerance < F::zero() {
            return Err(SamplingError::InvalidArgument(format!(
                "tolerance should be positive, got {}",
                self.0.tolerance
            )));
        }
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
