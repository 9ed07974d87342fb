use crate::criteria::OptimalityCriterion;
use crate::errors::{Result, SamplingError};
use crate::locator::{locate_existing_points, LocatedPoints};
use crate::merge::DesignMerger;
use crate::parameters::{SamplerParams, SamplerValidParams};
use crate::region::TrustRegion;
use crate::utils::cummax;
use linfa::{Float, ParamGuard};
use log::{debug, info, warn};
use ndarray::{s, Array1, Array2, ArrayBase, ArrayView2, Data, Ix2};
use ndarray_rand::rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use rayon::prelude::*;

/// Number of candidate designs drawn before being scored together
const CANDIDATES_CHUNK_SIZE: usize = 256;

/// Result of a trust region sampling
#[derive(Clone, Debug)]
pub struct SamplingResult<F: Float> {
    /// Best design found as a (n_points, nx) matrix in absolute coordinates.
    /// First rows are the recycled points (see [SamplingResult::recycled]), remaining rows
    /// are new points.
    pub points: Array2<F>,
    /// Score of each candidate design generated during the search
    pub criterion_values: Array1<F>,
    /// Iteration index of the best candidate design
    pub best_index: usize,
    /// Score of the best candidate design
    pub best_score: F,
    /// Rows of the existing points recycled in the design, in design order
    pub recycled: Vec<usize>,
    /// Rows of the existing points lying within the region but not recycled, either
    /// because of the recycling policy or because they share a Latin hypercube bin with
    /// a previously recycled point. Those points are not part of the design and their
    /// evaluations are not reused.
    pub dropped: Vec<usize>,
}

impl<F: Float> SamplingResult<F> {
    /// Number of recycled points
    pub fn n_recycled(&self) -> usize {
        self.recycled.len()
    }

    /// New points of the design, the ones which still have to be evaluated
    pub fn new_points(&self) -> ArrayView2<F> {
        self.points.slice(s![self.n_recycled().., ..])
    }

    /// Best score found so far at each iteration
    pub fn best_so_far(&self) -> Vec<F> {
        cummax(&self.criterion_values.to_vec())
    }
}

/// Best candidate design retained during the search
struct Incumbent<F: Float> {
    index: usize,
    score: F,
    doe: Array2<F>,
}

impl<F: Float> Incumbent<F> {
    /// Returns the winner between the incumbent and the challenger,
    /// the incumbent wins ties (earliest iteration).
    fn challenge(self, index: usize, score: F, doe: Array2<F>) -> Self {
        if score > self.score {
            debug!("Iteration {}: best score improved to {}", index, score);
            Incumbent { index, score, doe }
        } else {
            self
        }
    }
}

/// Trust region sampler: generates optimal Latin hypercube designs within a trust region.
///
/// Existing points (already evaluated) lying within the region are recycled in the design,
/// new points are spread over the Latin hypercube cells left free. Among `n_iterations`
/// random candidate designs, the best one regarding the optimality criterion is returned.
///
/// ```
/// use trsampling::{OptimalityCriterion, SamplerParams, TrustRegion, TrustRegionSampler};
/// use ndarray::array;
///
/// let region = TrustRegion::new(&array![0., 0.], 0.5).unwrap();
/// let params = SamplerParams::new(4)
///     .criterion(OptimalityCriterion::Maximin)
///     .n_iterations(100);
/// let res = TrustRegionSampler::new(&region, params)
///     .existing_points(&array![[0.1, 0.2], [3., 3.]])
///     .seed(42)
///     .sample()
///     .unwrap();
/// assert_eq!(res.points.dim(), (4, 2));
/// assert_eq!(res.recycled, vec![0]);
/// ```
pub struct TrustRegionSampler<F: Float, R: Rng + Clone> {
    /// Region to be sampled
    region: TrustRegion<F>,
    /// Sampling parameters, checked when sampling
    params: SamplerParams<F>,
    /// Optional (ne, nx) already evaluated points in absolute coordinates
    existing: Option<Array2<F>>,
    /// Random generator used for reproducibility
    rng: R,
}

/// Sampler with default random generator
impl<F: Float> TrustRegionSampler<F, Xoshiro256Plus> {
    /// Constructor given the trust `region` and the sampling `params`
    pub fn new(region: &TrustRegion<F>, params: SamplerParams<F>) -> Self {
        Self::new_with_rng(region, params, Xoshiro256Plus::from_entropy())
    }

    /// Sets the seed of the default random generator
    pub fn seed(self, seed: u64) -> Self {
        self.with_rng(Xoshiro256Plus::seed_from_u64(seed))
    }
}

impl<F: Float, R: Rng + Clone> TrustRegionSampler<F, R> {
    /// Constructor with given trust region, parameters and random generator
    pub fn new_with_rng(region: &TrustRegion<F>, params: SamplerParams<F>, rng: R) -> Self {
        TrustRegionSampler {
            region: region.clone(),
            params,
            existing: None,
            rng,
        }
    }

    /// Sets the random generator
    pub fn with_rng<R2: Rng + Clone>(self, rng: R2) -> TrustRegionSampler<F, R2> {
        TrustRegionSampler {
            region: self.region,
            params: self.params,
            existing: self.existing,
            rng,
        }
    }

    /// Sets the already evaluated points as a (ne, nx) matrix in absolute coordinates
    pub fn existing_points(mut self, existing: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Self {
        self.existing = Some(existing.to_owned());
        self
    }

    /// Trust region to be sampled
    pub fn region(&self) -> &TrustRegion<F> {
        &self.region
    }

    /// Runs the search and returns the best design found.
    ///
    /// The random generator is cloned, hence successive calls give the same result.
    ///
    /// Fails with
    /// * [SamplingError::InvalidArgument] on invalid parameters or existing points dimension,
    /// * [SamplingError::Capacity] when more existing points than requested points lie
    ///   within the region with the [crate::RecyclingPolicy::Strict] policy.
    pub fn sample(&self) -> Result<SamplingResult<F>> {
        let params = self.params.check_ref()?;
        let mut rng = self.rng.clone();
        let n_points = params.n_points();

        let located = match &self.existing {
            Some(existing) => locate_existing_points(existing, &self.region, params.tolerance())?,
            None => LocatedPoints::empty(self.region.dim()),
        };
        let (located, mut dropped) = located.restrict(n_points, params.recycling(), &mut rng)?;
        let merger = DesignMerger::new(&located.points, n_points)?;
        let recycled: Vec<usize> = merger.kept().iter().map(|&k| located.indices[k]).collect();
        dropped.extend(merger.dropped().iter().map(|&k| located.indices[k]));
        dropped.sort_unstable();

        let (best, scores) = search(&merger, params, &mut rng)?;
        if best.score == OptimalityCriterion::worst() {
            warn!(
                "No candidate design could be scored with {} criterion",
                params.criterion()
            );
        }
        info!(
            "Sampled {} points ({} recycled) in {}-dim trust region: \
             best {} = {} at iteration {}/{}",
            n_points,
            recycled.len(),
            self.region.dim(),
            params.criterion(),
            best.score,
            best.index,
            params.n_iterations()
        );

        Ok(SamplingResult {
            points: self.region.denormalize(&best.doe),
            criterion_values: Array1::from_vec(scores),
            best_index: best.index,
            best_score: best.score,
            recycled,
            dropped,
        })
    }
}

/// Generates and scores the whole budget of candidate designs, returns the best one
/// with the scores of all candidates.
///
/// Candidates are drawn sequentially by chunks then scored, possibly in parallel.
fn search<F: Float, R: Rng>(
    merger: &DesignMerger<F>,
    params: &SamplerValidParams<F>,
    rng: &mut R,
) -> Result<(Incumbent<F>, Vec<F>)> {
    let criterion = params.criterion();
    let intercept = params.intercept();
    let n_iterations = params.n_iterations();

    let mut scores = Vec::with_capacity(n_iterations);
    let mut incumbent: Option<Incumbent<F>> = None;
    for start in (0..n_iterations).step_by(CANDIDATES_CHUNK_SIZE) {
        let size = CANDIDATES_CHUNK_SIZE.min(n_iterations - start);
        let candidates: Vec<Array2<F>> = (0..size).map(|_| merger.candidate(rng)).collect();
        let chunk_scores: Vec<F> = if params.parallel() {
            candidates
                .par_iter()
                .map(|doe| criterion.score(doe, intercept))
                .collect()
        } else {
            candidates
                .iter()
                .map(|doe| criterion.score(doe, intercept))
                .collect()
        };
        for (k, (doe, score)) in candidates.into_iter().zip(chunk_scores).enumerate() {
            incumbent = Some(match incumbent {
                Some(best) => best.challenge(start + k, score, doe),
                None => Incumbent {
                    index: start + k,
                    score,
                    doe,
                },
            });
            scores.push(score);
        }
    }
    let best = incumbent.ok_or_else(|| {
        SamplingError::InvalidArgument(
            "number of iterations should be strictly positive".to_string(),
        )
    })?;
    Ok((best, scores))
}

/// Samples `n_points` points within the trust `region` optimizing the given `criterion`
/// over `n_iterations` candidate Latin hypercube designs.
///
/// `existing_points` are already evaluated points in absolute coordinates, the ones lying
/// within the region are recycled. `rng_seed` allows reproducible results.
/// Other parameters take their default values (see [SamplerParams::new]).
pub fn sample<F: Float>(
    region: &TrustRegion<F>,
    n_points: usize,
    criterion: OptimalityCriterion,
    n_iterations: usize,
    existing_points: Option<&Array2<F>>,
    rng_seed: Option<u64>,
) -> Result<SamplingResult<F>> {
    let params = SamplerParams::new(n_points)
        .criterion(criterion)
        .n_iterations(n_iterations);
    let mut sampler = TrustRegionSampler::new(region, params);
    if let Some(seed) = rng_seed {
        sampler = sampler.seed(seed);
    }
    if let Some(existing) = existing_points {
        sampler = sampler.existing_points(existing);
    }
    sampler.sample()
}
