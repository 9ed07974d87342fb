/*!
This library implements the sampling of trust regions used by model-based
derivative-free optimizers: given a hyper-cubic trust region (a center and a radius),
it builds a [Latin Hypercube](https://en.wikipedia.org/wiki/Latin_hypercube_sampling)
design of points within the region which
* is selected among many random candidate designs to optimize a design optimality
  criterion (a, d, e, g-optimality or maximin distance, see [OptimalityCriterion]),
* recycles points already evaluated in a previous, possibly overlapping, trust region
  so that expensive function evaluations are not repeated.

Recycled points keep their coordinates and occupy fixed cells of the Latin hypercube grid,
new points are spread over the cells left free.

Example:
```
use trsampling::{sample, OptimalityCriterion, TrustRegion};
use ndarray::array;

// Trust region [0.5, 1.5] x [-2.5, -1.5]
let region = TrustRegion::new(&array![1., -2.], 0.5).unwrap();
// Points evaluated so far, only the first one lies within the region
let evaluated = array![[0.7, -1.9], [3., 0.]];

let res = sample(
    &region,
    5,
    OptimalityCriterion::DOptimality,
    1000,
    Some(&evaluated),
    Some(42),
)
.unwrap();

assert_eq!(res.points.dim(), (5, 2));
assert_eq!(res.recycled, vec![0]);
// only new points have to be evaluated
assert_eq!(res.new_points().nrows(), 4);
```

The sampler can also be configured with [SamplerParams] and a custom random generator:
```
use trsampling::{
    OptimalityCriterion, RecyclingPolicy, SamplerParams, TrustRegion, TrustRegionSampler,
};
use ndarray::array;
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

let region = TrustRegion::new(&array![0., 0., 0.], 1.).unwrap();
let params = SamplerParams::new(10)
    .criterion(OptimalityCriterion::EOptimality)
    .n_iterations(500)
    .recycling(RecyclingPolicy::KeepFirst)
    .parallel(true);
let res = TrustRegionSampler::new_with_rng(&region, params, Xoshiro256Plus::seed_from_u64(0))
    .sample()
    .unwrap();
assert_eq!(res.criterion_values.len(), 500);
```
*/
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod criteria;
mod errors;
mod lhs;
mod locator;
mod merge;
mod parameters;
mod region;
mod sampler;
pub mod utils;

pub use criteria::*;
pub use errors::*;
pub use lhs::*;
pub use locator::*;
pub use merge::*;
pub use parameters::*;
pub use region::*;
pub use sampler::*;
