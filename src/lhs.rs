use crate::errors::{Result, SamplingError};
use linfa::Float;
use ndarray::{s, Array, Array2, ArrayBase, Axis, Data, Ix2};
use ndarray_rand::{rand::seq::SliceRandom, rand::Rng, rand_distr::Uniform, RandomExt};

/// Bins assigned to samples as a (ns, nx) matrix: the (i, j) element is the bin index
/// of the ith sample along the jth axis.
///
/// In a valid assignment each column is a permutation of `0..ns`.
pub type GridAssignment = Array2<usize>;

/// Index of the bin containing the normalized coordinate `u` when `[0., 1.]`
/// is divided into `ns` equal bins.
///
/// The upper bound `1.` belongs to the last bin. Without any bin (`ns == 0`)
/// the index is `0`.
pub fn bin_index<F: Float>(u: F, ns: usize) -> usize {
    if ns == 0 {
        return 0;
    }
    let k = (u * F::cast(ns)).floor();
    if k <= F::zero() {
        0
    } else {
        k.to_usize().map_or(ns - 1, |k| k.min(ns - 1))
    }
}

/// Bins of the given (ns, nx) normalized samples, `ns` bins per axis
pub fn grid_assignment<F: Float>(x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> GridAssignment {
    let ns = x.nrows();
    x.mapv(|u| bin_index(u, ns))
}

/// Checks the Latin hypercube property of the given (ns, nx) normalized samples:
/// along each axis, `[0., 1.]` divided into `ns` bins contains exactly one sample per bin.
pub fn is_latin_hypercube<F: Float>(x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> bool {
    let ns = x.nrows();
    grid_assignment(x).axis_iter(Axis(1)).all(|bins| {
        let mut seen = vec![false; ns];
        bins.iter().all(|&b| !std::mem::replace(&mut seen[b], true))
    })
}

/// The Latin hypercube partition of the unit hypercube `[0., 1.]^nx` in `ns` bins per axis.
///
/// Some cells may be occupied by fixed points: the first `nf` samples of the partition
/// are the fixed points, their bins are held constant, while the `ns - nf` free samples
/// are spread over the remaining bins of each axis using random permutations.
#[derive(Clone, Debug)]
pub struct GridPartition<F: Float> {
    /// Number of bins (and samples) per axis
    ns: usize,
    /// (nf, nx) fixed points in normalized coordinates
    fixed: Array2<F>,
    /// (nf, nx) bins occupied by fixed points
    fixed_bins: GridAssignment,
    /// For each axis, the bins left free by fixed points
    free_bins: Vec<Vec<usize>>,
}

impl<F: Float> GridPartition<F> {
    /// Partition of `[0., 1.]^nx` with `ns` bins per axis without any fixed point
    pub fn new(ns: usize, nx: usize) -> Result<Self> {
        Self::with_fixed(ns, &Array2::<F>::zeros((0, nx)))
    }

    /// Partition of `[0., 1.]^nx` with `ns` bins per axis where the given `fixed`
    /// normalized points, a (nf, nx) matrix, occupy their own bins.
    ///
    /// Fails with
    /// * [SamplingError::InvalidArgument] when `ns` or `nx` is null or when two fixed points
    ///   share a bin along some axis,
    /// * [SamplingError::Capacity] when `nf > ns`,
    /// * [SamplingError::Domain] when a fixed point lies outside `[0., 1.]^nx`.
    pub fn with_fixed(ns: usize, fixed: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Self> {
        let nx = fixed.ncols();
        if ns == 0 || nx == 0 {
            return Err(SamplingError::InvalidArgument(format!(
                "grid partition requires at least one bin and one axis, got ({}, {})",
                ns, nx
            )));
        }
        if fixed.nrows() > ns {
            return Err(SamplingError::Capacity {
                recycled: fixed.nrows(),
                n_points: ns,
            });
        }
        check_unit_hypercube(fixed)?;

        let fixed_bins = fixed.mapv(|u| bin_index(u, ns));
        let mut free_bins = Vec::with_capacity(nx);
        for (j, bins) in fixed_bins.axis_iter(Axis(1)).enumerate() {
            let mut occupied = vec![false; ns];
            for (i, &b) in bins.iter().enumerate() {
                if std::mem::replace(&mut occupied[b], true) {
                    return Err(SamplingError::InvalidArgument(format!(
                        "fixed point {} shares bin {} with another fixed point along axis {}",
                        i, b, j
                    )));
                }
            }
            free_bins.push((0..ns).filter(|&b| !occupied[b]).collect());
        }

        Ok(GridPartition {
            ns,
            fixed: fixed.to_owned(),
            fixed_bins,
            free_bins,
        })
    }

    /// Number of samples (and bins per axis)
    pub fn ns(&self) -> usize {
        self.ns
    }

    /// Dimension of the sample space
    pub fn nx(&self) -> usize {
        self.fixed.ncols()
    }

    /// Number of fixed points
    pub fn n_fixed(&self) -> usize {
        self.fixed.nrows()
    }

    /// Fixed points of the partition
    pub fn fixed(&self) -> &Array2<F> {
        &self.fixed
    }

    /// Draws a random grid assignment: fixed points keep their bins while free samples
    /// get a random permutation of the free bins along each axis.
    pub fn draw<R: Rng>(&self, rng: &mut R) -> GridAssignment {
        let nf = self.n_fixed();
        let mut bins = Array2::zeros((self.ns, self.nx()));
        bins.slice_mut(s![..nf, ..]).assign(&self.fixed_bins);
        for (j, free) in self.free_bins.iter().enumerate() {
            let mut perm = free.to_owned();
            perm.shuffle(rng);
            for (i, b) in perm.into_iter().enumerate() {
                bins[[nf + i, j]] = b;
            }
        }
        bins
    }

    /// Places the samples of the given grid assignment: fixed points keep their coordinates
    /// while free samples are drawn uniformly within their bins.
    pub fn fill<R: Rng>(&self, bins: &GridAssignment, rng: &mut R) -> Array2<F> {
        let nf = self.n_fixed();
        let nfree = self.ns - nf;
        let rnd = Array::random_using((nfree, self.nx()), Uniform::new(0., 1.), rng);
        let mut doe = Array2::zeros((self.ns, self.nx()));
        doe.slice_mut(s![..nf, ..]).assign(&self.fixed);
        for i in 0..nfree {
            for j in 0..self.nx() {
                let b = bins[[nf + i, j]];
                doe[[nf + i, j]] = self.within_bin(b, F::cast(rnd[[i, j]]));
            }
        }
        doe
    }

    /// Draws a random Latin hypercube sample (ns, nx) in `[0., 1.]^nx` honouring fixed points
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Array2<F> {
        let bins = self.draw(rng);
        self.fill(&bins, rng)
    }

    /// Coordinate at relative position `r` in `[0, 1)` within bin `b`
    fn within_bin(&self, b: usize, r: F) -> F {
        let ns = F::cast(self.ns);
        let u = (F::cast(b) + r) / ns;
        // rounding may push the value onto a bin boundary
        if bin_index(u, self.ns) == b {
            u
        } else {
            (F::cast(b) + F::cast(0.5)) / ns
        }
    }
}

pub(crate) fn check_unit_hypercube<F: Float>(
    x: &ArrayBase<impl Data<Elem = F>, Ix2>,
) -> Result<()> {
    match x
        .indexed_iter()
        .find(|(_, &u)| u.is_nan() || u < F::zero() || u > F::one())
    {
        Some(((i, j), u)) => Err(SamplingError::Domain(format!(
            "fixed point {} component {} ({}) lies outside [0, 1]",
            i, j, u
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use ndarray_rand::rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    #[test]
    fn test_bin_index() {
        assert_eq!(bin_index(0., 4), 0);
        assert_eq!(bin_index(0.24, 4), 0);
        assert_eq!(bin_index(0.25, 4), 1);
        assert_eq!(bin_index(0.99, 4), 3);
        assert_eq!(bin_index(1., 4), 3);
        assert_eq!(bin_index(-1e-12, 4), 0);
        assert_eq!(bin_index(f64::INFINITY, 4), 3);
        assert_eq!(bin_index(f64::INFINITY, 0), 0);
        assert_eq!(bin_index(0.5, 0), 0);
    }

    #[test]
    fn test_is_latin_hypercube() {
        let lhs = array![[0.1, 0.5], [0.6, 0.1], [0.9, 0.8]];
        assert!(is_latin_hypercube(&lhs));
        let not_lhs = array![[0.1, 0.5], [0.2, 0.1], [0.9, 0.8]];
        assert!(!is_latin_hypercube(&not_lhs));
    }

    #[test]
    fn test_free_partition() {
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let partition = GridPartition::<f64>::new(10, 3).unwrap();
        for _ in 0..20 {
            let doe = partition.sample(&mut rng);
            assert_eq!(doe.dim(), (10, 3));
            assert!(doe.iter().all(|&u| (0. ..1.).contains(&u)));
            assert!(is_latin_hypercube(&doe));
        }
    }

    #[test]
    fn test_draw_is_permutation() {
        let mut rng = Xoshiro256Plus::seed_from_u64(0);
        let partition = GridPartition::<f64>::new(7, 4).unwrap();
        let bins = partition.draw(&mut rng);
        for col in bins.axis_iter(Axis(1)) {
            let mut sorted = col.to_vec();
            sorted.sort_unstable();
            assert_eq!(sorted, (0..7).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_fixed_points_are_kept() {
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let fixed = array![[0.05, 0.95], [0.52, 0.33]];
        let partition = GridPartition::with_fixed(5, &fixed).unwrap();
        assert_eq!(partition.n_fixed(), 2);
        for _ in 0..20 {
            let doe = partition.sample(&mut rng);
            assert_abs_diff_eq!(doe.slice(s![..2, ..]), fixed);
            assert!(is_latin_hypercube(&doe));
        }
    }

    #[test]
    fn test_all_fixed() {
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let fixed = array![[0.1, 0.5], [0.5, 0.9], [0.9, 0.1]];
        let partition = GridPartition::with_fixed(3, &fixed).unwrap();
        assert_abs_diff_eq!(partition.sample(&mut rng), fixed);
    }

    #[test]
    fn test_invalid_partitions() {
        assert!(matches!(
            GridPartition::<f64>::new(0, 2),
            Err(SamplingError::InvalidArgument(_))
        ));
        let fixed = array![[0.1, 0.5], [0.5, 0.9], [0.9, 0.1]];
        assert!(matches!(
            GridPartition::with_fixed(2, &fixed),
            Err(SamplingError::Capacity {
                recycled: 3,
                n_points: 2
            })
        ));
        let fixed = array![[0.1, 0.5], [0.15, 0.9]];
        assert!(matches!(
            GridPartition::with_fixed(4, &fixed),
            Err(SamplingError::InvalidArgument(_))
        ));
        let fixed = array![[0.1, 1.5]];
        assert!(matches!(
            GridPartition::with_fixed(4, &fixed),
            Err(SamplingError::Domain(_))
        ));
    }

    #[test]
    fn test_reproducible_sample() {
        let partition = GridPartition::<f64>::new(5, 2).unwrap();
        let doe1 = partition.sample(&mut Xoshiro256Plus::seed_from_u64(42));
        let doe2 = partition.sample(&mut Xoshiro256Plus::seed_from_u64(42));
        assert_abs_diff_eq!(doe1, doe2);
    }
}
