//! Merge of recycled points with fresh random points into complete Latin hypercube designs
use crate::errors::{Result, SamplingError};
use crate::lhs::{bin_index, check_unit_hypercube, GridPartition};
use linfa::Float;
use log::warn;
use ndarray::{Array2, ArrayBase, Axis, Data, Ix2};
use ndarray_rand::rand::Rng;

/// Builds complete Latin hypercube designs of `n_points` samples in `[0., 1.]^nx`
/// where recycled points occupy fixed cells.
///
/// Fixed cells are computed once at construction and stay constant across all the
/// candidates drawn by [DesignMerger::candidate], only the free cells are redrawn.
/// In each candidate, the first [DesignMerger::n_fixed] rows are the kept recycled
/// points, unchanged.
#[derive(Clone, Debug)]
pub struct DesignMerger<F: Float> {
    partition: GridPartition<F>,
    kept: Vec<usize>,
    dropped: Vec<usize>,
}

impl<F: Float> DesignMerger<F> {
    /// Constructor given the `recycled` points as a (nr, nx) matrix in normalized coordinates
    /// and the size `n_points` of the designs to be generated.
    ///
    /// A recycled point falling in a bin already occupied by a previous recycled point
    /// along some axis cannot be kept without breaking the Latin hypercube property:
    /// it is dropped (see [DesignMerger::dropped]).
    ///
    /// Fails with
    /// * [SamplingError::InvalidArgument] when `n_points` is null or `nx` is null,
    /// * [SamplingError::Capacity] when `nr > n_points`,
    /// * [SamplingError::Domain] when a recycled point lies outside `[0., 1.]^nx`.
    pub fn new(recycled: &ArrayBase<impl Data<Elem = F>, Ix2>, n_points: usize) -> Result<Self> {
        if n_points == 0 {
            return Err(SamplingError::InvalidArgument(
                "number of points should be strictly positive".to_string(),
            ));
        }
        if recycled.nrows() > n_points {
            return Err(SamplingError::Capacity {
                recycled: recycled.nrows(),
                n_points,
            });
        }
        check_unit_hypercube(recycled)?;

        let (kept, dropped) = split_colliding(recycled, n_points);
        if !dropped.is_empty() {
            warn!(
                "{} recycled points dropped as they share a bin with another recycled point",
                dropped.len()
            );
        }
        let partition = GridPartition::with_fixed(n_points, &recycled.select(Axis(0), &kept))?;
        Ok(DesignMerger {
            partition,
            kept,
            dropped,
        })
    }

    /// Size of the generated designs
    pub fn n_points(&self) -> usize {
        self.partition.ns()
    }

    /// Number of recycled points held in fixed cells
    pub fn n_fixed(&self) -> usize {
        self.partition.n_fixed()
    }

    /// Rows of the recycled matrix kept as fixed cells, in design order
    pub fn kept(&self) -> &[usize] {
        &self.kept
    }

    /// Rows of the recycled matrix dropped because of bin collisions
    pub fn dropped(&self) -> &[usize] {
        &self.dropped
    }

    /// Number of free cells per axis, i.e. the number of fresh points of each candidate
    pub fn n_free(&self) -> usize {
        self.n_points() - self.n_fixed()
    }

    /// Draws a new candidate design: a (n_points, nx) Latin hypercube sample whose
    /// first rows are the kept recycled points.
    pub fn candidate<R: Rng>(&self, rng: &mut R) -> Array2<F> {
        self.partition.sample(rng)
    }
}

/// Splits points into kept and dropped ones: a point is kept if none of its bins
/// is already occupied by a previously kept point (first seen wins).
fn split_colliding<F: Float>(
    x: &ArrayBase<impl Data<Elem = F>, Ix2>,
    ns: usize,
) -> (Vec<usize>, Vec<usize>) {
    let mut occupied = Array2::from_elem((ns, x.ncols()), false);
    let mut kept = vec![];
    let mut dropped = vec![];
    for (i, row) in x.axis_iter(Axis(0)).enumerate() {
        let bins: Vec<usize> = row.iter().map(|&u| bin_index(u, ns)).collect();
        if bins.iter().enumerate().any(|(j, &b)| occupied[[b, j]]) {
            dropped.push(i);
        } else {
            bins.iter()
                .enumerate()
                .for_each(|(j, &b)| occupied[[b, j]] = true);
            kept.push(i);
        }
    }
    (kept, dropped)
}
