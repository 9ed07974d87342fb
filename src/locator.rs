use crate::errors::{Result, SamplingError};
use crate::region::TrustRegion;
use linfa::Float;
use log::warn;
use ndarray::{Array2, ArrayBase, Axis, Data, Ix2};
use ndarray_rand::rand::{seq::index, Rng};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Policy applied when more existing points lie within the trust region
/// than the number of requested points
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum RecyclingPolicy {
    /// Fails with a [SamplingError::Capacity] error
    #[default]
    Strict,
    /// Keeps the first located points in the order of the existing points
    KeepFirst,
    /// Keeps a random subset of the located points
    RandomSubset,
}

/// Existing points located within a trust region
#[derive(Clone, Debug, PartialEq)]
pub struct LocatedPoints<F: Float> {
    /// Row indices of the located points within the existing points matrix
    pub indices: Vec<usize>,
    /// Located points as a (nl, nx) matrix in normalized coordinates of the region
    pub points: Array2<F>,
}

impl<F: Float> LocatedPoints<F> {
    /// No point located in a `nx`-dimensional region
    pub fn empty(nx: usize) -> Self {
        LocatedPoints {
            indices: vec![],
            points: Array2::zeros((0, nx)),
        }
    }

    /// Number of located points
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether no point is located
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Keeps the located points at given positions (positions are relative to `self`)
    pub fn select(&self, positions: &[usize]) -> Self {
        LocatedPoints {
            indices: positions.iter().map(|&p| self.indices[p]).collect(),
            points: self.points.select(Axis(0), positions),
        }
    }

    /// Restricts located points to at most `n_points` points according to the recycling `policy`.
    ///
    /// Returns the kept points and the indices (within the existing points matrix) of the
    /// discarded ones. Kept points preserve the order of the existing points.
    pub fn restrict<R: Rng>(
        self,
        n_points: usize,
        policy: RecyclingPolicy,
        rng: &mut R,
    ) -> Result<(Self, Vec<usize>)> {
        let nl = self.len();
        if nl <= n_points {
            return Ok((self, vec![]));
        }
        let kept: Vec<usize> = match policy {
            RecyclingPolicy::Strict => {
                return Err(SamplingError::Capacity {
                    recycled: nl,
                    n_points,
                })
            }
            RecyclingPolicy::KeepFirst => (0..n_points).collect(),
            RecyclingPolicy::RandomSubset => {
                let mut kept = index::sample(rng, nl, n_points).into_vec();
                kept.sort_unstable();
                kept
            }
        };
        let mut is_kept = vec![false; nl];
        kept.iter().for_each(|&k| is_kept[k] = true);
        let discarded: Vec<usize> = (0..nl)
            .filter(|&k| !is_kept[k])
            .map(|k| self.indices[k])
            .collect();
        warn!(
            "{} existing points found in trust region, only {} are recycled ({:?} policy)",
            nl, n_points, policy
        );
        Ok((self.select(&kept), discarded))
    }
}

/// Locates the `existing` points, given as a (ne, nx) matrix in absolute coordinates,
/// which lie within the trust `region`.
///
/// Points outside the region are filtered out; located points are returned in the
/// normalized coordinates of the region, preserving their order. `tol` is the containment
/// tolerance expressed in normalized units (see [TrustRegion::contains]).
///
/// Fails with [SamplingError::InvalidArgument] if the dimension of non-empty `existing`
/// points does not match the region dimension.
pub fn locate_existing_points<F: Float>(
    existing: &ArrayBase<impl Data<Elem = F>, Ix2>,
    region: &TrustRegion<F>,
    tol: F,
) -> Result<LocatedPoints<F>> {
    let nx = region.dim();
    if existing.nrows() == 0 {
        return Ok(LocatedPoints::empty(nx));
    }
    if existing.ncols() != nx {
        return Err(SamplingError::InvalidArgument(format!(
            "existing points dimension {} does not match trust region dimension {}",
            existing.ncols(),
            nx
        )));
    }

    let mut indices = vec![];
    let mut normalized = vec![];
    for (i, x) in existing.axis_iter(Axis(0)).enumerate() {
        if region.contains(&x, tol) {
            normalized.push(region.to_normalized(&x, tol)?);
            indices.push(i);
        }
    }
    let mut points = Array2::zeros((indices.len(), nx));
    for (mut row, u) in points.axis_iter_mut(Axis(0)).zip(normalized.iter()) {
        row.assign(u);
    }
    Ok(LocatedPoints { indices, points })
}
