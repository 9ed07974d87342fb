use crate::errors::{Result, SamplingError};
use linfa::Float;
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2, Zip};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// An axis-aligned hyper-cubic trust region
///
/// The region is defined by a `center` point and a `radius`, it spans
/// `[center_i - radius, center_i + radius]` along each axis `i`.
///
/// Two coordinate frames are used: *absolute* coordinates (caller's units) and
/// *normalized* coordinates within the unit hypercube `[0., 1.]^nx` where `0.5`
/// corresponds to the center of the region.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct TrustRegion<F: Float> {
    center: Array1<F>,
    radius: F,
}

impl<F: Float> TrustRegion<F> {
    /// Constructor of the trust region given its `center` and its `radius`
    ///
    /// ```
    /// use trsampling::TrustRegion;
    /// use ndarray::array;
    ///
    /// let region = TrustRegion::new(&array![0., 1.], 0.5).unwrap();
    /// assert_eq!(region.dim(), 2);
    /// ```
    ///
    /// Fails with [SamplingError::InvalidArgument] when the radius is not strictly positive,
    /// when the center is empty or when some values are not finite.
    pub fn new(center: &ArrayBase<impl Data<Elem = F>, Ix1>, radius: F) -> Result<Self> {
        if center.is_empty() {
            return Err(SamplingError::InvalidArgument(
                "trust region center should have at least one component".to_string(),
            ));
        }
        if !radius.is_finite() || radius <= F::zero() {
            return Err(SamplingError::InvalidArgument(format!(
                "trust region radius should be strictly positive and finite, got {}",
                radius
            )));
        }
        if center.iter().any(|c| !c.is_finite()) {
            return Err(SamplingError::InvalidArgument(format!(
                "trust region center should be finite, got {}",
                center
            )));
        }
        Ok(TrustRegion {
            center: center.to_owned(),
            radius,
        })
    }

    /// Dimension `nx` of the region
    pub fn dim(&self) -> usize {
        self.center.len()
    }

    /// Center of the region
    pub fn center(&self) -> &Array1<F> {
        &self.center
    }

    /// Radius of the region
    pub fn radius(&self) -> F {
        self.radius
    }

    /// Lower corner `center - radius`
    pub fn lower(&self) -> Array1<F> {
        self.center.mapv(|c| c - self.radius)
    }

    /// Upper corner `center + radius`
    pub fn upper(&self) -> Array1<F> {
        self.center.mapv(|c| c + self.radius)
    }

    /// Returns the region as a (nx, 2) matrix where the ith row is the
    /// \[lower bound, upper bound\] interval of the ith component.
    pub fn xlimits(&self) -> Array2<F> {
        let mut xlimits = Array2::zeros((self.dim(), 2));
        xlimits.column_mut(0).assign(&self.lower());
        xlimits.column_mut(1).assign(&self.upper());
        xlimits
    }

    fn width(&self) -> F {
        F::cast(2.) * self.radius
    }

    fn check_dim(&self, nx: usize) -> Result<()> {
        if nx != self.dim() {
            return Err(SamplingError::InvalidArgument(format!(
                "point dimension {} does not match trust region dimension {}",
                nx,
                self.dim()
            )));
        }
        Ok(())
    }

    /// Tells whether the given absolute point `x` lies within the region.
    ///
    /// `tol` is expressed in normalized units, a component is accepted if its
    /// normalized value lies within `[-tol, 1 + tol]`.
    pub fn contains(&self, x: &ArrayBase<impl Data<Elem = F>, Ix1>, tol: F) -> bool {
        x.len() == self.dim()
            && Zip::from(x).and(&self.center).all(|&xi, &ci| {
                let u = (xi - (ci - self.radius)) / self.width();
                u >= -tol && u <= F::one() + tol
            })
    }

    /// Maps an absolute point `x` into the unit hypercube of the region.
    ///
    /// Components overshooting the unit interval by less than `tol` (normalized units)
    /// are clamped to `[0., 1.]`.
    ///
    /// Fails with [SamplingError::Domain] if some component lies outside the region
    /// by more than `tol`.
    pub fn to_normalized(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix1>,
        tol: F,
    ) -> Result<Array1<F>> {
        self.check_dim(x.len())?;
        let width = self.width();
        let mut u = Array1::zeros(x.len());
        for (i, (&xi, &ci)) in x.iter().zip(self.center.iter()).enumerate() {
            let ui = (xi - (ci - self.radius)) / width;
            if ui.is_nan() || ui < -tol || ui > F::one() + tol {
                return Err(SamplingError::Domain(format!(
                    "component {} of point {} lies outside [{}, {}]",
                    i,
                    x,
                    ci - self.radius,
                    ci + self.radius
                )));
            }
            u[i] = clamp01(ui);
        }
        Ok(u)
    }

    /// Maps a normalized point `u` of the unit hypercube back to absolute coordinates.
    ///
    /// Result is clamped to the region bounds to guard against rounding.
    pub fn to_absolute(&self, u: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Array1<F> {
        let width = self.width();
        Zip::from(u).and(&self.center).map_collect(|&ui, &ci| {
            let lower = ci - self.radius;
            let upper = ci + self.radius;
            (lower + ui * width).max(lower).min(upper)
        })
    }

    /// Maps a (ns, nx) matrix of absolute points into the unit hypercube
    /// (see [TrustRegion::to_normalized])
    pub fn normalize(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
        tol: F,
    ) -> Result<Array2<F>> {
        self.check_dim(x.ncols())?;
        let mut u = Array2::zeros(x.raw_dim());
        for (mut row, xi) in u.axis_iter_mut(Axis(0)).zip(x.axis_iter(Axis(0))) {
            row.assign(&self.to_normalized(&xi, tol)?);
        }
        Ok(u)
    }

    /// Maps a (ns, nx) matrix of normalized points back to absolute coordinates
    /// (see [TrustRegion::to_absolute])
    pub fn denormalize(&self, u: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array2<F> {
        let lower = self.lower();
        let upper = self.upper();
        let mut x = u * self.width() + &lower;
        for mut row in x.axis_iter_mut(Axis(0)) {
            Zip::from(&mut row)
                .and(&lower)
                .and(&upper)
                .for_each(|v, &lo, &up| *v = (*v).max(lo).min(up));
        }
        x
    }
}

fn clamp01<F: Float>(u: F) -> F {
    u.max(F::zero()).min(F::one())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array};

    #[test]
    fn test_invalid_regions() {
        assert!(matches!(
            TrustRegion::new(&array![0., 0.], 0.),
            Err(SamplingError::InvalidArgument(_))
        ));
        assert!(matches!(
            TrustRegion::new(&array![0., 0.], -1.),
            Err(SamplingError::InvalidArgument(_))
        ));
        assert!(matches!(
            TrustRegion::new(&Array::<f64, _>::zeros(0), 1.),
            Err(SamplingError::InvalidArgument(_))
        ));
        assert!(matches!(
            TrustRegion::new(&array![f64::NAN, 0.], 1.),
            Err(SamplingError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_xlimits() {
        let region = TrustRegion::new(&array![1., -2.], 0.5).unwrap();
        assert_abs_diff_eq!(region.xlimits(), array![[0.5, 1.5], [-2.5, -1.5]]);
    }

    #[test]
    fn test_normalized_roundtrip() {
        let region = TrustRegion::new(&array![1., -2., 10.], 2.).unwrap();
        let x = array![0., -1., 12.];
        let u = region.to_normalized(&x, 1e-8).unwrap();
        assert_abs_diff_eq!(u, array![0.25, 0.75, 1.]);
        assert_abs_diff_eq!(region.to_absolute(&u), x, epsilon = 1e-12);
        assert_abs_diff_eq!(
            region.to_normalized(region.center(), 0.).unwrap(),
            array![0.5, 0.5, 0.5]
        );
    }

    #[test]
    fn test_normalized_out_of_domain() {
        let region = TrustRegion::new(&array![0., 0.], 1.).unwrap();
        let res = region.to_normalized(&array![0.5, 1.1], 1e-8);
        assert!(matches!(res, Err(SamplingError::Domain(_))));
        let res = region.to_normalized(&array![0.5], 1e-8);
        assert!(matches!(res, Err(SamplingError::InvalidArgument(_))));
    }

    #[test]
    fn test_normalized_overshoot_is_clamped() {
        let region = TrustRegion::new(&array![0., 0.], 1.).unwrap();
        let u = region.to_normalized(&array![1. + 1e-12, -1. - 1e-12], 1e-8).unwrap();
        assert_abs_diff_eq!(u, array![1., 0.]);
        assert!(region.contains(&array![1. + 1e-12, 0.], 1e-8));
        assert!(!region.contains(&array![1.01, 0.], 1e-8));
    }

    #[test]
    fn test_denormalize() {
        let region = TrustRegion::new(&array![5., 0.], 0.5).unwrap();
        let u = array![[0., 1.], [0.5, 0.5], [0.25, 0.1]];
        let x = region.denormalize(&u);
        assert_abs_diff_eq!(x, array![[4.5, 0.5], [5., 0.], [4.75, -0.4]], epsilon = 1e-12);
        assert_abs_diff_eq!(region.normalize(&x, 1e-8).unwrap(), u, epsilon = 1e-12);
    }
}
