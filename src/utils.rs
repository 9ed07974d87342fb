//! Distance and linear model helpers used to score designs
use linfa::Float;
use ndarray::{s, Array1, Array2, ArrayBase, Data, Ix2};
use ndarray_stats::DeviationExt;

/// Pairwise euclidean distances between the rows of the (ns, nx) matrix `x`
/// in condensed form: distances `d(i, j)` for `i < j` in row-major order.
pub fn pdist<F: Float>(x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array1<F> {
    let nrows = x.nrows();
    let size = nrows * nrows.saturating_sub(1) / 2;
    let mut res = Array1::zeros(size);
    let mut k = 0;
    for i in 0..nrows {
        let a = x.row(i);
        for j in (i + 1)..nrows {
            res[k] = a.sq_l2_dist(&x.row(j)).map_or(F::zero(), |d| d.sqrt());
            k += 1;
        }
    }
    res
}

/// Smallest pairwise euclidean distance between the rows of `x`,
/// infinite when `x` has less than two rows.
pub fn min_pdist<F: Float>(x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> F {
    pdist(x).fold(F::infinity(), |m, &d| m.min(d))
}

/// Regression matrix of a linear model on the (ns, nx) design `x`:
/// `[1 | x]` with an intercept column, `x` otherwise.
pub fn regressors<F: Float>(
    x: &ArrayBase<impl Data<Elem = F>, Ix2>,
    intercept: bool,
) -> Array2<F> {
    if intercept {
        let mut m = Array2::ones((x.nrows(), x.ncols() + 1));
        m.slice_mut(s![.., 1..]).assign(x);
        m
    } else {
        x.to_owned()
    }
}

/// Information matrix `M^T M` of the linear model regression matrix `M` (see [regressors])
pub fn information_matrix<F: Float>(
    x: &ArrayBase<impl Data<Elem = F>, Ix2>,
    intercept: bool,
) -> Array2<F> {
    let m = regressors(x, intercept);
    m.t().dot(&m)
}

/// Running maximum of the given values
pub fn cummax<F: Float>(values: &[F]) -> Vec<F> {
    values
        .iter()
        .scan(F::neg_infinity(), |best, &v| {
            if v > *best {
                *best = v;
            }
            Some(*best)
        })
        .collect()
}

/// Rows of `x` sorted in lexicographic order, handy to compare designs up to row ordering
#[cfg(test)]
pub(crate) fn sorted_rows<F: Float>(x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Vec<Vec<F>> {
    let mut rows: Vec<Vec<F>> = x.axis_iter(ndarray::Axis(0)).map(|r| r.to_vec()).collect();
    rows.sort_by(|a, b| {
        a.iter()
            .zip(b.iter())
            .map(|(u, v)| u.partial_cmp(v).unwrap_or(std::cmp::Ordering::Equal))
            .find(|o| o.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_pdist() {
        let x = array![[0., 0.], [3., 4.], [0., 1.]];
        assert_abs_diff_eq!(pdist(&x), array![5., 1., 18f64.sqrt()], epsilon = 1e-12);
        assert_abs_diff_eq!(min_pdist(&x), 1.);
        assert_eq!(pdist(&array![[1., 2.]]).len(), 0);
        assert!(min_pdist(&array![[1f64, 2.]]).is_infinite());
    }

    #[test]
    fn test_information_matrix() {
        let x = array![[0., 1.], [1., 0.], [1., 1.]];
        assert_abs_diff_eq!(
            information_matrix(&x, false),
            array![[2., 1.], [1., 2.]]
        );
        assert_abs_diff_eq!(
            information_matrix(&x, true),
            array![[3., 2., 2.], [2., 2., 1.], [2., 1., 2.]]
        );
    }

    #[test]
    fn test_cummax() {
        assert_eq!(cummax(&[1., 0., 3., 2., 5.]), vec![1., 1., 3., 3., 5.]);
    }

    #[test]
    fn test_sorted_rows() {
        let x = array![[0.5, 0.1], [0.2, 0.9], [0.5, 0.0]];
        assert_eq!(
            sorted_rows(&x),
            vec![vec![0.2, 0.9], vec![0.5, 0.0], vec![0.5, 0.1]]
        );
    }
}
