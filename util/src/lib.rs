use nalgebra::{DMatrix, DVector};

/// Poor man's approx assertion for matrices
#[macro_export]
macro_rules! assert_approx_matrix_eq {
    ($x:expr, $y:expr, abstol = $tol:expr) => {{
        let (x, y, tol) = (&$x, &$y, $tol);
        let diff = x - y;

        let max_absdiff = diff.abs().max();
        let approx_eq = max_absdiff <= tol;

        if !approx_eq {
            println!("abstol: {:e}", tol);
            println!("left: {}", x);
            println!("right: {}", y);
            println!("diff: {:e}", diff);
        }
        assert!(approx_eq);
    }};
}

/// Asserts that the two matrices are equal entry by entry, without any tolerance.
#[macro_export]
macro_rules! assert_matrix_identical {
    ($x:expr, $y:expr) => {{
        let (x, y) = (&$x, &$y);
        assert_eq!(x.shape(), y.shape(), "Matrix shapes differ");
        if x != y {
            println!("left: {}", x);
            println!("right: {}", y);
            panic!("Matrices are not identical");
        }
    }};
}

#[macro_export]
macro_rules! assert_panics {
    ($e:expr) => {{
        use std::panic::catch_unwind;
        use std::panic::AssertUnwindSafe;
        use std::stringify;
        let expr_string = stringify!($e);
        let result = catch_unwind(AssertUnwindSafe(|| $e));
        if result.is_ok() {
            panic!("assert_panics!({}) failed.", expr_string);
        }
    }};
}

/// Approximates the Jacobian of `f` at `x` with central finite differences of step `h`.
///
/// Column `j` of the result holds `(f(x + h e_j) - f(x - h e_j)) / 2h`, so the error
/// is `O(h^2)` for smooth `f`.
pub fn approximate_jacobian(mut f: impl FnMut(&DVector<f64>) -> DVector<f64>, x: &DVector<f64>, h: f64) -> DMatrix<f64> {
    let in_dim = x.len();
    let mut x_plus = x.clone();
    let mut x_minus = x.clone();

    let mut columns = Vec::with_capacity(in_dim);
    for j in 0..in_dim {
        x_plus.copy_from(x);
        x_plus[j] += h;
        x_minus.copy_from(x);
        x_minus[j] -= h;

        let f_plus = f(&x_plus);
        let f_minus = f(&x_minus);
        assert_eq!(f_plus.len(), f_minus.len(), "Function must have a fixed output dimension");
        columns.push((f_plus - f_minus) / (2.0 * h));
    }

    let out_dim = columns.first().map(|c| c.len()).unwrap_or(0);
    DMatrix::from_fn(out_dim, in_dim, |i, j| columns[j][i])
}
