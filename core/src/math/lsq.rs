use nalgebra::{DMatrix, DVector};

/// Relative size below which a diagonal entry of R counts as zero.
const RANK_TOLERANCE: f64 = 1e-10;

/// Linear least-squares solver for overdetermined systems.
pub struct LeastSquares;

impl LeastSquares {
    /// Solves `design * x ≈ observed` by Householder QR.
    ///
    /// Returns `None` for fewer rows than columns, mismatched shapes or a rank
    /// deficient design matrix.
    pub fn solve(design: DMatrix<f64>, observed: &DVector<f64>) -> Option<DVector<f64>> {
        let (rows, cols) = design.shape();
        if cols == 0 || rows < cols || observed.len() != rows {
            return None;
        }

        let qr = design.qr();
        let r = qr.r();
        let scale = r.diagonal().iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        if scale == 0.0 || r.diagonal().iter().any(|v| v.abs() <= scale * RANK_TOLERANCE) {
            return None;
        }

        let mut rhs = observed.clone();
        qr.q_tr_mul(&mut rhs);
        let head = rhs.rows(0, cols).into_owned();
        r.solve_upper_triangular(&head)
    }

    /// Convenience wrapper building the design matrix from rows of fixed width.
    pub fn solve_rows<const N: usize>(rows: &[[f64; N]], observed: &[f64]) -> Option<[f64; N]> {
        if rows.len() != observed.len() {
            return None;
        }
        let design = DMatrix::from_fn(rows.len(), N, |i, j| rows[i][j]);
        let observed = DVector::from_column_slice(observed);
        let solution = Self::solve(design, &observed)?;
        let mut out = [0.0; N];
        for (slot, value) in out.iter_mut().zip(solution.iter()) {
            *slot = *value;
        }
        Some(out)
    }
}
