//! Least-squares regression
//!
//! [`ols`] solves by Householder QR so the unit-root test gets accurate
//! t-values even for nearly collinear lag columns. [`ridge`] solves the
//! penalised normal equations by Cholesky and works with fewer rows than
//! columns, which the high-order ARMA regressions need on short series.

use crate::{ensure_finite, MathError, Result};

/// Dense row-major design matrix
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Empty matrix with a fixed number of columns
    pub fn with_columns(cols: usize) -> Self {
        Self {
            rows: 0,
            cols,
            data: Vec::new(),
        }
    }

    /// Append one observation
    pub fn push_row(&mut self, row: &[f64]) -> Result<()> {
        if row.len() != self.cols {
            return Err(MathError::InvalidInput(format!(
                "Row has {} values, matrix has {} columns",
                row.len(),
                self.cols
            )));
        }
        self.data.extend_from_slice(row);
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Keep only the first `cols` columns
    pub fn leading_columns(&self, cols: usize) -> Matrix {
        let cols = cols.min(self.cols);
        let mut out = Matrix::with_columns(cols);
        for r in 0..self.rows {
            out.data.extend_from_slice(&self.row(r)[..cols]);
            out.rows += 1;
        }
        out
    }
}

/// Result of an ordinary least-squares fit
#[derive(Debug, Clone)]
pub struct OlsFit {
    coefficients: Vec<f64>,
    residual_sum_squares: f64,
    nobs: usize,
    /// Inverse of the R factor; `(X'X)^-1 = R^-1 R^-T`
    r_inverse: Vec<Vec<f64>>,
}

impl OlsFit {
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn residual_sum_squares(&self) -> f64 {
        self.residual_sum_squares
    }

    pub fn nobs(&self) -> usize {
        self.nobs
    }

    pub fn nparams(&self) -> usize {
        self.coefficients.len()
    }

    /// Residual variance with `n - k` degrees of freedom
    pub fn sigma_squared(&self) -> Result<f64> {
        let dof = self.nobs.saturating_sub(self.nparams());
        if dof == 0 {
            return Err(MathError::InsufficientData(
                "No residual degrees of freedom".to_string(),
            ));
        }
        Ok(self.residual_sum_squares / dof as f64)
    }

    /// Standard error of coefficient `idx`
    pub fn std_error(&self, idx: usize) -> Result<f64> {
        if idx >= self.nparams() {
            return Err(MathError::InvalidInput(format!(
                "Coefficient index {} out of range",
                idx
            )));
        }
        let diag: f64 = self.r_inverse[idx][idx..].iter().map(|u| u * u).sum();
        Ok((self.sigma_squared()? * diag).sqrt())
    }

    /// t statistic of coefficient `idx`
    pub fn t_value(&self, idx: usize) -> Result<f64> {
        let se = self.std_error(idx)?;
        if se == 0.0 {
            return Err(MathError::Singular(
                "Zero standard error; the fit is exact".to_string(),
            ));
        }
        Ok(self.coefficients[idx] / se)
    }

    /// Akaike information criterion under Gaussian errors.
    ///
    /// `-2 * loglik + 2k` with `loglik = -n/2 * (ln(2*pi) + ln(rss/n) + 1)`.
    pub fn aic(&self) -> f64 {
        let n = self.nobs as f64;
        let log_sigma2 = (self.residual_sum_squares / n).ln();
        let loglik = -n / 2.0 * ((2.0 * std::f64::consts::PI).ln() + log_sigma2 + 1.0);
        -2.0 * loglik + 2.0 * self.nparams() as f64
    }
}

/// Ordinary least squares of `response` on the columns of `design`.
pub fn ols(design: &Matrix, response: &[f64]) -> Result<OlsFit> {
    let (m, n) = (design.rows(), design.cols());
    if response.len() != m {
        return Err(MathError::InvalidInput(format!(
            "Response has {} values, design has {} rows",
            response.len(),
            m
        )));
    }
    if n == 0 || m < n {
        return Err(MathError::InsufficientData(format!(
            "{} observations cannot identify {} coefficients",
            m, n
        )));
    }
    ensure_finite(&design.data, "design matrix")?;
    ensure_finite(response, "response")?;

    let mut a = design.data.clone();
    let mut qty = response.to_vec();
    let at = |i: usize, j: usize| i * n + j;

    for j in 0..n {
        let norm = (j..m).map(|i| a[at(i, j)].powi(2)).sum::<f64>().sqrt();
        let alpha = if a[at(j, j)] > 0.0 { -norm } else { norm };

        let mut v: Vec<f64> = (j..m).map(|i| a[at(i, j)]).collect();
        v[0] -= alpha;
        let v_norm_sq: f64 = v.iter().map(|x| x * x).sum();
        if v_norm_sq == 0.0 {
            continue;
        }

        for c in j..n {
            let dot: f64 = (j..m).map(|i| v[i - j] * a[at(i, c)]).sum();
            let factor = 2.0 * dot / v_norm_sq;
            for i in j..m {
                a[at(i, c)] -= factor * v[i - j];
            }
        }
        let dot: f64 = (j..m).map(|i| v[i - j] * qty[i]).sum();
        let factor = 2.0 * dot / v_norm_sq;
        for i in j..m {
            qty[i] -= factor * v[i - j];
        }
    }

    let scale = (0..n).map(|j| a[at(j, j)].abs()).fold(0.0, f64::max);
    let tolerance = scale * f64::EPSILON * m.max(n) as f64 * 10.0;
    if let Some(j) = (0..n).find(|&j| a[at(j, j)].abs() <= tolerance) {
        return Err(MathError::Singular(format!(
            "Design column {} is linearly dependent on the others",
            j
        )));
    }

    let mut coefficients = vec![0.0; n];
    for j in (0..n).rev() {
        let tail: f64 = (j + 1..n).map(|l| a[at(j, l)] * coefficients[l]).sum();
        coefficients[j] = (qty[j] - tail) / a[at(j, j)];
    }

    let mut r_inverse = vec![vec![0.0; n]; n];
    for j in 0..n {
        r_inverse[j][j] = 1.0 / a[at(j, j)];
        for i in (0..j).rev() {
            let s: f64 = (i + 1..=j).map(|l| a[at(i, l)] * r_inverse[l][j]).sum();
            r_inverse[i][j] = -s / a[at(i, i)];
        }
    }

    let residual_sum_squares = qty[n..].iter().map(|x| x * x).sum();

    Ok(OlsFit {
        coefficients,
        residual_sum_squares,
        nobs: m,
        r_inverse,
    })
}

/// Ridge regression: minimises `|y - X b|^2 + lambda |b|^2` where
/// `lambda = relative_penalty * trace(X'X) / k`.
///
/// Rows may be fewer than columns. An all-zero design yields zero
/// coefficients.
pub fn ridge(design: &Matrix, response: &[f64], relative_penalty: f64) -> Result<Vec<f64>> {
    let (m, k) = (design.rows(), design.cols());
    if response.len() != m {
        return Err(MathError::InvalidInput(format!(
            "Response has {} values, design has {} rows",
            response.len(),
            m
        )));
    }
    if !(relative_penalty > 0.0) {
        return Err(MathError::InvalidInput(
            "Ridge penalty must be positive".to_string(),
        ));
    }
    ensure_finite(&design.data, "design matrix")?;
    ensure_finite(response, "response")?;

    let mut gram = vec![vec![0.0; k]; k];
    let mut rhs = vec![0.0; k];
    for r in 0..m {
        let row = design.row(r);
        for i in 0..k {
            if row[i] == 0.0 {
                continue;
            }
            rhs[i] += row[i] * response[r];
            for j in i..k {
                gram[i][j] += row[i] * row[j];
            }
        }
    }

    let trace: f64 = (0..k).map(|i| gram[i][i]).sum();
    if k == 0 || trace == 0.0 {
        return Ok(vec![0.0; k]);
    }
    let lambda = relative_penalty * trace / k as f64;
    for i in 0..k {
        gram[i][i] += lambda;
        for j in 0..i {
            gram[i][j] = gram[j][i];
        }
    }

    let lower = cholesky(&gram)?;

    // forward then backward substitution
    let mut z = vec![0.0; k];
    for i in 0..k {
        let s: f64 = (0..i).map(|l| lower[i][l] * z[l]).sum();
        z[i] = (rhs[i] - s) / lower[i][i];
    }
    let mut beta = vec![0.0; k];
    for i in (0..k).rev() {
        let s: f64 = (i + 1..k).map(|l| lower[l][i] * beta[l]).sum();
        beta[i] = (z[i] - s) / lower[i][i];
    }

    ensure_finite(&beta, "ridge coefficients")?;
    Ok(beta)
}

fn cholesky(a: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
    let k = a.len();
    let mut lower = vec![vec![0.0; k]; k];
    for i in 0..k {
        for j in 0..=i {
            let s: f64 = (0..j).map(|l| lower[i][l] * lower[j][l]).sum();
            if i == j {
                let pivot = a[i][i] - s;
                if !(pivot > 0.0) {
                    return Err(MathError::Singular(format!(
                        "Matrix is not positive definite at pivot {}",
                        i
                    )));
                }
                lower[i][i] = pivot.sqrt();
            } else {
                lower[i][j] = (a[i][j] - s) / lower[j][j];
            }
        }
    }
    Ok(lower)
}
