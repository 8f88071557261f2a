//! Polynomial root finding by Laguerre iteration with deflation.
//!
//! Classic scheme: find one root of the deflated polynomial at a time
//! starting from the origin, divide it out synthetically, then polish every
//! root against the original polynomial to undo accumulated deflation error.
//!
//! Reference: Press et al., *Numerical Recipes in C*, 2nd ed., §9.5.

use log::warn;

use crate::complex::Cpx;

/// Fraction of the accumulated coefficient magnitude accepted as converged.
const EPSS: f32 = 1.0e-7;
/// Cycle-breaking step fractions applied every `MT` iterations.
const FRAC: [f32; MR + 1] = [0.0, 0.5, 0.25, 0.75, 0.13, 0.38, 0.62, 0.88, 1.0];
const MR: usize = 8;
const MT: usize = 10;
const MAXIT: usize = MT * MR;

/// Imaginary parts within `2 * EPS * |re|` collapse to zero.
const EPS: f32 = 2.0e-6;

/// One Laguerre search for a root of `a[0] + a[1] z + ... + a[m] z^m`,
/// refining `x` in place. Returns false if the iteration limit was reached.
fn laguerre(a: &[Cpx], x: &mut Cpx) -> bool {
    let m = a.len() - 1;
    for iter in 1..=MAXIT {
        // Evaluate the polynomial and its first two derivatives at x,
        // accumulating a running magnitude bound for the convergence test.
        let mut b = a[m];
        let mut err = b.abs();
        let mut d = Cpx::ZERO;
        let mut f = Cpx::ZERO;
        let abx = x.abs();
        for &aj in a[..m].iter().rev() {
            f = *x * f + d;
            d = *x * d + b;
            b = *x * b + aj;
            err = b.abs() + abx * err;
        }
        err *= EPSS;
        if b.abs() <= err {
            return true;
        }
        let g = d.div(b);
        let g2 = g * g;
        let h = g2 - f.div(b).scale(2.0);
        let sq = (h.scale(m as f32) - g2).scale((m - 1) as f32).sqrt();
        let gp = g + sq;
        let gm = g - sq;
        let abp = gp.abs();
        let abm = gm.abs();
        let denom = if abp < abm { gm } else { gp };
        let dx = if abp.max(abm) > 0.0 {
            Cpx::new(m as f32, 0.0).div(denom)
        } else {
            // Degenerate denominator: take a unit-circle step scaled by |x|.
            Cpx::new((iter as f32).cos(), (iter as f32).sin()).scale(1.0 + abx)
        };
        let x1 = *x - dx;
        if x.re == x1.re && x.im == x1.im {
            return true;
        }
        if iter % MT != 0 {
            *x = x1;
        } else {
            *x = *x - dx.scale(FRAC[iter / MT]);
        }
    }
    false
}

/// Roots of the degree-m polynomial with coefficients `a[0..=m]` in ascending
/// powers of z, sorted by ascending real part.
///
/// Non-convergence is diagnostic only: a warning is logged and the best
/// estimates found so far are returned.
pub fn poly_roots(a: &[Cpx]) -> Vec<Cpx> {
    let m = a.len().saturating_sub(1);
    let mut roots = vec![Cpx::ZERO; m];
    let mut ad = a.to_vec();

    for j in (1..=m).rev() {
        let mut x = Cpx::ZERO;
        if !laguerre(&ad[..=j], &mut x) {
            warn!("root finder did not converge at degree {j}");
        }
        if x.im.abs() <= 2.0 * EPS * x.re.abs() {
            x.im = 0.0;
        }
        roots[j - 1] = x;
        // Deflate by (z - x) with synthetic division.
        let mut b = ad[j];
        for jj in (0..j).rev() {
            let c = ad[jj];
            ad[jj] = b;
            b = x * b + c;
        }
    }

    // Polish against the undeflated polynomial.
    for r in roots.iter_mut() {
        if !laguerre(a, r) {
            warn!("root polish did not converge");
        }
    }

    // Insertion sort by ascending real part.
    for j in 1..m {
        let x = roots[j];
        let mut i = j;
        while i > 0 && roots[i - 1].re > x.re {
            roots[i] = roots[i - 1];
            i -= 1;
        }
        roots[i] = x;
    }
    roots
}

// --------------------------- Tests -----------------------------
