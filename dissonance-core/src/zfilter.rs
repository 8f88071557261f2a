//! Pole-controllable variant of the filter engine.
//!
//! The denominator polynomial is factored into its complex roots at
//! construction. Each run may nudge the pole magnitudes toward the unit
//! circle (or the origin) and the pole phases toward Nyquist (or zero),
//! which alters the time response while keeping the overall frequency
//! response characteristic. The nudged roots are expanded back into real
//! coefficients and pushed through the same Direct-Form-II transposed loop
//! and delay-line representation as [`crate::filter::Filter`].

use crate::complex::Cpx;
use crate::filter::{DelayLine, FilterError, FilterSpec, MAX_POLES, MAX_ZEROS, df2_step};
use crate::roots::poly_roots;

/// Poles closer to the real axis than this are treated as real and are
/// never nudged.
const REAL_AXIS_EPS: f32 = 1e-6;

#[derive(Clone, Copy, Debug)]
struct Polar {
    mag: f32,
    ph: f32,
}

impl Polar {
    fn from_cpx(c: Cpx) -> Self {
        Self {
            mag: c.re.hypot(c.im),
            ph: c.im.atan2(c.re),
        }
    }

    fn to_cpx(self) -> Cpx {
        Cpx::new(self.mag * self.ph.cos(), self.mag * self.ph.sin())
    }
}

pub struct ZFilter {
    b: Vec<f32>,
    /// Denominator roots, sorted by descending magnitude.
    roots: Vec<Cpx>,
    delay: DelayLine,
}

impl ZFilter {
    /// Validate the spec, factor the denominator, and allocate the delay
    /// line the plain engine would use for the same orders.
    pub fn new(spec: FilterSpec) -> Result<Self, FilterError> {
        let nb = spec.b.len();
        let na = spec.a.len();
        if nb < 1 || nb > MAX_ZEROS + 1 || na > MAX_POLES {
            return Err(FilterError::InvalidOrder { nb, na });
        }
        let ndelay = (nb - 1).max(na);

        // 1 + a[1] z^-1 + ... + a[na] z^-na has the z-polynomial
        // z^na + a[1] z^(na-1) + ... + a[na]; build it in ascending powers.
        let mut poly = vec![Cpx::ZERO; na + 1];
        poly[na] = Cpx::new(1.0, 0.0);
        for i in 0..na {
            poly[i] = Cpx::new(spec.a[na - i - 1], 0.0);
        }
        let mut roots = poly_roots(&poly);
        roots.sort_by(|l, r| r.abs().partial_cmp(&l.abs()).unwrap());

        Ok(Self {
            b: spec.b,
            roots,
            delay: DelayLine::new(ndelay),
        })
    }

    /// Filter `input` into `output` with the poles nudged by `mag_fact` and
    /// `phase_fact` for the duration of this call. The stored roots are not
    /// modified, so successive calls nudge from the same baseline.
    pub fn run(&mut self, input: &[f32], output: &mut [f32], mag_fact: f32, phase_fact: f32) {
        assert_eq!(input.len(), output.len());

        let mut plr: Vec<Polar> = self.roots.iter().copied().map(Polar::from_cpx).collect();
        nudge_mags(&mut plr, &self.roots, mag_fact);
        nudge_phases(&mut plr, &self.roots, phase_fact);
        let nudged: Vec<Cpx> = plr.into_iter().map(Polar::to_cpx).collect();
        let a = expand_poly(&nudged);

        for (x, y) in input.iter().zip(output.iter_mut()) {
            *y = df2_step(&mut self.delay, self.b[0], &self.b[1..], &a, *x);
        }
    }

    pub fn reset(&mut self) {
        self.delay.reset();
    }
}

/// Expand `prod (z - r_j)` and return the real parts of the coefficients of
/// z^(dim-1) .. z^0, i.e. the denominator tail a[1..=dim].
fn expand_poly(roots: &[Cpx]) -> Vec<f32> {
    let dim = roots.len();
    let mut z = vec![Cpx::ZERO; dim + 1];
    z[0] = Cpx::new(1.0, 0.0);
    let mut d = vec![Cpx::ZERO; dim + 1];
    for (j, &root) in roots.iter().enumerate() {
        d[..dim].copy_from_slice(&z[..dim]);
        for k in 1..=j + 1 {
            z[k] = z[k] - root * d[k - 1];
        }
    }
    (0..dim).map(|j| z[j + 1].re).collect()
}

/// Scale the magnitudes of all complex poles. For `fact` in (0, 1] the
/// scale interpolates toward the unit circle, anchored on the headroom of
/// the largest-magnitude complex pole; for `fact` in [-1, 0) it
/// interpolates toward the origin. Out-of-range factors are ignored.
fn nudge_mags(plr: &mut [Polar], roots: &[Cpx], fact: f32) {
    if fact > 0.0 && fact <= 1.0 {
        let Some(lead) = (0..roots.len()).find(|&i| roots[i].im.abs() > REAL_AXIS_EPS) else {
            return;
        };
        let nudge = 1.0 + (1.0 / plr[lead].mag - 1.0) * fact;
        for (p, r) in plr.iter_mut().zip(roots) {
            if r.im.abs() > REAL_AXIS_EPS {
                p.mag *= nudge;
            }
        }
    } else if fact < 0.0 && fact >= -1.0 {
        let nudge = fact + 1.0;
        for (p, r) in plr.iter_mut().zip(roots) {
            if r.im.abs() > REAL_AXIS_EPS {
                p.mag *= nudge;
            }
        }
    }
}

/// Scale the phases of all complex poles, anchored on the largest phase
/// normalized to radian frequency. Same factor ranges as [`nudge_mags`].
fn nudge_phases(plr: &mut [Polar], roots: &[Cpx], fact: f32) {
    if fact > 0.0 && fact <= 1.0 {
        let mut phmax = 0.0_f32;
        for p in plr.iter() {
            if p.ph > phmax {
                phmax = p.ph;
            }
        }
        phmax /= std::f32::consts::PI;
        let nudge = 1.0 + (1.0 - phmax) * fact;
        for (p, r) in plr.iter_mut().zip(roots) {
            if r.im.abs() > REAL_AXIS_EPS {
                p.ph *= nudge;
            }
        }
    } else if fact < 0.0 && fact >= -1.0 {
        let nudge = fact + 1.0;
        for (p, r) in plr.iter_mut().zip(roots) {
            if r.im.abs() > REAL_AXIS_EPS {
                p.ph *= nudge;
            }
        }
    }
}

// --------------------------- Tests -----------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;

    fn impulse(n: usize) -> Vec<f32> {
        let mut x = vec![0.0; n];
        x[0] = 1.0;
        x
    }

    #[test]
    fn expand_poly_roundtrips_simple_roots() {
        // (z - 0.5)(z + 0.25) = z^2 - 0.25 z - 0.125
        let a = expand_poly(&[Cpx::new(0.5, 0.0), Cpx::new(-0.25, 0.0)]);
        assert!((a[0] + 0.25).abs() < 1e-6);
        assert!((a[1] + 0.125).abs() < 1e-6);
    }

    #[test]
    fn zero_nudge_matches_plain_engine() {
        let spec = FilterSpec {
            b: vec![1.0],
            a: vec![-1.0, 0.5], // conjugate pole pair at 0.5 +- 0.5i
        };
        let mut zf = ZFilter::new(spec.clone()).unwrap();
        let mut f = Filter::new(spec).unwrap();

        let x = impulse(32);
        let mut yz = vec![0.0; 32];
        let mut yf = vec![0.0; 32];
        zf.run(&x, &mut yz, 0.0, 0.0);
        f.run(&x, &mut yf);

        for (a, b) in yz.iter().zip(&yf) {
            assert!((a - b).abs() < 1e-3, "{a} vs {b}");
        }
    }

    #[test]
    fn full_negative_mag_nudge_cancels_complex_poles() {
        let mut zf = ZFilter::new(FilterSpec {
            b: vec![1.0],
            a: vec![-1.0, 0.5],
        })
        .unwrap();
        let x = impulse(8);
        let mut y = vec![0.0; 8];
        // mag factor -1 collapses the pole pair onto the origin, leaving a
        // pure passthrough
        zf.run(&x, &mut y, -1.0, 0.0);
        assert!((y[0] - 1.0).abs() < 1e-5);
        for yi in &y[1..] {
            assert!(yi.abs() < 1e-5);
        }
    }

    #[test]
    fn positive_mag_nudge_slows_decay() {
        let spec = FilterSpec {
            b: vec![1.0],
            a: vec![-1.0, 0.5],
        };
        let x = impulse(64);

        let mut plain = ZFilter::new(spec.clone()).unwrap();
        let mut nudged = ZFilter::new(spec).unwrap();
        let mut y0 = vec![0.0; 64];
        let mut y1 = vec![0.0; 64];
        plain.run(&x, &mut y0, 0.0, 0.0);
        nudged.run(&x, &mut y1, 0.9, 0.0);

        let energy = |y: &[f32]| y[32..].iter().map(|v| v * v).sum::<f32>();
        assert!(energy(&y1) > energy(&y0));
        assert!(y1.iter().all(|v| v.is_finite()));
    }
}
