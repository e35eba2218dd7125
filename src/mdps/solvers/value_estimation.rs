use super::backup::*;
use crate::{common::defs::*, error::*, math::*, mdps::mdp::*, mdps::policy::*};
use tracing::{debug, warn};

/// Operator applications between two convergence probes.
///
/// Reported iteration counts are multiples of this.
pub const PROBE_INTERVAL: usize = 100;

pub(crate) struct FixedPoint {
    pub values: Vec<Continous>,
    pub iterations: usize,
    pub converged: bool,
}

/// Iterates `step` from the zero vector.
///
/// Every round applies `step` [`PROBE_INTERVAL`] times and compares the last
/// two vectors. Stops once they are closer than `10^-threshold` in L-infinity
/// norm, or after the round that reaches `max_iter`.
pub(crate) fn fixed_point<F>(
    n_s: usize,
    threshold: Option<i32>,
    max_iter: usize,
    step: F,
) -> FixedPoint
where
    F: Fn(&[Continous]) -> Vec<Continous>,
{
    let limit = threshold.map_or(0., |t| (10 as Continous).powi(-t));
    let mut v = vec![0.; n_s];
    let mut iterations = 0;

    while iterations < max_iter {
        v = (1..PROBE_INTERVAL).fold(v, |v, _| step(&v));
        let vv = step(&v);
        iterations += PROBE_INTERVAL;

        let delta = l_inf_distance(&vv, &v);
        debug!(iterations, delta, "probe");
        if delta < limit {
            debug!(iterations, delta, "converged");
            return FixedPoint {
                values: vv,
                iterations,
                converged: true,
            };
        }

        v = vv;
    }

    warn!(iterations, max_iter, "iteration ceiling reached before convergence");
    FixedPoint {
        values: v,
        iterations,
        converged: false,
    }
}

/// Estimates `v_pi` by iterating `B_pi` from the zero vector.
///
/// Returns the values and the number of backups applied. A count that reached
/// `max_iter` means the estimate did not converge. `threshold = None` never
/// stops early. Fails up front when `policy` does not fit `mdp`.
pub fn estimate_policy_value<M: Mdp + ?Sized>(
    mdp: &M,
    policy: &TabularPolicy,
    gamma: Continous,
    threshold: Option<i32>,
    max_iter: usize,
) -> Result<(Vec<Continous>, usize)> {
    policy.check(mdp)?;
    let fp = fixed_point(mdp.n_s(), threshold, max_iter, |v| {
        bpi_checked(mdp, v, policy, gamma)
    });
    Ok((fp.values, fp.iterations))
}

/// Estimates `v*` by iterating `B` from the zero vector.
///
/// Returns the values and the number of backups applied, as
/// [`estimate_policy_value`] does.
pub fn estimate_optimal_value<M: Mdp + ?Sized>(
    mdp: &M,
    gamma: Continous,
    threshold: Option<i32>,
    max_iter: usize,
) -> (Vec<Continous>, usize) {
    let fp = fixed_point(mdp.n_s(), threshold, max_iter, |v| b(mdp, v, gamma));
    (fp.values, fp.iterations)
}
