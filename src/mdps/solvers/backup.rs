//! Bellman backup operators.
//!
//! Every operator reads the model and the previous value vector only, and
//! returns a fresh vector.

use crate::{common::defs::*, error::*, mdps::mdp::*, mdps::policy::*};

/// One-step backup of taking `a` in `s`: `sum p * (r + gamma * v[s'])`.
pub fn q<M: Mdp + ?Sized>(
    mdp: &M,
    v: &[Continous],
    s: Discrete,
    a: Discrete,
    gamma: Continous,
) -> Continous {
    mdp.transitions(s, a)
        .iter()
        .map(|t| t.probability * (t.reward + gamma * v[t.next_state]))
        .sum()
}

/// `q` for every available action of `s`, in ascending action order.
pub fn q_all_actions<M: Mdp + ?Sized>(
    mdp: &M,
    v: &[Continous],
    s: Discrete,
    gamma: Continous,
) -> Vec<(Discrete, Continous)> {
    mdp.available_actions(s)
        .map(|a| (a, q(mdp, v, s, a, gamma)))
        .collect()
}

pub fn q_all_states<M: Mdp + ?Sized>(
    mdp: &M,
    v: &[Continous],
    gamma: Continous,
) -> Vec<Vec<(Discrete, Continous)>> {
    (0..mdp.n_s())
        .map(|s| q_all_actions(mdp, v, s, gamma))
        .collect()
}

/// Best one-step backup of `s` and the action reaching it.
///
/// Ties go to the lowest action index. `None` when `s` has no available action.
pub fn q_max<M: Mdp + ?Sized>(
    mdp: &M,
    v: &[Continous],
    s: Discrete,
    gamma: Continous,
) -> Option<(Continous, Discrete)> {
    mdp.available_actions(s)
        .map(|a| (q(mdp, v, s, a, gamma), a))
        .fold(None, |best, (q, a)| match best {
            Some((best_q, _)) if best_q >= q => best,
            _ => Some((q, a)),
        })
}

/// The policy backup `B_pi`. Fails when `policy` does not fit `mdp`.
pub fn bpi<M: Mdp + ?Sized>(
    mdp: &M,
    v: &[Continous],
    policy: &TabularPolicy,
    gamma: Continous,
) -> Result<Vec<Continous>> {
    policy.check(mdp)?;
    Ok(bpi_checked(mdp, v, policy, gamma))
}

/// [`bpi`] for a policy already checked against `mdp`.
pub(crate) fn bpi_checked<M: Mdp + ?Sized>(
    mdp: &M,
    v: &[Continous],
    policy: &TabularPolicy,
    gamma: Continous,
) -> Vec<Continous> {
    (0..mdp.n_s())
        .map(|s| q(mdp, v, s, policy.action(s), gamma))
        .collect()
}

/// The optimality backup `B`. States without actions back up to 0.
pub fn b<M: Mdp + ?Sized>(mdp: &M, v: &[Continous], gamma: Continous) -> Vec<Continous> {
    (0..mdp.n_s())
        .map(|s| q_max(mdp, v, s, gamma).map_or(0., |(q, _)| q))
        .collect()
}

/// `B_pi` applied `k` times.
pub fn bpi_k<M: Mdp + ?Sized>(
    mdp: &M,
    k: usize,
    v: &[Continous],
    policy: &TabularPolicy,
    gamma: Continous,
) -> Result<Vec<Continous>> {
    policy.check(mdp)?;
    Ok((0..k).fold(v.to_vec(), |v, _| bpi_checked(mdp, &v, policy, gamma)))
}

/// `B` applied `k` times.
pub fn b_k<M: Mdp + ?Sized>(
    mdp: &M,
    k: usize,
    v: &[Continous],
    gamma: Continous,
) -> Vec<Continous> {
    (0..k).fold(v.to_vec(), |v, _| b(mdp, &v, gamma))
}

/// The greedy policy of `v`. Applied to `v*` this is `pi*`.
pub fn greedy_policy<M: Mdp + ?Sized>(
    mdp: &M,
    v: &[Continous],
    gamma: Continous,
) -> Result<TabularPolicy> {
    (0..mdp.n_s())
        .map(|s| {
            q_max(mdp, v, s, gamma)
                .map(|(_, a)| a)
                .ok_or(MdpError::NoAvailableActions(s))
        })
        .collect::<Result<Vec<_>>>()
        .map(TabularPolicy::from_greedy)
}
