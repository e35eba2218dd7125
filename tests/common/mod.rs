use bellman::*;

/// Runs `B` from the zero vector until it stops moving.
#[allow(dead_code)]
pub fn solve_optimal(mdp: &TabularMdp, gamma: Continous) -> Vec<Continous> {
    let (v, iterations) = estimate_optimal_value(mdp, gamma, Some(10), 100_000);
    assert!(iterations < 100_000, "{mdp} did not converge");
    v
}

#[allow(dead_code)]
pub fn policy_actions(mdp: &TabularMdp, pi: &TabularPolicy) -> Vec<String> {
    pi.actions()
        .iter()
        .map(|&a| mdp.actions()[a].clone())
        .collect()
}

/// A model over `n_s` states where every action is available and every
/// outcome list is `outcomes`, with next states wrapped into range.
#[allow(dead_code)]
pub fn dense_mdp(
    n_s: usize,
    n_a: usize,
    outcomes: &[(Continous, Discrete, Continous)],
) -> TabularMdp {
    let transitions = (0..n_s).flat_map(|s| {
        (0..n_a).map(move |a| {
            let ts = outcomes
                .iter()
                .map(|&(p, s1, r)| (p, (s1 + s + a) % n_s, r))
                .collect::<Vec<_>>();
            ((s, a), ts)
        })
    });

    let mut mdp = TabularMdp::with(
        Labels::Count(n_s),
        Labels::Count(n_a),
        Availability::All,
        transitions_from(transitions),
    )
    .unwrap();
    mdp.normalize_all();
    mdp
}
