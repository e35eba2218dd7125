use crate::common::defs::*;
use std::iter::zip;

/// Ref: https://youtu.be/P0ZvxeQqv0A?si=RLKdOUTNEfKXE63C
pub fn mc_first_visit(
    ep_gen: &dyn EpisodeGenerator,
    gamma: Continous,
    n_s: usize,
    n_ep: usize,
    seed: Option<u64>,
) -> Vec<Continous> {
    mc_core(ep_gen, gamma, n_s, n_ep, seed, is_first_visit)
}

/// Ref: https://youtu.be/P0ZvxeQqv0A?si=RLKdOUTNEfKXE63C
pub fn mc_every_visit(
    ep_gen: &dyn EpisodeGenerator,
    gamma: Continous,
    n_s: usize,
    n_ep: usize,
    seed: Option<u64>,
) -> Vec<Continous> {
    mc_core(ep_gen, gamma, n_s, n_ep, seed, |_, _, _| true)
}

fn mc_core(
    ep_gen: &dyn EpisodeGenerator,
    gamma: Continous,
    n_s: usize,
    n_ep: usize,
    seed: Option<u64>,
    counts: fn(&[EpisodeEvent], usize, Discrete) -> bool,
) -> Vec<Continous> {
    let returns = &mut vec![0 as Continous; n_s];
    let visits = &mut vec![0_usize; n_s];

    let eps = ep_gen.generate(n_ep, seed);
    for ep in eps.iter().take(n_ep).filter(|ep| !ep.is_empty()) {
        let mut g = 0.;
        for t in (0..(ep.len() - 1)).rev() {
            g = gamma * g + ep[t + 1].r;
            if counts(ep, t, ep[t].s) {
                returns[ep[t].s] += g;
                visits[ep[t].s] += 1;
            }
        }
    }

    zip(returns, visits)
        .map(|(&mut r, &mut v)| if v == 0 { 0. } else { r / (v as Continous) })
        .collect()
}

fn is_first_visit(ep: &[EpisodeEvent], t: usize, s: Discrete) -> bool {
    !ep.iter().take(t).any(|x| x.s == s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::*;
    use crate::mdps::{mdp::*, mdp_simulator::*, policy::*, solvers::value_estimation::*};
    use float_eq::*;

    struct SimpleEnv {
        pub episodes: Vec<Vec<EpisodeEvent>>,
    }

    impl EpisodeGenerator for SimpleEnv {
        fn generate(&self, _n: usize, _seed: Option<u64>) -> Vec<Vec<EpisodeEvent>> {
            self.episodes.clone()
        }
    }

    fn toy_episodes() -> SimpleEnv {
        let ev = |s, r| EpisodeEvent { s, r };
        SimpleEnv {
            episodes: vec![
                vec![ev(1, -3.), ev(4, -2.), ev(1, -1.), ev(2, -3.), ev(1, -1.)],
                vec![ev(1, -3.), ev(4, -0.)],
                vec![ev(2, -3.), ev(4, -0.)],
            ],
        }
    }

    #[test]
    fn toy_example_with_first_vist() {
        let v = mc_first_visit(&toy_episodes(), 0.9, 6, 3, None);

        assert_float_eq!(
            v,
            vec![0., (-6.059 / 2.0), (-1. / 2.0), 0., -4.51, 0.],
            abs_all <= 1e-5
        );
    }

    #[test]
    fn toy_example_with_every_vist() {
        let v = mc_every_visit(&toy_episodes(), 0.9, 6, 3, None);

        assert_float_eq!(
            v,
            vec![
                0.,
                ((-6.059 + -3.0 + -0.9) / 3.0),
                (-1. / 2.0),
                0.,
                -4.51,
                0.
            ],
            abs_all <= 1e-5
        );
    }

    #[test]
    fn mc_first_visit_agrees_with_policy_evaluation() {
        let mdp = trivial_mdp();
        let pi = TabularPolicy::new(&mdp, vec![1, 0]).unwrap();
        let ep_gen = MdpEpisodes {
            mdp: &mdp,
            policy: &pi,
            start: Some(0),
            max_steps: 150,
        };

        let (exact, _) = estimate_policy_value(&mdp, &pi, 0.9, Some(6), 10_000).unwrap();
        let v = mc_first_visit(&ep_gen, 0.9, mdp.n_s(), 5000, Some(2718));

        assert_float_eq!(v, exact, abs_all <= 2.);
    }
}
