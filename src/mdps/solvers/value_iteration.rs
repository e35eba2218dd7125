use super::{backup::*, value_estimation::*};
use crate::{common::defs::*, mdps::mdp::*, mdps::mdp_solver::*};
use std::rc::Rc;
use tracing::info;

/// Value iteration with the batched convergence check of [`estimate_optimal_value`].
///
/// `pi*` is the greedy policy of the final `v*`; it is `None` for states
/// without available actions.
#[derive(Clone)]
pub struct ValueIteration {
    mdp: Rc<dyn Mdp>,
    gamma: Continous,
    v_star: Vec<Continous>,
    pi_star: Vec<Option<Discrete>>,
}

impl ValueIteration {
    pub fn new(mdp: Rc<dyn Mdp>, gamma: Continous) -> Self {
        let n_s = mdp.n_s();

        Self {
            mdp,
            gamma,
            v_star: vec![0.; n_s],
            pi_star: vec![None; n_s],
        }
    }

    pub fn values(&self) -> &[Continous] {
        &self.v_star
    }
}

impl MdpSolver<bool> for ValueIteration {
    fn v_star(&self, s: Discrete) -> Continous {
        self.v_star[s]
    }

    fn q_star(&self, s: Discrete, a: Discrete) -> Option<Continous> {
        self.mdp
            .available_actions(s)
            .any(|x| x == a)
            .then(|| q(&*self.mdp, &self.v_star, s, a, self.gamma))
    }

    fn pi_star(&self, s: Discrete) -> Option<Discrete> {
        self.pi_star.get(s).copied().flatten()
    }

    fn exec(&mut self, threshold: Option<i32>, max_iter: usize) -> (bool, usize) {
        let mdp = Rc::clone(&self.mdp);
        let gamma = self.gamma;

        let fp = fixed_point(mdp.n_s(), threshold, max_iter, |v| b(&*mdp, v, gamma));
        self.pi_star = (0..mdp.n_s())
            .map(|s| q_max(&*mdp, &fp.values, s, gamma).map(|(_, a)| a))
            .collect();
        self.v_star = fp.values;

        info!(
            converged = fp.converged,
            iterations = fp.iterations,
            "value iteration finished"
        );
        (fp.converged, fp.iterations)
    }
}
