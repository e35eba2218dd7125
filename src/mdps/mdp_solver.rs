use crate::common::defs::*;

pub trait MdpSolver<T> {
    fn v_star(&self, s: Discrete) -> Continous;

    fn q_star(&self, s: Discrete, a: Discrete) -> Option<Continous>;

    fn pi_star(&self, s: Discrete) -> Option<Discrete>;

    /// Runs the solver until `10^-threshold` precision or `max_iter` backups.
    fn exec(&mut self, threshold: Option<i32>, max_iter: usize) -> (T, usize);
}
