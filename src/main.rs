use bellman::{config::*, envs::*, mdps::serialization::*, mdps::solvers::value_iteration::*, *};
use bellman::mdps::{mdp_solver::*, mdp_solver_policy::*};
use itertools::Itertools;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

/// `bellman [trivial|simple|hw1|robot|golf|PATH]`
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let name = std::env::args().nth(1).unwrap_or_else(|| "trivial".to_string());
    let mdp = match toy_mdp(&name) {
        Some(mdp) => mdp,
        None => load(&name)?,
    };
    let config = SolverConfig::from_env();
    println!("{mdp}, {config:?}");

    let mdp = Rc::new(mdp);
    let vi = &mut ValueIteration::new(Rc::clone(&mdp) as Rc<dyn Mdp>, config.gamma);
    let ret = vi.exec(config.threshold, config.max_iter);
    println!("Converged: {}, Number of iterations: {}", ret.0, ret.1);

    let v_star = (0..mdp.n_s()).map(|s| vi.v_star(s)).collect::<Vec<_>>();
    println!("{v_star:?}");

    let policy = MdpSolverPolicy {
        mdp_solver: Rc::new(vi.clone()) as Rc<dyn MdpSolver<bool>>,
    };
    for s in 0..mdp.n_s() {
        match policy.policy(s) {
            Some(a) => println!("{} -> {}", mdp.states()[s], mdp.actions()[a]),
            None => println!("{} -> (terminal)", mdp.states()[s]),
        }
    }

    let q_star = (0..mdp.n_s())
        .cartesian_product(0..mdp.n_a())
        .filter_map(|(s, a)| vi.q_star(s, a).map(|q| ((s, a), q)))
        .collect::<Vec<_>>();
    println!("{q_star:?}");

    Ok(())
}
