pub mod markov_chain;
pub mod mdp;
pub mod mdp_simulator;
pub mod mdp_solver;
pub mod mdp_solver_policy;
pub mod policy;
pub mod serialization;
pub mod solvers;
