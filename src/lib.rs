extern crate rand;
extern crate serde;
extern crate serde_json;

pub mod common;
pub mod config;
pub mod envs;
pub mod error;
pub mod math;
pub mod mdps;

pub use common::defs::*;
pub use error::{MdpError, Result};
pub use mdps::{
    mdp::*,
    policy::*,
    solvers::{backup::*, value_estimation::*},
};
