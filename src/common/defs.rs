use serde::{Deserialize, Serialize};

/// Index into the states or actions of a finite model.
pub type Discrete = usize;
pub type Continous = f64;

/// Picks the action to take in a state, `None` when the state offers nothing to pick.
pub trait Policy {
    fn policy(&self, s: Discrete) -> Option<Discrete>;
}

impl<P: Policy + ?Sized> Policy for &P {
    fn policy(&self, s: Discrete) -> Option<Discrete> {
        (**self).policy(s)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpisodeEvent {
    pub s: Discrete,
    pub r: Continous,
}

pub trait EpisodeGenerator {
    fn generate(&self, n: usize, seed: Option<u64>) -> Vec<Vec<EpisodeEvent>>;
}
