use crate::{common::defs::*, error::*, mdps::mdp::*};
use rand::prelude::*;
use tracing::warn;

/// Chooses the action taken at each step of a walk.
pub trait ActionSelector {
    fn select<M, R>(&mut self, mdp: &M, s: Discrete, rng: &mut R) -> Option<Discrete>
    where
        M: Mdp + ?Sized,
        R: Rng + ?Sized;
}

/// Uniform over the available actions.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomActions;

impl ActionSelector for RandomActions {
    fn select<M, R>(&mut self, mdp: &M, s: Discrete, rng: &mut R) -> Option<Discrete>
    where
        M: Mdp + ?Sized,
        R: Rng + ?Sized,
    {
        mdp.available_actions(s).choose(rng)
    }
}

/// Follows a fixed policy.
#[derive(Debug, Clone)]
pub struct PolicyActions<P>(pub P);

impl<P: Policy> ActionSelector for PolicyActions<P> {
    fn select<M, R>(&mut self, _mdp: &M, s: Discrete, _rng: &mut R) -> Option<Discrete>
    where
        M: Mdp + ?Sized,
        R: Rng + ?Sized,
    {
        self.0.policy(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub action: Discrete,
    pub next_state: Discrete,
    pub reward: Continous,
}

/// A walk through an MDP.
///
/// Yields one [`Step`] per transition until `max_steps` steps were taken or the
/// selector has no action for the current state. A sampling failure is yielded
/// once and ends the walk.
pub struct MdpIterator<'a, M: ?Sized, S, R> {
    mdp: &'a M,
    selector: S,
    rng: R,
    state: Discrete,
    gamma: Continous,
    discount: Continous,
    total_reward: Continous,
    discounted_return: Continous,
    steps: usize,
    max_steps: usize,
    done: bool,
}

impl<'a, M, S, R> MdpIterator<'a, M, S, R>
where
    M: Mdp + ?Sized,
    S: ActionSelector,
    R: Rng,
{
    /// Starts in `start`, or in a state drawn uniformly from `rng`.
    pub fn new(
        mdp: &'a M,
        selector: S,
        mut rng: R,
        start: Option<Discrete>,
        gamma: Continous,
        max_steps: usize,
    ) -> Self {
        let state = start.or_else(|| (mdp.n_s() > 0).then(|| rng.gen_range(0..mdp.n_s())));

        Self {
            mdp,
            selector,
            rng,
            state: state.unwrap_or_default(),
            gamma,
            discount: 1.,
            total_reward: 0.,
            discounted_return: 0.,
            steps: 0,
            max_steps,
            done: state.is_none(),
        }
    }

    pub fn state(&self) -> Discrete {
        self.state
    }

    /// Undiscounted sum of the rewards so far.
    pub fn total_reward(&self) -> Continous {
        self.total_reward
    }

    pub fn discounted_return(&self) -> Continous {
        self.discounted_return
    }

    pub fn steps(&self) -> usize {
        self.steps
    }
}

impl<M, S, R> Iterator for MdpIterator<'_, M, S, R>
where
    M: Mdp + ?Sized,
    S: ActionSelector,
    R: Rng,
{
    type Item = Result<Step>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.steps >= self.max_steps {
            return None;
        }

        let Some(action) = self.selector.select(self.mdp, self.state, &mut self.rng) else {
            self.done = true;
            return None;
        };

        let x: Continous = self.rng.gen();
        let (next_state, reward) = match self.mdp.sample_transition(self.state, action, x) {
            Ok(sr) => sr,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        self.state = next_state;
        self.total_reward += reward;
        self.discounted_return += self.discount * reward;
        self.discount *= self.gamma;
        self.steps += 1;

        Some(Ok(Step {
            action,
            next_state,
            reward,
        }))
    }
}

/// Episodes of a policy over an MDP, each cut at `max_steps`.
pub struct MdpEpisodes<'a, M: ?Sized, P> {
    pub mdp: &'a M,
    pub policy: P,
    pub start: Option<Discrete>,
    pub max_steps: usize,
}

impl<M, P> EpisodeGenerator for MdpEpisodes<'_, M, P>
where
    M: Mdp + ?Sized,
    P: Policy,
{
    fn generate(&self, n: usize, seed: Option<u64>) -> Vec<Vec<EpisodeEvent>> {
        let rng = &mut match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        (0..n)
            .map(|_| {
                let walk = MdpIterator::new(
                    self.mdp,
                    PolicyActions(&self.policy),
                    &mut *rng,
                    self.start,
                    1.,
                    self.max_steps,
                );

                let mut ep = vec![EpisodeEvent {
                    s: walk.state(),
                    r: Default::default(),
                }];
                for step in walk {
                    match step {
                        Ok(step) => ep.push(EpisodeEvent {
                            s: step.next_state,
                            r: step.reward,
                        }),
                        Err(e) => {
                            warn!(error = %e, "episode cut short");
                            break;
                        }
                    }
                }
                ep
            })
            .collect()
    }
}
