use crate::{common::defs::*, error::*, mdps::mdp::Labels};
use itertools::Itertools;
use rand::prelude::*;
use tracing::trace;

/// Row-stochastic transition table of a [`MarkovChain`].
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionProbs {
    /// Every state moves to every state with probability `1/N`.
    Equal,
    /// `rows[i][j]` is the probability of moving from `i` to `j`.
    Explicit(Vec<Vec<Continous>>),
}

/// A finite Markov chain. Holds no current state; see [`MarkovChain::iterate`].
///
/// Any state may follow any other; a zero entry disallows the move.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkovChain {
    states: Vec<String>,
    tprob: Vec<Vec<Continous>>,
}

impl MarkovChain {
    pub fn new(states: impl Into<Labels>, tprob: TransitionProbs) -> Result<Self> {
        let states = states.into().resolve("State");
        let n_s = states.len();

        let tprob = match tprob {
            TransitionProbs::Equal => vec![vec![1. / n_s as Continous; n_s]; n_s],
            TransitionProbs::Explicit(rows) => {
                if rows.len() != n_s || rows.iter().any(|r| r.len() != n_s) {
                    return Err(MdpError::MismatchedRowCount {
                        expected: n_s,
                        found: rows.iter().map(Vec::len).collect(),
                    });
                }
                rows
            }
        };

        Ok(Self { states, tprob })
    }

    pub fn n_s(&self) -> usize {
        self.states.len()
    }

    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn tprob(&self, from: Discrete, to: Discrete) -> Option<Continous> {
        self.tprob.get(from)?.get(to).copied()
    }

    /// Rescales every row to sum to 1. An all-zero row becomes uniform.
    pub fn equalize_tprobs(&mut self) {
        let n_s = self.n_s();
        for (s, row) in self.tprob.iter_mut().enumerate() {
            let mut total: Continous = row.iter().sum();
            if total == 0. {
                trace!(s, "all-zero row, using uniform");
                row.iter_mut().for_each(|p| *p = 1. / n_s as Continous);
                total = row.iter().sum();
            }
            row.iter_mut().for_each(|p| *p /= total);
        }
    }

    /// Successor of `s` for a uniform draw `x` in `[0, 1)`: the first state
    /// whose cumulative probability exceeds `x`.
    pub fn next_state_from(&self, s: Discrete, x: Continous) -> Result<Discrete> {
        let row = self
            .tprob
            .get(s)
            .ok_or_else(|| MdpError::UnknownStates(vec![s]))?;

        let mut total = 0.;
        for (next, p) in row.iter().enumerate() {
            total += p;
            if total > x {
                return Ok(next);
            }
        }

        Err(MdpError::SamplingExhausted {
            state: s,
            action: 0,
            x,
            total,
        })
    }

    /// Walks the chain for `max_iter` steps from `start`, or from a state drawn
    /// uniformly from `rng`.
    ///
    /// With `skip_initial` one extra step is taken before the first yield so
    /// the start state itself is never reported. An unknown `start` is yielded
    /// as an error and ends the walk.
    pub fn iterate<R: Rng>(
        &self,
        start: Option<Discrete>,
        rng: R,
        max_iter: usize,
        skip_initial: bool,
    ) -> MarkovChainIterator<'_, R> {
        MarkovChainIterator::new(self, start, rng, max_iter, skip_initial)
    }
}

/// Yields the successive states of a walk over a [`MarkovChain`].
///
/// A sampling failure is yielded once and ends the walk.
pub struct MarkovChainIterator<'a, R> {
    chain: &'a MarkovChain,
    rng: R,
    state: Discrete,
    iterations: usize,
    max_iter: usize,
    skip_initial: bool,
    done: bool,
}

impl<'a, R: Rng> MarkovChainIterator<'a, R> {
    fn new(
        chain: &'a MarkovChain,
        start: Option<Discrete>,
        mut rng: R,
        max_iter: usize,
        skip_initial: bool,
    ) -> Self {
        let state = start.or_else(|| (chain.n_s() > 0).then(|| rng.gen_range(0..chain.n_s())));

        Self {
            chain,
            rng,
            state: state.unwrap_or_default(),
            iterations: 0,
            max_iter,
            skip_initial,
            done: state.is_none(),
        }
    }

    pub fn state(&self) -> Discrete {
        self.state
    }

    fn advance(&mut self) -> Result<Discrete> {
        let x: Continous = self.rng.gen();
        self.state = self.chain.next_state_from(self.state, x)?;
        Ok(self.state)
    }
}

impl<R: Rng> Iterator for MarkovChainIterator<'_, R> {
    type Item = Result<Discrete>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.iterations >= self.max_iter {
            return None;
        }

        if std::mem::take(&mut self.skip_initial) {
            if let Err(e) = self.advance() {
                self.done = true;
                return Some(Err(e));
            }
        }

        self.iterations += 1;
        let next = self.advance();
        self.done = next.is_err();
        Some(next)
    }
}

/// Visit counts of a long walk.
#[derive(Debug, Clone, PartialEq)]
pub struct SteadyDistribution {
    pub counts: Vec<usize>,
}

impl SteadyDistribution {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Relative visit frequencies. All zero when nothing was visited.
    pub fn probabilities(&self) -> Vec<Continous> {
        let total = self.total();
        self.counts
            .iter()
            .map(|&c| if total == 0 { 0. } else { c as Continous / total as Continous })
            .collect_vec()
    }
}

/// Estimates the steady-state distribution of `chain` by counting the states
/// visited in an `n_iter` step walk. The start state is skipped.
pub fn estimate_steady_dist<R: Rng>(
    chain: &MarkovChain,
    start: Option<Discrete>,
    n_iter: usize,
    rng: R,
) -> Result<SteadyDistribution> {
    let mut counts = vec![0; chain.n_s()];
    for s in chain.iterate(start, rng, n_iter, true) {
        counts[s?] += 1;
    }

    Ok(SteadyDistribution { counts })
}
