use crate::{common::defs::*, error::*};
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::trace;

/// Markov Decision Process - Sutton & Barto 2018.
///
/// Read-only view used by the backup operators and the simulators.
pub trait Mdp {
    fn n_s(&self) -> usize;

    fn n_a(&self) -> usize;

    /// Actions usable in `s`, in ascending order.
    fn available_actions(&self, s: Discrete) -> Box<dyn Iterator<Item = Discrete> + '_>;

    /// Outcomes of taking `a` in `s`. Empty when the pair has none.
    fn transitions(&self, s: Discrete, a: Discrete) -> &[Transition];

    /// Next state and reward of `(s, a)` for a uniform draw `x` in `[0, 1)`.
    ///
    /// Returns the first outcome whose cumulative probability exceeds `x`.
    fn sample_transition(
        &self,
        s: Discrete,
        a: Discrete,
        x: Continous,
    ) -> Result<(Discrete, Continous)> {
        let mut total = 0.;
        for t in self.transitions(s, a) {
            total += t.probability;
            if total > x {
                return Ok((t.next_state, t.reward));
            }
        }

        Err(MdpError::SamplingExhausted {
            state: s,
            action: a,
            x,
            total,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub probability: Continous,
    pub next_state: Discrete,
    pub reward: Continous,
}

impl From<(Continous, Discrete, Continous)> for Transition {
    fn from((probability, next_state, reward): (Continous, Discrete, Continous)) -> Self {
        Self {
            probability,
            next_state,
            reward,
        }
    }
}

/// Outcome lists keyed by `(state, action)`, as handed to [`TabularMdp::set_transitions`].
pub type Transitions = BTreeMap<(Discrete, Discrete), Vec<Transition>>;

/// Builds [`Transitions`] from `(p, s', r)` triples.
pub fn transitions_from<I, T>(items: I) -> Transitions
where
    I: IntoIterator<Item = ((Discrete, Discrete), T)>,
    T: IntoIterator<Item = (Continous, Discrete, Continous)>,
{
    items
        .into_iter()
        .map(|(k, ts)| (k, ts.into_iter().map(Transition::from).collect()))
        .collect()
}

/// How states or actions are labelled.
#[derive(Debug, Clone, PartialEq)]
pub enum Labels {
    /// `n` synthetic labels, `<prefix>-0 .. <prefix>-(n-1)`.
    Count(usize),
    Named(Vec<String>),
}

impl Labels {
    pub(crate) fn resolve(self, prefix: &str) -> Vec<String> {
        match self {
            Labels::Count(n) => (0..n).map(|i| format!("{prefix}-{i}")).collect(),
            Labels::Named(names) => names,
        }
    }
}

impl From<usize> for Labels {
    fn from(n: usize) -> Self {
        Labels::Count(n)
    }
}

impl From<Vec<String>> for Labels {
    fn from(names: Vec<String>) -> Self {
        Labels::Named(names)
    }
}

impl<const N: usize> From<[&str; N]> for Labels {
    fn from(names: [&str; N]) -> Self {
        Labels::Named(names.iter().map(|s| s.to_string()).collect())
    }
}

/// Which actions can be taken in which states.
#[derive(Debug, Clone, PartialEq)]
pub enum Availability {
    /// Every action in every state.
    All,
    /// Must have exactly one entry per state.
    Explicit(BTreeMap<Discrete, BTreeSet<Discrete>>),
}

impl Availability {
    pub fn explicit<I, A>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Discrete, A)>,
        A: IntoIterator<Item = Discrete>,
    {
        Availability::Explicit(
            pairs
                .into_iter()
                .map(|(s, acts)| (s, acts.into_iter().collect()))
                .collect(),
        )
    }
}

/// A finite MDP held in dense tables.
///
/// Every state/action pair has a list of stochastic outcomes `(p, s', r)`.
/// The probabilities of a list are expected to sum to 1 but this is NOT checked
/// when the transitions are set: call [`TabularMdp::normalize_all`] to enforce it.
/// [`Mdp::sample_transition`] fails on lists that do not cover the draw.
///
/// `clone()` is a deep copy.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularMdp {
    states: Vec<String>,
    actions: Vec<String>,
    availability: Vec<BTreeSet<Discrete>>,
    /// Indexed by `s * n_a + a`.
    transitions: Vec<Option<Vec<Transition>>>,
}

impl TabularMdp {
    /// A model with no available actions and no transitions.
    pub fn new(states: impl Into<Labels>, actions: impl Into<Labels>) -> Self {
        let states = states.into().resolve("State");
        let actions = actions.into().resolve("Action");
        let n_sa = states.len() * actions.len();

        Self {
            availability: vec![BTreeSet::new(); states.len()],
            transitions: vec![None; n_sa],
            states,
            actions,
        }
    }

    pub fn with(
        states: impl Into<Labels>,
        actions: impl Into<Labels>,
        availability: Availability,
        transitions: Transitions,
    ) -> Result<Self> {
        let mut mdp = Self::new(states, actions);
        mdp.set_availability(availability)?;
        mdp.set_transitions(transitions)?;
        Ok(mdp)
    }

    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn is_available(&self, s: Discrete, a: Discrete) -> bool {
        self.availability.get(s).is_some_and(|acts| acts.contains(&a))
    }

    /// Replaces the availability sets.
    ///
    /// Once transitions are set, every newly available pair must already carry
    /// an outcome list. On error the model is left unchanged.
    pub fn set_availability(&mut self, availability: Availability) -> Result<()> {
        let n_s = self.n_s();
        let n_a = self.n_a();

        let mut sa_pairs = match availability {
            Availability::All => return self.replace_availability(vec![(0..n_a).collect(); n_s]),
            Availability::Explicit(sa_pairs) => sa_pairs,
        };

        let unknown = sa_pairs
            .keys()
            .copied()
            .filter(|&s| s >= n_s)
            .collect::<Vec<_>>();
        if !unknown.is_empty() {
            return Err(MdpError::UnknownStates(unknown));
        }

        let missing = (0..n_s)
            .filter(|s| !sa_pairs.contains_key(s))
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(MdpError::MissingStates(missing));
        }

        let invalid = sa_pairs
            .iter()
            .flat_map(|(&s, acts)| {
                acts.iter()
                    .filter(move |&&a| a >= n_a)
                    .map(move |&a| (s, a))
            })
            .collect::<Vec<_>>();
        if !invalid.is_empty() {
            return Err(MdpError::InvalidActions(invalid));
        }

        self.replace_availability(
            (0..n_s)
                .map(|s| sa_pairs.remove(&s).unwrap_or_default())
                .collect(),
        )
    }

    fn replace_availability(&mut self, availability: Vec<BTreeSet<Discrete>>) -> Result<()> {
        if self.transitions.iter().any(Option::is_some) {
            let n_a = self.n_a();
            let missing = availability
                .iter()
                .enumerate()
                .flat_map(|(s, acts)| acts.iter().map(move |&a| (s, a)))
                .filter(|&(s, a)| self.transitions[s * n_a + a].is_none())
                .collect::<Vec<_>>();
            if !missing.is_empty() {
                return Err(MdpError::MissingTransitions(missing));
            }
        }

        self.availability = availability;
        Ok(())
    }

    /// Replaces all transitions. Every available pair must be present.
    /// Entries for unavailable pairs are kept.
    pub fn set_transitions(&mut self, transitions: Transitions) -> Result<()> {
        let n_s = self.n_s();
        let n_a = self.n_a();

        let bad_keys = transitions
            .keys()
            .copied()
            .filter(|&(s, a)| s >= n_s || a >= n_a)
            .collect::<Vec<_>>();
        if !bad_keys.is_empty() {
            return Err(MdpError::InvalidTransitionKeys(bad_keys));
        }

        let bad_next = transitions
            .iter()
            .flat_map(|(&(s, a), ts)| {
                ts.iter()
                    .filter(move |t| t.next_state >= n_s)
                    .map(move |t| (s, a, t.next_state))
            })
            .collect::<Vec<_>>();
        if !bad_next.is_empty() {
            return Err(MdpError::InvalidNextStates(bad_next));
        }

        let missing = self
            .available_pairs()
            .into_iter()
            .filter(|k| !transitions.contains_key(k))
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(MdpError::MissingTransitions(missing));
        }

        let mut table = vec![None; n_s * n_a];
        for ((s, a), ts) in transitions {
            table[s * n_a + a] = Some(ts);
        }
        self.transitions = table;
        Ok(())
    }

    /// All `(state, action)` pairs that carry an outcome list, in key order.
    pub fn transition_entries(&self) -> impl Iterator<Item = ((Discrete, Discrete), &[Transition])> {
        let n_a = self.n_a();
        self.transitions
            .iter()
            .enumerate()
            .filter_map(move |(i, ts)| ts.as_deref().map(|ts| ((i / n_a, i % n_a), ts)))
    }

    /// Rescales the outcome list of `(s, a)` to sum to 1.
    /// An all-zero list becomes uniform over its outcomes.
    pub fn normalize(&mut self, s: Discrete, a: Discrete) {
        let Some(ts) = self
            .cell(s, a)
            .and_then(|i| self.transitions[i].as_mut())
            .filter(|ts| !ts.is_empty())
        else {
            return;
        };

        let mut total: Continous = ts.iter().map(|t| t.probability).sum();
        if total == 0. {
            trace!(s, a, n = ts.len(), "all-zero probabilities, using uniform");
            let p = 1. / ts.len() as Continous;
            ts.iter_mut().for_each(|t| t.probability = p);
            total = ts.iter().map(|t| t.probability).sum();
        }

        ts.iter_mut().for_each(|t| t.probability /= total);
    }

    /// [`TabularMdp::normalize`] on every available pair.
    pub fn normalize_all(&mut self) {
        for (s, a) in self.available_pairs() {
            self.normalize(s, a);
        }
    }

    fn available_pairs(&self) -> Vec<(Discrete, Discrete)> {
        self.availability
            .iter()
            .enumerate()
            .flat_map(|(s, acts)| acts.iter().map(move |&a| (s, a)))
            .collect_vec()
    }

    fn cell(&self, s: Discrete, a: Discrete) -> Option<usize> {
        (s < self.n_s() && a < self.n_a()).then(|| s * self.n_a() + a)
    }
}

impl Mdp for TabularMdp {
    fn n_s(&self) -> usize {
        self.states.len()
    }

    fn n_a(&self) -> usize {
        self.actions.len()
    }

    fn available_actions(&self, s: Discrete) -> Box<dyn Iterator<Item = Discrete> + '_> {
        match self.availability.get(s) {
            Some(acts) => Box::new(acts.iter().copied()),
            None => Box::new(std::iter::empty()),
        }
    }

    fn transitions(&self, s: Discrete, a: Discrete) -> &[Transition] {
        self.cell(s, a)
            .and_then(|i| self.transitions[i].as_deref())
            .unwrap_or(&[])
    }
}

impl fmt::Display for TabularMdp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Markov Decision Process with {} states and {} actions>",
            self.n_s(),
            self.n_a()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::*;
    use rstest::*;

    fn trivial() -> TabularMdp {
        TabularMdp::with(
            Labels::Count(2),
            Labels::Count(2),
            Availability::explicit([(0, vec![0, 1]), (1, vec![0])]),
            transitions_from([
                ((0, 0), vec![(0.9, 0, 0.), (0.1, 0, 10.)]),
                ((0, 1), vec![(0.5, 0, -10.), (0.5, 1, 10.)]),
                ((1, 0), vec![(0.3, 0, -10.), (0.7, 1, 10.)]),
            ]),
        )
        .unwrap()
    }

    #[test]
    fn synthetic_and_named_labels() {
        let mdp = TabularMdp::new(Labels::Count(3), ["search", "wait"]);

        assert_eq!(mdp.states(), ["State-0", "State-1", "State-2"]);
        assert_eq!(mdp.actions(), ["search", "wait"]);
        assert_eq!(mdp.n_s(), 3);
        assert_eq!(mdp.n_a(), 2);
        assert_eq!(
            mdp.to_string(),
            "<Markov Decision Process with 3 states and 2 actions>"
        );
        assert!((0..3).all(|s| mdp.available_actions(s).next().is_none()));
    }

    #[test]
    fn available_actions_are_ascending_and_restartable() {
        let mut mdp = TabularMdp::new(Labels::Count(1), Labels::Count(4));
        mdp.set_availability(Availability::explicit([(0, vec![3, 0, 2])]))
            .unwrap();

        let first = mdp.available_actions(0).collect::<Vec<_>>();
        let second = mdp.available_actions(0).collect::<Vec<_>>();
        assert_eq!(first, vec![0, 2, 3]);
        assert_eq!(first, second);
        assert!(mdp.available_actions(7).next().is_none());
    }

    #[test]
    fn all_availability() {
        let mut mdp = TabularMdp::new(Labels::Count(2), Labels::Count(3));
        mdp.set_availability(Availability::All).unwrap();

        for s in 0..2 {
            assert_eq!(mdp.available_actions(s).collect::<Vec<_>>(), vec![0, 1, 2]);
        }
    }

    #[rstest]
    #[case(Availability::explicit([(0, vec![0]), (1, vec![0]), (2, vec![0])]), "UnknownStates([2])")]
    #[case(Availability::explicit([(0, vec![0])]), "MissingStates([1])")]
    #[case(Availability::explicit([(0, vec![0, 2]), (1, vec![5])]), "InvalidActions([(0, 2), (1, 5)])")]
    fn invalid_availability(#[case] availability: Availability, #[case] expected: &str) {
        let mut mdp = TabularMdp::new(Labels::Count(2), Labels::Count(2));
        let err = mdp.set_availability(availability).unwrap_err();

        assert!(err.is_validation());
        assert_eq!(format!("{err:?}"), expected);
    }

    #[test]
    fn missing_transitions_are_rejected() {
        let err = TabularMdp::with(
            Labels::Count(2),
            Labels::Count(2),
            Availability::explicit([(0, vec![0, 1]), (1, vec![0])]),
            transitions_from([((0, 0), vec![(1., 0, 0.)])]),
        )
        .unwrap_err();

        assert_eq!(format!("{err:?}"), "MissingTransitions([(0, 1), (1, 0)])");
    }

    #[test]
    fn out_of_range_transitions_are_rejected() {
        let mut mdp = TabularMdp::new(Labels::Count(2), Labels::Count(1));
        mdp.set_availability(Availability::All).unwrap();

        let err = mdp
            .set_transitions(transitions_from([
                ((0, 0), vec![(1., 0, 0.)]),
                ((1, 0), vec![(1., 0, 0.)]),
                ((1, 1), vec![(1., 0, 0.)]),
            ]))
            .unwrap_err();
        assert_eq!(format!("{err:?}"), "InvalidTransitionKeys([(1, 1)])");

        let err = mdp
            .set_transitions(transitions_from([
                ((0, 0), vec![(0.5, 0, 0.), (0.5, 2, 0.)]),
                ((1, 0), vec![(1., 0, 0.)]),
            ]))
            .unwrap_err();
        assert_eq!(format!("{err:?}"), "InvalidNextStates([(0, 0, 2)])");
    }

    #[test]
    fn unavailable_pairs_may_carry_transitions() {
        let mut mdp = TabularMdp::new(Labels::Count(1), Labels::Count(2));
        mdp.set_availability(Availability::explicit([(0, vec![0])]))
            .unwrap();
        mdp.set_transitions(transitions_from([
            ((0, 0), vec![(1., 0, 1.)]),
            ((0, 1), vec![(1., 0, 2.)]),
        ]))
        .unwrap();

        assert_eq!(mdp.transitions(0, 1).len(), 1);
        assert_eq!(mdp.transition_entries().count(), 2);
        assert!(!mdp.is_available(0, 1));
    }

    #[test]
    fn normalize_rescales_and_fills_zero_lists() {
        let mut mdp = TabularMdp::new(Labels::Count(1), Labels::Count(2));
        mdp.set_availability(Availability::All).unwrap();
        mdp.set_transitions(transitions_from([
            ((0, 0), vec![(2., 0, 0.), (6., 0, 1.)]),
            ((0, 1), vec![(0., 0, 0.), (0., 0, 1.), (0., 0, 2.)]),
        ]))
        .unwrap();

        mdp.normalize_all();

        let p = |a| {
            mdp.transitions(0, a)
                .iter()
                .map(|t| t.probability)
                .collect::<Vec<_>>()
        };
        assert_float_eq!(p(0), vec![0.25, 0.75], abs_all <= 1e-12);
        assert_float_eq!(p(1), vec![1. / 3.; 3], abs_all <= 1e-12);
        assert_float_eq!(p(1).iter().sum::<f64>(), 1., abs <= 1e-12);
    }

    #[test]
    fn normalize_ignores_empty_and_unknown_pairs() {
        let mut mdp = TabularMdp::new(Labels::Count(1), Labels::Count(1));
        mdp.set_availability(Availability::All).unwrap();
        mdp.set_transitions(transitions_from([((0, 0), vec![])]))
            .unwrap();

        mdp.normalize(0, 0);
        mdp.normalize(3, 3);
        assert!(mdp.transitions(0, 0).is_empty());
    }

    #[rstest]
    #[case(0.0, (0, 0.))]
    #[case(0.89, (0, 0.))]
    #[case(0.9, (0, 10.))]
    #[case(0.999, (0, 10.))]
    fn sample_transition_scans_cumulative_mass(#[case] x: f64, #[case] expected: (usize, f64)) {
        assert_eq!(trivial().sample_transition(0, 0, x).unwrap(), expected);
    }

    #[test]
    fn sample_transition_fails_on_short_mass() {
        let mut mdp = TabularMdp::new(Labels::Count(1), Labels::Count(1));
        mdp.set_availability(Availability::All).unwrap();
        mdp.set_transitions(transitions_from([((0, 0), vec![(0.2, 0, 1.), (0.3, 0, 2.)])]))
            .unwrap();

        let err = mdp.sample_transition(0, 0, 0.7).unwrap_err();
        assert!(!err.is_validation());
        assert!(matches!(
            err,
            MdpError::SamplingExhausted { state: 0, action: 0, .. }
        ));

        mdp.normalize_all();
        assert_eq!(mdp.sample_transition(0, 0, 0.7).unwrap(), (0, 2.));
    }

    #[test]
    fn clone_is_independent() {
        let original = trivial();
        let mut copy = original.clone();
        assert_eq!(copy, original);

        copy.set_transitions(transitions_from([
            ((0, 0), vec![(0., 0, 0.), (0., 1, 0.)]),
            ((0, 1), vec![(1., 0, 0.)]),
            ((1, 0), vec![(1., 1, 0.)]),
        ]))
        .unwrap();
        copy.normalize_all();
        copy.set_availability(Availability::explicit([(0, vec![0]), (1, vec![0])]))
            .unwrap();

        assert_ne!(copy, original);
        assert_eq!(original, trivial());
    }

    #[test]
    fn availability_cannot_outrun_transitions() {
        let mut mdp = TabularMdp::with(
            Labels::Count(2),
            Labels::Count(2),
            Availability::explicit([(0, vec![0]), (1, vec![0])]),
            transitions_from([
                ((0, 0), vec![(1., 1, -1.)]),
                ((1, 0), vec![(1., 0, -1.)]),
            ]),
        )
        .unwrap();
        let before = mdp.clone();

        let err = mdp.set_availability(Availability::All).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(format!("{err:?}"), "MissingTransitions([(0, 1), (1, 1)])");

        let err = mdp
            .set_availability(Availability::explicit([(0, vec![0, 1]), (1, vec![0])]))
            .unwrap_err();
        assert_eq!(format!("{err:?}"), "MissingTransitions([(0, 1)])");
        assert_eq!(mdp, before);

        mdp.set_availability(Availability::explicit([(0, vec![]), (1, vec![0])]))
            .unwrap();
        assert!(!mdp.is_available(0, 0));
    }
}
