use super::mdp::*;
use crate::{common::defs::*, error::*};
use std::collections::BTreeMap;

/// A deterministic policy with one available action for every state.
///
/// Only built through validating constructors, so the backups can index it
/// without further checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularPolicy {
    actions: Vec<Discrete>,
}

impl TabularPolicy {
    /// `actions[s]` is the action taken in state `s`.
    pub fn new<M: Mdp + ?Sized>(mdp: &M, actions: Vec<Discrete>) -> Result<Self> {
        let pi = Self { actions };
        pi.check(mdp)?;
        Ok(pi)
    }

    /// Checks that the policy covers every state of `mdp` with an action
    /// currently available there.
    pub fn check<M: Mdp + ?Sized>(&self, mdp: &M) -> Result<()> {
        if self.actions.len() != mdp.n_s() {
            return Err(MdpError::InvalidPolicyLength {
                expected: mdp.n_s(),
                found: self.actions.len(),
            });
        }

        let invalid = self
            .actions
            .iter()
            .enumerate()
            .filter(|&(s, &a)| !mdp.available_actions(s).any(|x| x == a))
            .map(|(s, &a)| (s, a))
            .collect::<Vec<_>>();
        if !invalid.is_empty() {
            return Err(MdpError::InvalidPolicyActions(invalid));
        }

        Ok(())
    }

    pub fn from_map<M: Mdp + ?Sized>(mdp: &M, policy: &BTreeMap<Discrete, Discrete>) -> Result<Self> {
        let unknown = policy
            .keys()
            .copied()
            .filter(|&s| s >= mdp.n_s())
            .collect::<Vec<_>>();
        if !unknown.is_empty() {
            return Err(MdpError::UnknownStates(unknown));
        }

        let missing = (0..mdp.n_s())
            .filter(|s| !policy.contains_key(s))
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(MdpError::MissingStates(missing));
        }

        Self::new(mdp, policy.values().copied().collect())
    }

    /// Skips validation. Callers guarantee every action is available.
    pub(crate) fn from_greedy(actions: Vec<Discrete>) -> Self {
        Self { actions }
    }

    pub fn action(&self, s: Discrete) -> Discrete {
        self.actions[s]
    }

    pub fn actions(&self) -> &[Discrete] {
        &self.actions
    }

    pub fn to_map(&self) -> BTreeMap<Discrete, Discrete> {
        self.actions.iter().copied().enumerate().collect()
    }
}

impl Policy for TabularPolicy {
    fn policy(&self, s: Discrete) -> Option<Discrete> {
        self.actions.get(s).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mdp() -> TabularMdp {
        TabularMdp::with(
            Labels::Count(2),
            Labels::Count(3),
            Availability::explicit([(0, vec![0, 2]), (1, vec![1])]),
            transitions_from([
                ((0, 0), vec![(1., 0, 0.)]),
                ((0, 2), vec![(1., 1, 0.)]),
                ((1, 1), vec![(1., 1, 1.)]),
            ]),
        )
        .unwrap()
    }

    #[test]
    fn valid_policy() {
        let mdp = mdp();
        let pi = TabularPolicy::new(&mdp, vec![2, 1]).unwrap();

        assert_eq!(pi.action(0), 2);
        assert_eq!(pi.policy(1), Some(1));
        assert_eq!(pi.policy(2), None);
        assert_eq!(pi.to_map(), BTreeMap::from([(0, 2), (1, 1)]));
        assert_eq!(TabularPolicy::from_map(&mdp, &pi.to_map()).unwrap(), pi);
    }

    #[test]
    fn rejects_unavailable_actions() {
        let err = TabularPolicy::new(&mdp(), vec![1, 1]).unwrap_err();

        assert!(err.is_validation());
        assert_eq!(format!("{err:?}"), "InvalidPolicyActions([(0, 1)])");
    }

    #[test]
    fn rejects_wrong_length() {
        let err = TabularPolicy::new(&mdp(), vec![0]).unwrap_err();

        assert!(matches!(
            err,
            MdpError::InvalidPolicyLength {
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn rejects_unknown_and_missing_states() {
        let mdp = mdp();

        let err = TabularPolicy::from_map(&mdp, &BTreeMap::from([(0, 0), (1, 1), (4, 0)]))
            .unwrap_err();
        assert_eq!(format!("{err:?}"), "UnknownStates([4])");

        let err = TabularPolicy::from_map(&mdp, &BTreeMap::from([(1, 1)])).unwrap_err();
        assert_eq!(format!("{err:?}"), "MissingStates([0])");
    }

    #[test]
    fn check_against_another_model() {
        let pi = TabularPolicy::new(&mdp(), vec![2, 1]).unwrap();

        let mut bigger = TabularMdp::new(Labels::Count(3), Labels::Count(3));
        bigger.set_availability(Availability::All).unwrap();
        assert!(matches!(
            pi.check(&bigger),
            Err(MdpError::InvalidPolicyLength {
                expected: 3,
                found: 2
            })
        ));

        let mut narrowed = mdp();
        narrowed
            .set_availability(Availability::explicit([(0, vec![0]), (1, vec![1])]))
            .unwrap();
        assert_eq!(
            format!("{:?}", pi.check(&narrowed).unwrap_err()),
            "InvalidPolicyActions([(0, 2)])"
        );
    }
}
