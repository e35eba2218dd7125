use crate::mdps::mdp::*;

/// https://towardsdatascience.com/reinforcement-learning-an-easy-introduction-to-value-iteration-e4cfe0731fd5
///
/// The hole (state 2) is terminal and offers no action.
pub fn simple_golf() -> TabularMdp {
    TabularMdp::with(
        ["fairway", "green", "hole"],
        ["hit to green", "hit to fairway", "hit in hole"],
        Availability::explicit([(0, vec![0]), (1, vec![1, 2]), (2, vec![])]),
        transitions_from([
            ((0, 0), vec![(0.9, 1, 0.), (0.1, 0, 0.)]),
            ((1, 1), vec![(0.9, 0, 0.), (0.1, 1, 0.)]),
            ((1, 2), vec![(0.9, 2, 10.), (0.1, 1, 0.)]),
        ]),
    )
    .expect("simple golf is well formed")
}
