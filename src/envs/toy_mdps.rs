use crate::mdps::mdp::*;

/// Two states, two actions, values off the top of the head.
pub fn trivial_mdp() -> TabularMdp {
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
    .expect("trivial mdp is well formed")
}

pub fn simple_mdp() -> TabularMdp {
    TabularMdp::with(
        Labels::Count(4),
        Labels::Count(3),
        Availability::explicit([
            (0, vec![0, 1, 2]),
            (1, vec![0, 2]),
            (2, vec![1, 2]),
            (3, vec![0]),
        ]),
        transitions_from([
            (
                (0, 0),
                vec![(0.2, 0, 0.), (0.1, 1, 2.), (0.3, 1, 0.5), (0.15, 2, 1.), (0.25, 2, 0.)],
            ),
            (
                (0, 1),
                vec![(0.2, 1, 0.), (0.2, 1, 1.), (0.2, 2, 0.), (0.2, 2, 1.), (0.2, 2, 2.)],
            ),
            ((0, 2), vec![(0.4, 0, 0.), (0.3, 2, 0.), (0.3, 3, 0.)]),
            ((1, 0), vec![(0.5, 0, 1.), (0.5, 2, -1.)]),
            ((1, 2), vec![(0.3, 0, -1.), (0.4, 1, 0.), (0.3, 2, 1.)]),
            ((2, 1), vec![(0.4, 0, 0.), (0.4, 1, 0.), (0.2, 3, 0.)]),
            ((2, 2), vec![(0.4, 0, -2.), (0.1, 1, 10.), (0.5, 3, 0.)]),
            ((3, 0), vec![(0.6, 0, 8.), (0.2, 1, 4.), (0.2, 2, 4.)]),
        ]),
    )
    .expect("simple mdp is well formed")
}

/// Every action available everywhere.
pub fn hw1_mdp() -> TabularMdp {
    TabularMdp::with(
        Labels::Count(3),
        Labels::Count(2),
        Availability::All,
        transitions_from([
            ((0, 0), vec![(1., 0, 1.)]),
            ((0, 1), vec![(0.5, 1, 2.), (0.5, 2, 2.)]),
            ((1, 0), vec![(1., 1, 0.)]),
            ((1, 1), vec![(0.3, 0, 3.), (0.7, 2, 3.)]),
            ((2, 0), vec![(1., 2, 1.)]),
            ((2, 1), vec![(0.1, 0, 4.), (0.9, 1, 4.)]),
        ]),
    )
    .expect("hw1 mdp is well formed")
}

/// The recycling robot of Sutton & Barto 2018, example 3.3.
pub fn robot_mdp() -> TabularMdp {
    TabularMdp::with(
        ["battery-high", "battery-low"],
        ["search", "wait", "recharge"],
        Availability::explicit([(0, vec![0, 1]), (1, vec![0, 1, 2])]),
        transitions_from([
            ((0, 0), vec![(0.8, 0, 1.), (0.2, 1, 1.)]),
            ((0, 1), vec![(1., 0, 0.1)]),
            ((1, 0), vec![(0.3, 0, -0.2), (0.7, 1, -0.2)]),
            ((1, 1), vec![(1., 1, 0.1)]),
            ((1, 2), vec![(1., 0, 0.)]),
        ]),
    )
    .expect("robot mdp is well formed")
}

/// Looks a toy model up by name.
pub fn toy_mdp(name: &str) -> Option<TabularMdp> {
    match name {
        "trivial" => Some(trivial_mdp()),
        "simple" => Some(simple_mdp()),
        "hw1" => Some(hw1_mdp()),
        "robot" => Some(robot_mdp()),
        "golf" => Some(super::simple_golf()),
        _ => None,
    }
}
