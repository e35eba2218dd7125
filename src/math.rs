use crate::common::defs::*;
use std::iter::zip;

/// Element-wise `a - b`. Both slices must have the same length.
pub fn vec_diff(a: &[Continous], b: &[Continous]) -> Vec<Continous> {
    debug_assert_eq!(a.len(), b.len());
    zip(a, b).map(|(x, y)| x - y).collect()
}

/// The L-infinity norm, 0 for an empty vector.
pub fn l_inf(v: &[Continous]) -> Continous {
    v.iter().fold(0., |acc, x| acc.max(x.abs()))
}

pub fn l_inf_distance(a: &[Continous], b: &[Continous]) -> Continous {
    l_inf(&vec_diff(a, b))
}
