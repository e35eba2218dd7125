//! Versioned JSON persistence of a [`TabularMdp`].
//!
//! The document is an object whose fields, except `version_no`, are
//! themselves JSON encoded strings. Outcome lists are keyed by `s * n_a + a`.

use crate::{common::defs::*, error::*, mdps::mdp::*};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fs, path::Path};
use tracing::debug;

pub const VERSION_NO: u32 = 1;

#[derive(Serialize, Deserialize, Debug)]
struct Document {
    version_no: u32,
    states: String,
    actions: String,
    #[serde(rename = "sa-pairs")]
    sa_pairs: String,
    transitions: String,
}

type Outcome = (Continous, Discrete, Continous);

pub fn serialize(mdp: &TabularMdp) -> Result<String> {
    let n_a = mdp.n_a();

    let sa_pairs = (0..mdp.n_s())
        .map(|s| (s, mdp.available_actions(s).collect::<Vec<_>>()))
        .collect::<BTreeMap<_, _>>();
    let transitions = mdp
        .transition_entries()
        .map(|((s, a), ts)| {
            let outcomes = ts
                .iter()
                .map(|t| (t.probability, t.next_state, t.reward))
                .collect::<Vec<Outcome>>();
            (s * n_a + a, outcomes)
        })
        .collect::<BTreeMap<_, _>>();

    let doc = Document {
        version_no: VERSION_NO,
        states: serde_json::to_string(mdp.states())?,
        actions: serde_json::to_string(mdp.actions())?,
        sa_pairs: serde_json::to_string(&sa_pairs)?,
        transitions: serde_json::to_string(&transitions)?,
    };

    Ok(serde_json::to_string(&doc)?)
}

/// Rebuilds a model, validating it like [`TabularMdp::with`] does.
pub fn deserialize(msg: &str) -> Result<TabularMdp> {
    let doc: Document = serde_json::from_str(msg)?;
    if doc.version_no != VERSION_NO {
        return Err(MdpError::VersionMismatch {
            expected: VERSION_NO,
            found: doc.version_no,
        });
    }

    let states: Vec<String> = serde_json::from_str(&doc.states)?;
    let actions: Vec<String> = serde_json::from_str(&doc.actions)?;
    let sa_pairs: BTreeMap<Discrete, Vec<Discrete>> = serde_json::from_str(&doc.sa_pairs)?;
    let transitions: BTreeMap<usize, Vec<Outcome>> = serde_json::from_str(&doc.transitions)?;

    let n_a = actions.len();
    let key = |k: usize| match n_a {
        0 => (k, 0),
        _ => (k / n_a, k % n_a),
    };

    TabularMdp::with(
        states,
        actions,
        Availability::explicit(sa_pairs),
        transitions_from(transitions.into_iter().map(|(k, ts)| (key(k), ts))),
    )
}

pub fn save<P: AsRef<Path>>(mdp: &TabularMdp, path: P) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, serialize(mdp)?)?;
    debug!(path = %path.display(), "model saved");
    Ok(())
}

pub fn load<P: AsRef<Path>>(path: P) -> Result<TabularMdp> {
    let path = path.as_ref();
    let mdp = deserialize(&fs::read_to_string(path)?)?;
    debug!(path = %path.display(), %mdp, "model loaded");
    Ok(mdp)
}
