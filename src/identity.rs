//! Identity resolver
//!
//! Matches vendor elements to their specification counterparts within one
//! parent collection. Two explicit passes:
//!
//! 1. identifier pass: explicit `id` equality first, then inferred
//!    identifier equality over whatever is still unmatched;
//! 2. positional pass: vendor elements carrying no identifier at all pair,
//!    in document order, with the specification elements left over after
//!    pass 1 (front-aligned).
//!
//! The positional pass is an approximation for descriptors that omit
//! identifiers. Vendor elements with no counterpart after both passes are
//! additions.

use serde::Serialize;

use ra_metadata::Identified;

/// Which pass produced a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPass {
    ExplicitId,
    InferredId,
    Positional,
}

/// A vendor element matched to a specification element, by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchedPair {
    pub spec: usize,
    pub vendor: usize,
    pub pass: MatchPass,
}

/// Result of matching one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Matching {
    /// Pairs in vendor document order.
    pub pairs: Vec<MatchedPair>,
    /// Indexes of unmatched vendor elements, in vendor document order.
    pub additions: Vec<usize>,
}

impl Matching {
    /// Vendor index matched to the given specification index, if any.
    pub fn vendor_for(&self, spec: usize) -> Option<usize> {
        self.pairs.iter().find(|p| p.spec == spec).map(|p| p.vendor)
    }
}

/// Match `vendor` elements against `spec` elements.
pub fn resolve<S, V>(spec: &[S], vendor: &[V]) -> Matching
where
    S: Identified,
    V: Identified,
{
    let mut spec_taken = vec![false; spec.len()];
    let mut assigned: Vec<Option<(usize, MatchPass)>> = vec![None; vendor.len()];

    // Pass 1a: explicit identifiers.
    for (vi, element) in vendor.iter().enumerate() {
        let Some(id) = element.explicit_id() else {
            continue;
        };
        if let Some(si) = first_free(spec, &spec_taken, |s| s.explicit_id() == Some(id)) {
            spec_taken[si] = true;
            assigned[vi] = Some((si, MatchPass::ExplicitId));
        }
    }

    // Pass 1b: inferred identifiers.
    for (vi, element) in vendor.iter().enumerate() {
        if assigned[vi].is_some() {
            continue;
        }
        let Some(id) = element.inferred_id() else {
            continue;
        };
        if let Some(si) = first_free(spec, &spec_taken, |s| s.inferred_id() == Some(id)) {
            spec_taken[si] = true;
            assigned[vi] = Some((si, MatchPass::InferredId));
        }
    }

    // Pass 2: positional, identifier-less vendor elements only.
    let mut free = (0..spec.len()).filter(|&si| !spec_taken[si]).collect::<Vec<_>>().into_iter();
    for (vi, element) in vendor.iter().enumerate() {
        if assigned[vi].is_some() || element.is_keyed() {
            continue;
        }
        match free.next() {
            Some(si) => assigned[vi] = Some((si, MatchPass::Positional)),
            None => break,
        }
    }

    let mut matching = Matching::default();
    for (vi, slot) in assigned.into_iter().enumerate() {
        match slot {
            Some((si, pass)) => matching.pairs.push(MatchedPair {
                spec: si,
                vendor: vi,
                pass,
            }),
            None => matching.additions.push(vi),
        }
    }

    tracing::trace!(
        pairs = matching.pairs.len(),
        additions = matching.additions.len(),
        "resolved element identities"
    );
    matching
}

fn first_free<S>(spec: &[S], taken: &[bool], mut predicate: impl FnMut(&S) -> bool) -> Option<usize> {
    spec.iter()
        .enumerate()
        .find(|(si, s)| !taken[*si] && predicate(*s))
        .map(|(si, _)| si)
}
