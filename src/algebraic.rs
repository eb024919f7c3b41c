//! `⊗` (tensor / parallel composition) and `→` (sequential, affine composition), making
//! `(OpenHypergraph, ⊗, empty)` a symmetric monoidal category (§4.2).

use std::collections::BTreeMap;

use tracing::trace;

use crate::hypergraph::{HyperEdgeId, Hypergraph, Port, PortOwner, PortRole};
use crate::signature::Signature;

fn rename_edge(p: Port, shift: usize) -> Port {
    match p.owner {
        PortOwner::Gen(HyperEdgeId(id)) => Port {
            owner: PortOwner::Gen(HyperEdgeId(id + shift)),
            ..p
        },
        PortOwner::Boundary => p,
    }
}

/// `a ⊗ b`: disjoint union of edges, boundary ports of `b` shifted per-role so the
/// combined boundary is `a`'s boundary stacked above `b`'s (§4.2 "Tensor"). `b`'s left
/// boundary (`Source`-role) shifts by `a`'s own left width so it sits below `a`'s left
/// boundary; `b`'s right boundary (`Target`-role) shifts by `a`'s own right width likewise.
pub fn tensor<S: Signature + Clone>(a: &Hypergraph<S>, b: &Hypergraph<S>) -> Hypergraph<S> {
    let ma = a.next_hyperedge_id().0;
    let mb = b.next_hyperedge_id().0;
    let (ai, ao) = a.size();

    let shift_b = |p: Port| -> Port {
        let p = rename_edge(p, ma);
        match (p.owner, p.role) {
            (PortOwner::Boundary, PortRole::Source) => Port {
                index: p.index + ai,
                ..p
            },
            (PortOwner::Boundary, PortRole::Target) => Port {
                index: p.index + ao,
                ..p
            },
            _ => p,
        }
    };

    let mut wires: Vec<(Port, Port)> = a.wires().collect();
    wires.extend(b.wires().map(|(s, t)| (shift_b(s), shift_b(t))));

    let mut signatures: BTreeMap<HyperEdgeId, S> = BTreeMap::new();
    for e in a.edges() {
        signatures.insert(e, a.signature(e).unwrap().clone());
    }
    for e in b.edges() {
        signatures.insert(HyperEdgeId(e.0 + ma), b.signature(e).unwrap().clone());
    }

    trace!(ma, mb, "tensor composition");
    Hypergraph::from_parts(wires, signatures, HyperEdgeId(ma + mb))
}

/// `a → b`: sequential composition gluing `a`'s output boundary (`Target`-role) to `b`'s
/// input boundary (`Source`-role).
///
/// When `|a_out| != |b_in|`, excess wires on the wider side bypass the other operand and
/// terminate on the combined boundary (the affine policy). The tie-break convention fixed
/// here: the *lowest*-indexed excess ports on the wider side bypass, and the remaining
/// (highest-indexed) window of the wider side pairs, ascending, with every port on the
/// narrower side.
pub fn sequential<S: Signature + Clone>(a: &Hypergraph<S>, b: &Hypergraph<S>) -> Hypergraph<S> {
    let ma = a.next_hyperedge_id().0;
    let mb = b.next_hyperedge_id().0;
    let (ai, ao) = a.size();
    let (bi, bo) = b.size();
    let offset = ao.saturating_sub(bi);
    let shared = ao.min(bi);

    // Indexed (not by-value) bookkeeping for the `shared` splice window, so that boundary
    // ports of `a` and `b` that happen to carry the same (role, index) -- e.g. both operands
    // using `Boundary(Target, 0)` for their own, unrelated boundary -- never get confused
    // with one another by a value-based lookup.
    let mut a_spliced_source: Vec<Option<Port>> = vec![None; shared];
    let mut b_spliced_target: Vec<Option<Port>> = vec![None; shared];
    let mut wires: Vec<(Port, Port)> = Vec::new();

    // `a`'s wires landing on its own output boundary (`Target`-role, the high window
    // `[offset, ao)`) are candidates for splicing straight into `b`; everything else
    // (including `a`'s own input boundary and its low-indexed bypassing outputs) survives
    // unchanged.
    for (s, t) in a.wires() {
        if let PortOwner::Boundary = t.owner {
            if t.role == PortRole::Target && t.index >= offset && t.index < ao {
                a_spliced_source[t.index - offset] = Some(s);
                continue;
            }
        }
        wires.push((s, t));
    }

    // Every boundary port of `b` shifts by `offset` (§4.2), making room on the combined
    // right boundary for `a`'s low-indexed bypassing outputs ahead of `b`'s own outputs.
    let shift_b_boundary = |p: Port| -> Port {
        match p.owner {
            PortOwner::Boundary => Port {
                index: p.index + offset,
                ..p
            },
            _ => p,
        }
    };

    for (s, t) in b.wires() {
        let s = rename_edge(s, ma);
        let t = rename_edge(t, ma);
        if let PortOwner::Boundary = s.owner {
            if s.role == PortRole::Source {
                if s.index < shared {
                    b_spliced_target[s.index] = Some(shift_b_boundary(t));
                    continue;
                }
                let new_index = s.index - ao + ai;
                wires.push((Port::boundary(PortRole::Source, new_index), shift_b_boundary(t)));
                continue;
            }
        }
        wires.push((s, shift_b_boundary(t)));
    }

    for k in 0..shared {
        if let (Some(p_a), Some(p_b)) = (a_spliced_source[k], b_spliced_target[k]) {
            wires.push((p_a, p_b));
        }
    }

    let mut signatures: BTreeMap<HyperEdgeId, S> = BTreeMap::new();
    for e in a.edges() {
        signatures.insert(e, a.signature(e).unwrap().clone());
    }
    for e in b.edges() {
        signatures.insert(HyperEdgeId(e.0 + ma), b.signature(e).unwrap().clone());
    }

    trace!(ma, mb, offset, "sequential composition");
    Hypergraph::from_parts(wires, signatures, HyperEdgeId(ma + mb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hypergraph::{Hypergraph, PortRole};
    use crate::signature::GeneratorSignature;

    fn f(k: usize, n: usize) -> GeneratorSignature {
        GeneratorSignature::new("f", k, n)
    }

    fn wrapped(k: usize, n: usize) -> Hypergraph<GeneratorSignature> {
        let g: Hypergraph<GeneratorSignature> = Hypergraph::empty();
        let (e, g) = g.add_edge(f(k, n));
        let mut g = g;
        for i in 0..k {
            g = g.connect(
                Port::boundary(PortRole::Source, i),
                Port::generator(PortRole::Target, e, i),
            );
        }
        for i in 0..n {
            g = g.connect(
                Port::generator(PortRole::Source, e, i),
                Port::boundary(PortRole::Target, i),
            );
        }
        g
    }

    #[test]
    fn tensor_of_two_identities_matches_scenario_1() {
        let id: Hypergraph<GeneratorSignature> = Hypergraph::identity();
        let doubled = tensor(&id, &id);
        assert_eq!(doubled.size(), (2, 2));
        assert_eq!(
            doubled.target(Port::boundary(PortRole::Source, 0)),
            Some(Port::boundary(PortRole::Target, 0))
        );
        assert_eq!(
            doubled.target(Port::boundary(PortRole::Source, 1)),
            Some(Port::boundary(PortRole::Target, 1))
        );
    }

    #[test]
    fn tensor_unit_matches_p4() {
        let g = wrapped(1, 1);
        let empty: Hypergraph<GeneratorSignature> = Hypergraph::empty();
        let left = tensor(&empty, &g);
        let right = tensor(&g, &empty);
        assert_eq!(left.size(), g.size());
        assert_eq!(right.size(), g.size());
    }

    #[test]
    fn tensor_asymmetric_boundaries_stack_without_collision() {
        // a: 2 inputs, 1 output. b: 1 input, 3 outputs. Neither side's left/right widths
        // match, so a role mixup in the shift formula would collide two ports onto the
        // same boundary index instead of stacking them.
        let a = wrapped(2, 1);
        let b = wrapped(1, 3);
        let e_a = HyperEdgeId(0);
        let e_b = HyperEdgeId(1);
        let composed = tensor(&a, &b);
        assert_eq!(composed.size(), (3, 4));
        // b's input sits after a's two inputs.
        assert_eq!(
            composed.target(Port::boundary(PortRole::Source, 2)),
            Some(Port::generator(PortRole::Target, e_b, 0))
        );
        // b's outputs sit after a's single output.
        assert_eq!(
            composed.source(Port::boundary(PortRole::Target, 1)),
            Some(Port::generator(PortRole::Source, e_b, 0))
        );
        assert_eq!(
            composed.source(Port::boundary(PortRole::Target, 3)),
            Some(Port::generator(PortRole::Source, e_b, 2))
        );
    }

    #[test]
    fn affine_sequential_matches_scenario_3() {
        // a: 1 input, 2 outputs. b: 1 input, 1 output. b has fewer inputs than a has
        // outputs, so the affine rule pairs a's highest-indexed output with b's input and
        // bypasses the rest.
        let a = wrapped(1, 2);
        let b = wrapped(1, 1);
        let e_a = HyperEdgeId(0);
        let e_b = HyperEdgeId(1);
        let composed = sequential(&a, &b);
        assert_eq!(composed.size(), (1, 2));

        // a's lower (higher-indexed) output feeds b's generator directly.
        assert_eq!(
            composed.target(Port::generator(PortRole::Source, e_a, 1)),
            Some(Port::generator(PortRole::Target, e_b, 0))
        );
        // a's upper output bypasses straight to the combined right boundary at index 0.
        assert_eq!(
            composed.source(Port::boundary(PortRole::Target, 0)),
            Some(Port::generator(PortRole::Source, e_a, 0))
        );
        // b's own output lands after the bypassed one, at index 1.
        assert_eq!(
            composed.source(Port::boundary(PortRole::Target, 1)),
            Some(Port::generator(PortRole::Source, e_b, 0))
        );
    }

    #[test]
    fn sequential_unit_matches_p5() {
        let g = wrapped(1, 1);
        let id: Hypergraph<GeneratorSignature> = Hypergraph::identity();
        let left = sequential(&id, &g);
        let right = sequential(&g, &id);
        assert_eq!(left.size(), g.size());
        assert_eq!(right.size(), g.size());
    }

    #[test]
    fn wider_right_input_pads_left_boundary() {
        // a: 1 input, 1 output. b: 2 inputs, 1 output -- b's in_width exceeds a's
        // out_width, so the excess input pads the combined left boundary.
        let a = wrapped(1, 1);
        let b = wrapped(2, 1);
        let e_a = HyperEdgeId(0);
        let e_b = HyperEdgeId(1);
        let composed = sequential(&a, &b);
        assert_eq!(composed.size(), (2, 1));

        // a's sole output feeds b's generator directly.
        assert_eq!(
            composed.target(Port::generator(PortRole::Source, e_a, 0)),
            Some(Port::generator(PortRole::Target, e_b, 0))
        );
        // b's excess input is relabelled onto the combined left boundary at index 1.
        assert_eq!(
            composed.target(Port::boundary(PortRole::Source, 1)),
            Some(Port::generator(PortRole::Target, e_b, 1))
        );
        // b's own output still lands on the combined right boundary at index 0.
        assert_eq!(
            composed.source(Port::boundary(PortRole::Target, 0)),
            Some(Port::generator(PortRole::Source, e_b, 0))
        );
    }
}
