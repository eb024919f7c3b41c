//! The six end-to-end scenarios, run together rather than split across module-level unit
//! tests, so a single file exercises every layer (`hypergraph`, `algebraic`, `matching`,
//! `rewrite`) the way a reader of the scenarios would expect to find them collected.

use hypergraph_core::{
    find_matches, is_isomorphic_to, sequential, tensor, GeneratorSignature, HyperEdgeId,
    Hypergraph, Port, PortRole, Rule,
};
use rstest::rstest;

fn f() -> GeneratorSignature {
    GeneratorSignature::new("f", 1, 1)
}

fn g() -> GeneratorSignature {
    GeneratorSignature::new("g", 1, 1)
}

#[rstest]
fn scenario_1_identity_wire() {
    let id: Hypergraph<GeneratorSignature> = Hypergraph::identity();
    assert_eq!(id.size(), (1, 1));
    assert_eq!(id.edge_count(), 0);
    assert_eq!(
        id.target(Port::boundary(PortRole::Source, 0)),
        Some(Port::boundary(PortRole::Target, 0))
    );

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

#[rstest]
fn scenario_2_simple_generator() {
    let empty: Hypergraph<GeneratorSignature> = Hypergraph::empty();
    let (e, g) = empty.add_edge(f());
    assert_eq!(e, HyperEdgeId(0));
    assert!(g.target(Port::boundary(PortRole::Source, 0)).is_none());

    let g = g.connect(
        Port::boundary(PortRole::Source, 0),
        Port::generator(PortRole::Target, e, 0),
    );
    let g = g.connect(
        Port::generator(PortRole::Source, e, 0),
        Port::boundary(PortRole::Target, 0),
    );
    assert_eq!(g.size(), (1, 1));
    assert_eq!(g.wire_count(), 2);
}

/// A generator with `k` target and `n` source ports, fully wired to its own boundary.
/// `size()` reports `(k, n)` for this shape, matching the generator's own arity directly.
fn generator_wired(k: usize, n: usize) -> Hypergraph<GeneratorSignature> {
    let h: Hypergraph<GeneratorSignature> = Hypergraph::empty();
    let (e, h) = h.add_edge(GeneratorSignature::new("f", k, n));
    let mut h = h;
    for i in 0..k {
        h = h.connect(
            Port::boundary(PortRole::Source, i),
            Port::generator(PortRole::Target, e, i),
        );
    }
    for i in 0..n {
        h = h.connect(
            Port::generator(PortRole::Source, e, i),
            Port::boundary(PortRole::Target, i),
        );
    }
    h
}

#[rstest]
fn scenario_3_affine_sequential_pairs_lower_outputs_first() {
    let a = generator_wired(1, 2); // 1 input, 2 outputs
    let b = generator_wired(1, 1); // 1 input, 1 output
    let e_a = HyperEdgeId(0);
    let e_b = HyperEdgeId(1);
    assert_eq!(a.size(), (1, 2));
    let composed = sequential(&a, &b);
    assert_eq!(composed.size(), (1, 2));

    // b consumes a's lower output (the one with the higher index).
    assert_eq!(
        composed.target(Port::generator(PortRole::Source, e_a, 1)),
        Some(Port::generator(PortRole::Target, e_b, 0))
    );
    // the upper output of a bypasses to right boundary index 0.
    assert_eq!(
        composed.source(Port::boundary(PortRole::Target, 0)),
        Some(Port::generator(PortRole::Source, e_a, 0))
    );
}

#[rstest]
fn scenario_4_tensor_then_sequence() {
    let pair = tensor(&generator_wired(1, 1), &generator_wired(1, 1)); // size (2, 2)
    let single = generator_wired(1, 1); // size (1, 1)
    let e_pair_lower = HyperEdgeId(1);
    let e_single = HyperEdgeId(2);
    assert_eq!(pair.size(), (2, 2));
    let composed = sequential(&pair, &single);

    // the lower f of the left pair connects to the input of the right f.
    assert_eq!(
        composed.target(Port::generator(PortRole::Source, e_pair_lower, 0)),
        Some(Port::generator(PortRole::Target, e_single, 0))
    );
    // the upper one bypasses to right boundary index 0, per the affine rule.
    assert_eq!(
        composed.source(Port::boundary(PortRole::Target, 0)),
        Some(Port::generator(PortRole::Source, HyperEdgeId(0), 0))
    );
}

fn wrapped(sig: GeneratorSignature) -> Hypergraph<GeneratorSignature> {
    let h: Hypergraph<GeneratorSignature> = Hypergraph::empty();
    let (e, h) = h.add_edge(sig);
    let h = h.connect(
        Port::boundary(PortRole::Source, 0),
        Port::generator(PortRole::Target, e, 0),
    );
    h.connect(
        Port::generator(PortRole::Source, e, 0),
        Port::boundary(PortRole::Target, 0),
    )
}

#[rstest]
fn scenario_5_two_disjoint_matches_no_third() {
    let host = tensor(&wrapped(f()), &wrapped(f()));
    let pattern = wrapped(f());
    let results: Vec<_> = find_matches(&pattern, &host).collect();
    assert_eq!(results.len(), 2);
    assert_ne!(results[0].edges, results[1].edges);
}

#[rstest]
fn scenario_6_rewrite_f_to_g_twice() {
    let rule = Rule::new(wrapped(f()), wrapped(g())).unwrap();
    let host = sequential(&wrapped(f()), &wrapped(f()));

    let m1 = rule.matches(&host).next().unwrap();
    let (host2, _) = rule.apply(&host, &m1);
    let names: Vec<_> = host2
        .edges()
        .map(|e| host2.signature(e).unwrap().name.clone())
        .collect();
    assert!(names.contains(&smol_str::SmolStr::new("g")));
    assert!(names.contains(&smol_str::SmolStr::new("f")));

    let m2 = rule.matches(&host2).next().unwrap();
    let (host3, _) = rule.apply(&host2, &m2);
    let all_g = host3
        .edges()
        .all(|e| host3.signature(e).unwrap().name == "g");
    assert!(all_g);
    assert_eq!(host3.edge_count(), 2);
}

#[rstest]
fn scenarios_are_mutually_isomorphism_stable() {
    // P3/P4 sanity: associativity and unit hold up to is_isomorphic_to, reused here as a
    // smoke check that the tensor used throughout this file behaves consistently.
    let empty: Hypergraph<GeneratorSignature> = Hypergraph::empty();
    let h = wrapped(f());
    assert!(is_isomorphic_to(&tensor(&empty, &h), &h));
    assert!(is_isomorphic_to(&tensor(&h, &empty), &h));
}
