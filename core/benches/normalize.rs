//! Benchmarks for the binary-conjunction normalizer.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use dl_lib::{Axiom, Concept, Ontology, Role};

/// One ontology with a `width`-ary conjunction and a nested `width`-ary
/// disjunction, so the rewrite has both shapes to fold.
fn wide_ontology(width: usize) -> Ontology {
    let names: Vec<String> = (0..width).map(|i| format!("C{i}")).collect();
    let operands: Vec<Concept> = names.iter().map(|n| Concept::name(n.as_str())).collect();
    Ontology::build(
        "bench",
        vec![
            Axiom::concept_inclusion(
                Concept::name("C0"),
                Concept::and(operands.clone()).unwrap(),
            ),
            Axiom::concept_inclusion(
                Concept::name("C1"),
                Concept::some(Role::name("r"), Concept::or(operands).unwrap()),
            ),
        ],
        names.iter().map(String::as_str),
        ["r"],
        std::iter::empty::<&str>(),
    )
    .unwrap()
}

fn bench_to_binary(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    for width in [4usize, 16, 64] {
        let ontology = wide_ontology(width);
        group.throughput(Throughput::Elements(width as u64));
        group.bench_function(format!("to_binary/{width}"), |b| {
            b.iter(|| black_box(black_box(&ontology).to_binary()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_to_binary);
criterion_main!(benches);
