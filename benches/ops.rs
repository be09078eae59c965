use criterion::{criterion_group, criterion_main, Criterion};
use robdd::{apply, Manager, Operator, VariableId};

fn build_chain_and(manager: &mut Manager, vars: usize) -> robdd::NodeId {
    let mut result = manager.ithvar(VariableId::from(0usize)).unwrap();
    for i in 1..vars {
        let v = manager.ithvar(VariableId::from(i)).unwrap();
        result = apply(manager, Operator::And, result, v).unwrap();
    }
    result
}

fn bench_apply_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_chain");
    for &vars in &[8usize, 16, 32] {
        group.bench_function(format!("and_{}", vars), |b| {
            b.iter(|| {
                let mut manager = Manager::new();
                manager.set_varnum(vars).unwrap();
                build_chain_and(&mut manager, vars)
            });
        });
    }
    group.finish();
}

fn bench_satcount(c: &mut Criterion) {
    let mut manager = Manager::new();
    manager.set_varnum(20).unwrap();
    let f = build_chain_and(&mut manager, 20);
    c.bench_function("satcount_20_vars", |b| {
        b.iter(|| robdd::satcount(&mut manager, f).unwrap());
    });
}

criterion_group!(benches, bench_apply_chain, bench_satcount);
criterion_main!(benches);
