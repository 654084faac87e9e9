// Vault operation benchmarks for the Trellis ledger.
//
// Covers term-id derivation, atom creation, deposit quoting and execution,
// share redemption, and batch deposits at various sizes.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use trellis_ledger::accounts::AccountId;
use trellis_ledger::config::LedgerConfig;
use trellis_ledger::curves::CurveId;
use trellis_ledger::multivault::MultiVault;
use trellis_ledger::terms::{atom_id, TermId};

fn curve() -> CurveId {
    LedgerConfig::default().default_curve_id
}

/// A fresh engine with one well-funded atom to operate against.
fn seeded_vault() -> (MultiVault, TermId) {
    let mut vault = MultiVault::standard(LedgerConfig::default()).unwrap();
    let assets = vault.atom_cost() + 1_000_000_000_000;
    let atom = vault
        .create_atom(&AccountId::from("alice"), b"bench:anchor".to_vec(), assets)
        .unwrap();
    (vault, atom)
}

fn bench_atom_id(c: &mut Criterion) {
    let payload = b"city:lisbon";

    c.bench_function("terms/atom_id", |b| {
        b.iter(|| atom_id(payload));
    });
}

fn bench_create_atom(c: &mut Criterion) {
    let mut vault = MultiVault::standard(LedgerConfig::default()).unwrap();
    let creator = AccountId::from("alice");
    let assets = vault.atom_cost() + 5_000_000;
    let mut n = 0u64;

    c.bench_function("multivault/create_atom", |b| {
        b.iter(|| {
            n += 1;
            vault
                .create_atom(&creator, format!("bench:atom:{n}").into_bytes(), assets)
                .unwrap()
        });
    });
}

fn bench_preview_deposit(c: &mut Criterion) {
    let (vault, atom) = seeded_vault();

    c.bench_function("multivault/preview_deposit", |b| {
        b.iter(|| vault.preview_deposit(&atom, curve(), 2_000_000).unwrap());
    });
}

fn bench_deposit(c: &mut Criterion) {
    let (mut vault, atom) = seeded_vault();
    let bob = AccountId::from("bob");

    c.bench_function("multivault/deposit", |b| {
        b.iter(|| {
            vault
                .deposit(&bob, &bob, &atom, curve(), 2_000_000, 0)
                .unwrap()
        });
    });
}

fn bench_redeem(c: &mut Criterion) {
    let (mut vault, atom) = seeded_vault();
    let bob = AccountId::from("bob");
    vault
        .deposit(&bob, &bob, &atom, curve(), 500_000_000_000, 0)
        .unwrap();

    c.bench_function("multivault/redeem", |b| {
        b.iter(|| vault.redeem(&bob, &bob, &atom, curve(), 1, 0).unwrap());
    });
}

fn bench_deposit_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("multivault/deposit_batch");

    for size in [10usize, 50, 100, 256] {
        let (mut vault, atom) = seeded_vault();
        let bob = AccountId::from("bob");
        let receivers = vec![bob.clone(); size];
        let terms = vec![atom; size];
        let curves = vec![curve(); size];
        let amounts = vec![2_000_000u128; size];
        let min_shares = vec![0u128; size];

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                vault
                    .deposit_batch(&bob, &receivers, &terms, &curves, &amounts, &min_shares)
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_atom_id,
    bench_create_atom,
    bench_preview_deposit,
    bench_deposit,
    bench_redeem,
    bench_deposit_batch,
);
criterion_main!(benches);
