// Transaction core benchmarks for Thorn.
//
// Covers the hot paths of validation: signing hash, signer recovery with a
// cold and a warm cache, codec round-trips and overall gas pricing.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use alloy_primitives::{Address, B256, U256};

use thorn_protocol::crypto::Keypair;
use thorn_protocol::transaction::{
    sign_transaction, work_to_gas, BlockRef, Clause, LruSignerCache, NoopSignerCache,
    Transaction, TransactionBuilder,
};

fn chain(number: u32) -> B256 {
    let mut id = B256::repeat_byte(0x5c);
    id[..4].copy_from_slice(&number.to_be_bytes());
    id
}

fn sample_tx(clauses: usize) -> Transaction {
    let clause = Clause::new(Some(Address::repeat_byte(0x42)))
        .with_value(U256::from(1_000u64))
        .with_data(vec![0xa9, 0x05, 0x9c, 0xbb, 0x00, 0x00, 0x01]);
    let unsigned = TransactionBuilder::new()
        .chain_tag(0xa4)
        .block_ref(BlockRef::from_block_id(&chain(100)))
        .clauses(std::iter::repeat(clause).take(clauses))
        .gas(1_000_000)
        .nonce(42)
        .build();
    sign_transaction(&unsigned, &Keypair::generate()).expect("signing succeeds")
}

fn bench_signing_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("tx/signing_hash");
    for clauses in [1usize, 10, 100] {
        let bytes = sample_tx(clauses).to_rlp();
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(clauses), &bytes, |b, bytes| {
            // Fresh decode each time so the memo doesn't hide the hashing.
            b.iter(|| Transaction::from_rlp(bytes).unwrap().signing_hash());
        });
    }
    group.finish();
}

fn bench_signer_recovery(c: &mut Criterion) {
    let bytes = sample_tx(1).to_rlp();

    c.bench_function("tx/signer_cold", |b| {
        b.iter(|| {
            Transaction::from_rlp(&bytes)
                .unwrap()
                .signer_with(&NoopSignerCache)
                .unwrap()
        });
    });

    let cache = LruSignerCache::with_capacity(16);
    c.bench_function("tx/signer_warm", |b| {
        b.iter(|| Transaction::from_rlp(&bytes).unwrap().signer_with(&cache).unwrap());
    });
}

fn bench_codec(c: &mut Criterion) {
    let tx = sample_tx(10);
    let bytes = tx.to_rlp();

    c.bench_function("tx/encode", |b| b.iter(|| tx.to_rlp()));
    c.bench_function("tx/decode", |b| {
        b.iter(|| Transaction::from_rlp(&bytes).unwrap());
    });
}

fn bench_pricing(c: &mut Criterion) {
    let tx = sample_tx(1);
    let base = U256::from(1_000_000_000_000_000u64);

    c.bench_function("tx/overall_gas_price", |b| {
        b.iter(|| tx.overall_gas_price(base, 101, &chain));
    });

    let mut group = c.benchmark_group("tx/work_to_gas");
    for block in [0u32, 10_000_000, 100_000_000] {
        group.bench_with_input(BenchmarkId::from_parameter(block), &block, |b, &block| {
            b.iter(|| work_to_gas(U256::MAX >> 20, block));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_signing_hash,
    bench_signer_recovery,
    bench_codec,
    bench_pricing
);
criterion_main!(benches);
