//! # Header Sync Benchmarks
//!
//! | Path | Target |
//! |------|--------|
//! | JSON decode + content hash | < 50µs per header |
//! | Ethash quick verify | < 10µs per header |
//! | Batch sync, linear chain | < 1ms per header |
//! | Reorg across a long branch | bounded by `max_fork_depth` |

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use qc_18_header_sync::algorithms::ethash;
use qc_18_header_sync::codec::decode_json;
use qc_18_header_sync::test_utils::{
    batch_param, branch, genesis_header, genesis_param, scripted_ledger, ROPSTEN_7152785_JSON,
};
use qc_18_header_sync::{HeaderSyncApi, HeaderSyncConfig};
use std::time::Duration;

// ============================================================================
// Codec and seal
// ============================================================================

fn bench_decode_and_seal(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-18-codec");
    let raw = ROPSTEN_7152785_JSON.as_bytes();
    let header = decode_json(raw).expect("fixture decodes");

    group.bench_function("decode_json_ropsten", |b| {
        b.iter(|| black_box(decode_json(black_box(raw)).is_ok()))
    });
    group.bench_function("content_hash", |b| b.iter(|| black_box(header.hash())));
    group.bench_function("ethash_quick_verify", |b| {
        b.iter(|| black_box(ethash::verify_seal(black_box(&header))))
    });

    group.finish();
}

// ============================================================================
// Batch sync
// ============================================================================

fn bench_batch_sync(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-18-batch-sync");
    group.measurement_time(Duration::from_secs(10));

    let config = HeaderSyncConfig {
        max_batch_size: 1_000,
        ..HeaderSyncConfig::for_testing()
    };
    let genesis = genesis_header(0, 16);

    for size in [10usize, 100, 500] {
        let headers = branch(&genesis, &vec![16; size], 1);
        let param = batch_param(&headers);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("linear", size), &param, |b, param| {
            b.iter_batched(
                || {
                    let mut ledger = scripted_ledger(config.clone());
                    ledger
                        .sync_genesis_header(genesis_param(&genesis))
                        .expect("genesis");
                    (ledger, param.clone())
                },
                |(mut ledger, param)| black_box(ledger.sync_block_header(param).is_ok()),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_reorg(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-18-reorg");

    let config = HeaderSyncConfig {
        max_fork_depth: 1_024,
        max_batch_size: 1_000,
        ..HeaderSyncConfig::for_testing()
    };
    let genesis = genesis_header(0, 16);

    for depth in [16usize, 128] {
        let light = branch(&genesis, &vec![1; depth], 1);
        let mut heavy_weights = vec![1; depth];
        heavy_weights.push(2);
        let heavy = branch(&genesis, &heavy_weights, 2);

        group.bench_with_input(BenchmarkId::new("switch", depth), &depth, |b, _| {
            b.iter_batched(
                || {
                    let mut ledger = scripted_ledger(config.clone());
                    ledger
                        .sync_genesis_header(genesis_param(&genesis))
                        .expect("genesis");
                    ledger
                        .sync_block_header(batch_param(&light))
                        .expect("light branch");
                    let (prefix, last) = heavy.split_at(depth);
                    ledger
                        .sync_block_header(batch_param(prefix))
                        .expect("heavy prefix");
                    (ledger, batch_param(last))
                },
                |(mut ledger, param)| black_box(ledger.sync_block_header(param).is_ok()),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decode_and_seal, bench_batch_sync, bench_reorg);
criterion_main!(benches);
