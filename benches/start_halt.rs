//! Benchmark comparing runner-managed services against bare spawns.
//!
//! Services are by nature heavier than a plain `tokio::spawn`: the runner
//! adds a registry entry, a readiness handshake and an end notification
//! per service. This measures that overhead at N = 1 and N = 10.

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use tokio_util::sync::CancellationToken;

use servisor::testing::BlockingService;
use servisor::{Runner, Service};

fn runner_start_halt(c: &mut Criterion) {
    for n in [1usize, 10] {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("build runtime");

        c.bench_function(&format!("runner_start_halt_{n}"), |b| {
            b.iter(|| {
                rt.block_on(async {
                    let runner = Runner::new();
                    let ctx = CancellationToken::new();
                    let services: Vec<Service> = (0..n)
                        .map(|_| Service::new("bench", Arc::new(BlockingService::new())))
                        .collect();
                    runner.start(&ctx, &services).await.expect("start");
                    runner.halt(&ctx, &services).await.expect("halt");
                })
            })
        });
    }
}

fn bare_spawn(c: &mut Criterion) {
    for n in [1usize, 10] {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("build runtime");

        c.bench_function(&format!("bare_spawn_{n}"), |b| {
            b.iter(|| {
                rt.block_on(async {
                    let stop = CancellationToken::new();
                    let handles: Vec<_> = (0..n)
                        .map(|_| {
                            let stop = stop.clone();
                            tokio::spawn(async move { stop.cancelled().await })
                        })
                        .collect();
                    stop.cancel();
                    for handle in handles {
                        handle.await.expect("join");
                    }
                })
            })
        });
    }
}

criterion_group!(benches, runner_start_halt, bare_spawn);
criterion_main!(benches);
