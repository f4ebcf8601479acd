//! Tests for the convenience wrappers and the global runner facade.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use servisor::testing::BlockingService;
use servisor::{
    ensure_halt, global, halt_timeout, sleep, start_timeout, Error, Runner, Service, State,
    StateQuery,
};

fn ctx() -> CancellationToken {
    CancellationToken::new()
}

#[tokio::test]
async fn start_timeout_elapses() {
    let runner = Runner::new();
    let svc = Service::new(
        "slow",
        Arc::new(BlockingService::with_ready_delay(Duration::from_secs(60))),
    );

    let err = start_timeout(Duration::from_millis(50), &runner, &[svc.clone()])
        .await
        .unwrap_err();
    assert!(err.is_wait_timeout());
    assert_eq!(runner.state(&svc), State::Starting);

    halt_timeout(Duration::from_secs(2), &runner, &[svc]).await.unwrap();
}

#[tokio::test]
async fn timeouts_pass_through_success() {
    let runner = Runner::new();
    let svc = Service::new("quick", Arc::new(BlockingService::new()));

    start_timeout(Duration::from_secs(2), &runner, &[svc.clone()])
        .await
        .unwrap();
    assert_eq!(runner.state(&svc), State::Started);

    halt_timeout(Duration::from_secs(2), &runner, &[svc.clone()])
        .await
        .unwrap();
    assert_eq!(runner.state(&svc), State::Halted);
}

#[tokio::test]
async fn ensure_halt_tolerates_unknown() {
    let runner = Runner::new();
    let never_started = Service::new("ghost", Arc::new(BlockingService::new()));

    ensure_halt(Duration::from_secs(1), &runner, &never_started)
        .await
        .unwrap();

    let running = Service::new("real", Arc::new(BlockingService::new()));
    runner.start(&ctx(), &[running.clone()]).await.unwrap();
    ensure_halt(Duration::from_secs(2), &runner, &running)
        .await
        .unwrap();
    assert_eq!(runner.state(&running), State::Halted);
}

#[tokio::test]
async fn sleep_returns_early_on_halt() {
    let runner = Runner::new();

    // The loop would sleep for a minute per lap; halting must cut the lap
    // short instead of waiting it out.
    let svc = Service::from_fn("sleeper", |ctx| async move {
        ctx.ready()?;
        loop {
            if sleep(&ctx, Duration::from_secs(60)).await.is_err() {
                return Ok(());
            }
        }
    });

    runner.start(&ctx(), &[svc.clone()]).await.unwrap();

    let begun = Instant::now();
    halt_timeout(Duration::from_secs(2), &runner, &[svc]).await.unwrap();
    assert!(begun.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn sleep_completes_when_not_halted() {
    let runner = Runner::new();
    let svc = Service::from_fn("napper", |ctx| async move {
        ctx.ready()?;
        sleep(&ctx, Duration::from_millis(10)).await?;
        ctx.done().await;
        Ok(())
    });

    runner.start(&ctx(), &[svc.clone()]).await.unwrap();
    runner.halt(&ctx(), &[svc]).await.unwrap();
}

// Every global-runner interaction lives in one test: the facade is
// process-wide state and the test binary runs tests concurrently.
#[tokio::test]
async fn global_runner_facade() {
    global::reset();

    let svc = Service::new("global-worker", Arc::new(BlockingService::new()));
    global::start(&ctx(), &[svc.clone()]).await.unwrap();
    assert_eq!(global::state(&svc), State::Started);
    assert_eq!(global::services(StateQuery::Any, 0).len(), 1);

    // Handles observe the same registry.
    assert_eq!(global::runner().state(&svc), State::Started);

    global::halt(&ctx(), &[svc.clone()]).await.unwrap();
    assert_eq!(global::state(&svc), State::Halted);

    global::start(&ctx(), &[svc.clone()]).await.unwrap();
    global::shutdown(&ctx()).await.unwrap();
    assert_eq!(
        global::start(&ctx(), &[svc.clone()]).await.unwrap_err(),
        Error::NotEnabled
    );

    // A configured runner can be installed wholesale.
    global::install(Runner::new());
    global::start(&ctx(), &[svc.clone()]).await.unwrap();
    global::halt(&ctx(), &[svc]).await.unwrap();

    global::reset();
}
