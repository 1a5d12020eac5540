use secondwind::{
    CancellationToken, InstantSleeper, MemoryObserver, RetryError, RetryEvent, RetryExecutor,
    RetryOptions, TrackingSleeper,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
struct TestError(&'static str);

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for TestError {}

fn constant(max_attempts: usize, delay: Duration) -> RetryOptions {
    RetryOptions::new()
        .max_attempts(max_attempts)
        .base_delay(delay)
        .max_delay(delay)
        .constant()
        .jitter(0.0)
}

#[tokio::test]
async fn success_on_first_attempt_makes_one_call() {
    let executor = RetryExecutor::default().with_sleeper(InstantSleeper);
    let calls = Arc::new(AtomicUsize::new(0));

    let value = executor
        .execute_async(|| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TestError>(7)
            }
        })
        .await
        .unwrap();

    assert_eq!(value, 7);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unit_operations_are_supported() {
    let executor = RetryExecutor::new(constant(2, Duration::from_millis(1)));
    let result: Result<(), RetryError<TestError>> =
        executor.execute_async(|| async { Ok(()) }).await;
    assert!(result.is_ok());
}

#[tokio::test(start_paused = true)]
async fn end_to_end_waits_between_attempts() {
    let executor = RetryExecutor::new(constant(3, Duration::from_millis(10)));
    let calls = Arc::new(AtomicUsize::new(0));
    let start = tokio::time::Instant::now();

    let value = executor
        .call()
        .label("fetch_quote")
        .execute_async(|| {
            let calls = calls.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(TestError("unavailable"))
                } else {
                    Ok("quote")
                }
            }
        })
        .await
        .unwrap();

    assert_eq!(value, "quote");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(20), "waited {elapsed:?}");
    assert!(elapsed < Duration::from_millis(25), "waited {elapsed:?}");
}

#[tokio::test]
async fn exhausted_error_wraps_most_recent_failure() {
    let executor = RetryExecutor::new(constant(4, Duration::from_millis(5)))
        .with_sleeper(InstantSleeper);
    let calls = Arc::new(AtomicUsize::new(0));
    let failures = ["first", "second", "third", "fourth"];

    let err = executor
        .call()
        .label("rotate_keys")
        .execute_async(|| {
            let calls = calls.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(TestError(failures[n]))
            }
        })
        .await
        .unwrap_err();

    assert_eq!(err.last_error(), Some(&TestError("fourth")));
    let message = err.to_string();
    assert!(message.contains("exhausted"));
    assert!(message.contains("rotate_keys"));
    assert!(std::error::Error::source(&err).is_some());
}

#[tokio::test]
async fn should_retry_false_stops_immediately() {
    let executor = RetryExecutor::new(constant(5, Duration::from_millis(5)))
        .with_sleeper(InstantSleeper);
    let calls = Arc::new(AtomicUsize::new(0));

    let err = executor
        .call()
        .should_retry(|e: &TestError| e.0 != "invalid input")
        .execute_async(|| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(TestError("invalid input"))
            }
        })
        .await
        .unwrap_err();

    assert!(matches!(err, RetryError::Inner(TestError("invalid input"))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn cancelling_during_backoff_wins_over_remaining_retries() {
    let executor = RetryExecutor::new(constant(10, Duration::from_secs(60)));
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        canceller.cancel();
    });
    let calls = Arc::new(AtomicUsize::new(0));
    let start = tokio::time::Instant::now();

    let err = executor
        .call()
        .label("reconnect")
        .cancel_on(&token)
        .execute_async(|| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(TestError("refused"))
            }
        })
        .await
        .unwrap_err();

    assert!(matches!(err, RetryError::Cancelled { attempts: 1, .. }));
    assert_eq!(err.label(), Some("reconnect"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(start.elapsed() < Duration::from_secs(60));
}

#[tokio::test]
async fn pre_cancelled_token_prevents_any_attempt() {
    let executor = RetryExecutor::default().with_sleeper(InstantSleeper);
    let token = CancellationToken::new();
    token.cancel();

    let err = executor
        .call()
        .cancel_on(&token)
        .execute_async(|| async { Ok::<_, TestError>(1) })
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(err.attempts(), Some(0));
}

#[tokio::test]
async fn observer_records_retry_schedule() {
    let observer = MemoryObserver::new();
    let sleeper = TrackingSleeper::new();
    let executor = RetryExecutor::new(
        RetryOptions::new()
            .max_attempts(3)
            .base_delay(Duration::from_millis(100))
            .max_delay(Duration::from_secs(1))
            .jitter(0.0),
    )
    .with_sleeper(sleeper.clone())
    .with_observer(observer.clone());

    let _ = executor
        .call()
        .label("index")
        .execute_async(|| async { Err::<(), _>(TestError("busy")) })
        .await;

    assert_eq!(observer.delays(), sleeper.calls());
    assert_eq!(observer.delays(), vec![Duration::from_millis(100), Duration::from_millis(200)]);
    assert!(matches!(
        observer.events().last(),
        Some(RetryEvent::Exhausted { attempts: 3, .. })
    ));
}

#[tokio::test]
async fn concurrent_calls_are_independent() {
    let executor = Arc::new(
        RetryExecutor::new(constant(3, Duration::from_millis(1))).with_sleeper(InstantSleeper),
    );

    let tasks: Vec<_> = (0..10usize)
        .map(|i| {
            let executor = executor.clone();
            tokio::spawn(async move {
                let calls = Arc::new(AtomicUsize::new(0));
                let result = executor
                    .execute_async(|| {
                        let calls = calls.clone();
                        async move {
                            let n = calls.fetch_add(1, Ordering::SeqCst);
                            if i % 2 == 0 && n == 0 {
                                Err(TestError("first try fails"))
                            } else {
                                Ok(i)
                            }
                        }
                    })
                    .await;
                (result.unwrap(), calls.load(Ordering::SeqCst))
            })
        })
        .collect();

    for (i, task) in tasks.into_iter().enumerate() {
        let (value, calls) = task.await.unwrap();
        assert_eq!(value, i);
        assert_eq!(calls, if i % 2 == 0 { 2 } else { 1 });
    }
}
