//! Async retry with a cancellation deadline.
use secondwind::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let executor = RetryExecutor::new(presets::fast()).with_observer(LogObserver);
    let token = CancellationToken::new();
    let deadline = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        deadline.cancel();
    });

    let attempts = AtomicUsize::new(0);
    let result = executor
        .call()
        .label("connect upstream")
        .cancel_on(&token)
        .execute_async(|| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async {
                Err::<(), _>(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"))
            }
        })
        .await;

    match result {
        Ok(()) => println!("connected"),
        Err(RetryError::Cancelled { attempts, .. }) => {
            println!("gave up after {attempts} attempts")
        }
        Err(other) => println!("failed: {other}"),
    }
    println!("operation invoked {} times", attempts.load(Ordering::SeqCst));
}
