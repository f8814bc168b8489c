//! Bounded retry for opening the store at startup.

use std::{fmt::Display, future::Future, time::Duration};

/// Run `connect` up to `attempts` times, sleeping `backoff` between failures.
///
/// Returns the last error once every attempt has failed. `attempts` of zero
/// is treated as one.
pub async fn connect_with_retry<T, E, F, Fut>(
  attempts: u32,
  backoff:  Duration,
  mut connect: F,
) -> Result<T, E>
where
  E: Display,
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<T, E>>,
{
  let attempts = attempts.max(1);
  let mut attempt = 1;
  loop {
    tracing::info!(attempt, attempts, "connecting to store");
    match connect().await {
      Ok(value) => {
        tracing::info!("connected to store");
        return Ok(value);
      }
      Err(e) if attempt < attempts => {
        tracing::warn!(error = %e, attempt, ?backoff, "store connection failed, retrying");
        tokio::time::sleep(backoff).await;
        attempt += 1;
      }
      Err(e) => {
        tracing::error!(error = %e, attempts, "giving up on store connection");
        return Err(e);
      }
    }
  }
}
