use std::time::Duration;

use backon::ExponentialBuilder;

/// Shared backoff policy for all node-client calls (log fetches and block
/// fetches alike). Only errors where [`NodeError::is_retryable`] holds go
/// through this policy; range-too-large rejections are handled by chunk
/// halving instead.
///
/// [`NodeError::is_retryable`]: crate::error::NodeError::is_retryable
pub fn backoff_policy(max_retries: usize, min_delay: Duration) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(min_delay)
        .with_max_delay(Duration::from_secs(30))
        .with_max_times(max_retries)
}
