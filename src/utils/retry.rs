// ABOUTME: Bounded retry with fixed back-off for fallible async tasks.
// ABOUTME: The last error is returned unchanged once retries run out.

use crate::config::RetryPolicy;
use std::future::Future;
use std::time::Duration;

type Predicate<'a, E> = Box<dyn Fn(&E) -> bool + Send + Sync + 'a>;
type RetryHook<'a, E> = Box<dyn Fn(u32, &E) + Send + Sync + 'a>;

pub struct RetryOptions<'a, E> {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub back_off: Duration,
    should_retry: Option<Predicate<'a, E>>,
    on_retry: Option<RetryHook<'a, E>>,
}

impl<'a, E> RetryOptions<'a, E> {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            max_attempts: policy.max_attempts.max(1),
            back_off: policy.back_off,
            should_retry: None,
            on_retry: None,
        }
    }

    /// Only retry errors for which `predicate` holds.
    pub fn should_retry(mut self, predicate: impl Fn(&E) -> bool + Send + Sync + 'a) -> Self {
        self.should_retry = Some(Box::new(predicate));
        self
    }

    /// Called with the attempt number that failed before each retry.
    pub fn on_retry(mut self, hook: impl Fn(u32, &E) + Send + Sync + 'a) -> Self {
        self.on_retry = Some(Box::new(hook));
        self
    }
}

impl<E> Default for RetryOptions<'_, E> {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

pub async fn retry_task<T, E, F, Fut>(options: &RetryOptions<'_, E>, mut task: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match task().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let retryable = options.should_retry.as_ref().is_none_or(|p| p(&err));
                if !retryable || attempt >= options.max_attempts {
                    return Err(err);
                }
                if let Some(hook) = &options.on_retry {
                    hook(attempt, &err);
                }
                tokio::time::sleep(options.back_off).await;
                attempt += 1;
            }
        }
    }
}
