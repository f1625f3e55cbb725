use futures::future::try_join_all;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use std::future::Future;
use std::time::Duration;

pub type Client = ClientWithMiddleware;

lazy_static::lazy_static! {
    pub static ref CLIENT: Client = create_shared_client();

    /// Creates stay off the retry middleware so a replayed POST can never
    /// duplicate an entity.
    pub static ref BARE_CLIENT: reqwest::Client = reqwest::Client::new();
}

fn create_shared_client() -> Client {
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
    ClientBuilder::new(reqwest::Client::new())
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build()
}

/// Runs the futures in order-preserving batches of `batch_size`, pausing
/// `delay_ms` between batches so the vendor rate limit is not tripped.
pub async fn politely_try_join_all<F, T, E>(
    futures: Vec<F>,
    batch_size: usize,
    delay_ms: u64,
) -> Result<Vec<T>, E>
where
    F: Future<Output = Result<T, E>>,
{
    let batch_size = batch_size.max(1);
    let mut results = Vec::with_capacity(futures.len());
    let mut queue = futures;
    while !queue.is_empty() {
        let rest = queue.split_off(queue.len().min(batch_size));
        let batch = std::mem::replace(&mut queue, rest);
        results.extend(try_join_all(batch).await?);
        if !queue.is_empty() {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::politely_try_join_all;

    #[tokio::test]
    async fn batches_preserve_input_order() {
        let futures: Vec<_> = (0..5)
            .map(|n| async move { Ok::<u32, String>(n * 10) })
            .collect();
        let results = politely_try_join_all(futures, 2, 0).await.unwrap();
        assert_eq!(results, vec![0, 10, 20, 30, 40]);
    }

    #[tokio::test]
    async fn first_error_aborts_the_batch() {
        let futures: Vec<_> = (0..3)
            .map(|n| async move {
                if n == 1 {
                    Err(format!("boom {}", n))
                } else {
                    Ok(n)
                }
            })
            .collect();
        let result = politely_try_join_all(futures, 3, 0).await;
        assert_eq!(result.unwrap_err(), "boom 1");
    }

    #[tokio::test]
    async fn zero_batch_size_still_makes_progress() {
        let futures: Vec<_> = (0..2).map(|n| async move { Ok::<u32, ()>(n) }).collect();
        let results = politely_try_join_all(futures, 0, 0).await.unwrap();
        assert_eq!(results.len(), 2);
    }
}
