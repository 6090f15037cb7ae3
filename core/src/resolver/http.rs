use super::retry::{retry_after, AttemptFailure, RetryPolicy};
use super::{BatchResults, LinkBatch, LinkResolver, ResolverError};
use crate::config::ResolverEndpointOptions;
use log::warn;
use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use std::time::SystemTime;

const RESOLVE_PATH: &str = "/links/resolve";

#[derive(Debug, Deserialize)]
struct ResolveResponse {
    results: Vec<Option<String>>,
}

/// Resolves link batches against the remote link service.
///
/// The batch is POSTed as a JSON array of requests; the service answers with
/// `{"results": [...]}` holding one URL or `null` per request.
#[derive(Debug, Clone)]
pub struct HttpLinkResolver {
    client: Client,
    endpoint: String,
    policy: RetryPolicy,
}

impl HttpLinkResolver {
    pub fn new(options: &ResolverEndpointOptions) -> Result<Self, ResolverError> {
        let client = Client::builder().timeout(options.timeout()).build()?;
        Ok(Self::with_client(client, options))
    }

    pub fn with_client(client: Client, options: &ResolverEndpointOptions) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", options.base_url.trim_end_matches('/'), RESOLVE_PATH),
            policy: RetryPolicy::from(&options.retry),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute_with_retry(&self, batch: &LinkBatch) -> Result<BatchResults, ResolverError> {
        if batch.is_empty() {
            return Ok(BatchResults::default());
        }

        let mut retries = 0u32;
        loop {
            let (attempt, failure) = match self
                .client
                .post(&self.endpoint)
                .json(batch.requests())
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => {
                    let body: ResolveResponse = response
                        .json()
                        .await
                        .map_err(|error| ResolverError::InvalidResponse(error.to_string()))?;
                    if body.results.len() != batch.len() {
                        return Err(ResolverError::ResultCountMismatch {
                            expected: batch.len(),
                            actual: body.results.len(),
                        });
                    }
                    return Ok(BatchResults::new(body.results));
                }
                Ok(response) => {
                    let status = response.status();
                    let hint = retry_after(response.headers(), SystemTime::now());
                    let body = response.text().await.unwrap_or_default();
                    (
                        AttemptFailure::Status {
                            status,
                            retry_after: hint,
                        },
                        ResolverError::Http { status, body },
                    )
                }
                Err(error) => (AttemptFailure::Network, ResolverError::Network(error)),
            };

            let Some(delay) = self.policy.next_delay(attempt, retries) else {
                return Err(failure);
            };

            warn!(
                "link resolution batch of {} failed ({}), retrying in {} ms (attempt {}/{})",
                batch.len(),
                failure,
                delay.as_millis(),
                retries + 1,
                self.policy.max_retries
            );
            tokio::time::sleep(delay).await;
            retries += 1;
        }
    }
}

impl LinkResolver for HttpLinkResolver {
    fn name(&self) -> &'static str {
        "http"
    }

    fn execute(
        &self,
        batch: &LinkBatch,
    ) -> impl Future<Output = Result<BatchResults, ResolverError>> + Send {
        self.execute_with_retry(batch)
    }
}
