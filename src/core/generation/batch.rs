//! Batch Scheduling
//!
//! Pre-generates artifacts for many cards under a rate-limit-friendly
//! pacing policy: bounded concurrent groups with an explicit barrier and
//! a fixed delay between groups. A single task's failure never aborts
//! the batch; every request resolves to exactly one result.

use super::types::{GenerationRequest, GenerationResult};
use super::{GenerationEngine, ProviderConfig};
use std::collections::HashMap;
use std::time::Duration;

/// Default pacing: groups of three, five seconds between groups, a two
/// second settle after each generation.
const DEFAULT_GROUP_SIZE: usize = 3;
const DEFAULT_GROUP_DELAY: Duration = Duration::from_secs(5);
const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Runs generation requests in bounded concurrent groups.
#[derive(Debug, Clone)]
pub struct BatchScheduler {
    group_size: usize,
    group_delay: Duration,
    settle_delay: Duration,
}

impl Default for BatchScheduler {
    fn default() -> Self {
        Self {
            group_size: DEFAULT_GROUP_SIZE,
            group_delay: DEFAULT_GROUP_DELAY,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

impl BatchScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group_size(mut self, group_size: usize) -> Self {
        self.group_size = group_size.max(1);
        self
    }

    pub fn with_group_delay(mut self, group_delay: Duration) -> Self {
        self.group_delay = group_delay;
        self
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// Run every request to completion, returning results keyed by card
    /// name. Within a group all members run concurrently; group N+1
    /// never starts before group N fully resolves, so no more than
    /// `group_size` external calls are ever in flight.
    pub async fn run(
        &self,
        engine: &GenerationEngine,
        config: &ProviderConfig,
        requests: &[GenerationRequest],
    ) -> HashMap<String, GenerationResult> {
        let mut results = HashMap::with_capacity(requests.len());
        let group_count = requests.len().div_ceil(self.group_size);

        for (index, group) in requests.chunks(self.group_size).enumerate() {
            if index > 0 {
                tokio::time::sleep(self.group_delay).await;
            }
            log::info!(
                "Generating batch group {}/{} ({} cards)",
                index + 1,
                group_count,
                group.len()
            );

            let outcomes = futures::future::join_all(group.iter().map(|request| async {
                let result = engine.generate(request, config).await;
                if !self.settle_delay.is_zero() {
                    tokio::time::sleep(self.settle_delay).await;
                }
                (request.card_name.clone(), result)
            }))
            .await;

            results.extend(outcomes);
        }

        results
    }
}
