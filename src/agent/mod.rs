//! Sampling agent
//!
//! Two independent cadences share one [`MetricBuffer`]: polling samples
//! and signs gauges into the buffer, pushing swaps the buffer out and hands
//! the batch to a [`MetricsClient`] in the background.

pub mod buffer;
pub mod client;
pub mod sampler;

pub use buffer::MetricBuffer;
pub use client::{HttpMetricsClient, MetricsClient};
pub use sampler::{HostSampler, RuntimeSampler, Sampler};

use crate::config::AgentConfig;
use crate::core::models::Metric;
use crate::utils::crypto::create_hmac_signature;
use crate::utils::error::{MetricError, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Gauge appended on every poll
pub const RANDOM_VALUE: &str = "RandomValue";
/// Counter appended on every poll with delta 1
pub const POLL_COUNT: &str = "PollCount";

/// The agent's collection and delivery pipeline
pub struct Agent {
    samplers: Vec<Arc<dyn Sampler>>,
    buffer: MetricBuffer,
    client: Arc<dyn MetricsClient>,
    signing_key: Option<String>,
    poll_period: Duration,
    report_period: Duration,
}

impl Agent {
    pub fn new(
        samplers: Vec<Arc<dyn Sampler>>,
        client: Arc<dyn MetricsClient>,
        signing_key: Option<String>,
        poll_period: Duration,
        report_period: Duration,
    ) -> Self {
        Self {
            samplers,
            buffer: MetricBuffer::new(),
            client,
            signing_key: signing_key.filter(|k| !k.is_empty()),
            poll_period,
            report_period,
        }
    }

    /// Agent with the runtime and host samplers and an HTTP client
    pub async fn from_config(config: &AgentConfig) -> Result<Arc<Self>> {
        let client = HttpMetricsClient::from_config(config).await?;
        info!("Reporting to {}", client.url());

        let samplers: Vec<Arc<dyn Sampler>> = vec![
            Arc::new(RuntimeSampler::new()),
            Arc::new(HostSampler::new()),
        ];

        Ok(Arc::new(Self::new(
            samplers,
            Arc::new(client),
            config.signing_key().map(str::to_string),
            config.poll_period(),
            config.report_period(),
        )))
    }

    /// Pending metrics not yet pushed
    pub fn buffer(&self) -> &MetricBuffer {
        &self.buffer
    }

    /// Sample every source once and buffer the signed results.
    /// Returns the number of metrics added.
    pub async fn poll(&self) -> usize {
        let tasks = self.samplers.iter().cloned().map(|sampler| {
            tokio::task::spawn_blocking(move || (sampler.name(), sampler.sample()))
        });

        let mut metrics = Vec::new();
        for joined in futures::future::join_all(tasks).await {
            match joined {
                Ok((_, Ok(gauges))) => metrics.extend(
                    gauges
                        .into_iter()
                        .filter(|(_, value)| value.is_finite())
                        .map(|(name, value)| Metric::gauge(name, value)),
                ),
                Ok((name, Err(e))) => warn!("Sampler {} failed: {}", name, e),
                Err(e) => warn!("Sampler task failed: {}", e),
            }
        }
        metrics.push(Metric::gauge(RANDOM_VALUE, rand::random::<f64>()));
        metrics.push(Metric::counter(POLL_COUNT, 1));

        let signed: Vec<Metric> = metrics
            .into_iter()
            .filter_map(|mut metric| match self.sign(&mut metric) {
                Ok(()) => Some(metric),
                Err(e) => {
                    warn!("Dropping {}: {}", metric.id, e);
                    None
                }
            })
            .collect();
        let added = signed.len();
        self.buffer.extend(signed);
        debug!("Polled {} metrics, {} pending", added, self.buffer.len());
        added
    }

    fn sign(&self, metric: &mut Metric) -> Result<()> {
        let message = metric.canonical_message()?;
        let key = self.signing_key.as_deref().unwrap_or_default();
        match create_hmac_signature(key, &message) {
            Ok(hash) => metric.hash = Some(hash),
            Err(MetricError::NoSigningKey) => {
                debug!("Signing disabled, {} sent unsigned", metric.id)
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Swap the buffer out and deliver it in the background.
    /// `None` when there was nothing to send.
    pub fn push(&self) -> Option<JoinHandle<()>> {
        let batch = self.buffer.take();
        if batch.is_empty() {
            debug!("Nothing to push");
            return None;
        }

        let client = self.client.clone();
        Some(tokio::spawn(async move {
            let count = batch.len();
            match client.push_metrics(batch).await {
                Ok(()) => debug!("Delivered {} metrics", count),
                Err(e) => error!("Dropped batch of {} metrics: {}", count, e),
            }
        }))
    }

    /// Poll cadence, kept on its own task so slow sampling never delays a
    /// push
    async fn poll_loop(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(self.poll_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.poll().await;
        }
    }

    /// Run both cadences until `shutdown` resolves, then flush once and wait
    /// for that last delivery
    pub async fn run<F>(self: Arc<Self>, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let poller = tokio::spawn(self.clone().poll_loop());

        let mut report_ticker = tokio::time::interval(self.report_period);
        report_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick completes immediately
        report_ticker.tick().await;

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = report_ticker.tick() => {
                    self.push();
                }
            }
        }

        // a poll is applied to the buffer in one step, so aborting between
        // awaits loses at most the samples in flight
        poller.abort();
        if let Err(e) = poller.await {
            if !e.is_cancelled() {
                error!("Poll task failed: {}", e);
            }
        }

        info!("Agent stopping, flushing {} pending metrics", self.buffer.len());
        if let Some(last) = self.push() {
            if let Err(e) = last.await {
                error!("Final delivery task failed: {}", e);
            }
        }
    }
}
