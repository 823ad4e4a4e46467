//! Agent collection and delivery tests

#[cfg(test)]
mod tests {
    use crate::assert_err;
    use crate::common::fixtures::{MockClient, StaticSampler, TEST_KEY};
    use metric_service::agent::{
        Agent, HostSampler, HttpMetricsClient, MetricsClient, RuntimeSampler, Sampler,
    };
    use metric_service::core::models::{Metric, MetricKind};
    use metric_service::utils::crypto::verify_hmac_signature;
    use metric_service::utils::error::{MetricError, RetryConfig};
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_retry() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(20),
            backoff_multiplier: 2.0,
            jitter: false,
        }
    }

    fn agent_with(samplers: Vec<Arc<dyn Sampler>>, client: MockClient, key: Option<&str>) -> Agent {
        Agent::new(
            samplers,
            Arc::new(client),
            key.map(str::to_string),
            Duration::from_millis(20),
            Duration::from_millis(50),
        )
    }

    #[tokio::test]
    async fn test_first_poll_batch_contents() {
        let samplers: Vec<Arc<dyn Sampler>> =
            vec![Arc::new(RuntimeSampler::new()), Arc::new(HostSampler::new())];
        let agent = agent_with(samplers, MockClient::new(), Some(TEST_KEY));

        agent.poll().await;
        let batch = agent.buffer().take();

        let poll_count: Vec<&Metric> = batch.iter().filter(|m| m.id == "PollCount").collect();
        assert_eq!(poll_count.len(), 1);
        assert_eq!(poll_count[0].kind, MetricKind::Counter);
        assert_eq!(poll_count[0].delta, Some(1));

        let gauges: HashSet<&str> = batch
            .iter()
            .filter(|m| m.kind == MetricKind::Gauge)
            .map(|m| m.id.as_str())
            .collect();
        assert!(gauges.contains("RandomValue"));
        assert!(gauges.len() >= 28, "only {} gauges", gauges.len());

        for metric in &batch {
            let message = metric.canonical_message().unwrap();
            assert!(verify_hmac_signature(TEST_KEY, &message, metric.hash.as_deref().unwrap()).unwrap());
        }
    }

    #[tokio::test]
    async fn test_run_pushes_and_flushes_on_shutdown() {
        let mut client = MockClient::new();
        client
            .expect_push_metrics()
            .withf(|batch| batch.iter().any(|m| m.id == "Fixed"))
            .times(1..)
            .returning(|_| Ok(()));

        let agent = Arc::new(agent_with(
            vec![Arc::new(StaticSampler(vec![("Fixed", 1.0)]))],
            client,
            None,
        ));

        let shutdown = tokio::time::sleep(Duration::from_millis(120));
        agent.clone().run(shutdown).await;

        assert!(agent.buffer().is_empty());
    }

    #[tokio::test]
    async fn test_delivery_retries_then_gives_up() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/updates/"))
            .and(header("content-encoding", "gzip"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let client =
            HttpMetricsClient::new(&server.uri(), Duration::from_secs(5), fast_retry()).unwrap();
        assert_err!(client.push_metrics(vec![Metric::counter("PollCount", 1)]).await);
    }

    #[tokio::test]
    async fn test_rejected_batch_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/updates/"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            HttpMetricsClient::new(&server.uri(), Duration::from_secs(5), fast_retry()).unwrap();
        let error = client
            .push_metrics(vec![Metric::counter("PollCount", 1)])
            .await
            .unwrap_err();
        assert!(matches!(error, MetricError::Rejected(_)));
    }

    #[tokio::test]
    async fn test_delivery_recovers_after_transient_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/updates/"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/updates/"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            HttpMetricsClient::new(&server.uri(), Duration::from_secs(5), fast_retry()).unwrap();
        assert!(
            client
                .push_metrics(vec![Metric::gauge("Alloc", 1.0)])
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_delivery_against_unreachable_collector() {
        let client = HttpMetricsClient::new(
            "http://127.0.0.1:1",
            Duration::from_millis(200),
            fast_retry(),
        )
        .unwrap();
        assert_err!(client.push_metrics(vec![Metric::counter("PollCount", 1)]).await);
    }
}
