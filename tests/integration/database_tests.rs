//! Relational storage tests
//!
//! Runs the repository contract against a real in-memory SQLite database.

#[cfg(test)]
mod tests {
    use crate::common::TestDatabase;
    use crate::common::database::test_db_config;
    use crate::{assert_err, assert_ok};
    use metric_service::core::models::{Metric, MetricKind};
    use metric_service::storage::MetricRepository;
    use metric_service::utils::error::MetricError;

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let db = TestDatabase::new().await;
        assert_ok!(db.db().migrate().await);
        assert_ok!(db.db().ping().await);
        assert_eq!(db.db().backend_name(), "sqlite");
    }

    #[tokio::test]
    async fn test_counter_accumulates() {
        let db = TestDatabase::new().await;
        let repo = db.db();

        assert_ok!(repo.save_counter("PollCount", 5).await);
        assert_ok!(repo.save_counter("PollCount", 7).await);

        let metric = assert_ok!(repo.get_metric_by_key("PollCount").await);
        assert_eq!(metric.kind, MetricKind::Counter);
        assert_eq!(metric.delta, Some(12));
        assert_eq!(metric.value, None);
    }

    #[tokio::test]
    async fn test_gauge_overwrites() {
        let db = TestDatabase::new().await;
        let repo = db.db();

        assert_ok!(repo.save_gauge("Alloc", 1.5).await);
        assert_ok!(repo.save_gauge("Alloc", 12.5).await);

        let metric = assert_ok!(repo.get_metric_by_key("Alloc").await);
        assert_eq!(metric.value, Some(12.5));
        assert_eq!(assert_ok!(repo.get_all_metrics().await).len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_counter_updates_are_not_lost() {
        let db = TestDatabase::new().await;
        let repo = db.repository();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    for _ in 0..10 {
                        repo.save_counter("hits", 1).await.unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let metric = assert_ok!(repo.get_metric_by_key("hits").await);
        assert_eq!(metric.delta, Some(100));
    }

    #[tokio::test]
    async fn test_same_name_lives_under_both_kinds() {
        let db = TestDatabase::new().await;
        let repo = db.db();

        assert_ok!(repo.save_counter("dual", 3).await);
        assert_ok!(repo.save_gauge("dual", 0.5).await);

        let counter = assert_ok!(repo.get_typed_metric(&MetricKind::Counter, "dual").await);
        let gauge = assert_ok!(repo.get_typed_metric(&MetricKind::Gauge, "dual").await);
        assert_eq!(counter.delta, Some(3));
        assert_eq!(gauge.value, Some(0.5));

        // untyped lookup prefers the counter
        let any = assert_ok!(repo.get_metric_by_key("dual").await);
        assert_eq!(any.kind, MetricKind::Counter);
    }

    #[tokio::test]
    async fn test_missing_metric_is_not_found() {
        let db = TestDatabase::new().await;

        let err = assert_err!(db.db().get_metric_by_key("nope").await);
        assert!(matches!(err, MetricError::NotFound(_)));

        let err = assert_err!(db.db().get_typed_metric(&MetricKind::Gauge, "nope").await);
        assert!(matches!(err, MetricError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_batch_applies_all() {
        let db = TestDatabase::new().await;
        let repo = db.db();

        let batch = vec![
            Metric::counter("PollCount", 1),
            Metric::counter("PollCount", 2),
            Metric::gauge("Alloc", 3.25),
        ];
        assert_ok!(repo.save_metrics_batch(&batch).await);

        let counter = assert_ok!(repo.get_metric_by_key("PollCount").await);
        assert_eq!(counter.delta, Some(3));
        let gauge = assert_ok!(repo.get_metric_by_key("Alloc").await);
        assert_eq!(gauge.value, Some(3.25));
    }

    #[tokio::test]
    async fn test_batch_rolls_back_on_failure() {
        let db = TestDatabase::new().await;
        let repo = db.db();
        assert_ok!(repo.save_counter("PollCount", 10).await);

        let broken = Metric {
            id: "Alloc".to_string(),
            kind: MetricKind::Gauge,
            delta: None,
            value: None,
            hash: None,
        };
        let batch = vec![Metric::counter("PollCount", 5), Metric::gauge("Heap", 1.0), broken];
        assert_err!(repo.save_metrics_batch(&batch).await);

        let counter = assert_ok!(repo.get_metric_by_key("PollCount").await);
        assert_eq!(counter.delta, Some(10));
        assert!(repo.get_metric_by_key("Heap").await.is_err());
    }

    #[tokio::test]
    async fn test_batch_rolls_back_on_database_error() {
        use metric_service::config::DatabaseConfig;
        use metric_service::storage::database::Database;
        use sea_orm::ConnectionTrait;

        let dir = tempfile::TempDir::new().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("metrics.db").display());
        let repo = Database::new(&DatabaseConfig {
            url: url.clone(),
            ..test_db_config()
        })
        .await
        .unwrap();
        assert_ok!(repo.migrate().await);
        assert_ok!(repo.save_counter("PollCount", 10).await);

        // the row passes validation but the database refuses it
        let admin = sea_orm::Database::connect(url.as_str()).await.unwrap();
        admin
            .execute_unprepared(
                "CREATE TRIGGER reject_poison BEFORE INSERT ON metrics \
                 WHEN NEW.id = 'Poison' BEGIN SELECT RAISE(ABORT, 'rejected'); END",
            )
            .await
            .unwrap();
        admin.close().await.unwrap();

        let batch = vec![
            Metric::counter("PollCount", 5),
            Metric::gauge("Heap", 1.0),
            Metric::gauge("Poison", 2.0),
        ];
        let err = assert_err!(repo.save_metrics_batch(&batch).await);
        assert!(matches!(err, MetricError::Database(_)));

        let counter = assert_ok!(repo.get_metric_by_key("PollCount").await);
        assert_eq!(counter.delta, Some(10));
        assert!(repo.get_metric_by_key("Heap").await.is_err());
        assert_ok!(repo.shutdown().await);
    }

    #[tokio::test]
    async fn test_ping_fails_after_shutdown() {
        let db = TestDatabase::new().await;
        assert_ok!(db.db().ping().await);

        assert_ok!(db.db().shutdown().await);
        let err = assert_err!(db.db().ping().await);
        assert!(matches!(err, MetricError::Unavailable(_)));
    }
}
