use crate::core::models::{Metric, MetricKind, MetricValue, Metrics};
use crate::storage::MetricRepository;
use crate::utils::error::{MetricError, Result};
use async_trait::async_trait;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::*;
use tracing::{debug, warn};

use super::super::entities::metric;
use super::types::SeaOrmDatabase;

/// `INSERT .. ON CONFLICT (id, kind) DO UPDATE SET delta = metrics.delta + $delta`
async fn upsert_counter<C>(conn: &C, name: &str, delta: i64) -> std::result::Result<(), DbErr>
where
    C: ConnectionTrait,
{
    let row = metric::ActiveModel {
        id: Set(name.to_string()),
        kind: Set(MetricKind::Counter.to_string()),
        delta: Set(Some(delta)),
        value: Set(None),
    };

    metric::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([metric::Column::Id, metric::Column::Kind])
                .value(
                    metric::Column::Delta,
                    Expr::col((metric::Entity, metric::Column::Delta)).add(delta),
                )
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

/// `INSERT .. ON CONFLICT (id, kind) DO UPDATE SET value = excluded.value`
async fn upsert_gauge<C>(conn: &C, name: &str, value: f64) -> std::result::Result<(), DbErr>
where
    C: ConnectionTrait,
{
    let row = metric::ActiveModel {
        id: Set(name.to_string()),
        kind: Set(MetricKind::Gauge.to_string()),
        delta: Set(None),
        value: Set(Some(value)),
    };

    metric::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([metric::Column::Id, metric::Column::Kind])
                .update_column(metric::Column::Value)
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

async fn apply<C>(conn: &C, metric: &Metric) -> Result<()>
where
    C: ConnectionTrait,
{
    match metric.validate()? {
        MetricValue::Counter(delta) => upsert_counter(conn, &metric.id, delta).await?,
        MetricValue::Gauge(value) => upsert_gauge(conn, &metric.id, value).await?,
    }
    Ok(())
}

#[async_trait]
impl MetricRepository for SeaOrmDatabase {
    async fn save_counter(&self, name: &str, delta: i64) -> Result<()> {
        upsert_counter(&self.db, name, delta).await?;
        Ok(())
    }

    async fn save_gauge(&self, name: &str, value: f64) -> Result<()> {
        upsert_gauge(&self.db, name, value).await?;
        Ok(())
    }

    async fn save_metrics_batch(&self, metrics: &[Metric]) -> Result<()> {
        debug!("Saving batch of {} metrics", metrics.len());
        let txn = self.db.begin().await?;

        for item in metrics {
            if let Err(e) = apply(&txn, item).await {
                warn!("Batch rolled back at '{}': {}", item.id, e);
                txn.rollback().await?;
                return Err(e);
            }
        }

        txn.commit().await?;
        Ok(())
    }

    async fn get_metric_by_key(&self, name: &str) -> Result<Metric> {
        // "counter" sorts before "gauge"
        metric::Entity::find()
            .filter(metric::Column::Id.eq(name))
            .order_by_asc(metric::Column::Kind)
            .one(&self.db)
            .await?
            .map(Metric::from)
            .ok_or_else(|| MetricError::not_found(name))
    }

    async fn get_typed_metric(&self, kind: &MetricKind, name: &str) -> Result<Metric> {
        kind.ensure_supported()?;
        metric::Entity::find_by_id((name.to_string(), kind.to_string()))
            .one(&self.db)
            .await?
            .map(Metric::from)
            .ok_or_else(|| MetricError::not_found(name))
    }

    async fn get_all_metrics(&self) -> Result<Metrics> {
        let rows = metric::Entity::find().all(&self.db).await?;
        Ok(rows.into_iter().map(Metric::from).collect())
    }

    async fn ping(&self) -> Result<()> {
        self.health_check().await
    }

    async fn migrate(&self) -> Result<()> {
        self.run_migrations().await
    }

    async fn shutdown(&self) -> Result<()> {
        self.close().await
    }

    fn backend_name(&self) -> &'static str {
        match self.backend_type {
            super::DatabaseBackendType::PostgreSQL => "postgres",
            super::DatabaseBackendType::SQLite => "sqlite",
        }
    }
}
