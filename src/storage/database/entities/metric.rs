use crate::core::models::{Metric, MetricKind};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored metric row, keyed by `(id, kind)`
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "metrics")]
pub struct Model {
    /// Metric name
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// `counter` or `gauge`
    #[sea_orm(primary_key, auto_increment = false)]
    pub kind: String,

    /// Accumulated total for counters
    pub delta: Option<i64>,

    /// Latest value for gauges
    #[sea_orm(column_type = "Double", nullable)]
    pub value: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Metric {
    fn from(model: Model) -> Self {
        Metric {
            id: model.id,
            kind: MetricKind::from(model.kind),
            delta: model.delta,
            value: model.value,
            hash: None,
        }
    }
}
