use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Metrics::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Metrics::Id).string().not_null())
                    .col(ColumnDef::new(Metrics::Kind).string().not_null())
                    .col(ColumnDef::new(Metrics::Delta).big_integer().null())
                    .col(ColumnDef::new(Metrics::Value).double().null())
                    .primary_key(
                        Index::create()
                            .name("pk_metrics")
                            .col(Metrics::Id)
                            .col(Metrics::Kind),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Metrics::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Metrics {
    Table,
    Id,
    Kind,
    Delta,
    Value,
}
