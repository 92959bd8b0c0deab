// connexion BD + création des tables au démarrage

use std::time::Duration;

use sea_orm::sea_query::Index;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema};

use crate::config::DatabaseConfig;
use crate::models::{accounts, orders};

pub async fn establish_connection(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .acquire_timeout(Duration::from_secs(60))
        .idle_timeout(Duration::from_secs(30))
        .sqlx_logging(false);

    Database::connect(options).await
}

/// Crée les tables payments / user_details et leurs index s'ils n'existent pas
pub async fn sync_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut payments = schema.create_table_from_entity(orders::Entity);
    payments.if_not_exists();
    db.execute(backend.build(&payments)).await?;

    let mut user_details = schema.create_table_from_entity(accounts::Entity);
    user_details.if_not_exists();
    db.execute(backend.build(&user_details)).await?;

    let indexes = [
        Index::create()
            .name("idx_payments_order_id")
            .table(orders::Entity)
            .col(orders::Column::RazorpayOrderId)
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_user_details_payment_id")
            .table(accounts::Entity)
            .col(accounts::Column::OrderId)
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_user_details_email")
            .table(accounts::Entity)
            .col(accounts::Column::Email)
            .if_not_exists()
            .to_owned(),
    ];

    for index in &indexes {
        db.execute(backend.build(index)).await?;
    }

    tracing::info!("Database schema is up to date");
    Ok(())
}
