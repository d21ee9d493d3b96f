//! Catalog seeder entry point.
//!
//! Defines the fixed credit-card products against either the in-memory
//! store (a dry run showing what would be written) or a PostgreSQL store
//! when a database URL is provided.

mod catalog;

use clap::Parser;
use domain::DefineProductHandler;
use event_queue::InMemoryEventQueue;
use event_store::{InMemoryEventStore, PostgresEventStore};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Parser)]
#[command(name = "seeder", about = "Defines the fixed credit-card products")]
struct Args {
    /// PostgreSQL connection string; falls back to the DATABASE_URL
    /// environment variable. Without either, seeds an in-memory store.
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let database_url = args
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok());

    let queue = InMemoryEventQueue::new();

    match database_url {
        Some(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(5)
                .connect(&url)
                .await
                .expect("failed to connect to database");

            let store = PostgresEventStore::new(pool);
            store.run_migrations().await.expect("migrations failed");

            let handler = DefineProductHandler::new(store, queue);
            let responses = catalog::seed_catalog(&handler).await.expect("seeding failed");
            tracing::info!(products = responses.len(), "catalog seeded");
        }
        None => {
            tracing::warn!("no DATABASE_URL set; seeding an in-memory store (dry run)");
            let store = InMemoryEventStore::new();
            let handler = DefineProductHandler::new(store.clone(), queue);
            let responses = catalog::seed_catalog(&handler).await.expect("seeding failed");
            tracing::info!(
                products = responses.len(),
                events = store.event_count().await,
                "dry run complete"
            );
        }
    }
}
