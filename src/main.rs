use books_api::{
    app, apply_migrations, ensure_database_exists, AppState, MemoryStore, PgStore, Settings,
    Store, StoreKind,
};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("books_api=info,tower_http=info")
            }),
        )
        .init();

    let settings = Settings::from_env()?;
    let store: Arc<dyn Store> = match settings.store {
        StoreKind::Memory => {
            tracing::info!("using in-memory store");
            Arc::new(MemoryStore::new())
        }
        StoreKind::Postgres => {
            ensure_database_exists(&settings.database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(settings.max_connections)
                .connect(&settings.database_url)
                .await?;
            apply_migrations(&pool).await?;
            Arc::new(PgStore::new(pool))
        }
    };

    let router = app(AppState::new(store), settings.body_limit);
    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
