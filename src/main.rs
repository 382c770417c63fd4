use car_rental_booking::{
    adapters::memory::{
        BookingStore as MemoryBookingStore, CarCatalog as MemoryCarCatalog,
        UserDirectory as MemoryUserDirectory,
    },
    adapters::postgres::{
        MIGRATOR, PostgresBookingStore, PostgresCarCatalog, PostgresUserDirectory,
    },
    api::{handlers::AppState, router::create_router},
    application::booking::ServiceDependencies,
    config::{AppConfig, StorageBackend},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "car_rental_booking=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    // Initialize adapters
    let service_deps = match config.storage {
        StorageBackend::Postgres => {
            tracing::info!("Database: {}", config.database_target());

            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(&config.database_url)
                .await?;

            MIGRATOR.run(&pool).await?;

            ServiceDependencies {
                booking_store: Arc::new(PostgresBookingStore::new(pool.clone())),
                car_catalog: Arc::new(PostgresCarCatalog::new(pool.clone())),
                user_directory: Arc::new(PostgresUserDirectory::new(pool)),
            }
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");

            ServiceDependencies {
                booking_store: Arc::new(MemoryBookingStore::new()),
                car_catalog: Arc::new(MemoryCarCatalog::new()),
                user_directory: Arc::new(MemoryUserDirectory::new()),
            }
        }
    };

    // Create application state and router
    let app_state = Arc::new(AppState { service_deps });
    let app = create_router(app_state);

    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
