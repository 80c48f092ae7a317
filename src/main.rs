use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fittrack::api::create_routes;
use fittrack::config::{run_migrations, AppConfig, DatabaseConfig, DatabaseSeeder};
use fittrack::services::{Mailer, ReminderScheduler};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    // RUST_LOG wins over LOG_LEVEL
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let db_config = DatabaseConfig::from_env()?;
    let pool = db_config.create_pool().await?;
    run_migrations(&pool).await?;
    info!("Database ready");

    if config.seed_demo_data {
        DatabaseSeeder::new(pool.clone()).seed_all().await?;
    }

    let mailer = match &config.smtp {
        Some(smtp) => Some(Mailer::new(smtp)?),
        None => {
            warn!("SMTP not configured; emails will be logged instead of sent");
            None
        }
    };

    let mut scheduler = ReminderScheduler::new(pool.clone(), mailer.clone(), &config.reminder_cron).await?;
    scheduler.start().await?;

    let app = create_routes(pool, &config.jwt_secret, mailer);

    let address = config.server_address();
    let listener = TcpListener::bind(&address).await?;
    info!("FitTrack server starting on http://{}", address);
    info!("Health check available at http://{}/health", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    scheduler.shutdown().await?;
    Ok(())
}
