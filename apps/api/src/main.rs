use std::sync::Arc;

use anyhow::{Context, Result};
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use notification_cell::{BusinessProfile, LogSender, NotificationDispatcher};
use scheduling_cell::models::{BlackoutDate, SchedulingRules};
use scheduling_cell::{BookingLedger, BusinessCalendar};
use shared_config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Mobile Experts booking API server");

    // Load configuration
    let config = AppConfig::from_env();

    let blackouts = config
        .blackout_dates
        .iter()
        .map(|date| BlackoutDate::full_day(*date, None))
        .collect();
    let calendar = Arc::new(
        BusinessCalendar::storefront_default(blackouts)
            .context("invalid operating-hours configuration")?,
    );

    let ledger = Arc::new(BookingLedger::new(calendar, SchedulingRules::from(&config)));

    // Notification dispatcher consumes ledger events for the process lifetime
    let dispatcher =
        NotificationDispatcher::new(BusinessProfile::from(&config), Arc::new(LogSender));
    let _dispatcher_task = dispatcher.spawn(ledger.subscribe());

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(ledger)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    info!("Listening on {}", config.bind_addr);
    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
