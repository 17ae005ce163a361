use axum::Router;
use axum::http::{HeaderValue, Method, header::CONTENT_TYPE};
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use keygrid::config::Config;
use keygrid::db::{AppState, create_pool, init_affiliate_db, init_db, queries};
use keygrid::handlers;
use keygrid::payments::MozPaymentClient;
use keygrid::plans::PAID_PLANS;

#[derive(Parser, Debug)]
#[command(name = "keygrid")]
#[command(about = "Access key, mobile-money payment and signal backend")]
struct Cli {
    /// Seed the database with one dev key per paid plan
    #[arg(long)]
    seed: bool,

    /// Delete databases on exit (dev mode only, useful for fresh starts)
    #[arg(long)]
    ephemeral: bool,
}

/// Seeds the database with one key per paid plan, for exercising the
/// panel and client against a fresh store.
/// Only runs in dev mode and when the database is empty.
fn seed_dev_data(state: &AppState) {
    let conn = state
        .db
        .get()
        .expect("Failed to get db connection for seeding");

    let count = queries::count_keys(&conn).expect("Failed to count keys");
    if count > 0 {
        tracing::info!("Database already has data, skipping seed");
        return;
    }

    tracing::info!("============================================");
    tracing::info!("SEEDING DEV DATA");
    tracing::info!("============================================");

    let mut seeded = Vec::new();
    for plan in PAID_PLANS {
        let key = queries::create_key(&conn, plan).expect("Failed to create dev key");
        tracing::info!("Plan {} key: {}", plan.as_ref(), key.key);
        seeded.push(key);
    }

    tracing::info!("============================================");
    tracing::info!("DEV DATA SEEDED SUCCESSFULLY");
    tracing::info!("============================================");

    // Print copy-paste friendly output (no log formatting)
    println!();
    println!("--- COPY FROM HERE ---");
    for key in &seeded {
        println!("  key_{}: {}", key.plan.as_ref(), key.key);
    }
    println!("--- END COPY ---");
    println!();
}

/// Creates the admin key on first startup. The token is only logged here;
/// afterwards it lives in the keys table like any other key.
fn bootstrap_admin_key(state: &AppState) {
    let conn = state
        .db
        .get()
        .expect("Failed to get db connection for bootstrap");

    match queries::ensure_admin_key(&conn).expect("Failed to provision admin key") {
        Some(key) => {
            tracing::info!("============================================");
            tracing::info!("ADMIN KEY CREATED");
            tracing::info!("Key: {}", key.key);
            tracing::info!("============================================");
        }
        None => {
            tracing::info!("Admin key already provisioned");
        }
    }
}

/// Logs what the store holds at startup. A non-zero pending count means
/// charges whose outcome was never recorded and is worth an operator's
/// attention.
fn log_store_summary(state: &AppState) {
    let conn = state
        .db
        .get()
        .expect("Failed to get db connection for summary");

    let total = queries::count_keys(&conn).expect("Failed to count keys");
    let active = queries::count_active_keys(&conn).expect("Failed to count active keys");
    let pending =
        queries::count_pending_payment_attempts(&conn).expect("Failed to count pending attempts");

    tracing::info!("Store: {} keys, {} active", total, active);
    if pending > 0 {
        tracing::warn!(
            "{} payment attempt(s) stuck pending, reconcile against the provider statement",
            pending
        );
    }
}

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keygrid=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }
    if config.wallet_id.is_empty() {
        tracing::warn!("WALLET_ID is not set; gateway charges will fail");
    }

    // Create database connection pools
    let db_pool = create_pool(&config.database_path).expect("Failed to create database pool");
    let affiliate_pool = create_pool(&config.affiliate_database_path)
        .expect("Failed to create affiliate database pool");

    // Initialize database schemas
    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }
    {
        let conn = affiliate_pool
            .get()
            .expect("Failed to get affiliate connection");
        init_affiliate_db(&conn).expect("Failed to initialize affiliate database");
    }

    let state = AppState {
        db: db_pool,
        affiliates: affiliate_pool,
        base_url: config.base_url.clone(),
        gateway: MozPaymentClient::new(&config.payment_api_base, &config.wallet_id),
    };

    // Seed dev data if --seed flag is passed (only in dev mode)
    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed flag ignored: not in dev mode (set KEYGRID_ENV=dev)");
        } else {
            seed_dev_data(&state);
        }
    }

    bootstrap_admin_key(&state);
    log_store_summary(&state);

    // The panel runs on its own origin; lock CORS to it when configured.
    let cors = match config.panel_origin.as_deref() {
        Some(origin) => {
            let origin = origin
                .parse::<HeaderValue>()
                .expect("Invalid PANEL_ORIGIN value");
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([CONTENT_TYPE])
        }
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([CONTENT_TYPE]),
    };

    // Build the application router
    let app = Router::new()
        .merge(handlers::router(config.rate_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    // Start the server
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    // Track if we should clean up on exit
    let cleanup_on_exit = cli.ephemeral && config.dev_mode;
    let db_path = config.database_path.clone();
    let affiliate_path = config.affiliate_database_path.clone();

    if cleanup_on_exit {
        tracing::info!("EPHEMERAL MODE: databases will be deleted on exit");
    }

    tracing::info!("Keygrid server listening on {}", addr);

    // Run server with graceful shutdown
    // Use into_make_service_with_connect_info to enable IP-based rate limiting
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start server");

    // Cleanup on exit if ephemeral mode
    if cleanup_on_exit {
        tracing::info!("Cleaning up ephemeral databases...");
        for path in [&db_path, &affiliate_path] {
            if let Err(e) = std::fs::remove_file(path) {
                tracing::warn!("Failed to remove {}: {}", path, e);
            } else {
                tracing::info!("Removed {}", path);
            }
            // Also remove WAL and SHM files if they exist
            let _ = std::fs::remove_file(format!("{}-wal", path));
            let _ = std::fs::remove_file(format!("{}-shm", path));
        }
        tracing::info!("Ephemeral cleanup complete");
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
