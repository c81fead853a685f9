use globetrail_api::{
    app,
    state::{AppState, AuthConfig, RateLimit},
};
use globetrail_store::{app_config::Config, MemoryAuthProvider, RedisClient};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    "globetrail_api=debug,globetrail_store=info,tower_http=debug".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");
    tracing::info!("Starting GlobeTrail API on port {}", config.server.port);

    let store = globetrail_store::open_document_store(&config)
        .await
        .expect("Failed to open document store");
    let catalog = Arc::new(globetrail_store::catalog_store(&config, store.clone()));

    let mut refreshes = catalog.refresh_events();
    tokio::spawn(async move {
        while let Ok(event) = refreshes.recv().await {
            if event.failed {
                tracing::warn!("Catalog {} refresh failed, serving empty", event.collection);
            } else {
                tracing::info!(
                    "Catalog {} refreshed with {} packages",
                    event.collection,
                    event.package_count
                );
            }
        }
    });

    if config.catalog.seed_on_start {
        if let Some(collection) = catalog.collection() {
            let existing = store.read_all(collection).await.map(|docs| docs.len()).unwrap_or(0);
            if existing == 0 {
                globetrail_store::seed_all(&store, collection)
                    .await
                    .expect("Failed to seed catalog");
            }
        }
    }
    catalog.refresh().await;

    let uploader = globetrail_store::uploader(&config).expect("Failed to open media storage");

    let mut app_state = AppState::new(
        store,
        catalog,
        Arc::new(MemoryAuthProvider::new()),
        Arc::new(uploader),
        AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
            admin_emails: config.auth.admin_emails.clone(),
        },
        config.app.app_id.clone(),
    );

    if let Some(redis) = &config.redis {
        let client = RedisClient::new(&redis.url)
            .await
            .expect("Failed to connect to Redis");
        app_state.rate_limit = Some(RateLimit {
            redis: Arc::new(client),
            requests_per_minute: redis.requests_per_minute,
        });
    }

    let mut bookings = app_state.booking_tx.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = bookings.recv().await {
            tracing::info!(
                "Booking {} for package {} by {} ({} guests)",
                event.booking_id,
                event.package_id,
                event.user_email,
                event.guests
            );
        }
    });

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
