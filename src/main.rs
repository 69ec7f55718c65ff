use weather_dashboard::{ Config, Result };
use axum::{ Router, routing::{ delete, get, post } };
use migration::MigratorTrait;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{ layer::SubscriberExt, util::SubscriberInitExt };

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber
        ::registry()
        .with(
            tracing_subscriber::EnvFilter
                ::try_from_default_env()
                .unwrap_or_else(|_| "weather_dashboard=debug,tower_http=debug".into())
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e|
        weather_dashboard::AppError::Config(e.to_string())
    )?;

    tracing::info!("Starting weather dashboard backend");

    // Initialize database connection
    let db = sea_orm::Database
        ::connect(&config.database_url).await
        .map_err(weather_dashboard::AppError::Database)?;

    tracing::info!("Database connected successfully");

    // Run migrations
    migration::Migrator::up(&db, None).await.map_err(weather_dashboard::AppError::Database)?;

    tracing::info!("Migrations completed successfully");

    // Initialize services
    let user_service = Arc::new(weather_dashboard::services::UserService::new(db.clone()));
    let favorite_service = Arc::new(weather_dashboard::services::FavoriteService::new(db.clone()));
    let alert_service = Arc::new(weather_dashboard::services::AlertService::new(db.clone()));
    let weather_service = Arc::new(
        weather_dashboard::services::WeatherService::new(config.openweather_api_key.clone())
    );
    let email_service = Arc::new(weather_dashboard::services::EmailService::new(&config)?);
    let jwt = Arc::new(weather_dashboard::auth::JwtKeys::new(config.jwt_secret.as_bytes()));

    // Start the background alert monitor
    let monitor = weather_dashboard::alert_monitor::AlertMonitor::new(
        alert_service.clone(),
        weather_service.clone(),
        email_service.clone(),
        config.monitor.clone()
    );
    tokio::spawn(monitor.start());

    tracing::info!("Alert monitor started");

    // Create app state
    let app_state = weather_dashboard::api::AppState::new(
        user_service,
        favorite_service,
        alert_service,
        weather_service,
        jwt
    );

    // Build application router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(weather_dashboard::api::auth::register))
        .route("/api/auth/login", post(weather_dashboard::api::auth::login))
        .route("/api/auth/me", get(weather_dashboard::api::auth::me))
        .route(
            "/api/weather/current/{city}",
            get(weather_dashboard::api::weather::current_by_city)
        )
        .route(
            "/api/weather/forecast/{city}",
            get(weather_dashboard::api::weather::forecast_by_city)
        )
        .route(
            "/api/weather/coordinates/{lat}/{lon}",
            get(weather_dashboard::api::weather::current_by_coordinates)
        )
        .route(
            "/api/weather/forecast-coordinates/{lat}/{lon}",
            get(weather_dashboard::api::weather::forecast_by_coordinates)
        )
        .route(
            "/api/favorites",
            get(weather_dashboard::api::favorites::list_favorites).post(
                weather_dashboard::api::favorites::add_favorite
            )
        )
        .route("/api/favorites/{id}", delete(weather_dashboard::api::favorites::remove_favorite))
        .route(
            "/api/alerts",
            get(weather_dashboard::api::alerts::list_alerts).post(
                weather_dashboard::api::alerts::upsert_alert
            )
        )
        .route(
            "/api/alerts/{city}",
            get(weather_dashboard::api::alerts::get_alert).delete(
                weather_dashboard::api::alerts::delete_alert
            )
        )
        .fallback_service(ServeDir::new("public"))
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener
        ::bind(&addr).await
        .map_err(|e| weather_dashboard::AppError::Internal(e.to_string()))?;

    axum::serve(listener, app).await.map_err(|e|
        weather_dashboard::AppError::Internal(e.to_string())
    )?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
