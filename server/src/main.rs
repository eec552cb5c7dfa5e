// server/src/main.rs

use goeats::config::{AppConfig, PaymentProvider};
use goeats::errors::AppError;
use goeats::pipelines;
use goeats::services::auth_service::TokenService;
use goeats::services::payment_gateway::PaymentGateway;
use goeats::services::payment_mock::MockPaymentGateway;
use goeats::services::stripe_gateway::StripeGateway;
use goeats::state::AppState;
use goeats::store::PgOrderStore;
use goeats::web::configure_app_routes;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use flow::FlowRegistry;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE);
  if std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
    builder.json().init();
  } else {
    builder.init();
  }
}

fn payment_gateway(config: &AppConfig) -> anyhow::Result<Arc<dyn PaymentGateway>> {
  Ok(match config.payment_provider {
    PaymentProvider::Stripe => {
      let key = config
        .stripe_secret_key
        .clone()
        .context("STRIPE_SECRET_KEY is required for the stripe provider")?;
      Arc::new(StripeGateway::new(key, config.stripe_api_base.clone()))
    }
    PaymentProvider::Mock => {
      tracing::warn!("Using the mock payment processor; no real charges will be made.");
      Arc::new(MockPaymentGateway::new())
    }
  })
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();
  init_tracing();
  tracing::info!("Starting GoEats server...");

  let config = Arc::new(AppConfig::from_env().context("loading configuration")?);

  let db_pool = PgPoolOptions::new()
    .max_connections(config.database_max_connections)
    .connect(&config.database_url)
    .await
    .context("connecting to the database")?;
  tracing::info!("Connected to the database.");

  if config.run_migrations {
    sqlx::migrate!("./migrations")
      .run(&db_pool)
      .await
      .context("running database migrations")?;
    tracing::info!("Database migrations applied.");
  }

  let flows = Arc::new(FlowRegistry::<AppError>::new());
  pipelines::register_all_flows(&flows);

  let app_state = AppState {
    db_pool: db_pool.clone(),
    flows,
    config: config.clone(),
    tokens: Arc::new(TokenService::new(&config.jwt_secret, config.jwt_ttl_seconds)),
    order_store: Arc::new(PgOrderStore::new(db_pool)),
    payments: payment_gateway(&config)?,
  };

  let server_address = format!("{}:{}", config.server_host, config.server_port);
  tracing::info!(address = %server_address, "Binding HTTP server.");

  HttpServer::new(move || {
    App::new()
      .app_data(web::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("binding {}", server_address))?
  .run()
  .await?;
  Ok(())
}
