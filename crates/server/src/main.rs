//! Hermes server entry point

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use anyhow::Result;
use hermes_server::{api, config::ServerConfig, health, AppContext};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    config.validate()?;

    info!("starting hermes-server v{}", env!("CARGO_PKG_VERSION"));

    let ctx = AppContext::from_config(&config);
    info!(
        chat = ctx.chat.is_ready(),
        speech = ctx.speech.is_ready(),
        "capabilities initialized"
    );

    let bind_addr = format!("{}:{}", config.host, config.port);
    info!("listening on {}", bind_addr);

    let ctx = web::Data::new(ctx);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(ctx.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .configure(api::routes)
            .route("/health", web::get().to(health::health_check))
    })
    .bind(&bind_addr)?
    .run()
    .await?;

    info!("server stopped");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hermes_server=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
