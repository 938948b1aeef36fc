mod config;
mod player;
mod routes;
mod stats;
mod storage;
mod vision;

#[cfg(test)]
mod test_support;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use config::AppConfig;
use player::pipeline::PlayerInfoPipeline;
use player::roster::Roster;
use routes::configure_routes;
use stats::nba_client::NbaStatsClient;
use std::sync::Arc;
use storage::upload_store::UploadStore;
use vision::gemini::GeminiClient;

fn startup_error(context: &str, e: impl std::fmt::Display) -> std::io::Error {
    log::error!("{}: {}", context, e);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::load().map_err(|e| startup_error("Invalid configuration", e))?;

    let vision = GeminiClient::new(&config.vision)
        .map_err(|e| startup_error("Failed to create vision client", e))?;
    let stats = Arc::new(
        NbaStatsClient::new(&config.stats)
            .map_err(|e| startup_error("Failed to create stats client", e))?,
    );

    // The roster is loaded once; lookups never go back to the provider.
    let roster = Roster::load(config.stats.roster_path.as_deref(), stats.as_ref())
        .await
        .map_err(|e| startup_error("Failed to load roster snapshot", e))?;

    let pipeline = web::Data::new(PlayerInfoPipeline::new(
        Arc::new(vision),
        stats,
        Arc::new(roster),
        config.stats.season.clone(),
        config.stats.request_pause(),
    ));
    let upload_store = web::Data::new(
        UploadStore::new(config.upload_dir.clone(), config.max_upload_bytes)
            .map_err(|e| startup_error("Failed to prepare upload directory", e))?,
    );

    log::info!(
        "Using model {} and season {}; uploads go to {}",
        config.vision.model,
        config.stats.season,
        upload_store.upload_dir().display()
    );
    if let Some(dir) = &config.static_dir {
        log::info!("Serving static files from {}", dir.display());
    }

    let bind_address = config.bind_address();
    log::info!("Starting server on {}", bind_address);

    let static_dir = config.static_dir.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(pipeline.clone())
            .app_data(upload_store.clone())
            .configure(|cfg| configure_routes(cfg, static_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
