use super::*;
use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpServer;
use actix_web::middleware::Logger;
use actix_web::web;
use anyhow::Context;
use rps_store::*;
use std::sync::Arc;

/// Runs the game server until shutdown.
///
/// Reads `BIND_ADDR` (required) and `DB_URL` (optional; without it games
/// are kept in memory and lost on restart).
pub async fn run() -> anyhow::Result<()> {
    let bind = std::env::var("BIND_ADDR").context("BIND_ADDR must be set")?;
    let store = store().await?;
    let registry = Arc::new(Registry::default());
    let dispatcher = web::Data::new(Dispatcher::new(store, registry.clone()));
    let registry = web::Data::from(registry);
    log::info!("starting game server on {}", bind);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .app_data(dispatcher.clone())
            .app_data(registry.clone())
            .route("/health", web::get().to(handlers::health))
            .service(
                web::scope("/game")
                    .route("/start", web::post().to(handlers::start))
                    .route("/{game_id}/enter", web::get().to(handlers::enter)),
            )
    })
    .workers(4)
    .bind(bind)?
    .run()
    .await?;
    Ok(())
}

#[cfg(feature = "database")]
async fn store() -> anyhow::Result<Arc<dyn Store>> {
    match std::env::var("DB_URL") {
        Ok(url) => {
            let client = rps_pg::db(&url).await?;
            rps_pg::migrate::<Record>(&client).await?;
            log::info!("[store] using postgres");
            Ok(Arc::new(client))
        }
        Err(_) => Ok(memory()),
    }
}

#[cfg(not(feature = "database"))]
async fn store() -> anyhow::Result<Arc<dyn Store>> {
    if std::env::var("DB_URL").is_ok() {
        log::warn!("[store] DB_URL ignored: built without the database feature");
    }
    Ok(memory())
}

fn memory() -> Arc<dyn Store> {
    log::warn!("[store] using in-memory store; games will not survive a restart");
    Arc::new(Memory::default())
}
