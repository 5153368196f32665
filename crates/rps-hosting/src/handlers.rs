//! HTTP and WebSocket route handlers.
use super::*;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::web;
use rps_core::*;
use rps_gameplay::*;
use std::collections::HashMap;

/// `POST /game/start` hands out a fresh game id. The game itself is
/// created by whoever connects to it first.
pub async fn start() -> impl Responder {
    let id = ID::<Game>::default();
    log::info!("issued game {}", id);
    HttpResponse::Ok().json(serde_json::json!({ "game_id": id.to_string() }))
}

/// `GET /game/{game_id}/enter?name=` upgrades to a WebSocket seated as `name`.
pub async fn enter(
    dispatcher: web::Data<Dispatcher>,
    registry: web::Data<Registry>,
    path: web::Path<uuid::Uuid>,
    query: web::Query<HashMap<String, String>>,
    body: web::Payload,
    req: HttpRequest,
) -> impl Responder {
    let game: ID<Game> = ID::from(path.into_inner());
    let name = match query.get("name").map(|n| n.trim()).filter(|n| !n.is_empty()) {
        Some(name) => name.to_string(),
        None => {
            return HttpResponse::BadRequest()
                .body("name is required")
                .map_into_right_body();
        }
    };
    match actix_ws::handle(&req, body) {
        Ok((response, session, stream)) => {
            let (connection, outbox) = registry.open().await;
            log::info!("{} entering game {} on {}", name, game, connection);
            Socket {
                game,
                name,
                connection,
                outbox,
                session,
                stream,
            }
            .spawn(dispatcher.into_inner());
            response.map_into_left_body()
        }
        Err(e) => HttpResponse::InternalServerError()
            .body(e.to_string())
            .map_into_right_body(),
    }
}

/// `GET /health`
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
