use crate::commands;
use crate::AppState;
use actix_web::get;
use actix_web::post;
use actix_web::web;
use actix_web::HttpResponse;
use actix_web::Responder;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct Paging {
    skip: Option<i64>,
    limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    query: String,
    skip: Option<i64>,
    limit: Option<i64>,
}

/// Inbound Telegram update; everything but the chat id and message text is ignored.
#[derive(Deserialize)]
pub struct TelegramUpdate {
    message: Option<TelegramMessage>,
}

#[derive(Deserialize)]
pub struct TelegramMessage {
    chat: TelegramChat,
    text: Option<String>,
}

#[derive(Deserialize)]
pub struct TelegramChat {
    id: i64,
}

#[get("/v1/status")]
pub async fn status() -> impl Responder {
    HttpResponse::Ok().finish()
}

#[get("/v1/contract/{address}")]
pub async fn contract_by_address(path: web::Path<String>, state: web::Data<AppState>) -> impl Responder {
    match state.dbc.rest().get_contract(&path) {
        Some(contract) => HttpResponse::Ok().body(serde_json::to_string(&contract).unwrap()),
        None => HttpResponse::NotFound().body("Contract address not found"),
    }
}

#[get("/v1/contracts/")]
pub async fn contracts(query: web::Query<Paging>, state: web::Data<AppState>) -> impl Responder {
    let items = state.dbc.rest().get_contracts(query.skip.unwrap_or(0), query.limit.unwrap_or(100));

    HttpResponse::Ok().body(serde_json::to_string(&items).unwrap())
}

#[get("/v1/contracts/search/")]
pub async fn contracts_search(query: web::Query<SearchQuery>, state: web::Data<AppState>) -> impl Responder {
    let items = state.dbc.rest().search_contracts(
        &query.query,
        query.skip.unwrap_or(0),
        query.limit.unwrap_or(100),
    );

    HttpResponse::Ok().body(serde_json::to_string(&items).unwrap())
}

/// Telegram delivers bot updates here; the path token must match the configured bot
/// token. Always answers 200 for known tokens since Telegram redelivers on anything else.
#[post("/webhook/{token}")]
pub async fn telegram_webhook(
    path: web::Path<String>,
    update: web::Json<TelegramUpdate>,
    state: web::Data<AppState>,
) -> impl Responder {
    if *path != state.bot_token {
        return HttpResponse::NotFound().finish();
    }

    let update = update.into_inner();
    let state = state.clone();

    // Command handling talks to both the database and the blocking Telegram client
    let _ = web::block(move || {
        if let Some(message) = update.message {
            if let Some(text) = message.text {
                commands::handle(&state, message.chat.id, &text);
            }
        }
    })
    .await;

    HttpResponse::Ok().finish()
}
