use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::web;
use actix_web::App;
use actix_web::HttpServer;
use ftmwatch_lib::api::telegram::TelegramClient;
use ftmwatch_lib::config::Config;
use ftmwatch_lib::database::handler::DatabaseClientPooled;

mod commands;
mod v1;

pub struct AppState {
    dbc: DatabaseClientPooled,
    tgc: TelegramClient,
    bot_token: String,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::new().unwrap();

    // The Telegram client is blocking, so webhook registration happens on a plain
    // thread rather than inside the actix runtime
    let webhook_config = config.clone();
    std::thread::spawn(move || TelegramClient::new(&webhook_config).set_webhook())
        .join()
        .unwrap()
        .unwrap();

    let state = web::Data::new(AppState {
        dbc: DatabaseClientPooled::new(&config).unwrap(),
        tgc: TelegramClient::new(&config),
        bot_token: config.telegram_bot_token.clone(),
    });

    HttpServer::new(move || {
        App::new()
            // Clone the state here as otherwise each worker thread would create one state /
            // DatabaseClientPooled struct yielding really bad performance
            .app_data(state.clone())
            .service(v1::status)
            .service(v1::contract_by_address)
            .service(v1::contracts)
            .service(v1::contracts_search)
            .service(v1::telegram_webhook)
            .wrap(Cors::permissive())
            .wrap(Logger::new("[%t] %U, %r"))
    })
    .bind(("0.0.0.0", 8080))?
    .run()
    .await
}
