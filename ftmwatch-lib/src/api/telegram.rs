//! Client for the Telegram bot API, used as the alert delivery transport.

use crate::config::Config;
use crate::error::Error;
use log::info;
use serde::Deserialize;
use url::Url;

use super::RequestHandler;
use super::TelegramResponseHandler;

pub struct TelegramClient {
    request_handler: RequestHandler,
    token: String,
    webhook_host: String,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

impl TelegramClient {
    pub fn new(config: &Config) -> Self {
        TelegramClient {
            request_handler: RequestHandler::new(),
            token: config.telegram_bot_token.clone(),
            webhook_host: config.telegram_webhook_host.clone(),
        }
    }

    /// Delivers one Markdown formatted message to the given chat.
    pub fn send_message(&self, chat_id: i64, text: &str) -> Result<(), Error> {
        let url = Url::parse_with_params(
            &format!("https://api.telegram.org/bot{}/sendMessage", self.token),
            &[
                ("chat_id", chat_id.to_string().as_str()),
                ("text", text),
                ("parse_mode", "Markdown"),
                ("disable_web_page_preview", "true"),
            ],
        )
        .unwrap();

        let response: ApiResponse =
            self.request_handler.execute_deser::<TelegramResponseHandler, ApiResponse>(url.as_str())?;

        match response.ok {
            true => Ok(()),
            false => Err(Error::TelegramDelivery(
                chat_id,
                response.description.unwrap_or_else(|| "n/a".to_string()),
            )),
        }
    }

    /// Registers `<webhook host>/webhook/<bot token>` as the inbound update URL; a
    /// "Webhook is already set" response counts as success so restarts stay idempotent.
    pub fn set_webhook(&self) -> Result<(), Error> {
        let webhook_url =
            format!("{}/webhook/{}", self.webhook_host.trim_end_matches('/'), self.token);

        let url = Url::parse_with_params(
            &format!("https://api.telegram.org/bot{}/setWebhook", self.token),
            &[("url", webhook_url.as_str())],
        )
        .unwrap();

        let response: ApiResponse =
            self.request_handler.execute_deser::<TelegramResponseHandler, ApiResponse>(url.as_str())?;

        if response.ok {
            info!("Successfully set Telegram webhook URL");
            return Ok(());
        }

        match response.description.as_deref() {
            Some("Webhook is already set") => Ok(()),
            Some(why) => Err(Error::TelegramSetWebhook(why.to_string())),
            None => Err(Error::TelegramSetWebhook("n/a".to_string())),
        }
    }
}
