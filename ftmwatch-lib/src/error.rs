//! Errors that might be returned when using this crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Scraper Errors
    #[error("Failed to parse verified contracts listing, no '{0}' element present")]
    ScrapeMissingTableElement(&'static str),

    #[error("Failed to parse verified contracts listing, no '{0}' column present")]
    ScrapeMissingColumn(&'static str),

    #[error("Failed to parse verified contracts listing row; {0}")]
    ScrapeMalformedRow(String),

    #[error("Failed to parse verification date; {0}")]
    ScrapeDate(#[from] chrono::ParseError),

    // FTMScan Errors
    #[error("Invalid FTMScan token '{0}'")]
    FtmscanInvalidToken(String),

    // Parser / Deserializer
    #[error("Failed to deserialize JSON input; {0}")]
    DeserializeError(#[from] serde_json::Error),

    #[error("{0}")]
    ResponseHandlerInvalidFunctionCall(String),

    // HTTP Errors
    #[error("Failed to initialize HTTP client; {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Failed to send HTTP request; {0}")]
    HttpRequest(#[source] reqwest::Error),

    // Telegram Errors
    #[error("Failed to deliver Telegram message to chat '{0}'; {1}")]
    TelegramDelivery(i64, String),

    #[error("Failed to set Telegram webhook URL; {0}")]
    TelegramSetWebhook(String),

    // Template Errors
    #[error("Failed to read template directory; {0}")]
    TemplateRead(#[from] std::io::Error),

    #[error("Template directory '{0}' contains no usable templates")]
    TemplateDirEmpty(String),

    // Config Errors
    #[error("Failed to read .env file; {0}")]
    ConfigRead(#[from] dotenv::Error),

    #[error("Environment variable '{0}' does not exist; {1}")]
    ConfigReadNonExistantEnvironmentVariable(&'static str, #[source] std::env::VarError),

    #[error("Environment variable '{0}' is empty")]
    ConfigReadEmptyEnvironmentVariable(&'static str),

    #[error("Environment variable '{0}' holds a non-numeric value")]
    ConfigReadNonNumericEnvironmentVariable(&'static str, #[source] std::num::ParseIntError),

    #[error("Failed to connect to database; {0}")]
    DatabaseConnect(#[from] diesel::result::ConnectionError),
}
