//! FTMScan and Telegram API clients.

use crate::error::Error;
use log::debug;
use reqwest::blocking::Client;
use reqwest::blocking::RequestBuilder;
use reqwest::blocking::Response;
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub mod ftmscan;
pub mod telegram;

struct RequestHandler {
    client: Client,
}

/// Handler responsible for sites which don't need any special error handling
struct GenericResponseHandler;

/// Handler responsible for the FTMScan contract API
struct FtmscanResponseHandler;

/// Handler responsible for the Telegram bot API
struct TelegramResponseHandler;

trait ResponseHandler {
    /// Prepares a request by i.e. setting it's headers or query parameters.
    fn prepare(request_handler: &RequestHandler, url: &str) -> RequestBuilder {
        request_handler.client.get(url)
    }

    /// Given a response different error status codes are handled.
    fn process(response: Response) -> Result<ResponseHandlerResult, Error>;
}

enum ResponseHandlerResult {
    Ok(Content),
    Retry(String),
    RetryWithCustomSleepDuration(u64),
}

enum Content {
    Response(Response),
    Text(String),
}

impl RequestHandler {
    pub fn new() -> Self {
        RequestHandler {
            client: Client::default(),
        }
    }

    #[inline]
    fn execute<T: ResponseHandler>(&self, url: &str) -> Result<Content, Error> {
        let mut retries = 0;
        let mut retries_valid = 1;

        loop {
            let request = T::prepare(self, url);

            match request.send() {
                Ok(response) => match T::process(response)? {
                    ResponseHandlerResult::Ok(body) => return Ok(body),

                    ResponseHandlerResult::Retry(why) => {
                        debug!("Retrying because of '{why}' ({url})");
                        if retries_valid < 10 {
                            retries_valid += 1;
                        }
                    }

                    ResponseHandlerResult::RetryWithCustomSleepDuration(duration) => {
                        std::thread::sleep(std::time::Duration::from_secs(duration));
                        continue;
                    }
                },

                Err(why) => {
                    retries += 1;

                    // Return an error if after N retries the reqwest crate is unable to send a request.
                    if retries == 5 {
                        return Err(Error::HttpRequest(why));
                    }
                }
            }

            std::thread::sleep(std::time::Duration::from_secs(5 * retries_valid));
        }
    }

    pub fn execute_resp<T: ResponseHandler>(&self, url: &str) -> Result<Response, Error> {
        match self.execute::<T>(url)? {
            Content::Response(response) => Ok(response),

            _ => Err(Error::ResponseHandlerInvalidFunctionCall(
                "You probably meant to call the `execute_deser` function".to_string(),
            )),
        }
    }

    pub fn execute_text<T: ResponseHandler>(&self, url: &str) -> Result<String, Error> {
        match self.execute::<T>(url)? {
            Content::Text(content) => Ok(content),
            Content::Response(response) => response.text().map_err(Error::HttpRequest),
        }
    }

    pub fn execute_deser<T: ResponseHandler, U: DeserializeOwned>(&self, url: &str) -> Result<U, Error> {
        match self.execute::<T>(url)? {
            Content::Response(response) => Ok(response.json()?),
            Content::Text(content) => Ok(serde_json::from_str(&content)?),
        }
    }
}

impl ResponseHandler for GenericResponseHandler {
    fn process(response: Response) -> Result<ResponseHandlerResult, Error> {
        match response.status().as_u16() {
            200 => Ok(ResponseHandlerResult::Ok(Content::Response(response))),

            _ => Ok(ResponseHandlerResult::Retry(response.status().as_u16().to_string())),
        }
    }
}

impl ResponseHandler for FtmscanResponseHandler {
    fn process(response: Response) -> Result<ResponseHandlerResult, Error> {
        #[derive(Deserialize)]
        struct Page {
            result: serde_json::Value,
        }

        match response.status().as_u16() {
            200 => {
                let url = response.url().to_string();
                let content = response.text().unwrap();
                let json = serde_json::from_str::<Page>(&content)?;

                // FTMScan always returns a 200 status code regardless of whether or not the
                // request was successful; the actual status is wrapped within the JSON body.
                // The raw serialized `result` is what gets persisted, so errors are detected
                // on its serialized form.
                let result = serde_json::to_string(&json.result)?;

                if is_rate_limited(&result) {
                    // 5 API calls per second, hence sleep 1 second before retrying
                    return Ok(ResponseHandlerResult::RetryWithCustomSleepDuration(1));
                }

                if result.contains("Invalid API Key") {
                    return Err(Error::FtmscanInvalidToken(url));
                }

                Ok(ResponseHandlerResult::Ok(Content::Text(result)))
            }

            _ => Ok(ResponseHandlerResult::Retry(response.status().as_u16().to_string())),
        }
    }
}

impl ResponseHandler for TelegramResponseHandler {
    fn process(response: Response) -> Result<ResponseHandlerResult, Error> {
        match response.status().as_u16() {
            // Telegram wraps its actual status in the JSON body (`ok` / `description`),
            // which the client inspects; error responses carry the same shape.
            429 => Ok(ResponseHandlerResult::RetryWithCustomSleepDuration(1)),
            500..=599 => Ok(ResponseHandlerResult::Retry(response.status().as_u16().to_string())),

            _ => Ok(ResponseHandlerResult::Ok(Content::Text(response.text().unwrap()))),
        }
    }
}

/// FTMScan signals throttling inside an otherwise well-formed payload.
fn is_rate_limited(serialized_result: &str) -> bool {
    serialized_result.trim().to_lowercase().contains("rate limit reached")
}

#[cfg(test)]
mod tests {
    use crate::api::is_rate_limited;

    #[test]
    fn rate_limit_sentinel() {
        assert!(is_rate_limited("\"Max rate limit reached\""));
        assert!(is_rate_limited("  \"max RATE LIMIT reached, please use API Key\" "));
        assert!(!is_rate_limited("\"[]\""));
        assert!(!is_rate_limited("[{\"SourceCode\": \"contract Foo {}\"}]"));
    }
}
