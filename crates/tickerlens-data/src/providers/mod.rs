//! Concrete quote providers.

mod alphavantage;
mod csv_source;
mod yahoo;

pub use self::alphavantage::AlphaVantageProvider;
pub use self::csv_source::CsvProvider;
pub use self::yahoo::YahooProvider;

use tickerlens_core::FetchError;

const USER_AGENT: &str = concat!("tickerlens/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by the network providers.
///
/// Per-call deadlines are enforced by the price source, so no client-level
/// timeout is configured here.
pub fn http_client() -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| FetchError::Transport(e.to_string()))
}

/// Send a request and return the status code with the body text.
async fn send(request: reqwest::RequestBuilder) -> Result<(u16, String), FetchError> {
    let response = request.send().await.map_err(transport)?;
    let status = response.status().as_u16();
    let body = response.text().await.map_err(transport)?;
    Ok((status, body))
}

fn transport(error: reqwest::Error) -> FetchError {
    if let Some(status) = error.status() {
        return FetchError::from_status(status.as_u16());
    }
    FetchError::Transport(error.to_string())
}
