use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, REFERER, USER_AGENT};
use reqwest::Client;

use crate::settings::Settings;

/// One client per run; the district sites turn away requests without a browser User-Agent.
pub fn build_client(settings: &Settings) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_str(&settings.user_agent).context("CAD_USER_AGENT is not a valid header value")?);
    let client = Client::builder()
        .default_headers(headers)
        .cookie_store(true)
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()?;
    Ok(client)
}

pub async fn get_text(client: &Client, url: &str, query: &[(&str, &str)]) -> Result<String> {
    let text = client.get(url).query(query).send().await
        .with_context(|| format!("GET {}", url))?
        .error_for_status()?
        .text().await?;
    Ok(text)
}

pub async fn post_form(client: &Client, url: &str, referer: &str, form: &[(&str, &str)]) -> Result<String> {
    let text = client.post(url)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(REFERER, referer)
        .form(form)
        .send().await
        .with_context(|| format!("POST {}", url))?
        .error_for_status()?
        .text().await?;
    Ok(text)
}
