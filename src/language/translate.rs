use std::time::Duration;

use anyhow::{bail, Result};
use reqwest::Client;

/// Anything that can turn text into the target language.
#[allow(async_fn_in_trait)]
pub trait Translator {
    async fn translate(&self, text: &str) -> Result<String>;
}

/// Client for the public Google Translate web endpoint (`client=gtx`).
///
/// The source language is always auto-detected by the service.
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
    target: String,
}

impl GoogleTranslator {
    pub fn new(endpoint: &str, target: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            target: target.to_string(),
        })
    }
}

impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        let response = self
            .client
            .get(&self.endpoint)
            .header("User-Agent", concat!("review-miner/", env!("CARGO_PKG_VERSION")))
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", self.target.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("translation service returned {}", response.status());
        }

        let data: serde_json::Value = response.json().await?;
        match parse_translation(&data) {
            Some(translated) => Ok(translated),
            None => bail!("unexpected translation response shape"),
        }
    }
}

/// Join the translated segments of a `translate_a/single` response.
///
/// The payload looks like `[[["Hello", "Bonjour", ...], ["world", "monde", ...]], ...]`.
fn parse_translation(data: &serde_json::Value) -> Option<String> {
    let segments = data.get(0)?.as_array()?;
    let text: String = segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(|s| s.as_str()))
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
