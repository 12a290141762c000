// src/client.rs

use crate::{config::AppConfig, error::*};
use reqwest::{IntoUrl, Response, header};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::sync::Arc;

/// The authenticated transport. Cookies of the login are kept in the client's
/// cookie store, so clones share one session.
#[derive(Clone)]
pub struct RobustClient {
    pub client: ClientWithMiddleware,
    config: Arc<AppConfig>,
}

impl RobustClient {
    pub fn new(config: Arc<AppConfig>) -> AppResult<Self> {
        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(
            reqwest::Client::builder()
                .user_agent(config.user_agent.clone())
                .cookie_store(true)
                .connect_timeout(config.connect_timeout)
                .timeout(config.timeout)
                .pool_max_idle_per_host(config.scan_workers.max(config.download_workers) * 2)
                .build()?,
        )
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build();

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub async fn get<T: IntoUrl>(&self, url: T) -> AppResult<Response> {
        let res = self.client.get(url).send().await?;
        Ok(res.error_for_status()?)
    }

    /// Fetches a page and returns its markup.
    pub async fn get_page<T: IntoUrl>(&self, url: T) -> AppResult<String> {
        Ok(self.get(url).await?.text().await?)
    }

    /// Starts a download without judging the status code.
    pub async fn get_stream<T: IntoUrl>(&self, url: T) -> AppResult<Response> {
        Ok(self.client.get(url).send().await?)
    }

    pub async fn post_form<T: IntoUrl>(
        &self,
        url: T,
        form: &[(&str, &str)],
    ) -> AppResult<Response> {
        let res = self.client.post(url).form(form).send().await?;
        Ok(res.error_for_status()?)
    }

    /// Asks the server for the size of a resource without downloading it.
    pub async fn content_length<T: IntoUrl>(&self, url: T) -> AppResult<Option<u64>> {
        let res = self.client.head(url).send().await?.error_for_status()?;
        Ok(res
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok()))
    }
}
