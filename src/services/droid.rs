use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thirtyfour::{
    error::WebDriverError, ChromeCapabilities, ChromiumLikeCapabilities, DesiredCapabilities,
    WebDriver,
};

use crate::{configuration::RendererSettings, error::RenderError};

use super::{BrowserLauncher, BrowserSession};

/// Launches Chrome sessions through a WebDriver server (chromedriver).
pub struct Droid {
    settings: RendererSettings,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct DriverStatus {
    value: DriverStatusValue,
}

#[derive(Deserialize)]
struct DriverStatusValue {
    ready: bool,
}

impl Droid {
    pub fn new(settings: RendererSettings) -> Self {
        Droid {
            settings,
            client: reqwest::Client::new(),
        }
    }

    /// Command line switches passed to Chrome, in order.
    fn chrome_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.settings.args.len() + 2);

        if self.settings.headless {
            args.push("--headless=new".to_string());
        }
        if self.settings.ignore_tls_errors {
            args.push("--ignore-certificate-errors".to_string());
        }
        args.extend(self.settings.args.iter().cloned());

        args
    }

    fn capabilities(&self) -> Result<ChromeCapabilities, WebDriverError> {
        let mut caps = DesiredCapabilities::chrome();

        for arg in self.chrome_args() {
            caps.add_arg(&arg)?;
        }
        if let Some(binary) = self.settings.chrome_binary() {
            caps.set_binary(&binary)?;
        }

        Ok(caps)
    }
}

#[async_trait]
impl BrowserLauncher for Droid {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, RenderError> {
        let caps = self
            .capabilities()
            .map_err(|e| RenderError::Launch(format!("invalid capabilities: {}", e)))?;

        let driver = WebDriver::new(self.settings.webdriver_url.as_str(), caps)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        if let Err(e) = driver
            .set_page_load_timeout(self.settings.page_load_timeout())
            .await
        {
            if let Err(quit_err) = driver.quit().await {
                log::warn!("Failed to quit half-configured driver: {}", quit_err);
            }
            return Err(RenderError::Launch(format!(
                "failed to set page load timeout: {}",
                e
            )));
        }

        Ok(Box::new(DroidSession {
            driver: Some(driver),
        }))
    }

    async fn is_ready(&self) -> bool {
        let url = format!(
            "{}/status",
            self.settings.webdriver_url.trim_end_matches('/')
        );

        match self
            .client
            .get(url)
            .timeout(Duration::from_secs(2))
            .send()
            .await
        {
            Ok(res) => match res.json::<DriverStatus>().await {
                Ok(status) => status.value.ready,
                Err(e) => {
                    log::error!("Unexpected webdriver status payload: {:?}", e);
                    false
                }
            },
            Err(e) => {
                log::error!("Webdriver server is unreachable: {:?}", e);
                false
            }
        }
    }
}

struct DroidSession {
    driver: Option<WebDriver>,
}

fn navigation_error(url: &str, e: WebDriverError) -> RenderError {
    RenderError::Navigation {
        url: url.to_string(),
        reason: e.to_string(),
    }
}

#[async_trait]
impl BrowserSession for DroidSession {
    async fn snapshot(&mut self, url: &str) -> Result<String, RenderError> {
        let Some(driver) = self.driver.as_ref() else {
            return Err(RenderError::Closed);
        };

        driver.goto(url).await.map_err(|e| navigation_error(url, e))?;
        driver.source().await.map_err(|e| navigation_error(url, e))
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        match self.driver.take() {
            Some(driver) => driver
                .quit()
                .await
                .map_err(|e| RenderError::Release(e.to_string())),
            None => Ok(()),
        }
    }
}
