//! Browser session scoping.
//!
//! A [`BrowserSession`] owns one driver for the length of one flow. However
//! the flow ends (success, error, or a panic unwinding through it) the
//! browser is quit exactly once.
//!
//! # Example
//!
//! ```no_run
//! use pagewright_core::config::SuiteConfig;
//! use pagewright_core::locator::Locator;
//! use pagewright_core::session::BrowserSession;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SuiteConfig::load_or_default(None)?;
//! let env = config.environment(None);
//! let session = BrowserSession::connect("smoke", &config, &env).await?;
//!
//! let title = session
//!     .run(|page| async move {
//!         page.open("/").await?;
//!         page.get_text(&Locator::css(".dashboard-title"), None).await
//!     })
//!     .await?;
//! println!("{}", title);
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::{EnvironmentConfig, SuiteConfig};
use crate::driver::{BrowserDriver, DriverError};
use crate::error::Interaction;
use crate::page::Page;
use crate::webdriver::WebDriverBackend;

/// One browser, one flow.
pub struct BrowserSession {
    id: Uuid,
    name: String,
    started_at: DateTime<Utc>,
    driver: Arc<dyn BrowserDriver>,
    page: Page,
    closed: AtomicBool,
}

impl BrowserSession {
    /// Wrap a driver. The session quits it when done.
    pub fn new(name: impl Into<String>, driver: Arc<dyn BrowserDriver>, page: Page) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            started_at: Utc::now(),
            driver,
            page,
            closed: AtomicBool::new(false),
        }
    }

    /// Start a WebDriver browser configured from `config`, with a page bound
    /// to `env`.
    pub async fn connect(
        name: impl Into<String>,
        config: &SuiteConfig,
        env: &EnvironmentConfig,
    ) -> Result<Self, DriverError> {
        let driver: Arc<dyn BrowserDriver> = Arc::new(WebDriverBackend::connect(&config.browser).await?);
        let page = Page::from_config(driver.clone(), config, env);
        Ok(Self::new(name, driver, page))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Hand the page to `flow`, then quit the browser. The flow's result is
    /// returned unchanged; a failing quit is logged, not reported.
    pub async fn run<T, F, Fut>(self, flow: F) -> Interaction<T>
    where
        F: FnOnce(Page) -> Fut,
        Fut: Future<Output = Interaction<T>>,
    {
        let span = info_span!("session", id = %self.id, name = %self.name);
        async move {
            info!("Session started");
            let result = flow(self.page.clone()).await;
            match &result {
                Ok(_) => info!("Flow passed"),
                Err(e) => warn!(kind = e.kind().as_str(), error = %e, "Flow failed"),
            }
            if let Err(e) = self.close().await {
                warn!(error = %e, "Browser quit failed");
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Quit the browser. Later calls do nothing.
    pub async fn close(&self) -> Result<(), DriverError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let elapsed = Utc::now() - self.started_at;
        info!(session = %self.id, elapsed_ms = elapsed.num_milliseconds(), "Closing browser");
        self.driver.quit().await
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let driver = self.driver.clone();
                let id = self.id;
                handle.spawn(async move {
                    if let Err(e) = driver.quit().await {
                        warn!(session = %id, error = %e, "Browser quit on drop failed");
                    }
                });
            }
            Err(_) => {
                warn!(session = %self.id, "Session dropped outside a runtime; browser left running");
            }
        }
    }
}
