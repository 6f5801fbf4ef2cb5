//! W3C WebDriver backend built on `fantoccini`.
//!
//! Live `fantoccini` elements are kept in a registry keyed by their W3C
//! element reference and handed out as [`ElementHandle`]s carrying that
//! reference. Finding the same node again reuses its entry, so polling does
//! not grow the registry. Navigating drops it, and handles from a previous
//! page report [`DriverError::StaleElement`] like any other detached node.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use fantoccini::actions::{InputSource, MouseActions, PointerAction};
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder};
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::BrowserConfig;
use crate::driver::{BrowserDriver, DriverError, ScriptArg};
use crate::element::{ElementHandle, ElementState, Rect};
use crate::locator::{Locator, Strategy};

/// A browser session on a WebDriver server (chromedriver, a Selenium grid).
pub struct WebDriverBackend {
    client: Client,
    elements: Mutex<Registry<Element>>,
}

/// Live elements by W3C element reference.
#[derive(Debug)]
struct Registry<E> {
    entries: HashMap<String, E>,
}

impl<E: Clone> Registry<E> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Store `element` under `reference`, replacing an earlier lookup of
    /// the same node.
    fn insert(&mut self, reference: String, element: E) -> ElementHandle {
        let handle = ElementHandle::new(reference.clone());
        self.entries.insert(reference, element);
        handle
    }

    fn get(&self, handle: &ElementHandle) -> Option<E> {
        self.entries.get(handle.id()).cloned()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl WebDriverBackend {
    /// Start a new browser session with the configured capabilities.
    pub async fn connect(config: &BrowserConfig) -> Result<Self, DriverError> {
        debug!(url = %config.webdriver_url, headless = config.headless, "Connecting to WebDriver");
        let client = ClientBuilder::native()
            .capabilities(capabilities(config))
            .connect(&config.webdriver_url)
            .await
            .map_err(|e| DriverError::CommandFailed(format!("session not created: {}", e)))?;

        let timeouts = TimeoutConfiguration::new(
            None,
            Some(Duration::from_secs(config.page_load_timeout_secs)),
            None,
        );
        client.update_timeouts(timeouts).await.map_err(classify)?;

        info!(url = %config.webdriver_url, "Browser session started");
        Ok(Self {
            client,
            elements: Mutex::new(Registry::new()),
        })
    }

    async fn register(&self, found: Vec<Element>) -> Vec<ElementHandle> {
        let mut elements = self.elements.lock().await;
        let handles: Vec<ElementHandle> = found
            .into_iter()
            .map(|element| elements.insert(element.element_id().to_string(), element))
            .collect();
        debug!(registered = elements.len(), "element registry");
        handles
    }

    async fn element(&self, handle: &ElementHandle) -> Result<Element, DriverError> {
        self.elements
            .lock()
            .await
            .get(handle)
            .ok_or_else(|| DriverError::StaleElement(handle.id().to_string()))
    }

    async fn script_arg(&self, arg: ScriptArg) -> Result<Value, DriverError> {
        match arg {
            ScriptArg::Value(value) => Ok(value),
            ScriptArg::Element(handle) => {
                let element = self.element(&handle).await?;
                serde_json::to_value(&element)
                    .map_err(|e| DriverError::CommandFailed(format!("cannot pass {} to script: {}", handle, e)))
            }
        }
    }
}

fn capabilities(config: &BrowserConfig) -> Map<String, Value> {
    let mut args = config.args.clone();
    if config.headless {
        args.push("--headless=new".to_string());
        args.push("--disable-gpu".to_string());
        args.push("--disable-dev-shm-usage".to_string());
    }

    let mut caps = Map::new();
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    caps.insert(
        "acceptInsecureCerts".to_string(),
        Value::Bool(config.accept_insecure_certs),
    );
    caps
}

/// Sort a WebDriver failure into the variants the wait engine distinguishes.
fn classify(err: CmdError) -> DriverError {
    let message = err.to_string();
    let lower = message.to_lowercase();
    if lower.contains("stale element reference") {
        DriverError::StaleElement(message)
    } else if lower.contains("element click intercepted") {
        DriverError::ClickIntercepted(message)
    } else if lower.contains("element not interactable") {
        DriverError::NotInteractable(message)
    } else if lower.contains("javascript error") {
        DriverError::Script(message)
    } else if lower.contains("invalid session id") {
        DriverError::NotConnected
    } else {
        DriverError::CommandFailed(message)
    }
}

#[async_trait]
impl BrowserDriver for WebDriverBackend {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.client.goto(url).await.map_err(classify)?;
        self.elements.lock().await.clear();
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        Ok(self.client.current_url().await.map_err(classify)?.to_string())
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<ElementHandle>, DriverError> {
        let (strategy, selector) = locator.to_webdriver();
        let found = match strategy {
            Strategy::Css => self.client.find_all(fantoccini::Locator::Css(selector.as_str())).await,
            Strategy::XPath => self.client.find_all(fantoccini::Locator::XPath(selector.as_str())).await,
        }
        .map_err(classify)?;
        Ok(self.register(found).await)
    }

    async fn find_all_within(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> Result<Vec<ElementHandle>, DriverError> {
        let parent = self.element(parent).await?;
        let (strategy, selector) = locator.to_webdriver();
        let found = match strategy {
            Strategy::Css => parent.find_all(fantoccini::Locator::Css(selector.as_str())).await,
            Strategy::XPath => parent.find_all(fantoccini::Locator::XPath(selector.as_str())).await,
        }
        .map_err(classify)?;
        Ok(self.register(found).await)
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError> {
        self.element(element).await?.click().await.map_err(classify)
    }

    async fn hover(&self, element: &ElementHandle) -> Result<(), DriverError> {
        let element = self.element(element).await?;
        let actions = MouseActions::new("pointer".to_string()).then(PointerAction::MoveToElement {
            element,
            duration: None,
            x: 0,
            y: 0,
        });
        self.client.perform_actions(actions).await.map_err(classify)
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<(), DriverError> {
        self.element(element)
            .await?
            .send_keys(text)
            .await
            .map_err(classify)
    }

    async fn clear(&self, element: &ElementHandle) -> Result<(), DriverError> {
        self.element(element).await?.clear().await.map_err(classify)
    }

    async fn text(&self, element: &ElementHandle) -> Result<String, DriverError> {
        self.element(element).await?.text().await.map_err(classify)
    }

    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        let element = self.element(element).await?;
        // `value` as an attribute is the initial value; the property is live.
        if name == "value" {
            element.prop(name).await.map_err(classify)
        } else {
            element.attr(name).await.map_err(classify)
        }
    }

    async fn state(&self, element: &ElementHandle) -> Result<ElementState, DriverError> {
        let element = self.element(element).await?;
        let displayed = element.is_displayed().await.map_err(classify)?;
        let enabled = element.is_enabled().await.map_err(classify)?;
        let (x, y, width, height) = element.rectangle().await.map_err(classify)?;
        Ok(ElementState {
            displayed,
            enabled,
            rect: Some(Rect { x, y, width, height }),
        })
    }

    async fn execute_script(
        &self,
        script: &str,
        args: Vec<ScriptArg>,
    ) -> Result<Value, DriverError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.script_arg(arg).await?);
        }
        self.client.execute(script, values).await.map_err(classify)
    }

    async fn screenshot(&self) -> Result<Vec<u8>, DriverError> {
        self.client.screenshot().await.map_err(classify)
    }

    async fn quit(&self) -> Result<(), DriverError> {
        self.elements.lock().await.clear();
        self.client.clone().close().await.map_err(classify)?;
        info!("Browser session closed");
        Ok(())
    }
}
