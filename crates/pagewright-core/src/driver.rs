//! Browser driver trait for backend-agnostic UI automation.
//!
//! This module defines the [`BrowserDriver`] trait, the capability contract
//! the rest of the crate consumes: navigate, locate, click, type, run script
//! and take screenshots. The façade in [`page`](crate::page) never talks to a
//! concrete backend, so tests can substitute a scripted fake and production
//! code uses [`WebDriverBackend`](crate::webdriver::WebDriverBackend).
//!
//! # Backend Selection
//!
//! ```no_run
//! use pagewright_core::config::BrowserConfig;
//! use pagewright_core::webdriver::WebDriverBackend;
//!
//! # async fn demo() -> Result<(), pagewright_core::driver::DriverError> {
//! let backend = WebDriverBackend::connect(&BrowserConfig::default()).await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::element::{ElementHandle, ElementState};
use crate::locator::Locator;

/// Errors that can occur during driver operations.
///
/// This enum unifies errors from all backends behind a single type so the
/// wait engine can decide which ones are worth polling through.
#[derive(Error, Debug)]
pub enum DriverError {
    /// The handle refers to a node that was detached or re-rendered.
    #[error("Stale element reference: {0}")]
    StaleElement(String),

    /// Another element would receive the click.
    #[error("Element click intercepted: {0}")]
    ClickIntercepted(String),

    /// The element exists but cannot be interacted with (hidden, disabled).
    #[error("Element not interactable: {0}")]
    NotInteractable(String),

    /// An injected script threw.
    #[error("Script error: {0}")]
    Script(String),

    /// The browser session is gone or was never established.
    #[error("Not connected to browser")]
    NotConnected,

    /// A command failed with the given message.
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DriverError {
    /// Transient errors are expected to clear up within the same wait
    /// window; the poller swallows them and probes again.
    pub fn is_transient(&self) -> bool {
        matches!(self, DriverError::StaleElement(_))
    }
}

/// An argument passed to [`BrowserDriver::execute_script`].
///
/// Element handles are marshalled by the backend into live element
/// references, so scripts receive real DOM nodes as `arguments[i]`.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptArg {
    Element(ElementHandle),
    Value(serde_json::Value),
}

impl ScriptArg {
    pub fn value(value: impl Serialize) -> Self {
        ScriptArg::Value(serde_json::to_value(value).unwrap_or(serde_json::Value::Null))
    }
}

impl From<&ElementHandle> for ScriptArg {
    fn from(handle: &ElementHandle) -> Self {
        ScriptArg::Element(handle.clone())
    }
}

/// Trait for browser automation backends.
///
/// Implementors expose single, unretried driver actions. Waiting, retrying
/// and error normalization live above this trait in
/// [`Poller`](crate::wait::Poller) and [`Page`](crate::page::Page).
///
/// Lookups report absence as `Ok(None)` / an empty vector rather than an
/// error: an element that is not there yet is a normal polling outcome.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Load `url` in the current window.
    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    /// The URL of the current page.
    async fn current_url(&self) -> Result<String, DriverError>;

    /// All elements matching `locator` in document order.
    async fn find_all(&self, locator: &Locator) -> Result<Vec<ElementHandle>, DriverError>;

    /// All elements matching `locator` inside `parent`.
    async fn find_all_within(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> Result<Vec<ElementHandle>, DriverError>;

    /// The first element matching `locator`.
    ///
    /// The default implementation takes the head of
    /// [`find_all`](Self::find_all).
    async fn find(&self, locator: &Locator) -> Result<Option<ElementHandle>, DriverError> {
        Ok(self.find_all(locator).await?.into_iter().next())
    }

    /// Click the element's center point.
    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError>;

    /// Move the pointer to the element's center without clicking.
    async fn hover(&self, element: &ElementHandle) -> Result<(), DriverError>;

    /// Send keystrokes to the element. WebDriver special keys (U+E000
    /// block) are passed through.
    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<(), DriverError>;

    /// Clear an editable element.
    async fn clear(&self, element: &ElementHandle) -> Result<(), DriverError>;

    /// The element's rendered text.
    async fn text(&self, element: &ElementHandle) -> Result<String, DriverError>;

    /// An attribute or, for `value`, the live property.
    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError>;

    /// Displayed/enabled flags and geometry.
    async fn state(&self, element: &ElementHandle) -> Result<ElementState, DriverError>;

    /// Run `script` as a function body with `args` bound to `arguments`.
    async fn execute_script(
        &self,
        script: &str,
        args: Vec<ScriptArg>,
    ) -> Result<serde_json::Value, DriverError>;

    /// Capture the viewport as PNG bytes.
    async fn screenshot(&self) -> Result<Vec<u8>, DriverError>;

    /// End the browser session.
    async fn quit(&self) -> Result<(), DriverError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_error_display() {
        let err = DriverError::ClickIntercepted("<div class=\"ant-modal-mask\">".to_string());
        assert!(err.to_string().contains("intercepted"));

        let err = DriverError::NotConnected;
        assert!(err.to_string().contains("Not connected"));

        let err = DriverError::Script("ReferenceError".to_string());
        assert!(err.to_string().contains("ReferenceError"));
    }

    #[test]
    fn test_only_stale_is_transient() {
        assert!(DriverError::StaleElement("e-1".into()).is_transient());
        assert!(!DriverError::ClickIntercepted("mask".into()).is_transient());
        assert!(!DriverError::NotInteractable("hidden".into()).is_transient());
        assert!(!DriverError::CommandFailed("boom".into()).is_transient());
        assert!(!DriverError::NotConnected.is_transient());
    }

    #[test]
    fn test_script_arg_conversions() {
        let handle = ElementHandle::new("e-7");
        assert_eq!(ScriptArg::from(&handle), ScriptArg::Element(handle.clone()));
        assert_eq!(
            ScriptArg::value("2025-07-08"),
            ScriptArg::Value(serde_json::Value::String("2025-07-08".into()))
        );
    }
}
