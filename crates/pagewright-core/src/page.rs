//! The element-interaction façade.
//!
//! [`Page`] is the only layer that issues driver actions. Each public
//! operation locates its element through the [`Poller`], acts once, and
//! returns an [`Interaction`]. The single automatic retry is a click that
//! another element intercepted: the target is scrolled to the viewport
//! center and clicked exactly once more.
//!
//! Every operation runs inside an `action` tracing span and logs its phase
//! transitions (`pending`, `located`, `acted`, `action_failed`, `reported`).
//! Failures are handed to the configured [`Diagnostics`] before returning.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pagewright_core::config::BrowserConfig;
//! use pagewright_core::locator::Locator;
//! use pagewright_core::page::Page;
//! use pagewright_core::webdriver::WebDriverBackend;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let driver = Arc::new(WebDriverBackend::connect(&BrowserConfig::default()).await?);
//! let page = Page::new(driver).with_base_url("https://console.example.test");
//!
//! page.open("/login").await?;
//! page.type_text(&Locator::css("input[type=\"password\"]"), "hunter2", true, None).await?;
//! page.click(&Locator::css(".el-button--primary"), None).await?;
//! page.wait_for_url_contains("/dashboard", None).await?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::future::Future;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::config::{EnvironmentConfig, SuiteConfig};
use crate::diagnostics::{Diagnostics, ScreenshotStore};
use crate::driver::{BrowserDriver, DriverError, ScriptArg};
use crate::element::{ElementHandle, Presence};
use crate::error::{FailureKind, Interaction, InteractionError};
use crate::locator::Locator;
use crate::scripts::{self, keys};
use crate::wait::{Poller, WaitTier, WaitTiers, DEFAULT_POLL_INTERVAL, DEFAULT_STABLE_POLLS};

const DEFAULT_SETTLE: Duration = Duration::from_millis(500);

/// Where an action is in its lifecycle. Logged as the `phase` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPhase {
    Pending,
    Located,
    Acted,
    ActionFailed,
    Reported,
}

impl ActionPhase {
    pub fn name(&self) -> &'static str {
        match self {
            ActionPhase::Pending => "pending",
            ActionPhase::Located => "located",
            ActionPhase::Acted => "acted",
            ActionPhase::ActionFailed => "action_failed",
            ActionPhase::Reported => "reported",
        }
    }
}

impl fmt::Display for ActionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `scrollIntoView` alignment along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Start,
    Center,
    End,
    Nearest,
}

impl Align {
    pub fn as_str(&self) -> &'static str {
        match self {
            Align::Start => "start",
            Align::Center => "center",
            Align::End => "end",
            Align::Nearest => "nearest",
        }
    }
}

/// Block (vertical) and inline (horizontal) alignment for a scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollAlign {
    pub block: Align,
    pub inline: Align,
}

impl ScrollAlign {
    pub fn center() -> Self {
        Self {
            block: Align::Center,
            inline: Align::Center,
        }
    }
}

impl Default for ScrollAlign {
    /// The browser's own `scrollIntoView()` default.
    fn default() -> Self {
        Self {
            block: Align::Start,
            inline: Align::Nearest,
        }
    }
}

/// Something to scroll to: a locator still to be resolved, or an element
/// already in hand.
#[derive(Debug, Clone, Copy)]
pub enum ScrollTarget<'a> {
    Locator(&'a Locator),
    Element(&'a ElementHandle),
}

impl<'a> From<&'a Locator> for ScrollTarget<'a> {
    fn from(locator: &'a Locator) -> Self {
        ScrollTarget::Locator(locator)
    }
}

impl<'a> From<&'a ElementHandle> for ScrollTarget<'a> {
    fn from(handle: &'a ElementHandle) -> Self {
        ScrollTarget::Element(handle)
    }
}

impl fmt::Display for ScrollTarget<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrollTarget::Locator(locator) => write!(f, "{}", locator),
            ScrollTarget::Element(handle) => write!(f, "{}", handle),
        }
    }
}

/// Waiting, retrying element operations over a [`BrowserDriver`].
///
/// Cheap to clone; clones share the driver and diagnostics.
#[derive(Clone)]
pub struct Page {
    driver: Arc<dyn BrowserDriver>,
    tiers: WaitTiers,
    poll_interval: Duration,
    settle: Duration,
    base_url: Option<String>,
    diagnostics: Option<Arc<dyn Diagnostics>>,
    cancel: Option<CancellationToken>,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("tiers", &self.tiers)
            .field("poll_interval", &self.poll_interval)
            .field("settle", &self.settle)
            .field("base_url", &self.base_url)
            .field("diagnostics", &self.diagnostics.is_some())
            .finish()
    }
}

impl Page {
    pub fn new(driver: Arc<dyn BrowserDriver>) -> Self {
        Self {
            driver,
            tiers: WaitTiers::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            settle: DEFAULT_SETTLE,
            base_url: None,
            diagnostics: None,
            cancel: None,
        }
    }

    /// A page configured from the suite config: wait tiers, poll interval,
    /// settle delay, failure screenshots into `screenshot_dir`, and the
    /// environment's base URL.
    pub fn from_config(driver: Arc<dyn BrowserDriver>, config: &SuiteConfig, env: &EnvironmentConfig) -> Self {
        let page = Self::new(driver)
            .with_tiers(config.wait_tiers())
            .with_poll_interval(config.poll_interval())
            .with_settle(config.settle())
            .with_diagnostics(Arc::new(ScreenshotStore::new(config.screenshot_dir())));
        if env.url.is_empty() {
            page
        } else {
            page.with_base_url(env.url.clone())
        }
    }

    pub fn with_tiers(mut self, tiers: WaitTiers) -> Self {
        self.tiers = tiers;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    /// Every wait started by this page (and its clones) stops with
    /// [`InteractionError::Cancelled`] once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn tiers(&self) -> WaitTiers {
        self.tiers
    }

    pub fn tier(&self, tier: WaitTier) -> Duration {
        self.tiers.get(tier)
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// A poller with this page's interval and cancellation token.
    pub fn poller(&self, timeout: Duration) -> Poller {
        let poller = Poller::new(timeout).with_interval(self.poll_interval);
        match &self.cancel {
            Some(token) => poller.with_cancellation(token.clone()),
            None => poller,
        }
    }

    /// Sleep for the configured settle delay. Only for transitions that
    /// expose nothing to poll.
    pub async fn settle(&self) {
        tokio::time::sleep(self.settle).await;
    }

    // -- Navigation ----------------------------------------------------------

    /// Navigate to `url`. Relative paths are joined to the base URL.
    pub async fn open(&self, url: &str) -> Interaction<()> {
        self.perform("open", url, async {
            let target = resolve_url(self.base_url.as_deref(), url)?;
            self.driver.navigate(&target).await?;
            info!(url = %target, "Opened page");
            Ok(())
        })
        .await
    }

    pub async fn current_url(&self) -> Interaction<String> {
        Ok(self.driver.current_url().await?)
    }

    /// Wait until the current URL contains `fragment`, ignoring case.
    /// Returns the matching URL.
    pub async fn wait_for_url_contains(&self, fragment: &str, timeout: Option<Duration>) -> Interaction<String> {
        let needle = fragment.to_lowercase();
        let what = format!("url to contain {:?}", fragment);
        self.perform("wait_for_url", fragment, async {
            let driver = self.driver.as_ref();
            let needle = needle.as_str();
            self.poller(self.resolve(timeout))
                .until(&what, move || async move {
                    let url = driver.current_url().await?;
                    Ok(url.to_lowercase().contains(needle).then_some(url))
                })
                .await
        })
        .await
    }

    /// Wait until `document.readyState` is `complete`.
    pub async fn wait_for_document_ready(&self, timeout: Option<Duration>) -> Interaction<()> {
        self.perform("wait_for_document_ready", "document", async {
            let driver = self.driver.as_ref();
            self.poller(self.resolve(timeout))
                .until("document to be ready", move || async move {
                    let state = driver
                        .execute_script(scripts::DOCUMENT_READY_STATE, Vec::new())
                        .await?;
                    Ok((state.as_str() == Some("complete")).then_some(()))
                })
                .await
        })
        .await
    }

    // -- Locating ------------------------------------------------------------

    /// Wait for an element that is attached, displayed and has a size.
    pub async fn locate(&self, locator: &Locator, timeout: Option<Duration>) -> Interaction<ElementHandle> {
        self.locate_with(locator, Presence::Visible, timeout).await
    }

    /// Wait for an element at a chosen [`Presence`] level.
    pub async fn locate_with(
        &self,
        locator: &Locator,
        presence: Presence,
        timeout: Option<Duration>,
    ) -> Interaction<ElementHandle> {
        let target = locator.to_string();
        self.perform("locate", &target, async {
            let handle = self.find_with(locator, presence, self.resolve(timeout)).await?;
            debug!(phase = %ActionPhase::Located, element = %handle);
            Ok(handle)
        })
        .await
    }

    /// Every element matching `locator`, waiting for at least one to attach.
    /// Nothing matching within the timeout is an empty vector.
    pub async fn locate_all(&self, locator: &Locator, timeout: Option<Duration>) -> Interaction<Vec<ElementHandle>> {
        let driver = self.driver.as_ref();
        let what = format!("{} to match anything", locator);
        let found = self
            .poller(self.resolve(timeout))
            .until(&what, move || async move {
                let handles = driver.find_all(locator).await?;
                Ok((!handles.is_empty()).then_some(handles))
            })
            .await;
        match found {
            Ok(handles) => Ok(handles),
            Err(e) if e.is_absence() => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Whether `locator` becomes visible within the timeout. Absence is
    /// `Ok(false)`; driver failures are still errors.
    pub async fn is_visible(&self, locator: &Locator, timeout: Option<Duration>) -> Interaction<bool> {
        match self.find_with(locator, Presence::Visible, self.resolve(timeout)).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_absence() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Wait until nothing matching `locator` is visible. Elements that are
    /// attached but hidden count as gone.
    pub async fn wait_until_absent(&self, locator: &Locator, timeout: Option<Duration>) -> Interaction<()> {
        let target = locator.to_string();
        let what = format!("{} to disappear", locator);
        self.perform("wait_until_absent", &target, async {
            let driver = self.driver.as_ref();
            self.poller(self.resolve(timeout))
                .until(&what, move || async move {
                    for handle in driver.find_all(locator).await? {
                        if driver.state(&handle).await?.is_visible() {
                            return Ok(None);
                        }
                    }
                    Ok(Some(()))
                })
                .await
        })
        .await
    }

    /// Poll a custom read-only probe. For adapters that need conditions the
    /// named operations don't cover.
    pub async fn wait_until<T, F, Fut>(&self, what: &str, timeout: Option<Duration>, mut probe: F) -> Interaction<T>
    where
        F: FnMut(Arc<dyn BrowserDriver>) -> Fut,
        Fut: Future<Output = Result<Option<T>, DriverError>>,
    {
        self.perform("wait_until", what, async {
            let driver = self.driver.clone();
            self.poller(self.resolve(timeout))
                .until(what, move || probe(driver.clone()))
                .await
        })
        .await
    }

    /// Poll a probe until it returns the same value several times in a row.
    pub async fn wait_until_stable<T, F, Fut>(
        &self,
        what: &str,
        timeout: Option<Duration>,
        mut probe: F,
    ) -> Interaction<T>
    where
        T: PartialEq + Clone,
        F: FnMut(Arc<dyn BrowserDriver>) -> Fut,
        Fut: Future<Output = Result<Option<T>, DriverError>>,
    {
        self.perform("wait_until_stable", what, async {
            let driver = self.driver.clone();
            self.poller(self.resolve(timeout))
                .until_stable(what, DEFAULT_STABLE_POLLS, move || probe(driver.clone()))
                .await
        })
        .await
    }

    // -- Actions -------------------------------------------------------------

    /// Wait for `locator` to be clickable, then click it.
    pub async fn click(&self, locator: &Locator, timeout: Option<Duration>) -> Interaction<()> {
        let target = locator.to_string();
        let target = target.as_str();
        self.perform("click", target, async {
            self.with_located(locator, Presence::Clickable, self.resolve(timeout), |handle| async move {
                self.click_resolved(&handle, target).await
            })
            .await
        })
        .await
    }

    /// Click an element already located.
    pub async fn click_element(&self, handle: &ElementHandle) -> Interaction<()> {
        let target = handle.to_string();
        self.perform("click", &target, self.click_resolved(handle, &target))
            .await
    }

    /// Move the pointer over `locator`, for menus and tooltips that open on
    /// hover.
    pub async fn hover(&self, locator: &Locator, timeout: Option<Duration>) -> Interaction<()> {
        let target = locator.to_string();
        self.perform("hover", &target, async {
            self.with_located(locator, Presence::Visible, self.resolve(timeout), |handle| async move {
                self.driver.hover(&handle).await?;
                debug!(phase = %ActionPhase::Acted);
                Ok(())
            })
            .await
        })
        .await
    }

    /// Type `text` into a field and verify what the field ends up holding.
    ///
    /// With `clear_first` the field must then hold exactly `text`; without
    /// it, its previous value followed by `text`. A difference is returned as
    /// [`InteractionError::ValueMismatch`] and never retried.
    pub async fn type_text(
        &self,
        locator: &Locator,
        text: &str,
        clear_first: bool,
        timeout: Option<Duration>,
    ) -> Interaction<()> {
        let target = locator.to_string();
        self.perform("type_text", &target, async {
            self.with_located(locator, Presence::Visible, self.resolve(timeout), |handle| async move {
                let mut expected = if clear_first {
                    self.clear_field(locator, &handle).await?;
                    String::new()
                } else {
                    self.read_value(&handle).await?
                };
                expected.push_str(text);
                self.driver.send_keys(&handle, text).await?;

                let actual = self.read_value(&handle).await?;
                if actual != expected {
                    return Err(InteractionError::ValueMismatch {
                        locator: locator.clone(),
                        expected,
                        actual,
                    });
                }
                debug!(phase = %ActionPhase::Acted, chars = text.chars().count());
                Ok(())
            })
            .await
        })
        .await
    }

    /// The element's rendered text. Needs attachment only.
    pub async fn get_text(&self, locator: &Locator, timeout: Option<Duration>) -> Interaction<String> {
        let target = locator.to_string();
        self.perform("get_text", &target, async {
            self.with_located(locator, Presence::Attached, self.resolve(timeout), |handle| async move {
                Ok(self.driver.text(&handle).await?)
            })
            .await
        })
        .await
    }

    /// The live `value` of a form field.
    pub async fn get_value(&self, locator: &Locator, timeout: Option<Duration>) -> Interaction<String> {
        let target = locator.to_string();
        self.perform("get_value", &target, async {
            self.with_located(locator, Presence::Attached, self.resolve(timeout), |handle| async move {
                self.read_value(&handle).await
            })
            .await
        })
        .await
    }

    /// The live `value` of an element already located. Empty when unset.
    pub async fn read_value(&self, handle: &ElementHandle) -> Interaction<String> {
        Ok(self
            .driver
            .attribute(handle, "value")
            .await?
            .unwrap_or_default())
    }

    /// Scroll a locator or element into view, then settle. `timeout` bounds
    /// the wait for a locator to attach.
    pub async fn scroll_into_view<'a>(
        &self,
        target: impl Into<ScrollTarget<'a>>,
        align: ScrollAlign,
        timeout: Option<Duration>,
    ) -> Interaction<()> {
        let target = target.into();
        let label = target.to_string();
        self.perform("scroll_into_view", &label, async {
            let handle = match target {
                ScrollTarget::Element(handle) => handle.clone(),
                ScrollTarget::Locator(locator) => {
                    self.find_with(locator, Presence::Attached, self.resolve(timeout)).await?
                }
            };
            self.scroll_resolved(&handle, align).await
        })
        .await
    }

    /// Attach a local file to a file input.
    ///
    /// The path is checked before anything touches the browser; a missing
    /// file fails with [`InteractionError::LocalResourceMissing`] and issues
    /// no driver command at all.
    pub async fn upload_file(&self, locator: &Locator, path: impl AsRef<Path>) -> Interaction<()> {
        let path = path.as_ref();
        let target = locator.to_string();
        self.perform("upload_file", &target, async {
            let missing = || InteractionError::LocalResourceMissing {
                path: path.to_path_buf(),
            };
            let metadata = tokio::fs::metadata(path).await.map_err(|_| missing())?;
            if !metadata.is_file() {
                return Err(missing());
            }
            let absolute = tokio::fs::canonicalize(path).await.map_err(|_| missing())?;

            // File inputs are routinely hidden behind a styled button.
            let handle = self.find_with(locator, Presence::Attached, self.tiers.medium).await?;
            debug!(phase = %ActionPhase::Located, element = %handle);
            self.driver
                .send_keys(&handle, &absolute.to_string_lossy())
                .await?;
            debug!(phase = %ActionPhase::Acted, file = %absolute.display());
            Ok(())
        })
        .await
    }

    /// Run a script. Values come back as JSON.
    pub async fn run_script(&self, script: &str, args: Vec<ScriptArg>) -> Interaction<serde_json::Value> {
        Ok(self.driver.execute_script(script, args).await?)
    }

    // -- Internals -----------------------------------------------------------

    fn resolve(&self, timeout: Option<Duration>) -> Duration {
        timeout.unwrap_or(self.tiers.medium)
    }

    /// Runs `work` as one traced action and reports its outcome.
    async fn perform<T, Fut>(&self, action: &'static str, target: &str, work: Fut) -> Interaction<T>
    where
        Fut: Future<Output = Interaction<T>>,
    {
        let span = info_span!("action", action, target);
        async {
            debug!(phase = %ActionPhase::Pending);
            let start = Instant::now();
            let result = work.await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            if let Err(err) = &result {
                warn!(
                    phase = %ActionPhase::ActionFailed,
                    kind = err.kind().as_str(),
                    elapsed_ms,
                    error = %err,
                    "action failed"
                );
                self.capture_failure(action, err).await;
            }
            debug!(phase = %ActionPhase::Reported, elapsed_ms, success = result.is_ok());
            result
        }
        .instrument(span)
        .await
    }

    async fn capture_failure(&self, action: &str, err: &InteractionError) {
        // Nothing on screen explains a missing local file or a cancelled run.
        if matches!(err.kind(), FailureKind::LocalResourceMissing | FailureKind::Cancelled) {
            return;
        }
        let Some(diagnostics) = &self.diagnostics else {
            return;
        };
        let label = format!("{}_{}", action, err.kind().as_str());
        let limit = self.tiers.short;
        match tokio::time::timeout(limit, diagnostics.capture_on_failure(self.driver.as_ref(), &label)).await {
            Ok(Some(path)) => info!(path = %path.display(), "Failure screenshot"),
            Ok(None) => {}
            Err(_) => warn!(
                label = %label,
                limit_ms = limit.as_millis() as u64,
                "Failure screenshot abandoned, capture did not finish in time"
            ),
        }
    }

    /// Locate an element and run `act` on it. An element that goes stale
    /// before `act` finishes is located again and acted on afresh, until the
    /// same deadline the locate step runs under.
    async fn with_located<T, F, Fut>(
        &self,
        locator: &Locator,
        presence: Presence,
        timeout: Duration,
        mut act: F,
    ) -> Interaction<T>
    where
        F: FnMut(ElementHandle) -> Fut,
        Fut: Future<Output = Interaction<T>>,
    {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let handle = self.find_with(locator, presence, remaining).await?;
            debug!(phase = %ActionPhase::Located, element = %handle);
            match act(handle).await {
                Err(InteractionError::StaleReference(detail)) if Instant::now() < deadline => {
                    debug!(%detail, "element went stale before the action finished, locating again");
                    let pause = self.poll_interval.min(deadline.saturating_duration_since(Instant::now()));
                    tokio::time::sleep(pause).await;
                }
                other => return other,
            }
        }
    }

    /// Poll until `locator` has an element satisfying `presence`. Times out
    /// as `NotFound` if nothing ever matched, `Timeout` if something matched
    /// but never reached `presence`.
    async fn find_with(&self, locator: &Locator, presence: Presence, timeout: Duration) -> Interaction<ElementHandle> {
        let driver = self.driver.as_ref();
        let seen = AtomicBool::new(false);
        let seen_ref = &seen;
        let what = format!("{} to be {}", locator, presence.name());

        let result = self
            .poller(timeout)
            .until(&what, move || async move {
                let handles = driver.find_all(locator).await?;
                if handles.is_empty() {
                    return Ok(None);
                }
                seen_ref.store(true, Ordering::Relaxed);
                if presence == Presence::Attached {
                    return Ok(handles.into_iter().next());
                }
                for handle in handles {
                    if presence.satisfied_by(&driver.state(&handle).await?) {
                        return Ok(Some(handle));
                    }
                }
                Ok(None)
            })
            .await;

        match result {
            Err(InteractionError::Timeout { waited, .. }) if !seen.load(Ordering::Relaxed) => {
                Err(InteractionError::NotFound {
                    locator: locator.clone(),
                    waited,
                })
            }
            other => other,
        }
    }

    async fn click_resolved(&self, handle: &ElementHandle, target: &str) -> Interaction<()> {
        match self.driver.click(handle).await {
            Ok(()) => {
                debug!(phase = %ActionPhase::Acted);
                return Ok(());
            }
            Err(DriverError::ClickIntercepted(detail) | DriverError::NotInteractable(detail)) => {
                debug!(%detail, "click intercepted, scrolling to center and retrying once");
            }
            Err(e) => return Err(e.into()),
        }

        self.scroll_resolved(handle, ScrollAlign::center()).await?;
        match self.driver.click(handle).await {
            Ok(()) => {
                debug!(phase = %ActionPhase::Acted, retried = true);
                Ok(())
            }
            Err(DriverError::ClickIntercepted(detail) | DriverError::NotInteractable(detail)) => {
                Err(InteractionError::Intercepted {
                    target: target.to_string(),
                    detail,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn scroll_resolved(&self, handle: &ElementHandle, align: ScrollAlign) -> Interaction<()> {
        self.driver
            .execute_script(
                scripts::SCROLL_INTO_VIEW,
                vec![
                    ScriptArg::from(handle),
                    ScriptArg::value(align.block.as_str()),
                    ScriptArg::value(align.inline.as_str()),
                ],
            )
            .await?;
        self.settle().await;
        Ok(())
    }

    /// Empty a field. Select-all plus backspace first, which frameworks see
    /// as user input; the native-setter script only if text survives that.
    async fn clear_field(&self, locator: &Locator, handle: &ElementHandle) -> Interaction<()> {
        self.driver.clear(handle).await?;
        self.driver.send_keys(handle, &keys::select_all()).await?;
        self.driver
            .send_keys(handle, &keys::BACKSPACE.to_string())
            .await?;

        let residue = self.read_value(handle).await?;
        if residue.is_empty() {
            return Ok(());
        }
        debug!(residue_len = residue.len(), "field not empty after keyboard clear, forcing");
        self.driver
            .execute_script(scripts::FORCE_CLEAR, vec![ScriptArg::from(handle)])
            .await?;

        let residue = self.read_value(handle).await?;
        if residue.is_empty() {
            Ok(())
        } else {
            Err(InteractionError::ValueMismatch {
                locator: locator.clone(),
                expected: String::new(),
                actual: residue,
            })
        }
    }
}

/// Join `url` to `base` unless it is already absolute.
fn resolve_url(base: Option<&str>, url: &str) -> Interaction<String> {
    const ABSOLUTE: [&str; 4] = ["http://", "https://", "about:", "data:"];
    if ABSOLUTE.iter().any(|scheme| url.starts_with(scheme)) {
        return Ok(url.to_string());
    }
    match base {
        Some(base) => Ok(format!(
            "{}/{}",
            base.trim_end_matches('/'),
            url.trim_start_matches('/')
        )),
        None => Err(InteractionError::Unknown(format!(
            "relative url {:?} needs a base url",
            url
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Some("https://console.example.test/");
        assert_eq!(
            resolve_url(base, "/gift/create").unwrap(),
            "https://console.example.test/gift/create"
        );
        assert_eq!(
            resolve_url(base, "https://other.test/x").unwrap(),
            "https://other.test/x"
        );
        assert_eq!(resolve_url(None, "about:blank").unwrap(), "about:blank");
        assert!(resolve_url(None, "login").is_err());
    }

    #[test]
    fn test_scroll_align() {
        let default = ScrollAlign::default();
        assert_eq!(default.block.as_str(), "start");
        assert_eq!(default.inline.as_str(), "nearest");
        assert_eq!(ScrollAlign::center().block, Align::Center);
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(ActionPhase::ActionFailed.to_string(), "action_failed");
        assert_eq!(ActionPhase::Reported.name(), "reported");
    }
}
