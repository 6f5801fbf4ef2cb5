//! Shared test helpers for pagewright-core integration tests.
//!
//! [`MockDriver`] is a scripted in-memory DOM. Elements are matched by
//! locator equality, not by evaluating selectors, and every driver call is
//! recorded so tests can assert on exactly what the façade asked for.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use pagewright_core::diagnostics::Diagnostics;
use pagewright_core::driver::{BrowserDriver, DriverError, ScriptArg};
use pagewright_core::element::{ElementHandle, ElementState, Rect};
use pagewright_core::locator::Locator;
use pagewright_core::page::Page;
use pagewright_core::scripts::{self, keys};
use pagewright_core::wait::WaitTiers;

// ---------------------------------------------------------------------------
// Fake elements
// ---------------------------------------------------------------------------

pub const BOX: Rect = Rect {
    x: 10.0,
    y: 10.0,
    width: 120.0,
    height: 32.0,
};

#[derive(Debug, Clone)]
pub struct FakeElement {
    pub id: String,
    /// Top-level locators that find this element.
    pub matches: Vec<Locator>,
    /// Parent element id and the locators that find this element inside it.
    pub parent: Option<String>,
    pub within: Vec<Locator>,
    pub text: String,
    pub value: String,
    pub class: String,
    pub displayed: bool,
    pub enabled: bool,
    /// Successive rects reported by `state`; the last one sticks.
    pub rects: Vec<Rect>,
    /// Matching lookups that return nothing before the element appears.
    pub appear_after: u32,
    /// Matching lookups after which the element is gone again.
    pub vanish_after: Option<u32>,
    /// Clicks that fail with `ClickIntercepted` before one lands.
    pub intercept_clicks: u32,
    /// Clicks that fail with `NotInteractable` before one lands.
    pub uninteractable_clicks: u32,
    /// `state` calls that fail with `StaleElement` first.
    pub stale_reads: u32,
    /// Actions (click, hover, clear, text) on a handle that fail with
    /// `StaleElement` first, as if the node was re-rendered after lookup.
    pub stale_acts: u32,
    /// Keyboard clearing leaves the old value in place.
    pub clear_residue: bool,
    /// Keystrokes are swallowed, like a controlled input that ignores them.
    pub reject_typing: bool,

    lookups: u32,
    selected: bool,
    ctrl: bool,
}

impl FakeElement {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            matches: Vec::new(),
            parent: None,
            within: Vec::new(),
            text: String::new(),
            value: String::new(),
            class: String::new(),
            displayed: true,
            enabled: true,
            rects: vec![BOX],
            appear_after: 0,
            vanish_after: None,
            intercept_clicks: 0,
            uninteractable_clicks: 0,
            stale_reads: 0,
            stale_acts: 0,
            clear_residue: false,
            reject_typing: false,
            lookups: 0,
            selected: false,
            ctrl: false,
        }
    }

    pub fn matching(mut self, locator: Locator) -> Self {
        self.matches.push(locator);
        self
    }

    pub fn inside(mut self, parent: &str, locator: Locator) -> Self {
        self.parent = Some(parent.to_string());
        self.within.push(locator);
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.class = class.to_string();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn rects(mut self, rects: Vec<Rect>) -> Self {
        self.rects = rects;
        self
    }

    pub fn appear_after(mut self, lookups: u32) -> Self {
        self.appear_after = lookups;
        self
    }

    pub fn vanish_after(mut self, lookups: u32) -> Self {
        self.vanish_after = Some(lookups);
        self
    }

    pub fn intercept_clicks(mut self, count: u32) -> Self {
        self.intercept_clicks = count;
        self
    }

    pub fn uninteractable_clicks(mut self, count: u32) -> Self {
        self.uninteractable_clicks = count;
        self
    }

    pub fn stale_acts(mut self, count: u32) -> Self {
        self.stale_acts = count;
        self
    }

    pub fn stale_reads(mut self, count: u32) -> Self {
        self.stale_reads = count;
        self
    }

    pub fn clear_residue(mut self) -> Self {
        self.clear_residue = true;
        self
    }

    pub fn reject_typing(mut self) -> Self {
        self.reject_typing = true;
        self
    }

    fn present(&self) -> bool {
        self.lookups > self.appear_after && self.vanish_after.map_or(true, |n| self.lookups <= n)
    }

    fn check_fresh(&mut self) -> Result<(), DriverError> {
        if self.stale_acts > 0 {
            self.stale_acts -= 1;
            return Err(DriverError::StaleElement(self.id.clone()));
        }
        Ok(())
    }

    fn type_keys(&mut self, text: &str) {
        if self.reject_typing {
            return;
        }
        for c in text.chars() {
            match c {
                keys::NULL => self.ctrl = false,
                keys::CONTROL => self.ctrl = true,
                'a' if self.ctrl => self.selected = true,
                keys::BACKSPACE => {
                    if !self.clear_residue {
                        if self.selected {
                            self.value.clear();
                        } else {
                            self.value.pop();
                        }
                    }
                    self.selected = false;
                }
                c => {
                    if self.selected {
                        self.value.clear();
                        self.selected = false;
                    }
                    self.value.push(c);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Recorded calls
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    Navigate(String),
    CurrentUrl,
    FindAll(Locator),
    FindAllWithin(String, Locator),
    Click(String),
    Hover(String),
    SendKeys(String, String),
    Clear(String),
    Text(String),
    Attribute(String, String),
    State(String),
    /// Script name: `scroll_into_view`, `set_value`, `force_clear`,
    /// `ready_state` or `other`.
    Script(String),
    Screenshot,
    Quit,
}

// ---------------------------------------------------------------------------
// Mock driver
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Dom {
    elements: Vec<FakeElement>,
    calls: Vec<DriverCall>,
    urls: Vec<String>,
    ready_after: u32,
    ready_polls: u32,
    fail_screenshots: bool,
    fail_quit: bool,
}

#[derive(Default)]
pub struct MockDriver {
    dom: Mutex<Dom>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(elements: Vec<FakeElement>) -> Arc<Self> {
        let driver = Self::new();
        driver.dom.lock().unwrap().elements = elements;
        Arc::new(driver)
    }

    pub fn add(&self, element: FakeElement) {
        self.dom.lock().unwrap().elements.push(element);
    }

    /// URLs returned by successive `current_url` calls; the last one sticks.
    pub fn set_urls(&self, urls: &[&str]) {
        self.dom.lock().unwrap().urls = urls.iter().map(|u| u.to_string()).collect();
    }

    /// `document.readyState` stays `loading` for this many polls.
    pub fn set_ready_after(&self, polls: u32) {
        self.dom.lock().unwrap().ready_after = polls;
    }

    pub fn fail_screenshots(&self) {
        self.dom.lock().unwrap().fail_screenshots = true;
    }

    pub fn fail_quit(&self) {
        self.dom.lock().unwrap().fail_quit = true;
    }

    pub fn calls(&self) -> Vec<DriverCall> {
        self.dom.lock().unwrap().calls.clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                DriverCall::Click(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn scripts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                DriverCall::Script(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: &DriverCall) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn value_of(&self, id: &str) -> String {
        let dom = self.dom.lock().unwrap();
        dom.elements
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.value.clone())
            .unwrap_or_default()
    }

    fn record(&self, call: DriverCall) {
        self.dom.lock().unwrap().calls.push(call);
    }

    fn with_element<T>(
        &self,
        handle: &ElementHandle,
        f: impl FnOnce(&mut FakeElement) -> Result<T, DriverError>,
    ) -> Result<T, DriverError> {
        let mut dom = self.dom.lock().unwrap();
        match dom.elements.iter_mut().find(|e| e.id == handle.id()) {
            Some(element) => f(element),
            None => Err(DriverError::StaleElement(handle.id().to_string())),
        }
    }
}

fn script_name(script: &str) -> &'static str {
    if script == scripts::SCROLL_INTO_VIEW {
        "scroll_into_view"
    } else if script == scripts::SET_VALUE {
        "set_value"
    } else if script == scripts::FORCE_CLEAR {
        "force_clear"
    } else if script == scripts::DOCUMENT_READY_STATE {
        "ready_state"
    } else {
        "other"
    }
}

#[async_trait]
impl BrowserDriver for MockDriver {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.record(DriverCall::Navigate(url.to_string()));
        self.dom.lock().unwrap().urls = vec![url.to_string()];
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        self.record(DriverCall::CurrentUrl);
        let mut dom = self.dom.lock().unwrap();
        let url = match dom.urls.len() {
            0 => "about:blank".to_string(),
            1 => dom.urls[0].clone(),
            _ => dom.urls.remove(0),
        };
        Ok(url)
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<ElementHandle>, DriverError> {
        self.record(DriverCall::FindAll(locator.clone()));
        let mut dom = self.dom.lock().unwrap();
        let mut found = Vec::new();
        for element in dom.elements.iter_mut().filter(|e| e.matches.contains(locator)) {
            element.lookups += 1;
            if element.present() {
                found.push(ElementHandle::new(element.id.clone()));
            }
        }
        Ok(found)
    }

    async fn find_all_within(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> Result<Vec<ElementHandle>, DriverError> {
        self.record(DriverCall::FindAllWithin(parent.id().to_string(), locator.clone()));
        let dom = self.dom.lock().unwrap();
        if !dom.elements.iter().any(|e| e.id == parent.id()) {
            return Err(DriverError::StaleElement(parent.id().to_string()));
        }
        Ok(dom
            .elements
            .iter()
            .filter(|e| e.parent.as_deref() == Some(parent.id()) && e.within.contains(locator))
            .map(|e| ElementHandle::new(e.id.clone()))
            .collect())
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError> {
        self.record(DriverCall::Click(element.id().to_string()));
        self.with_element(element, |e| {
            e.check_fresh()?;
            if e.uninteractable_clicks > 0 {
                e.uninteractable_clicks -= 1;
                return Err(DriverError::NotInteractable(
                    "element not interactable: has no size and location".to_string(),
                ));
            }
            if e.intercept_clicks > 0 {
                e.intercept_clicks -= 1;
                return Err(DriverError::ClickIntercepted(
                    "<div class=\"ant-modal-mask\"> would receive the click".to_string(),
                ));
            }
            Ok(())
        })
    }

    async fn hover(&self, element: &ElementHandle) -> Result<(), DriverError> {
        self.record(DriverCall::Hover(element.id().to_string()));
        self.with_element(element, |e| e.check_fresh())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<(), DriverError> {
        self.record(DriverCall::SendKeys(element.id().to_string(), text.to_string()));
        self.with_element(element, |e| {
            e.type_keys(text);
            Ok(())
        })
    }

    async fn clear(&self, element: &ElementHandle) -> Result<(), DriverError> {
        self.record(DriverCall::Clear(element.id().to_string()));
        self.with_element(element, |e| {
            e.check_fresh()?;
            if !e.clear_residue {
                e.value.clear();
            }
            Ok(())
        })
    }

    async fn text(&self, element: &ElementHandle) -> Result<String, DriverError> {
        self.record(DriverCall::Text(element.id().to_string()));
        self.with_element(element, |e| {
            e.check_fresh()?;
            Ok(e.text.clone())
        })
    }

    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        self.record(DriverCall::Attribute(element.id().to_string(), name.to_string()));
        self.with_element(element, |e| {
            Ok(match name {
                "value" => Some(e.value.clone()),
                "class" => Some(e.class.clone()),
                _ => None,
            })
        })
    }

    async fn state(&self, element: &ElementHandle) -> Result<ElementState, DriverError> {
        self.record(DriverCall::State(element.id().to_string()));
        self.with_element(element, |e| {
            if e.stale_reads > 0 {
                e.stale_reads -= 1;
                return Err(DriverError::StaleElement(e.id.clone()));
            }
            let rect = if e.rects.len() > 1 {
                Some(e.rects.remove(0))
            } else {
                e.rects.first().copied()
            };
            Ok(ElementState {
                displayed: e.displayed,
                enabled: e.enabled,
                rect,
            })
        })
    }

    async fn execute_script(
        &self,
        script: &str,
        args: Vec<ScriptArg>,
    ) -> Result<Value, DriverError> {
        let name = script_name(script);
        self.record(DriverCall::Script(name.to_string()));

        let target = match args.first() {
            Some(ScriptArg::Element(handle)) => Some(handle.clone()),
            _ => None,
        };
        match (name, target) {
            ("set_value", Some(handle)) => {
                let value = match args.get(1) {
                    Some(ScriptArg::Value(Value::String(s))) => s.clone(),
                    _ => String::new(),
                };
                self.with_element(&handle, |e| {
                    e.value = value;
                    Ok(Value::String(e.value.clone()))
                })
            }
            ("force_clear", Some(handle)) => self.with_element(&handle, |e| {
                e.value.clear();
                Ok(Value::String(String::new()))
            }),
            ("scroll_into_view", Some(handle)) => self.with_element(&handle, |_| Ok(Value::Bool(true))),
            ("ready_state", None) => {
                let mut dom = self.dom.lock().unwrap();
                dom.ready_polls += 1;
                let state = if dom.ready_polls > dom.ready_after {
                    "complete"
                } else {
                    "loading"
                };
                Ok(Value::String(state.to_string()))
            }
            _ => Err(DriverError::Script(format!("unexpected script: {}", script))),
        }
    }

    async fn screenshot(&self) -> Result<Vec<u8>, DriverError> {
        self.record(DriverCall::Screenshot);
        if self.dom.lock().unwrap().fail_screenshots {
            return Err(DriverError::CommandFailed("screenshot unavailable".to_string()));
        }
        Ok(b"\x89PNG\r\n\x1a\n".to_vec())
    }

    async fn quit(&self) -> Result<(), DriverError> {
        self.record(DriverCall::Quit);
        if self.dom.lock().unwrap().fail_quit {
            return Err(DriverError::NotConnected);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Takes the screenshot through the driver like the real store, but keeps
/// only the label.
#[derive(Default)]
pub struct RecordingDiagnostics {
    labels: Mutex<Vec<String>>,
}

impl RecordingDiagnostics {
    pub fn labels(&self) -> Vec<String> {
        self.labels.lock().unwrap().clone()
    }
}

#[async_trait]
impl Diagnostics for RecordingDiagnostics {
    async fn capture_on_failure(&self, driver: &dyn BrowserDriver, label: &str) -> Option<PathBuf> {
        self.labels.lock().unwrap().push(label.to_string());
        driver.screenshot().await.ok()?;
        Some(PathBuf::from(format!("/tmp/{}.png", label)))
    }
}

// ---------------------------------------------------------------------------
// Page helpers
// ---------------------------------------------------------------------------

pub const TEST_TIERS: WaitTiers = WaitTiers {
    short: Duration::from_secs(1),
    medium: Duration::from_secs(2),
    long: Duration::from_secs(5),
};

/// A page over `driver` with short tiers and a 50ms settle.
pub fn page_for(driver: &Arc<MockDriver>) -> Page {
    Page::new(driver.clone())
        .with_tiers(TEST_TIERS)
        .with_poll_interval(Duration::from_millis(100))
        .with_settle(Duration::from_millis(50))
        .with_base_url("https://console.example.test")
}

/// Like [`page_for`], with failure screenshots recorded.
pub fn page_with_diagnostics(driver: &Arc<MockDriver>) -> (Page, Arc<RecordingDiagnostics>) {
    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let page = page_for(driver).with_diagnostics(diagnostics.clone());
    (page, diagnostics)
}
