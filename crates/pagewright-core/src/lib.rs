//! # pagewright-core
//!
//! Waiting, retrying and form interaction for browser UI automation.
//!
//! Raw driver calls fail whenever the page is mid-render: the element is not
//! attached yet, an overlay covers it, the node was swapped out by the
//! framework. This crate puts a polling layer between test flows and the
//! browser so a flow reads as a list of intents and every step returns a
//! typed outcome.
//!
//! ## Modules
//!
//! - [`wait`] - The poll engine: timeouts, intervals, stability polling, cancellation
//! - [`page`] - The element-interaction façade used by every flow
//! - [`widgets`] - Date range pickers, searchable dropdowns, value injection
//! - [`driver`] - The backend capability trait and its error type
//! - [`webdriver`] - A W3C WebDriver backend over `fantoccini`
//! - [`locator`] / [`element`] - Locators, element handles and rendered state
//! - [`error`] - Interaction outcomes
//! - [`diagnostics`] - Failure screenshots
//! - [`config`] - Suite configuration (`~/.pagewright/config.json`)
//! - [`session`] - One browser per flow, always quit
//!
//! ## External Dependencies
//!
//! [`webdriver`] needs a running WebDriver server, by default chromedriver on
//! `http://localhost:4444`.
//!
//! ## Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use pagewright_core::config::SuiteConfig;
//! use pagewright_core::locator::Locator;
//! use pagewright_core::session::BrowserSession;
//! use pagewright_core::widgets::DateRangePicker;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SuiteConfig::load_or_default(None)?;
//! let env = config.environment(Some("uat"));
//! let session = BrowserSession::connect("gift", &config, &env).await?;
//!
//! let picker = DateRangePicker::ant_design(Locator::id("showingDate"));
//! let start = NaiveDate::from_ymd_opt(2025, 7, 8).unwrap();
//! let end = NaiveDate::from_ymd_opt(2025, 7, 9).unwrap();
//! session
//!     .run(|page| async move {
//!         page.open("/gift/create").await?;
//!         picker.select_range(&page, start, end).await
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod diagnostics;
pub mod driver;
pub mod element;
pub mod error;
pub mod locator;
pub mod page;
pub mod scripts;
pub mod session;
pub mod wait;
pub mod webdriver;
pub mod widgets;
