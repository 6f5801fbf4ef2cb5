//! Calendar pickers that select days by their accessible label.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::driver::{BrowserDriver, DriverError};
use crate::element::Rect;
use crate::error::{Interaction, InteractionError};
use crate::locator::Locator;
use crate::page::Page;

use super::has_hidden_marker;

/// The label calendar day cells carry in their `title`: `July 8, 2025`.
pub fn format_day_label(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// A popup calendar opened from a trigger element.
///
/// Days are clicked through [`Locator::Title`] with the label from
/// [`format_day_label`], never by cell position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRangePicker {
    /// Opens the calendar.
    pub trigger: Locator,
    /// The popup panel. When set, opening waits for its bounding box to stop
    /// moving; otherwise it falls back to the page's settle delay.
    #[serde(default)]
    pub overlay: Option<Locator>,
    /// The OK button, for pickers that need explicit confirmation.
    #[serde(default)]
    pub confirm: Option<Locator>,
    /// The "Today" shortcut of single-date pickers.
    #[serde(default)]
    pub today: Option<Locator>,
}

impl DateRangePicker {
    pub fn new(trigger: Locator) -> Self {
        Self {
            trigger,
            overlay: None,
            confirm: None,
            today: None,
        }
    }

    /// An Ant Design v3 `RangePicker` / `DatePicker` opened by `trigger`.
    pub fn ant_design(trigger: Locator) -> Self {
        Self::new(trigger)
            .with_overlay(Locator::css(".ant-calendar-picker-container"))
            .with_confirm(Locator::css(".ant-calendar-ok-btn"))
            .with_today(Locator::css(".ant-calendar-today-btn"))
    }

    pub fn with_overlay(mut self, overlay: Locator) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn with_confirm(mut self, confirm: Locator) -> Self {
        self.confirm = Some(confirm);
        self
    }

    pub fn with_today(mut self, today: Locator) -> Self {
        self.today = Some(today);
        self
    }

    /// Select `start` then `end`. A range that ends before it starts is
    /// rejected before the browser is touched.
    pub async fn select_range(&self, page: &Page, start: NaiveDate, end: NaiveDate) -> Interaction<()> {
        if end < start {
            return Err(InteractionError::Unknown(format!(
                "date range ends before it starts: {} to {}",
                start, end
            )));
        }
        self.open(page).await?;
        for date in [start, end] {
            let label = format_day_label(date);
            debug!(%label, "selecting day");
            page.click(&Locator::title(label), None).await?;
        }
        self.finish(page).await
    }

    /// Select a single date, using the "Today" shortcut when `date` is
    /// `today` and the picker has one.
    pub async fn select_date(&self, page: &Page, date: NaiveDate, today: NaiveDate) -> Interaction<()> {
        self.open(page).await?;
        match &self.today {
            Some(shortcut) if date == today => page.click(shortcut, None).await?,
            _ => page.click(&Locator::title(format_day_label(date)), None).await?,
        }
        self.finish(page).await
    }

    async fn open(&self, page: &Page) -> Interaction<()> {
        page.click(&self.trigger, None).await?;
        let Some(overlay) = &self.overlay else {
            page.settle().await;
            return Ok(());
        };

        let overlay = overlay.clone();
        page.wait_until_stable("calendar overlay to settle", None, move |driver| {
            let overlay = overlay.clone();
            async move { live_overlay_rect(driver.as_ref(), &overlay).await }
        })
        .await?;
        Ok(())
    }

    async fn finish(&self, page: &Page) -> Interaction<()> {
        match &self.confirm {
            Some(ok) => page.click(ok, None).await,
            None => Ok(()),
        }
    }
}

/// Geometry of the open overlay. Closed pickers keep their popups mounted
/// and hidden, so the first displayed one without a `*-hidden` class wins.
async fn live_overlay_rect(driver: &dyn BrowserDriver, overlay: &Locator) -> Result<Option<Rect>, DriverError> {
    for panel in driver.find_all(overlay).await? {
        let state = driver.state(&panel).await?;
        if !state.is_visible() {
            continue;
        }
        let class = driver.attribute(&panel, "class").await?.unwrap_or_default();
        if has_hidden_marker(&class) {
            continue;
        }
        return Ok(state.rect);
    }
    Ok(None)
}
