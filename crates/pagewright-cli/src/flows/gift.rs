//! Gift creation form (Ant Design v3).

use chrono::NaiveDate;
use pagewright_core::error::Interaction;
use pagewright_core::locator::Locator;
use pagewright_core::page::Page;
use pagewright_core::widgets::{DateRangePicker, SearchableDropdown};
use tracing::info;

pub const CREATE_PATH: &str = "/gift/create";

/// What the `gift-dates` workflow fills in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GiftDates {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub source: String,
}

fn showing_date() -> DateRangePicker {
    DateRangePicker::ant_design(Locator::xpath(
        "//span[@id='showingDate']//i[contains(@class, 'ant-calendar-picker-icon')]",
    ))
}

fn gift_source() -> SearchableDropdown {
    SearchableDropdown::ant_design(Locator::xpath(
        "//div[contains(@class, 'ant-select-selection__rendered')]\
         /div[contains(@class, 'ant-select-selection-selected-value')]",
    ))
}

/// Open the create form, pick the showing date range and the gift source.
pub async fn fill_gift_dates(page: &Page, dates: &GiftDates) -> Interaction<()> {
    page.open(CREATE_PATH).await?;
    page.wait_for_document_ready(None).await?;
    page.locate(&Locator::tag("form"), None).await?;

    info!(start = %dates.start, end = %dates.end, "Selecting showing date");
    showing_date().select_range(page, dates.start, dates.end).await?;

    info!(source = %dates.source, "Selecting gift source");
    gift_source().select(page, &dates.source).await?;
    Ok(())
}
