//! Select boxes whose option list renders into a detached popup.
//!
//! Component libraries keep closed popups in the DOM, so an option label
//! can exist several times at once. Only options inside a displayed popup
//! without a `*-hidden` class are candidates.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::driver::{BrowserDriver, DriverError};
use crate::element::ElementHandle;
use crate::error::{Interaction, InteractionError};
use crate::locator::Locator;
use crate::page::Page;

use super::has_hidden_marker;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchableDropdown {
    /// Opens the option list.
    pub trigger: Locator,
    /// The popup holding the options.
    pub container: Locator,
    /// An option, relative to the container.
    pub option: Locator,
    /// Where to type a filter query, for searchable selects.
    #[serde(default)]
    pub search_input: Option<Locator>,
}

impl SearchableDropdown {
    pub fn new(trigger: Locator, container: Locator, option: Locator) -> Self {
        Self {
            trigger,
            container,
            option,
            search_input: None,
        }
    }

    /// An Ant Design v3 `Select` opened by `trigger`.
    pub fn ant_design(trigger: Locator) -> Self {
        Self::new(
            trigger,
            Locator::css(".ant-select-dropdown"),
            Locator::css("li.ant-select-dropdown-menu-item"),
        )
    }

    pub fn with_search(mut self, input: Locator) -> Self {
        self.search_input = Some(input);
        self
    }

    /// Open the list and click the option whose trimmed text equals `text`.
    ///
    /// Fails with [`InteractionError::NotFound`] if no live popup offers that
    /// option within the medium timeout.
    pub async fn select(&self, page: &Page, text: &str) -> Interaction<()> {
        page.click(&self.trigger, None).await?;
        if let Some(search) = &self.search_input {
            page.type_text(search, text, true, None).await?;
        }

        let wanted = text.trim().to_string();
        let container = self.container.clone();
        let option = self.option.clone();
        let what = format!("option {:?} in {}", wanted, self.container);
        let found = page
            .wait_until(&what, None, move |driver| {
                let (container, option, wanted) = (container.clone(), option.clone(), wanted.clone());
                async move { find_option(driver.as_ref(), &container, &option, &wanted).await }
            })
            .await;

        let handle = match found {
            Ok(handle) => handle,
            Err(InteractionError::Timeout { waited, .. }) => {
                return Err(InteractionError::NotFound {
                    locator: Locator::text(text.trim()),
                    waited,
                })
            }
            Err(e) => return Err(e),
        };
        debug!(option = %handle, "selecting option");
        page.click_element(&handle).await
    }
}

async fn find_option(
    driver: &dyn BrowserDriver,
    container: &Locator,
    option: &Locator,
    wanted: &str,
) -> Result<Option<ElementHandle>, DriverError> {
    for panel in driver.find_all(container).await? {
        if !driver.state(&panel).await?.is_visible() {
            continue;
        }
        let class = driver.attribute(&panel, "class").await?.unwrap_or_default();
        if has_hidden_marker(&class) {
            continue;
        }
        for candidate in driver.find_all_within(&panel, option).await? {
            if driver.text(&candidate).await?.trim() == wanted {
                return Ok(Some(candidate));
            }
        }
    }
    Ok(None)
}
