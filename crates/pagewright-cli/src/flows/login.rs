//! Sign-in form (Element UI).

use pagewright_core::error::Interaction;
use pagewright_core::locator::Locator;
use pagewright_core::page::Page;
use pagewright_core::wait::WaitTier;
use tracing::info;

fn username_input() -> Locator {
    Locator::css(r#".el-input__inner[type="text"]"#)
}

fn password_input() -> Locator {
    Locator::css(r#".el-input__inner[type="password"]"#)
}

fn login_button() -> Locator {
    Locator::css(".el-button--primary")
}

fn error_toast() -> Locator {
    Locator::css(".el-message--error")
}

fn dashboard_title() -> Locator {
    Locator::css(".dashboard-title")
}

/// How the console answered the credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Dashboard,
    /// The error toast's text.
    Rejected(String),
}

/// Open the base URL, submit the credentials, and wait for either the
/// dashboard or an error toast, whichever shows first.
pub async fn login(page: &Page, username: &str, password: &str) -> Interaction<LoginOutcome> {
    info!(username, "Signing in");
    page.open("/").await?;
    page.type_text(&username_input(), username, true, None).await?;
    page.type_text(&password_input(), password, true, None).await?;
    page.click(&login_button(), None).await?;

    let (toast, title) = (error_toast(), dashboard_title());
    let outcome = page
        .wait_until("login result", Some(page.tier(WaitTier::Long)), move |driver| {
            let (toast, title) = (toast.clone(), title.clone());
            async move {
                for handle in driver.find_all(&toast).await? {
                    if driver.state(&handle).await?.is_visible() {
                        let text = driver.text(&handle).await?;
                        return Ok(Some(LoginOutcome::Rejected(text.trim().to_string())));
                    }
                }
                for handle in driver.find_all(&title).await? {
                    if driver.state(&handle).await?.is_visible() {
                        return Ok(Some(LoginOutcome::Dashboard));
                    }
                }
                Ok(None)
            }
        })
        .await?;

    match &outcome {
        LoginOutcome::Dashboard => info!("Signed in"),
        LoginOutcome::Rejected(reason) => info!(%reason, "Sign-in rejected"),
    }
    Ok(outcome)
}
