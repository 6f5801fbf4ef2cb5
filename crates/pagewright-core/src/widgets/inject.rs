//! Script value injection for controlled inputs that ignore synthetic
//! keystrokes.

use tracing::debug;

use crate::driver::ScriptArg;
use crate::element::Presence;
use crate::error::{Interaction, InteractionError};
use crate::locator::Locator;
use crate::page::Page;
use crate::scripts;

/// Set a field's value with the native setter and fire `input`, `change`
/// and `blur`, then read it back.
pub async fn inject_value(page: &Page, locator: &Locator, value: &str) -> Interaction<()> {
    let handle = page.locate_with(locator, Presence::Attached, None).await?;
    let echoed = page
        .run_script(
            scripts::SET_VALUE,
            vec![ScriptArg::from(&handle), ScriptArg::value(value)],
        )
        .await?;
    debug!(element = %handle, echoed = %echoed, "value injected");

    let actual = page.read_value(&handle).await?;
    if actual == value {
        Ok(())
    } else {
        Err(InteractionError::ValueMismatch {
            locator: locator.clone(),
            expected: value.to_string(),
            actual,
        })
    }
}

/// Type `value`; only if the field then disagrees, inject it instead.
pub async fn fill_with_fallback(page: &Page, locator: &Locator, value: &str) -> Interaction<()> {
    match page.type_text(locator, value, true, None).await {
        Err(InteractionError::ValueMismatch { actual, .. }) => {
            debug!(%locator, %actual, "typed value rejected, injecting");
            inject_value(page, locator, value).await
        }
        other => other,
    }
}
