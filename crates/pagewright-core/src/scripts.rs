//! JavaScript snippets run through [`BrowserDriver::execute_script`].
//!
//! Each snippet is a function body; `arguments[i]` are the
//! [`ScriptArg`](crate::driver::ScriptArg)s in order.
//!
//! [`BrowserDriver::execute_script`]: crate::driver::BrowserDriver::execute_script

/// `arguments[0]`: element, `arguments[1]`: block alignment,
/// `arguments[2]`: inline alignment.
pub const SCROLL_INTO_VIEW: &str = "\
arguments[0].scrollIntoView({ block: arguments[1], inline: arguments[2] });
return true;";

/// Sets `arguments[0].value` to `arguments[1]` through the prototype's native
/// setter, so React's value tracker sees a real change, then fires the
/// events controlled components listen to. Returns the value read back.
pub const SET_VALUE: &str = "\
var el = arguments[0];
var value = arguments[1];
var proto = el instanceof HTMLTextAreaElement
    ? HTMLTextAreaElement.prototype
    : HTMLInputElement.prototype;
var setter = Object.getOwnPropertyDescriptor(proto, 'value').set;
el.removeAttribute('readonly');
el.focus();
setter.call(el, value);
el.dispatchEvent(new Event('input', { bubbles: true }));
el.dispatchEvent(new Event('change', { bubbles: true }));
el.blur();
return el.value;";

/// Empties `arguments[0]` with the native setter and fires `input`.
pub const FORCE_CLEAR: &str = "\
var el = arguments[0];
var proto = el instanceof HTMLTextAreaElement
    ? HTMLTextAreaElement.prototype
    : HTMLInputElement.prototype;
Object.getOwnPropertyDescriptor(proto, 'value').set.call(el, '');
el.dispatchEvent(new Event('input', { bubbles: true }));
return el.value;";

pub const DOCUMENT_READY_STATE: &str = "return document.readyState;";

/// WebDriver key codes (W3C `Keys`).
pub mod keys {
    pub const NULL: char = '\u{E000}';
    pub const BACKSPACE: char = '\u{E003}';
    pub const CONTROL: char = '\u{E009}';

    /// Ctrl+A, then release modifiers.
    pub fn select_all() -> String {
        format!("{CONTROL}a{NULL}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_all_chord() {
        let chord = keys::select_all();
        assert_eq!(chord.chars().count(), 3);
        assert!(chord.starts_with(keys::CONTROL));
        assert!(chord.ends_with(keys::NULL));
    }

    #[test]
    fn test_set_value_reads_back() {
        assert!(SET_VALUE.trim_end().ends_with("return el.value;"));
        assert!(!SET_VALUE.contains("defineProperty"));
    }
}
