//! Adapters for composite form controls.
//!
//! Each adapter is a fixed protocol of façade calls: open the control, wait
//! for it to be ready, pick by exact label, confirm. The first failing step
//! aborts the protocol and its error is returned unchanged.

mod date_range;
mod dropdown;
mod inject;

pub use date_range::{format_day_label, DateRangePicker};
pub use dropdown::SearchableDropdown;
pub use inject::{fill_with_fallback, inject_value};

/// Whether a class list carries a `*-hidden` token, the marker component
/// libraries put on closed popups they keep mounted.
pub(crate) fn has_hidden_marker(class: &str) -> bool {
    class.split_whitespace().any(|c| c.ends_with("-hidden"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_marker() {
        assert!(has_hidden_marker("ant-select-dropdown ant-select-dropdown-hidden"));
        assert!(has_hidden_marker("el-popper is-hidden"));
        assert!(!has_hidden_marker("ant-select-dropdown ant-select-dropdown--single"));
        assert!(!has_hidden_marker(""));
    }
}
