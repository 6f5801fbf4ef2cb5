//! Typed element locators.
//!
//! A [`Locator`] names a strategy and its selector. Locators are plain values:
//! they are cloned into page definitions, compared by value and never mutated
//! after construction.
//!
//! # Example
//!
//! ```
//! use pagewright_core::locator::{Locator, Strategy};
//!
//! let cell = Locator::title("July 8, 2025");
//! let (strategy, selector) = cell.to_webdriver();
//! assert_eq!(strategy, Strategy::XPath);
//! assert!(selector.contains("@title='July 8, 2025'"));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies zero or more DOM nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "selector", rename_all = "snake_case")]
pub enum Locator {
    /// Match the `id` attribute exactly.
    Id(String),
    /// A CSS selector.
    Css(String),
    /// An XPath expression, passed through untouched.
    #[serde(rename = "xpath")]
    XPath(String),
    /// Match elements whose own normalized text equals the string.
    Text(String),
    /// Match the accessible label: the `title` or `aria-label` attribute.
    Title(String),
    /// Match by tag name.
    TagName(String),
}

/// The W3C WebDriver location strategies this crate emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// `css selector`
    Css,
    /// `xpath`
    XPath,
}

impl Locator {
    pub fn id(id: impl Into<String>) -> Self {
        Locator::Id(id.into())
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Locator::XPath(expr.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Locator::Text(text.into())
    }

    pub fn title(label: impl Into<String>) -> Self {
        Locator::Title(label.into())
    }

    pub fn tag(name: impl Into<String>) -> Self {
        Locator::TagName(name.into())
    }

    /// Short, static name of the strategy, for tracing fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Locator::Id(_) => "id",
            Locator::Css(_) => "css",
            Locator::XPath(_) => "xpath",
            Locator::Text(_) => "text",
            Locator::Title(_) => "title",
            Locator::TagName(_) => "tag",
        }
    }

    /// The raw selector payload.
    pub fn selector(&self) -> &str {
        match self {
            Locator::Id(s)
            | Locator::Css(s)
            | Locator::XPath(s)
            | Locator::Text(s)
            | Locator::Title(s)
            | Locator::TagName(s) => s,
        }
    }

    /// Translates the locator into a WebDriver strategy and selector.
    ///
    /// Text and title lookups are emitted as relative XPath (`.//`) so the
    /// same selector works both from the document root and scoped under an
    /// element.
    pub fn to_webdriver(&self) -> (Strategy, String) {
        match self {
            Locator::Id(id) => (Strategy::Css, format!("[id=\"{}\"]", css_escape(id))),
            Locator::Css(css) => (Strategy::Css, css.clone()),
            Locator::XPath(xpath) => (Strategy::XPath, xpath.clone()),
            Locator::Text(text) => (
                Strategy::XPath,
                format!(".//*[normalize-space(text())={}]", xpath_literal(text.trim())),
            ),
            Locator::Title(label) => {
                let lit = xpath_literal(label);
                (
                    Strategy::XPath,
                    format!(".//*[@title={lit} or @aria-label={lit}]"),
                )
            }
            Locator::TagName(tag) => (Strategy::Css, tag.clone()),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.kind(), self.selector())
    }
}

/// Escapes a value for use inside a double-quoted CSS attribute selector.
fn css_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Renders `value` as an XPath 1.0 string literal.
///
/// XPath has no escape sequences, so a value holding both quote kinds is
/// split and rebuilt with `concat()`.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{}'", value);
    }
    if !value.contains('"') {
        return format!("\"{}\"", value);
    }
    let parts: Vec<String> = value
        .split('\'')
        .map(|part| format!("'{}'", part))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_becomes_attribute_selector() {
        let (strategy, selector) = Locator::id("en.title").to_webdriver();
        assert_eq!(strategy, Strategy::Css);
        assert_eq!(selector, "[id=\"en.title\"]");
    }

    #[test]
    fn test_css_and_xpath_pass_through() {
        let css = Locator::css(".el-button--primary");
        assert_eq!(css.to_webdriver(), (Strategy::Css, ".el-button--primary".to_string()));

        let xpath = Locator::xpath("//textarea[@id=\"rewardRemark\"]");
        assert_eq!(
            xpath.to_webdriver(),
            (Strategy::XPath, "//textarea[@id=\"rewardRemark\"]".to_string())
        );
    }

    #[test]
    fn test_title_matches_title_or_aria_label() {
        let (strategy, selector) = Locator::title("July 9, 2025").to_webdriver();
        assert_eq!(strategy, Strategy::XPath);
        assert_eq!(
            selector,
            ".//*[@title='July 9, 2025' or @aria-label='July 9, 2025']"
        );
    }

    #[test]
    fn test_text_is_trimmed() {
        let (_, selector) = Locator::text("  Purchase ").to_webdriver();
        assert_eq!(selector, ".//*[normalize-space(text())='Purchase']");
    }

    #[test]
    fn test_xpath_literal_quoting() {
        assert_eq!(xpath_literal("plain"), "'plain'");
        assert_eq!(xpath_literal("it's"), "\"it's\"");
        assert_eq!(
            xpath_literal("a'b\"c"),
            "concat('a', \"'\", 'b\"c')"
        );
    }

    #[test]
    fn test_css_escape_quotes() {
        let (_, selector) = Locator::id("we\"ird").to_webdriver();
        assert_eq!(selector, "[id=\"we\\\"ird\"]");
    }

    #[test]
    fn test_display_and_equality() {
        let a = Locator::css("form");
        let b = Locator::css("form");
        assert_eq!(a, b);
        assert_ne!(a, Locator::tag("form"));
        assert_eq!(a.to_string(), "css=form");
    }

    #[test]
    fn test_serde_tagged_form() {
        let json = serde_json::to_string(&Locator::xpath("//li")).unwrap();
        assert_eq!(json, r#"{"by":"xpath","selector":"//li"}"#);
        let back: Locator = serde_json::from_str(r#"{"by":"title","selector":"Today"}"#).unwrap();
        assert_eq!(back, Locator::title("Today"));
    }
}
