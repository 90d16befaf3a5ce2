//! Small DOM helpers over `scraper`

use scraper::{ElementRef, Selector};
use thiserror::Error;

/// Document-level failure: the body cannot be treated as an HTML page at all
///
/// Row-level problems never surface as this error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("document is empty")]
    EmptyDocument,
}

/// Returns the next sibling that is an element, skipping text and comments
pub fn next_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

/// First descendant matching `selector`
pub fn select_first<'a>(element: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    element.select(selector).next()
}

/// Last descendant matching `selector`, in document order
pub fn select_last<'a>(element: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    element.select(selector).last()
}

/// Concatenated text content of an element
pub fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}
