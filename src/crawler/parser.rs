//! HTML field extraction
//!
//! Each crawled page yields two fields, an owner and a title, each read from
//! an attribute of the element matched by a configured CSS selector.

use crate::config::TargetConfig;
use crate::ConfigError;
use scraper::{Html, Selector};

/// Fields extracted from one page
///
/// A selector that matches nothing leaves its field empty; that is not an
/// error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub owner: String,
    pub title: String,
}

/// Compiled selectors for the owner and title fields
#[derive(Debug)]
pub struct FieldExtractor {
    owner_selector: Selector,
    owner_attr: String,
    title_selector: Selector,
    title_attr: String,
}

impl FieldExtractor {
    /// Compiles the selectors from the target configuration
    ///
    /// # Returns
    ///
    /// * `Ok(FieldExtractor)` - Both selectors compiled
    /// * `Err(ConfigError::InvalidSelector)` - A selector failed to parse
    pub fn new(target: &TargetConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            owner_selector: compile(&target.owner_selector)?,
            owner_attr: target.owner_attr.clone(),
            title_selector: compile(&target.title_selector)?,
            title_attr: target.title_attr.clone(),
        })
    }

    /// Extracts the owner and title from an HTML document
    ///
    /// # Example
    ///
    /// ```no_run
    /// use range_crawler::config::TargetConfig;
    /// use range_crawler::crawler::FieldExtractor;
    ///
    /// let target = TargetConfig {
    ///     base_url: "https://example.com/p/".to_string(),
    ///     url_suffix: String::new(),
    ///     owner_selector: "a.owner".to_string(),
    ///     owner_attr: "title".to_string(),
    ///     title_selector: "h1".to_string(),
    ///     title_attr: "title".to_string(),
    /// };
    /// let extractor = FieldExtractor::new(&target).unwrap();
    /// let fields = extractor.extract(r#"<h1 title="Hello">Hello</h1>"#);
    /// assert_eq!(fields.title, "Hello");
    /// assert_eq!(fields.owner, "");
    /// ```
    pub fn extract(&self, html: &str) -> ExtractedFields {
        let document = Html::parse_document(html);

        ExtractedFields {
            owner: extract_attr(&document, &self.owner_selector, &self.owner_attr),
            title: extract_attr(&document, &self.title_selector, &self.title_attr),
        }
    }
}

fn compile(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector)
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))
}

/// Reads `attr` from the last element matching `selector`
///
/// Later matches overwrite earlier ones, so with several matches the last
/// one in document order wins.
fn extract_attr(document: &Html, selector: &Selector, attr: &str) -> String {
    document
        .select(selector)
        .filter_map(|element| element.value().attr(attr))
        .last()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_extractor() -> FieldExtractor {
        FieldExtractor::new(&TargetConfig {
            base_url: "https://example.com/playlist/".to_string(),
            url_suffix: ".html".to_string(),
            owner_selector: "div.data__singer a.data__singer_txt.js_user".to_string(),
            owner_attr: "title".to_string(),
            title_selector: "h1[class=data__name_txt]".to_string(),
            title_attr: "title".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_extract_both_fields() {
        let html = r#"
            <html><body>
                <h1 class="data__name_txt" title="Night Drive">Night Drive</h1>
                <div class="data__singer">
                    <a class="data__singer_txt js_user" title="alice" href="/u/1">alice</a>
                </div>
            </body></html>
        "#;
        let fields = create_extractor().extract(html);
        assert_eq!(fields.owner, "alice");
        assert_eq!(fields.title, "Night Drive");
    }

    #[test]
    fn test_missing_fields_are_empty() {
        let html = r#"<html><head><title>404</title></head><body></body></html>"#;
        let fields = create_extractor().extract(html);
        assert_eq!(fields, ExtractedFields::default());
    }

    #[test]
    fn test_element_without_attribute() {
        let html = r#"<h1 class="data__name_txt">No attribute</h1>"#;
        let fields = create_extractor().extract(html);
        assert_eq!(fields.title, "");
    }

    #[test]
    fn test_exact_class_match() {
        // [class=...] is an exact attribute match
        let html = r#"<h1 class="data__name_txt other" title="Nope">x</h1>"#;
        let fields = create_extractor().extract(html);
        assert_eq!(fields.title, "");
    }

    #[test]
    fn test_last_match_wins() {
        let html = r#"
            <div class="data__singer">
                <a class="data__singer_txt js_user" title="first">first</a>
                <a class="data__singer_txt js_user" title="second">second</a>
            </div>
        "#;
        let fields = create_extractor().extract(html);
        assert_eq!(fields.owner, "second");
    }

    #[test]
    fn test_attribute_kept_verbatim() {
        let html = r#"<h1 class="data__name_txt" title="  spaced &amp; escaped ">x</h1>"#;
        let fields = create_extractor().extract(html);
        assert_eq!(fields.title, "  spaced & escaped ");
    }

    #[test]
    fn test_invalid_selector() {
        let result = FieldExtractor::new(&TargetConfig {
            base_url: "https://example.com/".to_string(),
            url_suffix: String::new(),
            owner_selector: "div[[".to_string(),
            owner_attr: "title".to_string(),
            title_selector: "h1".to_string(),
            title_attr: "title".to_string(),
        });
        assert!(matches!(result, Err(ConfigError::InvalidSelector(_))));
    }
}
