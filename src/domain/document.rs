use scraper::{ElementRef, Html, Selector};

/// A rendered page parsed into a tree that can be queried with CSS selectors.
///
/// Parsing is lenient: malformed markup still yields a document.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(source: &str) -> Self {
        Document {
            html: Html::parse_document(source),
        }
    }

    pub fn select<'a>(&'a self, selector: &'a Selector) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.html.select(selector)
    }

    /// All descendant text of `node` in document order, whitespace untouched.
    pub fn text_of(node: ElementRef<'_>) -> String {
        node.text().collect()
    }

    /// Text of every node matching `selector`, concatenated with no separator.
    pub fn text_of_all(&self, selector: &Selector) -> String {
        self.select(selector).map(Document::text_of).collect()
    }
}
