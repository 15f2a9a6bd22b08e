use crate::model::Book;

/// Conjunctive filter over book records.
///
/// Every field is optional; a blank value is the same as no value. A filter
/// with no constraints matches every book. Matching is a case-insensitive
/// substring test.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    keyword: Option<String>,
    name: Option<String>,
    author: Option<String>,
    publisher: Option<String>,
    introduction: Option<String>,
    location: Option<String>,
}

impl BookFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Free text matched against title or author.
    pub fn keyword(mut self, value: Option<&str>) -> Self {
        self.keyword = constraint(value);
        self
    }

    pub fn name(mut self, value: Option<&str>) -> Self {
        self.name = constraint(value);
        self
    }

    pub fn author(mut self, value: Option<&str>) -> Self {
        self.author = constraint(value);
        self
    }

    pub fn publisher(mut self, value: Option<&str>) -> Self {
        self.publisher = constraint(value);
        self
    }

    pub fn introduction(mut self, value: Option<&str>) -> Self {
        self.introduction = constraint(value);
        self
    }

    pub fn location(mut self, value: Option<&str>) -> Self {
        self.location = constraint(value);
        self
    }

    pub fn is_unconstrained(&self) -> bool {
        self.keyword.is_none()
            && self.name.is_none()
            && self.author.is_none()
            && self.publisher.is_none()
            && self.introduction.is_none()
            && self.location.is_none()
    }

    pub fn matches(&self, book: &Book) -> bool {
        if let Some(keyword) = &self.keyword {
            if !contains(&book.name, keyword) && !contains(&book.author, keyword) {
                return false;
            }
        }

        [
            (&self.name, &book.name),
            (&self.author, &book.author),
            (&self.publisher, &book.publisher),
            (&self.introduction, &book.introduction),
            (&self.location, &book.location),
        ]
        .into_iter()
        .all(|(needle, haystack)| needle.as_ref().is_none_or(|n| contains(haystack, n)))
    }
}

/// Constraints are stored lowercased and trimmed; blank means unconstrained.
fn constraint(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

fn contains(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}
