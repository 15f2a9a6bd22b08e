use serde::Deserialize;

/// Structured search over the descriptive fields of a book.
///
/// Absent and blank fields leave that field unconstrained.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MultiConditions {
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub introduction: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Form posted by the reader search box.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub condition: Option<String>,
}
