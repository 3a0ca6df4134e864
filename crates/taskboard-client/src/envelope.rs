use serde::Deserialize;

/// Paginated list response. Only `content` is kept; page metadata
/// (`totalElements`, `pageable`, ...) is ignored.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
}

impl<T> Page<T> {
    pub fn into_content(self) -> Vec<T> {
        self.content
    }
}
