use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Zero-based page index plus an optional page size, as sent by callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub size: Option<u32>,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: Some(size),
        }
    }

    pub fn size(&self) -> u32 {
        self.size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Fills in `default_size` when no size was sent and keeps the result
    /// within `1..=max_size`.
    pub fn clamped(self, default_size: u32, max_size: u32) -> Self {
        let size = self.size.unwrap_or(default_size);
        Self {
            page: self.page,
            size: Some(size.clamp(1, max_size.max(1))),
        }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size())
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size())
    }
}

/// Configured page size bounds applied to every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_size: u32,
    pub max_size: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: 50,
        }
    }
}

impl PageLimits {
    pub fn apply(&self, request: PageRequest) -> PageRequest {
        request.clamped(self.default_size, self.max_size)
    }
}

/// A bounded slice of an ordered collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page,
            size: request.size(),
            total,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.size))
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_follows_page_index() {
        let req = PageRequest::new(3, 20);
        assert_eq!(req.offset(), 60);
        assert_eq!(req.limit(), 20);
    }

    #[test]
    fn clamps_size() {
        assert_eq!(PageRequest::new(0, 0).clamped(10, 50).size, Some(1));
        assert_eq!(PageRequest::new(0, 500).clamped(10, 50).size, Some(50));
        assert_eq!(PageRequest::new(2, 7).clamped(10, 50), PageRequest::new(2, 7));
    }

    #[test]
    fn missing_size_takes_configured_default() {
        let limits = PageLimits {
            default_size: 25,
            max_size: 40,
        };
        assert_eq!(limits.apply(PageRequest::default()).size(), 25);
        let tight = PageLimits {
            default_size: 25,
            max_size: 5,
        };
        assert_eq!(tight.apply(PageRequest::default()).size(), 5);
    }

    #[test]
    fn query_defaults() {
        let req: PageRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req, PageRequest::default());
        assert_eq!(req.size, None);
        assert_eq!(req.size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = Page::new(vec![1, 2], PageRequest::new(0, 2), 5);
        assert_eq!(page.total_pages(), 3);
        assert_eq!(page.map(|n| n * 10).items, vec![10, 20]);
    }
}
