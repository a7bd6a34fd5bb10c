//! Offset pagination shared by the catalog and the visitor log

/// A normalized page request: `page` starts at 1, `limit` is at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Apply defaults and clamp raw query values
    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: i64, max_limit: i64) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(default_limit).clamp(1, max_limit.max(1));
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Whether any matching rows lie past this page
    pub fn has_more(&self, total: i64) -> bool {
        self.offset().saturating_add(self.limit) < total
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            0
        } else {
            (total + self.limit - 1) / self.limit
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_clamping() {
        assert_eq!(PageRequest::new(None, None, 6, 100), PageRequest { page: 1, limit: 6 });
        assert_eq!(PageRequest::new(Some(0), Some(0), 6, 100), PageRequest { page: 1, limit: 1 });
        assert_eq!(PageRequest::new(Some(-4), Some(500), 6, 100), PageRequest { page: 1, limit: 100 });
    }

    #[test]
    fn has_more_is_false_only_on_last_page() {
        // 7 entries, 3 per page: pages 1 and 2 have more, page 3 does not
        let total = 7;
        assert!(PageRequest::new(Some(1), Some(3), 6, 100).has_more(total));
        assert!(PageRequest::new(Some(2), Some(3), 6, 100).has_more(total));
        assert!(!PageRequest::new(Some(3), Some(3), 6, 100).has_more(total));
        assert!(!PageRequest::new(Some(9), Some(3), 6, 100).has_more(total));
    }

    #[test]
    fn exact_multiple_has_no_trailing_page() {
        let request = PageRequest::new(Some(2), Some(5), 6, 100);
        assert!(!request.has_more(10));
        assert_eq!(request.total_pages(10), 2);
    }

    #[test]
    fn empty_result_set() {
        let request = PageRequest::new(Some(1), Some(6), 6, 100);
        assert!(!request.has_more(0));
        assert_eq!(request.total_pages(0), 0);
        assert_eq!(request.offset(), 0);
    }
}
