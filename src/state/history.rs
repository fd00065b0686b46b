// History tab state: paginated, optionally filtered by category

use super::request::RequestState;
use super::Command;
use crate::api::{Category, HistoryEntry, HistoryPage, HistoryQuery};

/// Offset/limit window over a server-side list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
    pub total: u64,
}

impl Pagination {
    pub fn new(limit: u64) -> Self {
        Self {
            offset: 0,
            limit: limit.max(1),
            total: 0,
        }
    }

    pub fn has_prev(&self) -> bool {
        self.offset > 0
    }

    pub fn has_next(&self) -> bool {
        self.offset + self.limit < self.total
    }

    pub fn next(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.offset += self.limit;
        true
    }

    pub fn prev(&mut self) -> bool {
        if !self.has_prev() {
            return false;
        }
        self.offset = self.offset.saturating_sub(self.limit);
        true
    }

    /// "21 - 40 / 45"
    pub fn range_label(&self) -> String {
        format!(
            "{} - {} / {}",
            self.offset + 1,
            (self.offset + self.limit).min(self.total),
            self.total
        )
    }

    /// 1-based page number
    pub fn page(&self) -> u64 {
        self.offset / self.limit + 1
    }
}

#[derive(Debug)]
pub struct HistoryState {
    pub entries: Vec<HistoryEntry>,
    pub pagination: Pagination,
    /// None = every category
    pub category: Option<Category>,
    pub request: RequestState,
}

impl HistoryState {
    pub fn new(page_size: u64) -> Self {
        Self {
            entries: Vec::new(),
            pagination: Pagination::new(page_size),
            category: None,
            request: RequestState::Idle,
        }
    }

    pub fn query(&self) -> HistoryQuery {
        HistoryQuery {
            limit: self.pagination.limit,
            offset: self.pagination.offset,
            category: self.category,
        }
    }

    pub fn fetch(&mut self) -> Command {
        self.request.start();
        Command::FetchHistory(self.query())
    }

    pub fn next_page(&mut self) -> Option<Command> {
        self.pagination.next().then(|| self.fetch())
    }

    pub fn prev_page(&mut self) -> Option<Command> {
        self.pagination.prev().then(|| self.fetch())
    }

    /// Change the filter and start over from the first page
    pub fn set_category(&mut self, category: Option<Category>) -> Command {
        self.category = category;
        self.pagination.offset = 0;
        self.fetch()
    }

    pub fn cycle_category(&mut self) -> Command {
        self.set_category(Category::cycle(self.category))
    }

    /// Apply a page; responses for a query we have since moved away from
    /// are ignored so the newest request wins
    pub fn apply(&mut self, query: HistoryQuery, result: Result<HistoryPage, String>) {
        if query != self.query() {
            tracing::debug!(?query, "Ignoring stale history page");
            return;
        }
        self.request.settle(&result);
        match result {
            Ok(page) => {
                self.entries = page.results;
                self.pagination.total = page.count;
            }
            Err(e) => tracing::warn!("Failed to fetch history: {}", e),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.pagination.offset = 0;
        self.pagination.total = 0;
        self.request = RequestState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(count: u64) -> HistoryPage {
        HistoryPage {
            results: Vec::new(),
            count,
        }
    }

    #[test]
    fn walks_forty_five_items_in_pages_of_twenty() {
        let mut p = Pagination::new(20);
        p.total = 45;

        assert!(!p.has_prev());
        assert!(p.has_next());
        assert_eq!(p.range_label(), "1 - 20 / 45");

        assert!(p.next());
        assert_eq!(p.offset, 20);
        assert!(p.has_prev());
        assert!(p.has_next());

        assert!(p.next());
        assert_eq!(p.offset, 40);
        assert!(!p.has_next());
        assert_eq!(p.range_label(), "41 - 45 / 45");
        assert!(!p.next());
        assert_eq!(p.offset, 40);

        assert!(p.prev());
        assert!(p.prev());
        assert_eq!(p.offset, 0);
        assert!(!p.prev());
        assert_eq!(p.page(), 1);
    }

    #[test]
    fn category_change_resets_offset_and_refetches() {
        let mut history = HistoryState::new(20);
        history.fetch();
        history.apply(history.query(), Ok(page(45)));
        history.next_page();
        assert_eq!(history.pagination.offset, 20);

        let command = history.set_category(Some(Category::Git));
        assert_eq!(history.pagination.offset, 0);
        assert_eq!(
            command,
            Command::FetchHistory(HistoryQuery {
                limit: 20,
                offset: 0,
                category: Some(Category::Git),
            })
        );
    }

    #[test]
    fn next_page_without_more_items_sends_nothing() {
        let mut history = HistoryState::new(20);
        history.apply(history.query(), Ok(page(20)));
        assert_eq!(history.next_page(), None);
        assert_eq!(history.prev_page(), None);
    }

    #[test]
    fn stale_pages_are_ignored() {
        let mut history = HistoryState::new(20);
        let first = history.query();
        history.cycle_category();
        history.apply(first, Ok(page(99)));
        assert_eq!(history.pagination.total, 0);
        assert!(history.request.is_loading());

        history.apply(history.query(), Ok(page(3)));
        assert_eq!(history.pagination.total, 3);
        assert!(!history.request.is_loading());
    }
}
