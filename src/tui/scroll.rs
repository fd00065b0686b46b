// Scroll and selection state for TUI panels
//
// Each panel owns its own state; App only routes input. Content that grows
// at the bottom (chat, logs) starts in auto-follow mode.

/// Scroll state for a single panel
#[derive(Debug, Clone)]
pub struct ScrollState {
    /// Line/item index at top of viewport
    offset: usize,
    total: usize,
    viewport: usize,
    /// Keep the view pinned to the bottom as content grows.
    /// Scrolling up disables it; reaching the bottom re-enables it.
    pub auto_follow: bool,
}

impl ScrollState {
    /// Auto-follow enabled
    pub fn new() -> Self {
        Self {
            offset: 0,
            total: 0,
            viewport: 0,
            auto_follow: true,
        }
    }

    /// Stays where the user put it
    pub fn manual() -> Self {
        Self {
            auto_follow: false,
            ..Self::new()
        }
    }

    /// Call each render frame with current sizes
    pub fn update_dimensions(&mut self, total: usize, viewport: usize) {
        self.total = total;
        self.viewport = viewport;

        if self.auto_follow {
            self.offset = self.max_offset();
        } else {
            self.offset = self.offset.min(self.max_offset());
        }
    }

    pub fn scroll_up(&mut self) {
        if self.offset > 0 {
            self.offset -= 1;
            self.auto_follow = false;
        }
    }

    pub fn scroll_down(&mut self) {
        // Dimensions unknown until first render; render clamps
        if self.total == 0 || self.offset < self.max_offset() {
            self.offset += 1;
        }
        if self.total > 0 && self.offset >= self.max_offset() {
            self.auto_follow = true;
        }
    }

    pub fn page_up(&mut self) {
        let page = self.viewport.max(1);
        self.offset = self.offset.saturating_sub(page);
        self.auto_follow = false;
    }

    pub fn page_down(&mut self) {
        let page = self.viewport.max(1);
        self.offset = (self.offset + page).min(self.max_offset());
        if self.offset >= self.max_offset() {
            self.auto_follow = true;
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
        self.auto_follow = false;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset();
        self.auto_follow = true;
    }

    /// Scroll the minimum amount that brings `line` into view
    pub fn ensure_visible(&mut self, line: usize) {
        self.auto_follow = false;
        if line < self.offset {
            self.offset = line;
        } else if self.viewport > 0 && line >= self.offset + self.viewport {
            self.offset = line + 1 - self.viewport;
        }
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// (start, end) of visible items
    pub fn visible_range(&self) -> (usize, usize) {
        let end = (self.offset + self.viewport).min(self.total);
        (self.offset.min(end), end)
    }

    pub fn needs_scrollbar(&self) -> bool {
        self.total > self.viewport
    }

    fn max_offset(&self) -> usize {
        self.total.saturating_sub(self.viewport)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn viewport(&self) -> usize {
        self.viewport
    }
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new()
    }
}

/// Cursor over a list whose length changes underneath it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    index: Option<usize>,
}

impl Selection {
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Move down, starting at the top when nothing is selected
    pub fn next(&mut self, len: usize) {
        self.index = match self.index {
            _ if len == 0 => None,
            Some(i) => Some((i + 1).min(len - 1)),
            None => Some(0),
        };
    }

    /// Move up, starting at the bottom when nothing is selected
    pub fn prev(&mut self, len: usize) {
        self.index = match self.index {
            _ if len == 0 => None,
            Some(i) => Some(i.saturating_sub(1).min(len - 1)),
            None => Some(len - 1),
        };
    }

    pub fn first(&mut self, len: usize) {
        self.index = (len > 0).then_some(0);
    }

    pub fn last(&mut self, len: usize) {
        self.index = len.checked_sub(1);
    }

    pub fn clear(&mut self) {
        self.index = None;
    }

    /// Keep the cursor inside a list that may have shrunk
    pub fn clamp(&mut self, len: usize) {
        if let Some(i) = self.index {
            self.index = if len == 0 { None } else { Some(i.min(len - 1)) };
        }
    }
}
