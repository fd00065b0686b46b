// Bookmark sidebar state
//
// The list is a cache of the server's: refetched at startup and after every
// add or delete, never edited locally.

use super::request::RequestState;
use super::Command;
use crate::api::{Bookmark, BookmarkId, Message};

#[derive(Debug, Default)]
pub struct BookmarksState {
    pub items: Vec<Bookmark>,
    pub request: RequestState,
}

impl BookmarksState {
    pub fn fetch(&mut self) -> Command {
        self.request.start();
        Command::FetchBookmarks
    }

    pub fn apply_list(&mut self, result: Result<Vec<Bookmark>, String>) {
        self.request.settle(&result);
        match result {
            Ok(items) => self.items = items,
            Err(e) => tracing::warn!("Failed to fetch bookmarks: {}", e),
        }
    }

    /// Bookmark an answer; user messages cannot be bookmarked
    pub fn add(&self, message: &Message) -> Option<Command> {
        if !message.is_assistant() {
            return None;
        }
        Some(Command::AddBookmark {
            content: message.content.clone(),
            sources: message.sources.clone(),
        })
    }

    pub fn delete(&self, id: BookmarkId) -> Command {
        Command::DeleteBookmark(id)
    }

    pub fn get(&self, index: usize) -> Option<&Bookmark> {
        self.items.get(index)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.request = RequestState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Source;

    #[test]
    fn only_answers_can_be_bookmarked() {
        let state = BookmarksState::default();
        assert_eq!(state.add(&Message::user("q")), None);

        let mut answer = Message::assistant("Use git add.");
        answer.sources = vec![Source::Snippet("doc".to_string())];
        assert_eq!(
            state.add(&answer),
            Some(Command::AddBookmark {
                content: "Use git add.".to_string(),
                sources: vec![Source::Snippet("doc".to_string())],
            })
        );
    }

    #[test]
    fn empty_list_lookups_are_safe() {
        let mut state = BookmarksState::default();
        assert!(state.get(0).is_none());
        state.apply_list(Ok(Vec::new()));
        assert!(state.items.is_empty());
        assert_eq!(state.delete(BookmarkId(1)), Command::DeleteBookmark(BookmarkId(1)));
    }
}
