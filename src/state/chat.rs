// Chat conversation state
//
// Owns the visible message list, the input line and the bound session id.
// Sending is single-flight: while a reply is pending, submit does nothing.

use std::collections::VecDeque;

use super::input::InputBuffer;
use super::request::RequestState;
use super::Command;
use crate::api::{ChatReply, Message, SessionId};

pub const GREETING: &str = "Hi! Ask me anything about coding. Git and Python are my specialties.";

pub const EXAMPLE_QUESTIONS: [&str; 3] = [
    "How do I undo the last git commit?",
    "What is the difference between a list and a tuple in Python?",
    "How do I resolve a merge conflict?",
];

pub const UNKNOWN_ERROR: &str = "An unknown error occurred.";
pub const FAILURE_APOLOGY: &str =
    "Sorry, something went wrong while generating the answer. Please try again.";

/// Distinct questions, most recent first
#[derive(Debug, Clone)]
pub struct RecentQuestions {
    items: VecDeque<String>,
    capacity: usize,
}

impl RecentQuestions {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, question: &str) {
        if self.capacity == 0 {
            return;
        }
        self.items.retain(|q| q != question);
        self.items.push_front(question.to_string());
        self.items.truncate(self.capacity);
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug)]
pub struct ChatState {
    pub messages: Vec<Message>,
    pub input: InputBuffer,
    pub session_id: Option<SessionId>,
    pub request: RequestState,
    pub recent: RecentQuestions,
    /// Bumped whenever the conversation is replaced, so a reply that
    /// arrives for an abandoned conversation can be recognized
    generation: u64,
}

impl ChatState {
    pub fn new(recent_capacity: usize) -> Self {
        Self {
            messages: vec![Message::assistant(GREETING)],
            input: InputBuffer::default(),
            session_id: None,
            request: RequestState::Idle,
            recent: RecentQuestions::new(recent_capacity),
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start sending `text`
    ///
    /// Returns `None` (and changes nothing) for blank text or while a
    /// previous message is still waiting for its reply.
    pub fn submit(&mut self, text: &str) -> Option<Command> {
        let text = text.trim();
        if text.is_empty() || self.request.is_loading() {
            return None;
        }

        self.messages.push(Message::user(text));
        self.recent.record(text);
        self.input.clear();
        self.request.start();

        Some(Command::SendChat {
            message: text.to_string(),
            session_id: self.session_id,
            generation: self.generation,
        })
    }

    /// Fold a chat reply into the conversation
    ///
    /// Replies tagged with an older generation belong to a conversation
    /// that was replaced; their content is dropped but they still end the
    /// in-flight request.
    pub fn apply_reply(&mut self, generation: u64, result: Result<ChatReply, String>) {
        self.request = RequestState::Idle;
        if generation != self.generation {
            tracing::debug!(generation, "Dropping reply for a replaced conversation");
            return;
        }

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("Chat request failed: {}", e);
                self.messages.push(Message::assistant(FAILURE_APOLOGY));
                return;
            }
        };

        if !reply.success {
            let error = reply
                .error
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
            self.messages
                .push(Message::assistant(format!("Error: {}", error)));
            return;
        }

        let Some(data) = reply.data else {
            tracing::warn!("Chat reply marked successful but carried no data");
            self.messages.push(Message::assistant(FAILURE_APOLOGY));
            return;
        };

        if self.session_id.is_none() {
            if let Some(id) = reply.session_id {
                tracing::debug!(session_id = %id, "Bound chat to session");
                self.session_id = Some(id);
            }
        }

        self.messages.push(Message {
            sources: data.sources,
            related_questions: data.related_questions,
            message_id: reply.message_id,
            ..Message::assistant(data.response)
        });
    }

    /// Fresh conversation: greeting only, no session
    pub fn new_chat(&mut self) {
        self.generation += 1;
        self.messages = vec![Message::assistant(GREETING)];
        self.input.clear();
        self.session_id = None;
    }

    /// Show a stored session and continue it
    pub fn load_session(&mut self, id: SessionId, messages: Vec<Message>) {
        self.generation += 1;
        self.messages = messages;
        self.session_id = Some(id);
    }

    /// Put a question into the input line without sending it
    pub fn use_question(&mut self, question: &str) {
        self.input.set(question);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ChatData, MessageId, Source};

    fn ok_reply(session: i64, text: &str) -> ChatReply {
        ChatReply {
            success: true,
            session_id: Some(SessionId(session)),
            message_id: Some(MessageId(100)),
            data: Some(ChatData {
                response: text.to_string(),
                sources: vec![Source::Snippet("doc".to_string())],
                related_questions: vec!["next?".to_string()],
            }),
            error: None,
        }
    }

    fn send(chat: &mut ChatState, text: &str) -> Command {
        chat.input.set(text);
        let input = chat.input.text().to_string();
        chat.submit(&input).expect("command")
    }

    #[test]
    fn starts_with_greeting() {
        let chat = ChatState::new(10);
        assert_eq!(chat.messages.len(), 1);
        assert_eq!(chat.messages[0].content, GREETING);
        assert!(chat.session_id.is_none());
    }

    #[test]
    fn blank_input_does_nothing() {
        let mut chat = ChatState::new(10);
        for blank in ["", "   ", "\t\n"] {
            assert!(chat.submit(blank).is_none());
        }
        assert_eq!(chat.messages.len(), 1);
        assert!(!chat.request.is_loading());
        assert!(chat.recent.is_empty());
    }

    #[test]
    fn submit_appends_and_clears_input() {
        let mut chat = ChatState::new(10);
        let command = send(&mut chat, "  git add?  ");

        assert_eq!(
            command,
            Command::SendChat {
                message: "git add?".to_string(),
                session_id: None,
                generation: 0,
            }
        );
        assert_eq!(chat.messages.last().unwrap().content, "git add?");
        assert!(chat.input.text().is_empty());
        assert!(chat.request.is_loading());
    }

    #[test]
    fn second_submit_while_loading_is_rejected() {
        let mut chat = ChatState::new(10);
        send(&mut chat, "first");
        assert!(chat.submit("second").is_none());
        assert_eq!(chat.messages.len(), 2);
    }

    #[test]
    fn binds_session_once_and_reuses_it() {
        let mut chat = ChatState::new(10);
        send(&mut chat, "first");
        chat.apply_reply(0, Ok(ok_reply(7, "answer")));
        assert_eq!(chat.session_id, Some(SessionId(7)));

        let command = send(&mut chat, "second");
        assert!(matches!(
            command,
            Command::SendChat {
                session_id: Some(SessionId(7)),
                ..
            }
        ));

        // A different id in a later reply does not rebind
        chat.apply_reply(0, Ok(ok_reply(8, "answer")));
        assert_eq!(chat.session_id, Some(SessionId(7)));
    }

    #[test]
    fn success_appends_one_assistant_message() {
        let mut chat = ChatState::new(10);
        send(&mut chat, "q");
        chat.apply_reply(0, Ok(ok_reply(1, "Use git add.")));

        assert_eq!(chat.messages.len(), 3);
        let answer = chat.messages.last().unwrap();
        assert!(answer.is_assistant());
        assert_eq!(answer.content, "Use git add.");
        assert_eq!(answer.message_id, Some(MessageId(100)));
        assert_eq!(answer.related_questions, vec!["next?".to_string()]);
        assert!(!chat.request.is_loading());
    }

    #[test]
    fn missing_optional_fields_default_to_empty() {
        let mut chat = ChatState::new(10);
        send(&mut chat, "q");
        let reply: ChatReply =
            serde_json::from_str(r#"{"success": true, "data": {"response": "ok"}}"#).unwrap();
        chat.apply_reply(0, Ok(reply));

        let answer = chat.messages.last().unwrap();
        assert!(answer.sources.is_empty());
        assert!(answer.related_questions.is_empty());
        assert_eq!(answer.message_id, None);
        assert_eq!(chat.session_id, None);
    }

    #[test]
    fn server_failure_shows_error_text() {
        let mut chat = ChatState::new(10);
        send(&mut chat, "q");
        chat.apply_reply(
            0,
            Ok(ChatReply {
                error: Some("Session not found.".to_string()),
                ..Default::default()
            }),
        );
        assert_eq!(
            chat.messages.last().unwrap().content,
            "Error: Session not found."
        );

        send(&mut chat, "q");
        chat.apply_reply(0, Ok(ChatReply::default()));
        assert_eq!(
            chat.messages.last().unwrap().content,
            "Error: An unknown error occurred."
        );
    }

    #[test]
    fn transport_failure_shows_apology() {
        let mut chat = ChatState::new(10);
        send(&mut chat, "q");
        chat.apply_reply(0, Err("could not reach the server".to_string()));
        assert_eq!(chat.messages.last().unwrap().content, FAILURE_APOLOGY);
        assert!(!chat.request.is_loading());
        assert!(chat.submit("again").is_some());
    }

    #[test]
    fn reply_for_replaced_conversation_is_dropped() {
        let mut chat = ChatState::new(10);
        let Command::SendChat { generation, .. } = send(&mut chat, "q") else {
            panic!("expected SendChat");
        };
        chat.new_chat();
        assert!(chat.request.is_loading());
        assert!(chat.submit("too soon").is_none());

        chat.apply_reply(generation, Ok(ok_reply(3, "late")));
        assert_eq!(chat.messages.len(), 1);
        assert_eq!(chat.session_id, None);
        assert!(!chat.request.is_loading());
        assert!(chat.submit("now").is_some());
    }

    #[test]
    fn new_chat_and_load_session_reset_atomically() {
        let mut chat = ChatState::new(10);
        send(&mut chat, "q");
        chat.apply_reply(0, Ok(ok_reply(3, "a")));
        chat.input.set("draft");

        chat.new_chat();
        assert_eq!(chat.messages.len(), 1);
        assert!(chat.input.text().is_empty());
        assert_eq!(chat.session_id, None);

        chat.load_session(
            SessionId(9),
            vec![Message::user("old q"), Message::assistant("old a")],
        );
        assert_eq!(chat.session_id, Some(SessionId(9)));
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[0].content, "old q");
    }

    #[test]
    fn recent_questions_are_distinct_and_bounded() {
        let mut recent = RecentQuestions::new(3);
        for q in ["a", "b", "c", "a", "d"] {
            recent.record(q);
        }
        assert_eq!(recent.iter().collect::<Vec<_>>(), vec!["d", "a", "c"]);
        assert_eq!(recent.get(1), Some("a"));
    }

    #[test]
    fn use_question_fills_input_only() {
        let mut chat = ChatState::new(10);
        chat.use_question(EXAMPLE_QUESTIONS[0]);
        assert_eq!(chat.input.text(), EXAMPLE_QUESTIONS[0]);
        assert_eq!(chat.messages.len(), 1);
    }
}
