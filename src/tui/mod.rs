// TUI module - Terminal User Interface
//
// This module manages the terminal UI using ratatui. It handles:
// - Terminal initialization and cleanup
// - Event loop (keyboard and mouse input, timer ticks)
// - Rendering the UI
// - Receiving API results and feeding them to the store

pub mod app;
pub mod clipboard;
pub mod components;
pub mod layout;
pub mod markdown;
pub mod modal;
pub mod scroll;
pub mod theme;
pub mod views;

use crate::api::{ApiClient, Category};
use crate::auth::CredentialStore;
use crate::config::Config;
use crate::logging::LogBuffer;
use crate::runtime::Runtime;
use crate::state::{Action, Store, Tab};
use anyhow::{Context, Result};
use app::{App, ChatFocus};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use modal::ModalAction;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use theme::ThemeKind;
use tokio::sync::mpsc;

/// Run the TUI
///
/// Sets up the terminal, runs the event loop, and restores the terminal
/// when done, whether the loop ended cleanly or not.
pub async fn run(
    config: &Config,
    client: Arc<ApiClient>,
    credentials: CredentialStore,
    log_buffer: LogBuffer,
) -> Result<()> {
    let theme_kind = ThemeKind::from_name(&config.theme).unwrap_or_else(|| {
        tracing::warn!(theme = %config.theme, "Unknown theme, using default");
        ThemeKind::default()
    });

    let (action_tx, mut action_rx) = mpsc::unbounded_channel();
    let api_url = client.base_url().to_string();
    let runtime = Runtime::new(client, credentials, action_tx);
    let mut app = App::new(
        Store::new(config.store_settings()),
        runtime,
        theme_kind,
        api_url,
        log_buffer,
    );

    // Set up terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    tracing::info!(api_url = %app.api_url, "TUI started");
    app.startup();

    let result = run_event_loop(&mut terminal, &mut app, &mut action_rx).await;

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main event loop
///
/// Waits on three sources at once:
/// 1. Keyboard and mouse input
/// 2. Timer ticks (spinner animation, toast expiry)
/// 3. Actions produced by finished API commands
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    action_rx: &mut mpsc::UnboundedReceiver<Action>,
) -> Result<()> {
    let mut tick_interval = tokio::time::interval(Duration::from_millis(200));

    loop {
        terminal
            .draw(|f| views::draw(f, app))
            .context("Failed to draw terminal")?;

        tokio::select! {
            _ = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    match event::read() {
                        Ok(Event::Key(key_event)) => handle_key_event(app, key_event),
                        Ok(Event::Mouse(mouse_event)) => handle_mouse_event(app, mouse_event),
                        _ => {}
                    }
                }
            } => {}

            _ = tick_interval.tick() => {
                app.tick_animation();
            }

            Some(action) = action_rx.recv() => {
                app.dispatch(action);
            }
        }

        if app.should_quit {
            tracing::info!("TUI closed");
            break;
        }
    }

    Ok(())
}

/// Handle keyboard input
/// Layered dispatch: Notification → Confirm → Modal → Global → Tab
fn handle_key_event(app: &mut App, key_event: KeyEvent) {
    if key_event.kind == KeyEventKind::Release {
        return;
    }

    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c')
    {
        app.should_quit = true;
        return;
    }

    if handle_notification_input(app, &key_event)
        || handle_confirm_input(app, &key_event)
        || handle_modal_input(app, &key_event)
        || handle_global_keys(app, &key_event)
    {
        return;
    }

    match app.store.tab {
        Tab::Chat => match app.focus {
            ChatFocus::Input => handle_input_keys(app, &key_event),
            ChatFocus::Messages => handle_message_keys(app, &key_event),
            ChatFocus::Bookmarks => handle_bookmark_keys(app, &key_event),
        },
        Tab::Sessions => handle_session_keys(app, &key_event),
        Tab::History => handle_history_keys(app, &key_event),
        Tab::Analytics => {
            if key_event.code == KeyCode::Char('r') {
                app.dispatch(Action::Refresh);
            } else if key_event.code == KeyCode::Char('q') {
                app.should_quit = true;
            }
        }
    }
}

/// Handle mouse input: wheel scrolls whatever is under focus
fn handle_mouse_event(app: &mut App, mouse_event: MouseEvent) {
    let down = match mouse_event.kind {
        MouseEventKind::ScrollUp => false,
        MouseEventKind::ScrollDown => true,
        _ => return,
    };

    if let Some(modal) = app.modal.as_mut() {
        modal.scroll(if down {
            &ModalAction::ScrollDown
        } else {
            &ModalAction::ScrollUp
        });
        return;
    }

    match app.store.tab {
        Tab::Chat if down => app.chat_scroll.scroll_down(),
        Tab::Chat => app.chat_scroll.scroll_up(),
        Tab::Sessions => move_selection(app, Tab::Sessions, down),
        Tab::History => move_selection(app, Tab::History, down),
        Tab::Analytics => {}
    }
}

fn move_selection(app: &mut App, tab: Tab, down: bool) {
    let (selection, len) = match tab {
        Tab::Sessions => (&mut app.session_sel, app.store.sessions.sessions.len()),
        Tab::History => (&mut app.history_sel, app.store.history.entries.len()),
        _ => return,
    };
    if down {
        selection.next(len);
    } else {
        selection.prev(len);
    }
}

/// Front notification blocks everything until dismissed
fn handle_notification_input(app: &mut App, key_event: &KeyEvent) -> bool {
    if app.store.notifications.front().is_none() {
        return false;
    }
    if matches!(
        key_event.code,
        KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') | KeyCode::Char('q')
    ) {
        app.dispatch(Action::DismissNotification);
    }
    true
}

/// Pending session delete waits for y/n
fn handle_confirm_input(app: &mut App, key_event: &KeyEvent) -> bool {
    if app.store.sessions.pending_delete.is_none() {
        return false;
    }
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            app.dispatch(Action::ConfirmDelete)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.dispatch(Action::CancelDelete)
        }
        _ => {}
    }
    true
}

/// Handle modal input - returns true if modal absorbed the input
fn handle_modal_input(app: &mut App, key_event: &KeyEvent) -> bool {
    let Some(modal) = app.modal.as_mut() else {
        return false;
    };

    let action = modal.handle_input(key_event.code);
    match action {
        ModalAction::None => {}
        ModalAction::Close => app.modal = None,
        ModalAction::Copy => {
            if let Some(modal::Modal::Detail(detail)) = &app.modal {
                let text = detail.body.clone();
                app.copy(&text);
            }
        }
        _ => {
            if let Some(modal) = app.modal.as_mut() {
                modal.scroll(&action);
            }
        }
    }

    true
}

/// The chat input line is taking plain characters
fn is_typing(app: &App) -> bool {
    app.store.tab == Tab::Chat && app.focus == ChatFocus::Input
}

/// Handle global keys - returns true if handled
fn handle_global_keys(app: &mut App, key_event: &KeyEvent) -> bool {
    let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
    let shift = key_event.modifiers.contains(KeyModifiers::SHIFT);

    match key_event.code {
        KeyCode::Tab => app.switch_tab(app.store.tab.next()),
        KeyCode::BackTab => app.switch_tab(app.store.tab.prev()),
        KeyCode::F(n @ 1..=4) => app.switch_tab(Tab::ALL[n as usize - 1]),
        KeyCode::F(5) => app.dispatch(Action::Refresh),
        KeyCode::Char('n') if ctrl => app.new_chat(),
        KeyCode::Char('l') if ctrl => app.toggle_logs(),
        KeyCode::Char('t') if ctrl => app.cycle_theme(),
        KeyCode::Char('o') if ctrl => app.dispatch(Action::Logout),
        KeyCode::PageUp if shift && app.show_logs => app.log_scroll.page_up(),
        KeyCode::PageDown if shift && app.show_logs => app.log_scroll.page_down(),
        KeyCode::Char('?') if !is_typing(app) => app.open_help(),
        _ => return false,
    }
    true
}

fn handle_chat_scroll(app: &mut App, code: KeyCode) -> bool {
    match code {
        KeyCode::PageUp => app.chat_scroll.page_up(),
        KeyCode::PageDown => app.chat_scroll.page_down(),
        _ => return false,
    }
    true
}

fn handle_input_keys(app: &mut App, key_event: &KeyEvent) {
    let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key_event.modifiers.contains(KeyModifiers::ALT);
    if handle_chat_scroll(app, key_event.code) {
        return;
    }

    match key_event.code {
        KeyCode::Enter => app.submit(),
        KeyCode::Esc => app.focus = ChatFocus::Messages,
        KeyCode::Up => {
            app.focus = ChatFocus::Messages;
            app.select_message(false);
        }
        KeyCode::Char('r') if ctrl => app.cycle_recent(),
        code => {
            let input = &mut app.store.chat.input;
            match code {
                KeyCode::Char('w') if ctrl => input.delete_word(),
                KeyCode::Char('u') if ctrl => input.clear(),
                KeyCode::Char('a') if ctrl => input.home(),
                KeyCode::Char('e') if ctrl => input.end(),
                KeyCode::Char(c) if !ctrl && !alt => input.insert(c),
                KeyCode::Backspace => input.backspace(),
                KeyCode::Delete => input.delete(),
                KeyCode::Left => input.left(),
                KeyCode::Right => input.right(),
                KeyCode::Home => input.home(),
                KeyCode::End => input.end(),
                _ => {}
            }
        }
    }
}

fn handle_message_keys(app: &mut App, key_event: &KeyEvent) {
    if handle_chat_scroll(app, key_event.code) {
        return;
    }
    match key_event.code {
        KeyCode::Down | KeyCode::Char('j') => app.select_message(true),
        KeyCode::Up | KeyCode::Char('k') => app.select_message(false),
        KeyCode::Home | KeyCode::Char('g') => {
            app.message_sel.first(app.store.chat.messages.len());
            app.reveal_selection = true;
        }
        KeyCode::End | KeyCode::Char('G') => {
            app.message_sel.clear();
            app.chat_scroll.scroll_to_bottom();
        }
        KeyCode::Char(c @ '1'..='9') => {
            let n = c as usize - '0' as usize;
            if let Some(question) = app.suggestion(n) {
                app.use_question(question);
            }
        }
        KeyCode::Char('b') => app.bookmark_target(),
        KeyCode::Char('y') => app.copy_target_message(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.feedback(true),
        KeyCode::Char('-') => app.feedback(false),
        KeyCode::Char('s') => {
            app.focus = ChatFocus::Bookmarks;
            if app.bookmark_sel.index().is_none() {
                app.bookmark_sel.first(app.store.bookmarks.items.len());
            }
        }
        KeyCode::Char('i') | KeyCode::Enter => app.focus = ChatFocus::Input,
        KeyCode::Esc => {
            app.message_sel.clear();
            app.focus = ChatFocus::Input;
            app.chat_scroll.scroll_to_bottom();
        }
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

fn handle_bookmark_keys(app: &mut App, key_event: &KeyEvent) {
    let len = app.store.bookmarks.items.len();
    match key_event.code {
        KeyCode::Down | KeyCode::Char('j') => app.bookmark_sel.next(len),
        KeyCode::Up | KeyCode::Char('k') => app.bookmark_sel.prev(len),
        KeyCode::Enter => app.open_bookmark_detail(),
        KeyCode::Char('y') => app.copy_selected_bookmark(),
        KeyCode::Char('d') => {
            let id = app
                .bookmark_sel
                .index()
                .and_then(|i| app.store.bookmarks.get(i))
                .map(|b| b.id);
            if let Some(id) = id {
                app.dispatch(Action::DeleteBookmark(id));
            }
        }
        KeyCode::Esc | KeyCode::Char('s') => app.focus = ChatFocus::Messages,
        KeyCode::Char('i') => app.focus = ChatFocus::Input,
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

fn handle_session_keys(app: &mut App, key_event: &KeyEvent) {
    let selected = app
        .session_sel
        .index()
        .and_then(|i| app.store.sessions.sessions.get(i))
        .map(|s| s.id);

    match key_event.code {
        KeyCode::Down | KeyCode::Char('j') => move_selection(app, Tab::Sessions, true),
        KeyCode::Up | KeyCode::Char('k') => move_selection(app, Tab::Sessions, false),
        KeyCode::Enter => {
            if let Some(id) = selected {
                app.focus = ChatFocus::Input;
                app.message_sel.clear();
                app.chat_scroll.scroll_to_bottom();
                app.dispatch(Action::LoadSession(id));
            }
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(id) = selected {
                app.dispatch(Action::RequestDeleteSession(id));
            }
        }
        KeyCode::Char('r') => app.dispatch(Action::Refresh),
        KeyCode::Char('n') => app.new_chat(),
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

fn handle_history_keys(app: &mut App, key_event: &KeyEvent) {
    let page_changed = match key_event.code {
        KeyCode::Down | KeyCode::Char('j') => {
            move_selection(app, Tab::History, true);
            false
        }
        KeyCode::Up | KeyCode::Char('k') => {
            move_selection(app, Tab::History, false);
            false
        }
        KeyCode::Char('n') | KeyCode::Right | KeyCode::PageDown => {
            app.dispatch(Action::NextPage);
            true
        }
        KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp => {
            app.dispatch(Action::PrevPage);
            true
        }
        KeyCode::Char('c') => {
            app.dispatch(Action::CycleCategory);
            true
        }
        KeyCode::Char('0') => {
            app.dispatch(Action::SetCategory(None));
            true
        }
        KeyCode::Char(c @ '1'..='4') => {
            let category = Category::ALL[c as usize - '1' as usize];
            app.dispatch(Action::SetCategory(Some(category)));
            true
        }
        KeyCode::Enter => {
            app.open_history_detail();
            false
        }
        KeyCode::Char('y') => {
            app.copy_selected_history();
            false
        }
        KeyCode::Char('r') => {
            app.dispatch(Action::Refresh);
            false
        }
        KeyCode::Char('q') => {
            app.should_quit = true;
            false
        }
        _ => false,
    };

    if page_changed {
        app.history_sel.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Session, SessionId};
    use crate::logging::LogBuffer;
    use crate::state::StoreSettings;
    use chrono::Utc;

    fn app() -> App {
        let client = ApiClient::new("http://127.0.0.1:9/api", None, None).expect("client");
        let (tx, _rx) = mpsc::unbounded_channel();
        let credentials =
            CredentialStore::new(std::env::temp_dir().join("pichat-keys-test.json"));
        App::new(
            Store::new(StoreSettings::default()),
            Runtime::new(Arc::new(client), credentials, tx),
            ThemeKind::Dark,
            "http://127.0.0.1:9/api",
            LogBuffer::new(),
        )
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ctrl(app: &mut App, c: char) {
        handle_key_event(app, KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn session(id: i64) -> Session {
        Session {
            id: SessionId(id),
            title: "git?".to_string(),
            created_at: Utc::now(),
            updated_at: None,
            message_count: Some(2),
            last_message: None,
            messages: Vec::new(),
        }
    }

    #[tokio::test]
    async fn typing_and_submitting() {
        let mut app = app();
        type_text(&mut app, "git adx");
        press(&mut app, KeyCode::Backspace);
        type_text(&mut app, "d?");
        assert_eq!(app.store.chat.input.text(), "git add?");

        press(&mut app, KeyCode::Enter);
        assert!(app.store.chat.input.text().is_empty());
        assert!(app.store.chat.request.is_loading());
        assert_eq!(app.store.chat.messages.len(), 2);

        // Single flight: a second submit is ignored while waiting
        type_text(&mut app, "again");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.store.chat.messages.len(), 2);
    }

    #[tokio::test]
    async fn question_mark_is_text_while_typing() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.modal.is_none());
        assert_eq!(app.store.chat.input.text(), "?");

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.focus, ChatFocus::Messages);
        press(&mut app, KeyCode::Char('?'));
        assert!(app.modal.is_some());
        press(&mut app, KeyCode::Esc);
        assert!(app.modal.is_none());
    }

    #[tokio::test]
    async fn number_key_uses_example_question() {
        let mut app = app();
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(
            app.store.chat.input.text(),
            crate::state::chat::EXAMPLE_QUESTIONS[1]
        );
        assert_eq!(app.focus, ChatFocus::Input);
        // Not sent
        assert_eq!(app.store.chat.messages.len(), 1);
    }

    #[tokio::test]
    async fn tab_keys_switch_views() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.store.tab, Tab::Sessions);
        press(&mut app, KeyCode::F(4));
        assert_eq!(app.store.tab, Tab::Analytics);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.store.tab, Tab::History);
        press(&mut app, KeyCode::F(1));
        assert_eq!(app.store.tab, Tab::Chat);
    }

    #[tokio::test]
    async fn session_delete_needs_confirmation() {
        let mut app = app();
        press(&mut app, KeyCode::F(2));
        app.dispatch(Action::SessionsLoaded(Ok(vec![session(7), session(8)])));

        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.store.sessions.pending_delete, Some(SessionId(7)));

        // Other keys are swallowed while the prompt is up
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.session_sel.index(), Some(0));

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.store.sessions.pending_delete, None);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.store.sessions.pending_delete, None);
    }

    #[tokio::test]
    async fn notification_blocks_until_dismissed() {
        let mut app = app();
        app.store.notifications.error("Failed to load session.");

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.store.tab, Tab::Chat);

        press(&mut app, KeyCode::Enter);
        assert!(app.store.notifications.front().is_none());
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.store.tab, Tab::Sessions);
    }

    #[tokio::test]
    async fn history_keys_change_category() {
        let mut app = app();
        press(&mut app, KeyCode::F(3));
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.store.history.category, Some(Category::Python));
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.store.history.category, Some(Category::General));
        press(&mut app, KeyCode::Char('0'));
        assert_eq!(app.store.history.category, None);
    }

    #[tokio::test]
    async fn ctrl_keys() {
        let mut app = app();
        ctrl(&mut app, 'l');
        assert!(app.show_logs);
        ctrl(&mut app, 't');
        assert_eq!(app.theme_kind, ThemeKind::Light);

        type_text(&mut app, "one two");
        ctrl(&mut app, 'w');
        assert_eq!(app.store.chat.input.text(), "one ");
        ctrl(&mut app, 'u');
        assert!(app.store.chat.input.text().is_empty());

        ctrl(&mut app, 'c');
        assert!(app.should_quit);
    }
}
