//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

impl Config {
    /// Render the config as a commented TOML file
    pub fn to_toml(&self) -> String {
        let timeout = match self.request_timeout_secs {
            Some(secs) => format!("request_timeout_secs = {}", secs),
            None => "# request_timeout_secs = 30".to_string(),
        };

        format!(
            r#"# pichat configuration
# Environment variables override these values:
#   PICHAT_API_URL, PICHAT_CREDENTIALS, PICHAT_TIMEOUT, PICHAT_THEME

# Base URL of the chatbot API (paths like /chatbot/chat/ are appended)
api_url = "{api_url}"

# Access/refresh tokens written by `pichat login`
credentials_path = '{credentials}'

# Per-request timeout in seconds (unset waits indefinitely)
{timeout}

# Theme: Dark, Light, Monokai, Dracula, Nord, Solarized
theme = "{theme}"

# Question history
[history]
page_size = {page_size}

# Usage analytics window
[analytics]
days = {days}

# Chat view
[chat]
recent_questions = {recent}

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = "{log_level}"
# File logging (in addition to TUI buffer or stderr)
file_enabled = {log_file_enabled}
file_dir = '{log_file_dir}'
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = "{log_file_prefix}"
"#,
            api_url = self.api_url,
            credentials = self.credentials_path.display(),
            timeout = timeout,
            theme = self.theme,
            page_size = self.history.page_size,
            days = self.analytics.days,
            recent = self.chat.recent_questions,
            log_level = self.logging.level,
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = self.logging.file_dir.display(),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = self.logging.file_prefix,
        )
    }
}
