// CLI module - command-line argument parsing and one-shot commands
//
// Without a subcommand pichat starts the TUI. Each subcommand performs a
// single API operation and prints the result:
// - ask, sessions, history, analytics, bookmarks, feedback
// - login / logout: manage stored tokens
// - config --show|--path|--reset|--edit
// - demo: run the TUI against the built-in backend

use std::io::Write;
use std::process::Command;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use crate::api::{ApiClient, Category, HistoryQuery, MessageId, Session, SessionId, Source};
use crate::auth::{self, CredentialStore, Credentials};
use crate::config::{Config, VERSION};
use crate::format;
use crate::state::chat::UNKNOWN_ERROR;

/// pichat - terminal client for the coding-assistant chatbot
#[derive(Parser)]
#[command(name = "pichat")]
#[command(version = VERSION)]
#[command(about = "Terminal client for the coding-assistant chatbot", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask one question and print the answer
    Ask {
        question: String,

        /// Continue an existing session
        #[arg(long)]
        session: Option<i64>,
    },

    /// List sessions, or delete one
    Sessions {
        /// Session id to delete
        #[arg(long)]
        delete: Option<i64>,

        /// Skip the confirmation prompt
        #[arg(long, requires = "delete")]
        yes: bool,
    },

    /// Show past questions
    History {
        /// git, python, general or unknown
        #[arg(long)]
        category: Option<String>,

        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: u64,
    },

    /// Show usage statistics
    Analytics {
        /// Look-back window (defaults to the configured value)
        #[arg(long)]
        days: Option<u32>,
    },

    /// List bookmarks, or delete one
    Bookmarks {
        #[arg(long)]
        delete: Option<i64>,
    },

    /// Rate an answer
    Feedback {
        message_id: i64,

        #[arg(long, conflicts_with = "unhelpful", required_unless_present = "unhelpful")]
        helpful: bool,

        #[arg(long)]
        unhelpful: bool,
    },

    /// Store API tokens issued by the web login
    Login {
        #[arg(long)]
        access: String,

        #[arg(long)]
        refresh: Option<String>,
    },

    /// Log out on the server and forget stored tokens
    Logout,

    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Open config file in $EDITOR
        #[arg(long)]
        edit: bool,
    },

    /// Start the in-memory demo backend and the TUI against it
    Demo {
        /// Port to bind (0 picks a free one)
        #[arg(long, default_value_t = 0)]
        port: u16,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Config subcommand (runs before the config file is parsed)
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_config(show: bool, path: bool, reset: bool, edit: bool) -> Result<()> {
    if path {
        let path = Config::config_path().context("Could not determine config path")?;
        println!("{}", path.display());
    } else if show {
        handle_config_show()?;
    } else if reset {
        handle_config_reset()?;
    } else if edit {
        handle_config_edit()?;
    } else {
        println!("Usage: pichat config [--show|--path|--reset|--edit]");
        println!();
        println!("Options:");
        println!("  --show    Display effective configuration");
        println!("  --path    Show config file path");
        println!("  --reset   Reset config file to defaults");
        println!("  --edit    Open config file in $EDITOR");
    }
    Ok(())
}

fn handle_config_show() -> Result<()> {
    let config = Config::load()?;

    println!("# Effective configuration (env > file > defaults)");
    println!();
    print!("{}", config.to_toml());

    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
    Ok(())
}

fn handle_config_reset() -> Result<()> {
    if let Some(path) = Config::config_path() {
        if path.exists()
            && !confirm(&format!(
                "Config file exists at {}. Overwrite?",
                path.display()
            ))?
        {
            println!("Aborted.");
            return Ok(());
        }
    }

    let path = Config::reset_file()?;
    println!("Config reset to defaults: {}", path.display());
    Ok(())
}

fn handle_config_edit() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;

    if !path.exists() {
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
    }

    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        });

    println!("Opening {} with {}", path.display(), editor);

    let status = Command::new(&editor).arg(&path).status().with_context(|| {
        format!(
            "Failed to launch editor '{}'. Set $EDITOR to your preferred editor",
            editor
        )
    })?;
    if !status.success() {
        bail!("Editor exited with status: {}", status);
    }
    Ok(())
}

/// Ask a yes/no question on stderr; anything but "y" is no
fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{} [y/N] ", prompt);
    std::io::stderr().flush()?;

    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .context("Failed to read answer")?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

// ─────────────────────────────────────────────────────────────────────────────
// API subcommands
// ─────────────────────────────────────────────────────────────────────────────

/// Build a client from config and the stored access token
pub fn build_client(config: &Config, store: &CredentialStore) -> Result<ApiClient> {
    let credentials = store.load()?;
    ApiClient::new(
        &config.api_url,
        credentials.access,
        config.request_timeout(),
    )
    .context("Invalid API URL")
}

/// Run a one-shot subcommand (everything except config and demo)
pub async fn run(command: Commands, config: &Config) -> Result<()> {
    let store = CredentialStore::new(&config.credentials_path);

    match command {
        Commands::Login { access, refresh } => {
            store.save(&Credentials {
                access: Some(access),
                refresh,
            })?;
            println!("Credentials saved to {}", store.path().display());
            Ok(())
        }
        Commands::Logout => {
            let client = build_client(config, &store)?;
            auth::logout(&client, &store).await?;
            println!("Logged out.");
            Ok(())
        }
        Commands::Ask { question, session } => {
            let client = build_client(config, &store)?;
            ask(&client, &question, session.map(SessionId)).await
        }
        Commands::Sessions { delete, yes } => {
            let client = build_client(config, &store)?;
            match delete {
                Some(id) => delete_session(&client, SessionId(id), yes).await,
                None => list_sessions(&client).await,
            }
        }
        Commands::History { category, page } => {
            let client = build_client(config, &store)?;
            let category = match category.as_deref() {
                None | Some("") | Some("all") => None,
                Some(name) => match Category::parse(name) {
                    Some(category) => Some(category),
                    None => bail!("Unknown category '{}' (git, python, general, unknown)", name),
                },
            };
            let limit = config.history.page_size;
            let query = HistoryQuery {
                limit,
                offset: page.saturating_sub(1) * limit,
                category,
            };
            history(&client, &query).await
        }
        Commands::Analytics { days } => {
            let client = build_client(config, &store)?;
            analytics(&client, days.unwrap_or(config.analytics.days)).await
        }
        Commands::Bookmarks { delete } => {
            let client = build_client(config, &store)?;
            match delete {
                Some(id) => {
                    client
                        .delete_bookmark(crate::api::BookmarkId(id))
                        .await
                        .context("Failed to delete bookmark")?;
                    println!("Bookmark {} deleted.", id);
                    Ok(())
                }
                None => list_bookmarks(&client).await,
            }
        }
        Commands::Feedback {
            message_id,
            helpful,
            unhelpful,
        } => {
            let client = build_client(config, &store)?;
            let helpful = helpful && !unhelpful;
            client
                .feedback(MessageId(message_id), helpful)
                .await
                .context("Failed to save feedback")?;
            println!(
                "{}",
                if helpful {
                    "Saved your feedback: helpful."
                } else {
                    "Saved your feedback."
                }
            );
            Ok(())
        }
        Commands::Config { .. } | Commands::Demo { .. } => {
            bail!("command is handled before the API client is built")
        }
    }
}

async fn ask(client: &ApiClient, question: &str, session: Option<SessionId>) -> Result<()> {
    let question = question.trim();
    if question.is_empty() {
        bail!("Question is empty");
    }

    let reply = client.chat(question, session).await.context("Chat failed")?;
    if !reply.success {
        bail!("{}", reply.error.as_deref().unwrap_or(UNKNOWN_ERROR));
    }
    let Some(data) = reply.data else {
        bail!("{}", crate::state::chat::FAILURE_APOLOGY);
    };

    println!("{}", format::format_answer(&data.response));
    print_sources(&data.sources);

    if !data.related_questions.is_empty() {
        println!();
        println!("Related questions:");
        for question in &data.related_questions {
            println!("  - {}", question);
        }
    }

    println!();
    let session = reply
        .session_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    let message = reply
        .message_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!("session {}  message {}", session, message);
    Ok(())
}

fn print_sources(sources: &[Source]) {
    if sources.is_empty() {
        return;
    }
    println!();
    println!("Sources:");
    for (i, source) in sources.iter().enumerate() {
        let mut line = format!("  {}. {}", i + 1, format::source_label(source));
        if let Some(relevance) = format::relevance(source) {
            line.push(' ');
            line.push_str(&relevance);
        }
        println!("{}", line);
        if let Some(url) = format::source_url(source) {
            println!("     {}", url);
        }
    }
}

fn session_row(session: &Session) -> String {
    format!(
        "{:>6}  {}  {:>3} msgs  {}",
        session.id,
        format::local_date(&session.created_at),
        session.message_total(),
        format::single_line(&session.title)
    )
}

async fn list_sessions(client: &ApiClient) -> Result<()> {
    let sessions = client.sessions().await.context("Failed to load sessions")?;
    if sessions.is_empty() {
        println!("No sessions yet.");
        return Ok(());
    }
    for session in &sessions {
        println!("{}", session_row(session));
    }
    Ok(())
}

async fn delete_session(client: &ApiClient, id: SessionId, yes: bool) -> Result<()> {
    if !yes && !confirm(&format!("Delete session {}?", id))? {
        println!("Aborted.");
        return Ok(());
    }
    client
        .delete_session(id)
        .await
        .context("Failed to delete session")?;
    println!("Session {} deleted.", id);
    Ok(())
}

async fn history(client: &ApiClient, query: &HistoryQuery) -> Result<()> {
    let page = client.history(query).await.context("Failed to load history")?;
    if page.results.is_empty() {
        println!("No questions found.");
        return Ok(());
    }

    for entry in &page.results {
        let badge = match entry.is_helpful {
            Some(true) => "  [helpful]",
            Some(false) => "  [not helpful]",
            None => "",
        };
        println!(
            "{}  {:<8}{}",
            format::local_datetime(&entry.created_at),
            entry.category,
            badge
        );
        println!("  Q: {}", format::single_line(&entry.question));
        println!(
            "  A: {}",
            format::truncate_chars(
                &format::single_line(&entry.answer),
                format::ANSWER_PREVIEW_CHARS
            )
        );
        println!();
    }

    let shown_to = (query.offset + page.results.len() as u64).min(page.count);
    println!("{}-{} of {}", query.offset + 1, shown_to, page.count);
    Ok(())
}

async fn analytics(client: &ApiClient, days: u32) -> Result<()> {
    let snapshot = client
        .analytics(days)
        .await
        .context("Failed to load analytics")?;
    if !snapshot.has_data {
        println!("No questions in the last {} days.", days);
        return Ok(());
    }

    println!("Last {} days", days);
    println!("  Total questions:   {}", snapshot.total_questions);
    println!(
        "  Avg response time: {}s",
        format::trim_float(snapshot.avg_response_time)
    );
    if let Some(peak) = &snapshot.peak_time {
        println!(
            "  Peak time:         {} ({}, {} questions)",
            peak.label, peak.hour_range, peak.usage_count
        );
    }
    if let Some(favorite) = &snapshot.favorite_category {
        println!("  Favorite topic:    {}", favorite.name);
    }
    if let Some(weekly) = &snapshot.weekly_stats {
        println!(
            "  This week:         {} ({} vs last week)",
            weekly.this_week,
            format::signed_percent(weekly.growth)
        );
    }
    if let Some(stats) = &snapshot.category_stats {
        println!();
        println!("  By category:");
        for (name, stat) in stats {
            println!(
                "    {:<8} {:>4}  {}%",
                name,
                stat.count,
                format::trim_float(stat.percentage)
            );
        }
    }
    Ok(())
}

async fn list_bookmarks(client: &ApiClient) -> Result<()> {
    let bookmarks = client
        .bookmarks()
        .await
        .context("Failed to load bookmarks")?;
    if bookmarks.is_empty() {
        println!("No bookmarks yet.");
        return Ok(());
    }
    for bookmark in &bookmarks {
        println!(
            "{:>6}  {}",
            bookmark.id,
            format::truncate_chars(
                &format::single_line(&bookmark.content),
                format::ANSWER_PREVIEW_CHARS
            )
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["pichat"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_ask_with_session() {
        let cli = Cli::try_parse_from(["pichat", "ask", "what is rebase?", "--session", "7"])
            .unwrap();
        match cli.command {
            Some(Commands::Ask { question, session }) => {
                assert_eq!(question, "what is rebase?");
                assert_eq!(session, Some(7));
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn feedback_needs_exactly_one_verdict() {
        assert!(Cli::try_parse_from(["pichat", "feedback", "3"]).is_err());
        assert!(
            Cli::try_parse_from(["pichat", "feedback", "3", "--helpful", "--unhelpful"]).is_err()
        );
        assert!(Cli::try_parse_from(["pichat", "feedback", "3", "--unhelpful"]).is_ok());
    }

    #[test]
    fn yes_requires_delete() {
        assert!(Cli::try_parse_from(["pichat", "sessions", "--yes"]).is_err());
        assert!(Cli::try_parse_from(["pichat", "sessions", "--delete", "2", "--yes"]).is_ok());
    }

    #[tokio::test]
    async fn login_then_ask_against_demo() {
        let server = crate::demo::serve(
            "127.0.0.1:0".parse().unwrap(),
            crate::demo::DemoConfig::default(),
        )
        .await
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            api_url: server.api_url(),
            credentials_path: dir.path().join("credentials.json"),
            ..Config::default()
        };

        run(
            Commands::Login {
                access: crate::demo::DEMO_ACCESS_TOKEN.to_string(),
                refresh: Some(crate::demo::DEMO_REFRESH_TOKEN.to_string()),
            },
            &config,
        )
        .await
        .unwrap();

        run(
            Commands::Ask {
                question: "How do I undo a commit in git?".to_string(),
                session: None,
            },
            &config,
        )
        .await
        .unwrap();

        run(Commands::History { category: None, page: 1 }, &config)
            .await
            .unwrap();

        run(Commands::Logout, &config).await.unwrap();
        assert!(!config.credentials_path.exists());

        server.shutdown().await;
    }

    #[tokio::test]
    async fn unknown_category_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            credentials_path: dir.path().join("credentials.json"),
            ..Config::default()
        };
        let err = run(
            Commands::History {
                category: Some("rust".to_string()),
                page: 1,
            },
            &config,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Unknown category"));
    }
}
