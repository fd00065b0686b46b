//! Per-view settings: history page size, analytics window, recent questions

use serde::Deserialize;

/// [history] section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Entries per page
    pub page_size: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { page_size: 20 }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileHistory {
    pub page_size: Option<u64>,
}

impl HistoryConfig {
    pub fn from_file(file: Option<FileHistory>) -> Self {
        let file = file.unwrap_or_default();
        Self {
            page_size: file
                .page_size
                .filter(|n| *n > 0)
                .unwrap_or(Self::default().page_size),
        }
    }
}

/// [analytics] section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsConfig {
    /// Look-back window in days
    pub days: u32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self { days: 30 }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileAnalytics {
    pub days: Option<u32>,
}

impl AnalyticsConfig {
    pub fn from_file(file: Option<FileAnalytics>) -> Self {
        let file = file.unwrap_or_default();
        Self {
            days: file
                .days
                .filter(|n| *n > 0)
                .unwrap_or(Self::default().days),
        }
    }
}

/// [chat] section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// How many distinct recent questions to remember (0 disables)
    pub recent_questions: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            recent_questions: 10,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileChat {
    pub recent_questions: Option<usize>,
}

impl ChatConfig {
    pub fn from_file(file: Option<FileChat>) -> Self {
        let file = file.unwrap_or_default();
        Self {
            recent_questions: file
                .recent_questions
                .unwrap_or(Self::default().recent_questions),
        }
    }
}
