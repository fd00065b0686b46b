// Analytics view - usage cards from the server's snapshot
//
// Each card renders only when its field is present; the totals card always
// renders once the snapshot has data.

use crate::api::{AnalyticsSnapshot, Category};
use crate::format::{signed_percent, trim_float};
use crate::tui::app::App;
use crate::tui::components::formatters::{bar, format_number};
use crate::tui::theme::Theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Cells in a category bar
const BAR_WIDTH: usize = 24;

fn card<'a>(title: &'a str, lines: Vec<Line<'a>>, theme: &Theme) -> Paragraph<'a> {
    Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(theme.border_style(false))
            .title(Span::styled(title, theme.title_style())),
    )
}

fn big(text: String, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(
        text,
        Style::default()
            .fg(theme.chart_primary)
            .add_modifier(Modifier::BOLD),
    ))
}

fn small(text: String, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(text, theme.muted_style()))
}

/// Cards shown in the top row, in order
fn summary_cards(snapshot: &AnalyticsSnapshot, days: u32, theme: &Theme) -> Vec<(&'static str, Vec<Line<'static>>)> {
    let mut cards = vec![(
        " Total ",
        vec![
            big(format_number(snapshot.total_questions), theme),
            small(format!("questions in {} days", days), theme),
            small(
                format!("avg answer {}s", trim_float(snapshot.avg_response_time)),
                theme,
            ),
        ],
    )];

    if let Some(peak) = &snapshot.peak_time {
        cards.push((
            " Peak time ",
            vec![
                big(peak.label.clone(), theme),
                small(peak.hour_range.clone(), theme),
                small(format!("{} questions", format_number(peak.usage_count)), theme),
            ],
        ));
    }

    if let Some(favorite) = &snapshot.favorite_category {
        let name = Category::parse(&favorite.name)
            .map(|c| c.label().to_string())
            .unwrap_or_else(|| favorite.name.clone());
        cards.push((" Favorite topic ", vec![big(name, theme)]));
    }

    if let Some(weekly) = &snapshot.weekly_stats {
        let growth_color = if weekly.growth >= 0.0 {
            theme.success
        } else {
            theme.error
        };
        cards.push((
            " This week ",
            vec![
                big(format_number(weekly.this_week), theme),
                Line::from(vec![
                    Span::styled(
                        signed_percent(weekly.growth),
                        Style::default().fg(growth_color),
                    ),
                    Span::styled(" vs last week", theme.muted_style()),
                ]),
            ],
        ));
    }

    cards
}

fn category_lines(snapshot: &AnalyticsSnapshot, theme: &Theme) -> Option<Vec<Line<'static>>> {
    let stats = snapshot.category_stats.as_ref().filter(|s| !s.is_empty())?;

    let mut rows: Vec<_> = stats.iter().collect();
    rows.sort_by(|a, b| b.1.count.cmp(&a.1.count).then_with(|| a.0.cmp(b.0)));

    let lines = rows
        .into_iter()
        .enumerate()
        .map(|(i, (name, stat))| {
            let label = Category::parse(name)
                .map(|c| c.label().to_string())
                .unwrap_or_else(|| name.clone());
            let color = if i % 2 == 0 {
                theme.chart_primary
            } else {
                theme.chart_secondary
            };
            Line::from(vec![
                Span::styled(format!(" {:<10}", label), Style::default().fg(theme.fg)),
                Span::styled(bar(stat.percentage, BAR_WIDTH), Style::default().fg(color)),
                Span::styled(
                    format!(" {:>5}%  {}", trim_float(stat.percentage), format_number(stat.count)),
                    theme.muted_style(),
                ),
            ])
        })
        .collect();
    Some(lines)
}

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let analytics = &app.store.analytics;

    let Some(snapshot) = analytics.ready() else {
        let text = if analytics.request.is_loading() {
            format!("{} Loading analytics…", app.spinner_char())
        } else {
            "No usage data yet. Ask a few questions in the Chat tab first.".to_string()
        };
        f.render_widget(
            card(" Analytics ", vec![Line::raw(""), small(text, theme)], theme),
            area,
        );
        return;
    };

    let categories = category_lines(snapshot, theme);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(categories.as_ref().map_or(0, |l| l.len() as u16 + 2)),
            Constraint::Min(0),
        ])
        .split(area);

    let cards = summary_cards(snapshot, analytics.days, theme);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, cards.len() as u32); cards.len()])
        .split(chunks[0]);
    for ((title, lines), column) in cards.into_iter().zip(columns.iter()) {
        f.render_widget(card(title, lines, theme), *column);
    }

    if let Some(lines) = categories {
        f.render_widget(card(" Categories ", lines, theme), chunks[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CategoryStat, PeakTime, WeeklyStats};
    use std::collections::BTreeMap;

    #[test]
    fn totals_card_always_present() {
        let snapshot = AnalyticsSnapshot {
            has_data: true,
            total_questions: 3,
            ..Default::default()
        };
        let cards = summary_cards(&snapshot, 30, &Theme::default());
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].0, " Total ");
        assert!(category_lines(&snapshot, &Theme::default()).is_none());
    }

    #[test]
    fn optional_cards_follow_fields() {
        let mut stats = BTreeMap::new();
        stats.insert(
            "git".to_string(),
            CategoryStat {
                count: 2,
                percentage: 66.7,
            },
        );
        stats.insert(
            "python".to_string(),
            CategoryStat {
                count: 1,
                percentage: 33.3,
            },
        );
        let snapshot = AnalyticsSnapshot {
            has_data: true,
            peak_time: Some(PeakTime {
                label: "Evening".to_string(),
                hour_range: "18:00-21:00".to_string(),
                usage_count: 2,
            }),
            weekly_stats: Some(WeeklyStats {
                this_week: 3,
                growth: 0.0,
            }),
            category_stats: Some(stats),
            total_questions: 3,
            ..Default::default()
        };
        let theme = Theme::default();
        let titles: Vec<_> = summary_cards(&snapshot, 30, &theme)
            .into_iter()
            .map(|(t, _)| t)
            .collect();
        assert_eq!(titles, vec![" Total ", " Peak time ", " This week "]);

        let lines = category_lines(&snapshot, &theme).expect("categories");
        let first: String = lines[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(first.contains("Git"));
    }
}
