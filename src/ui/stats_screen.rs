use chrono::Local;
use itertools::Itertools;
use keyfall::stats::{Achievement, PeriodTotals, Statistics};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table},
    Frame,
};

use crate::{ui::palette::Palette, App};

/// Unlocked first, then by name
pub fn sorted_achievements(stats: &Statistics) -> Vec<&Achievement> {
    stats
        .achievements
        .iter()
        .sorted_by_key(|a| (!a.unlocked, a.name.clone()))
        .collect()
}

/// `1h 02m`, `3m 20s` or `42s`
pub fn format_duration(secs: f64) -> String {
    let total = secs.max(0.0).round() as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}h {m:02}m")
    } else if m > 0 {
        format!("{m}m {s:02}s")
    } else {
        format!("{s}s")
    }
}

/// Pure presenter for a single achievement row
pub fn present_achievement_row(a: &Achievement, palette: &Palette) -> Row<'static> {
    let (mark, style) = if a.unlocked {
        ("✓", palette.base().fg(palette.matched))
    } else {
        (" ", palette.dim_style())
    };
    let when = a
        .unlocked_at
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "—".to_string());

    Row::new(vec![
        Cell::from(mark),
        Cell::from(a.name.clone()).style(style.add_modifier(Modifier::BOLD)),
        Cell::from(a.description.clone()),
        Cell::from(a.points.to_string()),
        Cell::from(when),
    ])
    .style(style)
}

fn period_row(label: &'static str, totals: &PeriodTotals) -> Row<'static> {
    Row::new(vec![
        Cell::from(label),
        Cell::from(totals.games.to_string()),
        Cell::from(totals.words.to_string()),
        Cell::from(format_duration(totals.time)),
        Cell::from(totals.score.to_string()),
    ])
}

pub fn render_stats_screen(app: &App, f: &mut Frame) {
    let palette = Palette::from_settings(&app.settings);
    let stats = &app.book.stats;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // rank gauge
            Constraint::Length(7), // bests + periods
            Constraint::Min(5),    // achievements
            Constraint::Length(3), // legend
        ])
        .split(f.area());

    let rank = stats.rank();
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Rank {}: {} ", rank.level, rank.name)),
        )
        .gauge_style(palette.base().fg(palette.accent))
        .ratio(stats.progress_to_next_rank())
        .label(format!("{} pts", stats.progression_points));
    f.render_widget(gauge, chunks[0]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    let label = palette.dim_style();
    let value = palette.base().add_modifier(Modifier::BOLD);
    let line = |name: &'static str, v: String| {
        Line::from(vec![Span::styled(format!("{name:<13}"), label), Span::styled(v, value)])
    };
    let bests = Paragraph::new(vec![
        line("games", stats.games_played.to_string()),
        line("high score", stats.high_score.to_string()),
        line("best wpm", format!("{:.1}", stats.best_wpm)),
        line("best acc", format!("{:.1}%", stats.best_accuracy)),
        line(
            "streak",
            format!("{} days (best {})", stats.current_streak, stats.longest_streak),
        ),
    ])
    .block(Block::default().borders(Borders::ALL).title(" Bests "));
    f.render_widget(bests, middle[0]);

    let all_time = PeriodTotals {
        games: stats.games_played,
        words: stats.total_words_typed,
        time: stats.total_time_spent,
        score: stats.total_score,
    };
    let rows = app
        .book
        .periods(Local::now().date_naive())
        .into_iter()
        .map(|(label, totals)| period_row(label, &totals))
        .chain(std::iter::once(period_row("all time", &all_time)))
        .collect_vec();
    let periods = Table::new(
        rows,
        [
            Constraint::Length(9),
            Constraint::Length(6),
            Constraint::Length(7),
            Constraint::Length(8),
            Constraint::Min(6),
        ],
    )
    .header(
        Row::new(vec!["", "games", "words", "time", "score"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().borders(Borders::ALL).title(" Totals "));
    f.render_widget(periods, middle[1]);

    let rows = sorted_achievements(stats)
        .into_iter()
        .map(|a| present_achievement_row(a, &palette));
    let achievements = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Length(18),
            Constraint::Min(20),
            Constraint::Length(5),
            Constraint::Length(11),
        ],
    )
    .header(
        Row::new(vec!["", "achievement", "", "pts", "unlocked"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().borders(Borders::ALL).title(format!(
        " Achievements {}/{} ",
        stats.unlocked_count(),
        stats.achievements.len()
    )));
    f.render_widget(achievements, chunks[2]);

    let legend = Paragraph::new("(b)ack / (q)uit")
        .block(Block::default().borders(Borders::ALL))
        .style(palette.dim_style().add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center);
    f.render_widget(legend, chunks[3]);
}
