pub mod charting;
pub mod palette;
pub mod screen;
pub mod stats_screen;

use keyfall::{
    celebration::ParticleSystem, content::Mode, falling::FallingItem, progression::Progress,
    time_series::as_chart_data,
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{ui::palette::Palette, App, AppState};

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;
/// Items past this fraction of the fall are drawn in the warning colour
const DANGER_ZONE: f64 = 0.8;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let palette = Palette::from_settings(&self.settings);
        buf.set_style(area, palette.base());

        match self.state {
            AppState::Menu => render_menu(self, &palette, area, buf),
            AppState::Playing => render_playing(self, &palette, area, buf),
            AppState::Results => render_results(self, &palette, area, buf),
            // drawn by stats_screen
            AppState::Stats => {}
        }
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

fn render_menu(app: &App, palette: &Palette, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(Mode::ALL.len() as u16 + 2),
            Constraint::Length(4),
            Constraint::Length(1),
        ])
        .split(area);

    let stats = &app.book.stats;
    let title = Paragraph::new(vec![
        Line::from(Span::styled("k e y f a l l", palette.accent_bold())),
        Line::from(Span::styled(
            format!(
                "{} · best {:.0} wpm · {} day streak",
                stats.rank().name,
                stats.best_wpm,
                stats.current_streak
            ),
            palette.dim_style(),
        )),
    ])
    .alignment(Alignment::Center);
    title.render(chunks[0], buf);

    let selected = app.menu.mode();
    let modes: Vec<Line> = Mode::ALL
        .iter()
        .map(|&mode| {
            let (marker, style) = if mode == selected {
                ("▶ ", palette.accent_bold())
            } else {
                ("  ", palette.base())
            };
            Line::from(vec![
                Span::styled(format!("{marker}{:<12}", mode.to_string()), style),
                Span::styled(mode.description(), palette.dim_style()),
            ])
        })
        .collect();
    Paragraph::new(modes)
        .block(Block::default().borders(Borders::ALL).title(" Mode "))
        .render(chunks[1], buf);

    let s = &app.settings;
    let mut settings_lines = vec![
        Line::from(format!(
            "(d) difficulty {}   (t) theme {}   (l) language {}   custom words {}",
            s.difficulty,
            s.theme,
            s.language,
            s.custom_words.len()
        )),
        Line::from(format!(
            "(m) sound {}   (p) particles {}   (c) combo {}   (h) high contrast {}",
            on_off(s.sound_enabled),
            on_off(s.particles_enabled),
            on_off(s.show_combo),
            on_off(s.accessibility.high_contrast)
        )),
    ];
    if selected.is_kids() {
        settings_lines.push(Line::from(Span::styled(
            "kids modes always play on easy",
            palette.dim_style().add_modifier(Modifier::ITALIC),
        )));
    }
    Paragraph::new(settings_lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        "(↑/↓) choose / (enter) play / (s)tats / (q)uit",
        palette.dim_style().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[3], buf);
}

/// Status line: score, rates, level and the combo once it is worth showing
pub fn hud_line(
    progress: &Progress,
    wpm: f64,
    accuracy: f64,
    show_combo: bool,
    palette: &Palette,
) -> Line<'static> {
    let label = palette.dim_style();
    let value = palette.base().add_modifier(Modifier::BOLD);
    let mut spans = vec![
        Span::styled("score ", label),
        Span::styled(progress.score.to_string(), value),
        Span::styled("   wpm ", label),
        Span::styled(format!("{wpm:.0}"), value),
        Span::styled("   acc ", label),
        Span::styled(format!("{accuracy:.0}%"), value),
        Span::styled("   level ", label),
        Span::styled(progress.level.to_string(), value),
    ];
    if show_combo && progress.show_combo() {
        spans.push(Span::styled(
            format!("   {}x combo", progress.combo),
            palette.base().fg(palette.combo).add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}

/// Top-left cell of an item inside the playfield
pub fn item_cell(item: &FallingItem, floor: f64, field: Rect, shake: i16) -> (u16, u16) {
    let width = item.display_text().width() as u16;
    let max_x = field.right().saturating_sub(width.min(field.width)).max(field.x);

    let x = field.x as f64 + item.horizontal_slot() / 100.0 * field.width as f64;
    let x = (x as i32 + i32::from(shake)).clamp(i32::from(field.x), i32::from(max_x)) as u16;

    let ratio = (item.position() / floor).clamp(0.0, 1.0);
    let y = field.y + (ratio * field.height.saturating_sub(1) as f64) as u16;
    (x, y)
}

fn render_playing(app: &App, palette: &Palette, area: Rect, buf: &mut Buffer) {
    let session = app.game.session();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(1), // hud
            Constraint::Min(3),    // playfield
            Constraint::Length(3), // input
            Constraint::Length(1), // legend
        ])
        .split(area);

    hud_line(
        &session.progress,
        session.wpm(),
        session.accuracy(),
        app.settings.show_combo,
        palette,
    )
    .render(chunks[0], buf);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", session.config.mode))
        .border_style(palette.dim_style());
    let field = block.inner(chunks[1]);
    block.render(chunks[1], buf);

    let shake = app.particles.shake_offset();
    let floor = session.config.floor;
    let mut text_style = palette.base();
    if app.settings.accessibility.large_text {
        text_style = text_style.add_modifier(Modifier::BOLD);
    }
    for item in session.items().iter().filter(|i| i.is_active()) {
        let (x, y) = item_cell(item, floor, field, shake);
        let colour = if item.position() / floor > DANGER_ZONE {
            palette.wrong
        } else {
            palette.item
        };
        let line = Line::from(vec![
            Span::styled(
                item.typed_display().to_string(),
                text_style
                    .fg(palette.matched)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            ),
            Span::styled(item.remaining_display().to_string(), text_style.fg(colour)),
        ]);
        buf.set_line(x, y, &line, field.right().saturating_sub(x));
    }

    render_particles(&app.particles, palette, field, buf);

    if let Some(banner) = app.banners.current() {
        Paragraph::new(Span::styled(banner.to_string(), palette.accent_bold()))
            .alignment(Alignment::Center)
            .render(Rect { height: 1, ..field }, buf);
    }

    let on_track = session.buffer.is_empty()
        || session.items().iter().any(|i| !i.matched_prefix().is_empty());
    let input_style = if on_track {
        palette.base().add_modifier(Modifier::BOLD)
    } else {
        palette.base().fg(palette.wrong).add_modifier(Modifier::BOLD)
    };
    Paragraph::new(Line::from(vec![
        Span::styled(session.buffer.clone(), input_style),
        Span::styled("▏", palette.accent_bold()),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" type ")
            .border_style(palette.dim_style()),
    )
    .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        "(enter) submit / (esc) pause",
        palette.dim_style().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[3], buf);

    if app.game.is_paused() {
        render_pause_overlay(palette, area, buf);
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_pause_overlay(palette: &Palette, area: Rect, buf: &mut Buffer) {
    let popup = centered_rect(36, 6, area);
    Clear.render(popup, buf);
    Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("(esc) resume", palette.base())),
        Line::from(Span::styled("(r)estart / (q)uit run", palette.base())),
    ])
    .alignment(Alignment::Center)
    .style(palette.base())
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Paused ")
            .title_alignment(Alignment::Center)
            .border_style(palette.accent_bold()),
    )
    .render(popup, buf);
}

/// Draw sparks over the playfield; faded ones are dimmed
fn render_particles(particles: &ParticleSystem, palette: &Palette, field: Rect, buf: &mut Buffer) {
    for particle in particles.particles().iter().filter(|p| p.on_screen()) {
        let x = field.x + (particle.x * field.width as f64) as u16;
        let y = field.y + (particle.y * field.height as f64) as u16;
        if x >= field.right() || y >= field.bottom() {
            continue;
        }

        let mut style = Style::default().fg(palette.burst(particle.kind));
        if particle.age / particle.max_age > 0.6 {
            style = style.add_modifier(Modifier::DIM);
        } else {
            style = style.add_modifier(Modifier::BOLD);
        }

        if let Some(cell) = buf.cell_mut((x, y)) {
            cell.set_symbol(&particle.symbol.to_string());
            cell.set_style(style);
        }
    }
}

fn render_results(app: &App, palette: &Palette, area: Rect, buf: &mut Buffer) {
    let session = app.game.session();
    let summary = app.last_run.clone().unwrap_or_else(|| app.game.summary());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // chart
            Constraint::Length(1), // stats
            Constraint::Length(1), // unlocked achievements
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    let bold_style = palette.base().add_modifier(Modifier::BOLD);
    let tuples = as_chart_data(&session.wpm_coords);
    let (overall_duration, highest_wpm) =
        charting::compute_chart_params(&tuples, summary.elapsed_secs);

    let datasets = vec![Dataset::default()
        .marker(Marker::Braille)
        .style(palette.base().fg(palette.accent))
        .graph_type(GraphType::Line)
        .data(&tuples)];

    let chart = Chart::new(datasets)
        .style(palette.base())
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([0.0, overall_duration])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(overall_duration), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, highest_wpm])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(highest_wpm), bold_style),
                ]),
        );
    chart.render(chunks[0], buf);

    Paragraph::new(Span::styled(
        format!(
            "{} pts   {:.0} wpm   {:.0}% acc   level {}   max combo {}",
            summary.score, summary.wpm, summary.accuracy, summary.level, summary.max_combo
        ),
        bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    let note = if !summary.should_persist() {
        Span::styled("too short to count toward your stats", palette.dim_style())
    } else if app.last_unlocked.is_empty() {
        let rank = app.book.stats.rank();
        Span::styled(
            format!("rank {} · {} pts", rank.name, app.book.stats.progression_points),
            palette.dim_style(),
        )
    } else {
        let names: Vec<&str> = app.last_unlocked.iter().map(|a| a.name.as_str()).collect();
        Span::styled(
            format!("unlocked: {}", names.join(", ")),
            palette.base().fg(palette.combo).add_modifier(Modifier::BOLD),
        )
    };
    Paragraph::new(note)
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        "(r)eplay / (m)enu / (s)tats / (q)uit",
        palette.dim_style().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[4], buf);
}
