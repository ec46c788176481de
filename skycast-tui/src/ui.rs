//! Frame rendering: the backdrop plus one centered card with the search
//! field, status line, current conditions and the 5-day strip.

use chrono::Local;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use skycast_core::{ForecastSample, GradientToken, WeatherReport};

use crate::app::App;
use crate::backdrop::Backdrop;

const CARD_WIDTH: u16 = 50;
const CARD_HEIGHT: u16 = 19;

pub fn draw(f: &mut Frame, app: &App, backdrop: &Backdrop, mono: bool) {
    let area = f.size();
    if !mono {
        f.render_widget(backdrop, area);
    }

    let palette = Palette::for_scene(app, mono);
    let card = centered(area, CARD_WIDTH, CARD_HEIGHT);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" skycast ")
        .title_alignment(Alignment::Center)
        .border_style(palette.text);
    let inner = block.inner(card);
    f.render_widget(block, card);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // search field
            Constraint::Length(1), // status line
            Constraint::Length(4), // current conditions
            Constraint::Length(7), // 5-day strip
            Constraint::Min(0),
            Constraint::Length(1), // key hints
        ])
        .split(inner);

    render_search(f, rows[0], app, &palette);
    render_status(f, rows[1], app, &palette);
    render_current(f, rows[2], app, &palette);
    render_forecast(f, rows[3], app.report.as_ref(), &palette);
    render_hints(f, rows[5], &palette);
}

/// Foreground colors matched to the backdrop so text stays readable on
/// both the dark and the washed-out gradients.
struct Palette {
    text: Style,
    faint: Style,
    error: Style,
}

impl Palette {
    fn for_scene(app: &App, mono: bool) -> Self {
        if mono {
            return Self {
                text: Style::default(),
                faint: Style::default().add_modifier(Modifier::DIM),
                error: Style::default().add_modifier(Modifier::BOLD),
            };
        }

        let dark_backdrop = matches!(
            app.scene().gradient,
            GradientToken::Slate | GradientToken::Azure
        );

        if dark_backdrop {
            Self {
                text: Style::default().fg(Color::Rgb(0xf8, 0xfa, 0xfc)),
                faint: Style::default().fg(Color::Rgb(0xcb, 0xd5, 0xe1)),
                error: Style::default().fg(Color::Rgb(0xfc, 0xa5, 0xa5)),
            }
        } else {
            Self {
                text: Style::default().fg(Color::Rgb(0x1e, 0x29, 0x3b)),
                faint: Style::default().fg(Color::Rgb(0x47, 0x55, 0x69)),
                error: Style::default().fg(Color::Rgb(0xb9, 0x1c, 0x1c)),
            }
        }
    }
}

fn render_search(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Search")
        .border_style(palette.faint);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.input.is_empty() {
        f.render_widget(
            Paragraph::new("Enter city name...").style(palette.faint),
            inner,
        );
    } else {
        let visible = visible_tail(&app.input, inner.width.saturating_sub(1) as usize);
        f.render_widget(
            Paragraph::new(visible.as_str()).style(palette.text),
            inner,
        );
    }

    // Caret after the (possibly scrolled) text.
    let caret = visible_width(&app.input).min(inner.width.saturating_sub(1) as usize) as u16;
    f.set_cursor(inner.x + caret, inner.y);
}

fn render_status(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let line = if app.detecting {
        Line::styled("Detecting your location...", palette.faint)
    } else if app.loading {
        Line::styled("Loading...", palette.faint)
    } else if let Some(error) = &app.error {
        Line::styled(error.clone(), palette.error.add_modifier(Modifier::BOLD))
    } else {
        Line::default()
    };

    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_current(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let Some(report) = &app.report else {
        if app.error.is_none() && !app.loading && !app.detecting {
            f.render_widget(
                Paragraph::new("Type a city name to begin.")
                    .style(palette.faint)
                    .alignment(Alignment::Center),
                area,
            );
        }
        return;
    };

    let current = &report.current;
    let lines = vec![
        Line::styled(
            current.name.clone(),
            palette.text.add_modifier(Modifier::BOLD),
        ),
        // The current reading keeps the provider's precision; only the
        // forecast cards round.
        Line::styled(
            format!("{}°C", current.temp_c),
            palette.text.add_modifier(Modifier::BOLD),
        ),
        Line::styled(capitalize_words(&current.description), palette.faint),
    ];

    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        area,
    );
}

fn render_forecast(f: &mut Frame, area: Rect, report: Option<&WeatherReport>, palette: &Palette) {
    let Some(report) = report else { return };
    let samples = report.daily.samples();
    if samples.is_empty() {
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    f.render_widget(
        Paragraph::new(Line::styled("5-Day Forecast", palette.faint))
            .alignment(Alignment::Center),
        rows[0],
    );

    let constraints: Vec<Constraint> = samples
        .iter()
        .map(|_| Constraint::Ratio(1, samples.len() as u32))
        .collect();
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(rows[1]);

    for (sample, cell) in samples.iter().zip(cells.iter()) {
        render_forecast_cell(f, *cell, sample, palette);
    }
}

fn render_forecast_cell(f: &mut Frame, area: Rect, sample: &ForecastSample, palette: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.faint);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = vec![
        Line::styled(weekday(sample), palette.faint),
        Line::styled(icon_glyph(&sample.icon).to_string(), palette.text),
        Line::styled(
            format!("{}°", sample.temp_c.round() as i64),
            palette.text.add_modifier(Modifier::BOLD),
        ),
    ];

    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        inner,
    );
}

fn render_hints(f: &mut Frame, area: Rect, palette: &Palette) {
    let hints = Line::from(vec![
        Span::styled("Enter", palette.text.add_modifier(Modifier::BOLD)),
        Span::styled(" search  ", palette.faint),
        Span::styled("Esc", palette.text.add_modifier(Modifier::BOLD)),
        Span::styled(" quit", palette.faint),
    ]);
    f.render_widget(
        Paragraph::new(hints).alignment(Alignment::Center),
        area,
    );
}

/// Short weekday of the sample, in the viewer's timezone.
fn weekday(sample: &ForecastSample) -> String {
    sample
        .timestamp()
        .map(|ts| ts.with_timezone(&Local).format("%a").to_string())
        .unwrap_or_else(|| "--".to_string())
}

/// Map an OpenWeather icon code ("10d", "01n", ...) to a glyph.
fn icon_glyph(icon: &str) -> &'static str {
    match icon.get(..2) {
        Some("01") => "☀",
        Some("02") => "⛅",
        Some("03") | Some("04") => "☁",
        Some("09") | Some("10") => "🌧",
        Some("11") => "⛈",
        Some("13") => "❄",
        Some("50") => "🌫",
        _ => "·",
    }
}

/// Uppercase the first letter of every word, as the provider descriptions
/// come all-lowercase ("broken clouds").
fn capitalize_words(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Last `max` characters of the input, for when the text outgrows the box.
fn visible_tail(input: &str, max: usize) -> String {
    let count = input.chars().count();
    input.chars().skip(count.saturating_sub(max)).collect()
}

fn visible_width(input: &str) -> usize {
    input.chars().count()
}

/// Center a `width` x `height` rectangle inside `area`, clamped to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};
    use skycast_core::{CurrentConditions, ForecastSeries};

    fn render_to_text(app: &App) -> Vec<String> {
        let backend = TestBackend::new(60, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let backdrop = Backdrop::new();
        terminal.draw(|f| draw(f, app, &backdrop, true)).unwrap();

        let buffer = terminal.backend().buffer().clone();
        let mut rows = Vec::new();
        for y in 0..buffer.area.height {
            let mut row = String::new();
            for x in 0..buffer.area.width {
                row.push_str(buffer.get(x, y).symbol());
            }
            rows.push(row);
        }
        rows
    }

    fn contains(rows: &[String], needle: &str) -> bool {
        rows.iter().any(|row| row.contains(needle))
    }

    #[test]
    fn empty_widget_shows_placeholder_and_prompt() {
        let app = App::new();
        let rows = render_to_text(&app);

        assert!(contains(&rows, "Enter city name..."));
        assert!(contains(&rows, "Type a city name to begin."));
    }

    #[test]
    fn detection_status_takes_precedence() {
        let mut app = App::new();
        app.detecting = true;
        app.loading = true;

        let rows = render_to_text(&app);
        assert!(contains(&rows, "Detecting your location..."));
        assert!(!contains(&rows, "Loading..."));
    }

    #[test]
    fn error_is_shown_without_weather_data() {
        let mut app = App::new();
        app.input = "Atlantis".to_string();
        app.error = Some("City not found".to_string());

        let rows = render_to_text(&app);
        assert!(contains(&rows, "City not found"));
        assert!(contains(&rows, "Atlantis"));
    }

    #[test]
    fn report_renders_name_temp_and_forecast_strip() {
        let mut app = App::new();
        app.report = Some(WeatherReport {
            current: CurrentConditions {
                name: "London".to_string(),
                temp_c: 17.6,
                condition: "Clouds".to_string(),
                description: "broken clouds".to_string(),
            },
            daily: ForecastSeries::from_three_hourly((0..40).map(|i| ForecastSample {
                dt: 1_755_907_200 + i * 10_800,
                temp_c: 12.4,
                icon: "04d".to_string(),
            })),
        });

        let rows = render_to_text(&app);
        assert!(contains(&rows, "London"));
        assert!(contains(&rows, "17.6°C"), "current reading is not rounded");
        assert!(contains(&rows, "Broken Clouds"));
        assert!(contains(&rows, "5-Day Forecast"));
        assert!(contains(&rows, "12°"), "forecast cards are rounded");
    }

    #[test]
    fn icon_glyphs_cover_the_code_table() {
        assert_eq!(icon_glyph("01d"), "☀");
        assert_eq!(icon_glyph("02n"), "⛅");
        assert_eq!(icon_glyph("03d"), "☁");
        assert_eq!(icon_glyph("04n"), "☁");
        assert_eq!(icon_glyph("09d"), "🌧");
        assert_eq!(icon_glyph("10n"), "🌧");
        assert_eq!(icon_glyph("11d"), "⛈");
        assert_eq!(icon_glyph("13d"), "❄");
        assert_eq!(icon_glyph("50d"), "🌫");
        assert_eq!(icon_glyph(""), "·");
        assert_eq!(icon_glyph("99x"), "·");
    }

    #[test]
    fn capitalize_words_matches_display_style() {
        assert_eq!(capitalize_words("broken clouds"), "Broken Clouds");
        assert_eq!(capitalize_words("light rain"), "Light Rain");
        assert_eq!(capitalize_words(""), "");
    }

    #[test]
    fn visible_tail_keeps_the_end_of_long_input() {
        assert_eq!(visible_tail("London", 10), "London");
        assert_eq!(visible_tail("Llanfairpwllgwyngyll", 6), "yngyll");
        assert_eq!(visible_tail("Kyiv", 2), "iv");
    }

    #[test]
    fn centered_clamps_to_small_areas() {
        let area = Rect::new(0, 0, 20, 10);
        let rect = centered(area, 50, 19);
        assert_eq!(rect.width, 20);
        assert_eq!(rect.height, 10);

        let rect = centered(Rect::new(0, 0, 100, 40), 50, 19);
        assert_eq!(rect.x, 25);
        assert_eq!(rect.width, 50);
    }
}
