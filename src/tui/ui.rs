//! Rendering of the explorer screen.

use std::collections::VecDeque;

use geo::{BoundingRect, Contains, Point};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine, Map, MapResolution, Points};
use ratatui::widgets::block::{Position, Title};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::map::{to_polygon, Emphasis, MapView, StyledPolygon, TileSource, Viewport};
use crate::service::CacheStatus;
use crate::shell::ShellState;
use crate::types::history::{format_year, HistoricalEntity};

const ACCENT: Color = Color::Indexed(63);
const MUTED: Color = Color::DarkGray;
const ERROR: Color = Color::Rgb(225, 29, 72);
const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];
const DETAIL_WIDTH: u16 = 38;

/// Log lines shown in the footer.
pub struct UiState {
    pub logs: VecDeque<String>,
    pub max_logs: usize,
    pub frame: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            logs: VecDeque::new(),
            max_logs: 2,
            frame: 0,
        }
    }
}

impl UiState {
    pub fn push_log<S: Into<String>>(&mut self, line: S) {
        let mut text: String = line.into();
        while text.ends_with('\n') || text.ends_with('\r') {
            text.pop();
        }
        if text.is_empty() {
            return;
        }
        self.logs.push_front(text);
        while self.logs.len() > self.max_logs {
            self.logs.pop_back();
        }
    }

    pub fn tick(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }

    fn spinner(&self) -> &'static str {
        SPINNER[self.frame % SPINNER.len()]
    }
}

/// Everything one frame needs.
pub struct Screen<'a> {
    pub state: &'a ShellState,
    pub map: &'a MapView,
    pub tiles: &'a TileSource,
    pub ui: &'a UiState,
    pub cache: Option<&'a CacheStatus>,
}

/// Draws the screen and returns the inner rectangle of the map canvas.
pub fn draw_ui(frame: &mut Frame, screen: &Screen<'_>) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(6),
            Constraint::Length(2 + screen.ui.max_logs as u16),
        ])
        .split(frame.size());

    draw_header(frame, screen, chunks[0]);
    let map_inner = draw_map(frame, screen, chunks[1]);
    draw_footer(frame, screen, chunks[2]);

    if let Some(entity) = &screen.state.selected {
        draw_detail_panel(frame, entity, map_inner);
    }
    draw_loading(frame, screen, map_inner);

    map_inner
}

fn draw_header(frame: &mut Frame, screen: &Screen<'_>, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let title = Paragraph::new(vec![
        Line::from(Span::styled(
            "Iberia Chronos",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled("INSTANT EXPLORER", Style::default().fg(MUTED))),
        Line::from(Span::styled(
            "Results are cached for instant navigation between eras.",
            Style::default().fg(Color::Gray),
        )),
    ])
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, columns[0]);

    let state = screen.state;
    let action = if state.loading {
        Span::styled(format!(" {} ", screen.ui.spinner()), Style::default().fg(ACCENT))
    } else {
        Span::styled(" ⏎ search ", Style::default().fg(MUTED))
    };

    let mut lines = vec![Line::from(vec![
        Span::raw("Year "),
        Span::styled(
            format!("{}▏", state.input),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        action,
        Span::styled("(e.g. 711 or 300 BC)", Style::default().fg(MUTED)),
    ])];

    match &state.error {
        Some(error) => lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(ERROR).add_modifier(Modifier::BOLD),
        ))),
        None => lines.push(Line::from("")),
    }

    lines.push(Line::from(vec![
        Span::styled("SELECTED ERA ", Style::default().fg(MUTED)),
        Span::styled(
            state.era_label(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  │  ENTITIES ", Style::default().fg(MUTED)),
        Span::styled(
            state.entity_count().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]));

    let form = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(form, columns[1]);
}

fn draw_map(frame: &mut Frame, screen: &Screen<'_>, area: Rect) -> Rect {
    let block = Block::default().borders(Borders::ALL).title(Span::styled(
        " Iberian Peninsula ",
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
    ));
    let inner = block.inner(area);

    let viewport = screen.map.viewport(map_aspect(inner));
    let styled = screen
        .map
        .styled(screen.state.entities(), screen.state.selected_name());
    let fills: Vec<Vec<(f64, f64)>> = styled
        .iter()
        .map(|polygon| fill_points(polygon, &viewport, inner.width, inner.height))
        .collect();

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([viewport.lon_min, viewport.lon_max])
        .y_bounds([viewport.lat_min, viewport.lat_max])
        .paint(|ctx| {
            ctx.draw(&Map {
                color: MUTED,
                resolution: MapResolution::High,
            });
            ctx.layer();

            for (polygon, fill) in styled.iter().zip(&fills) {
                let color = parse_css_color(&polygon.style.color);
                ctx.draw(&Points {
                    coords: fill,
                    color,
                });
                for segment in outline(polygon, &viewport, inner.width) {
                    ctx.draw(&CanvasLine {
                        x1: segment.0,
                        y1: segment.1,
                        x2: segment.2,
                        y2: segment.3,
                        color,
                    });
                }
            }
            ctx.layer();

            for polygon in &styled {
                let Some([lat, lon]) = polygon.entity.label_anchor() else {
                    continue;
                };
                if !viewport.contains(lat, lon) {
                    continue;
                }
                let mut style = Style::default()
                    .fg(Color::White)
                    .bg(parse_css_color(&polygon.style.color));
                if polygon.emphasis != Emphasis::Normal {
                    style = style.add_modifier(Modifier::BOLD);
                }
                ctx.print(lon, lat, Span::styled(polygon.entity.name.to_uppercase(), style));
            }
        });

    frame.render_widget(canvas, area);
    inner
}

/// Height/width ratio of the map area; terminal cells are about twice as
/// tall as wide.
pub fn map_aspect(area: Rect) -> f64 {
    if area.width == 0 {
        1.0
    } else {
        f64::from(area.height) * 2.0 / f64::from(area.width)
    }
}

/// Interior sample points; denser for higher fill opacity.
fn fill_points(polygon: &StyledPolygon<'_>, viewport: &Viewport, cols: u16, rows: u16) -> Vec<(f64, f64)> {
    if !polygon.entity.is_drawable() || cols == 0 || rows == 0 {
        return Vec::new();
    }

    let shape = to_polygon(polygon.entity);
    let Some(bounds) = shape.bounding_rect() else {
        return Vec::new();
    };

    // Braille: 2x4 dots per cell.
    let dots_x = usize::from(cols) * 2;
    let dots_y = usize::from(rows) * 4;
    let step = ((3.0 / polygon.style.fill_opacity.max(0.1)).floor() as usize).max(1);
    let dx = (viewport.lon_max - viewport.lon_min) / dots_x as f64;
    let dy = (viewport.lat_max - viewport.lat_min) / dots_y as f64;

    let mut points = Vec::new();
    for i in (0..dots_x).step_by(step) {
        let lon = viewport.lon_min + (i as f64 + 0.5) * dx;
        if lon < bounds.min().x || lon > bounds.max().x {
            continue;
        }
        for j in (0..dots_y).step_by(step) {
            let lat = viewport.lat_min + (j as f64 + 0.5) * dy;
            if lat < bounds.min().y || lat > bounds.max().y {
                continue;
            }
            if shape.contains(&Point::new(lon, lat)) {
                points.push((lon, lat));
            }
        }
    }
    points
}

/// Outline segments `(x1, y1, x2, y2)`; heavier strokes add offset passes.
fn outline(polygon: &StyledPolygon<'_>, viewport: &Viewport, cols: u16) -> Vec<(f64, f64, f64, f64)> {
    let points = &polygon.entity.boundary_points;
    if points.len() < 2 {
        return Vec::new();
    }

    let dot = if cols == 0 {
        0.0
    } else {
        (viewport.lon_max - viewport.lon_min) / (f64::from(cols) * 2.0)
    };
    let passes = (polygon.style.weight / 1.5).round().max(1.0) as usize;
    let offsets: Vec<f64> = (0..passes)
        .map(|k| match k {
            0 => 0.0,
            k if k % 2 == 1 => dot * ((k + 1) / 2) as f64,
            k => -dot * (k / 2) as f64,
        })
        .collect();

    let mut segments = Vec::with_capacity(points.len() * offsets.len());
    for offset in offsets {
        for (a, b) in points.iter().zip(points.iter().cycle().skip(1)) {
            segments.push((a[1] + offset, a[0] + offset, b[1] + offset, b[0] + offset));
        }
    }
    segments
}

fn draw_detail_panel(frame: &mut Frame, entity: &HistoricalEntity, map_area: Rect) {
    if map_area.width < 10 || map_area.height < 6 {
        return;
    }
    let width = DETAIL_WIDTH.min(map_area.width.saturating_sub(2));
    let height = 10.min(map_area.height.saturating_sub(2));
    let area = Rect {
        x: map_area.x + 1,
        y: map_area.y + (map_area.height - height) / 2,
        width,
        height,
    };

    let color = parse_css_color(&entity.color);
    let panel = Paragraph::new(vec![
        Line::from(Span::styled("━".repeat(width as usize), Style::default().fg(color))),
        Line::from(Span::styled(
            entity.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(entity.description.clone()),
    ])
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(Span::styled(" HISTORICAL RECORD ", Style::default().fg(MUTED)))
            .title(
                Title::from(Span::styled(" Esc ✕ ", Style::default().fg(MUTED)))
                    .position(Position::Bottom)
                    .alignment(Alignment::Right),
            ),
    );

    frame.render_widget(Clear, area);
    frame.render_widget(panel, area);
}

fn draw_loading(frame: &mut Frame, screen: &Screen<'_>, map_area: Rect) {
    if !screen.state.loading {
        return;
    }

    let spinner = screen.ui.spinner();
    let (lines, width, height) = if screen.state.data.is_some() {
        (
            vec![Line::from(Span::styled(
                format!("{} UPDATING BORDERS...", spinner),
                Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
            ))],
            26,
            3,
        )
    } else {
        (
            vec![
                Line::from(Span::styled(spinner, Style::default().fg(ACCENT))),
                Line::from(Span::styled(
                    "Accessing History",
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    "GENERATING MAP...",
                    Style::default().fg(ACCENT).add_modifier(Modifier::ITALIC),
                )),
            ],
            28,
            5,
        )
    };

    let width = width.min(map_area.width);
    let height = height.min(map_area.height);
    let y = if screen.state.data.is_some() {
        map_area.y + 1.min(map_area.height.saturating_sub(height))
    } else {
        map_area.y + (map_area.height - height) / 2
    };
    let area = Rect {
        x: map_area.x + (map_area.width - width) / 2,
        y,
        width,
        height,
    };

    let overlay = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(Clear, area);
    frame.render_widget(overlay, area);
}

fn draw_footer(frame: &mut Frame, screen: &Screen<'_>, area: Rect) {
    let mut lines = vec![Line::from(vec![
        Span::styled(screen.tiles.attribution().to_string(), Style::default().fg(MUTED)),
        Span::styled(
            screen
                .cache
                .map(|status| format!("   {}", cache_summary(status, screen.state)))
                .unwrap_or_default(),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(
            "   click: select  Tab: cycle  PgUp/PgDn: zoom  arrows: pan  Ctrl+C: quit",
            Style::default().fg(MUTED),
        ),
    ])];
    for log in screen.ui.logs.iter() {
        lines.push(Line::from(Span::styled(log.clone(), Style::default().fg(Color::Gray))));
    }

    let footer = Paragraph::new(lines).block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, area);
}

/// One-line cache summary: size, hit rate and when the shown year was stored.
fn cache_summary(status: &CacheStatus, state: &ShellState) -> String {
    let mut summary = format!(
        "cache: {} eras, {:.0}% hits",
        status.stats.size,
        status.stats.hit_rate() * 100.0
    );
    if let Some(at) = status.cached_at {
        summary.push_str(&format!(
            ", {} cached {} UTC",
            format_year(state.year),
            at.format("%H:%M:%S")
        ));
    }
    summary
}

/// Maps a CSS color string to a terminal color.
///
/// Supports `#rgb`, `#rrggbb`, `rgb(r, g, b)` and common names; anything
/// else renders gray.
pub fn parse_css_color(value: &str) -> Color {
    let value = value.trim().to_ascii_lowercase();

    if let Some(hex) = value.strip_prefix('#') {
        if !hex.is_ascii() {
            return Color::Gray;
        }
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return Color::Gray,
        };
        let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
        return match (channel(0), channel(2), channel(4)) {
            (Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
            _ => Color::Gray,
        };
    }

    if let Some(args) = value
        .strip_prefix("rgb(")
        .or_else(|| value.strip_prefix("rgba("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let parts: Vec<u8> = args
            .split(',')
            .take(3)
            .filter_map(|p| p.trim().parse::<f64>().ok())
            .map(|v| v.clamp(0.0, 255.0) as u8)
            .collect();
        return match parts.as_slice() {
            [r, g, b] => Color::Rgb(*r, *g, *b),
            _ => Color::Gray,
        };
    }

    match value.as_str() {
        "red" | "crimson" | "darkred" => Color::Red,
        "green" | "darkgreen" | "forestgreen" => Color::Green,
        "blue" | "navy" | "darkblue" | "royalblue" => Color::Blue,
        "yellow" | "gold" => Color::Yellow,
        "orange" | "darkorange" => Color::Rgb(249, 115, 22),
        "purple" | "magenta" | "violet" => Color::Magenta,
        "cyan" | "teal" | "turquoise" => Color::Cyan,
        "brown" | "saddlebrown" | "sienna" => Color::Rgb(146, 64, 14),
        "black" => Color::Black,
        "white" => Color::White,
        _ => Color::Gray,
    }
}
