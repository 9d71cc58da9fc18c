//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! ## For contributors
//!
//! * The layout is a headline box on top, the unveiled previous article and
//!   the guess history side by side in the middle, and a one-line status
//!   bar at the bottom.
//! * [`ratatui`] is the TUI framework; see its docs for widget details.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::App;

/// Draw the complete UI for one frame.
pub fn draw(app: &App, frame: &mut Frame) {
    let [headline_area, body_area, status_area] = Layout::vertical([
        Constraint::Length(5),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let [previous_area, history_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .areas(body_area);

    draw_headline(app, frame, headline_area);
    draw_previous(app, frame, previous_area);
    draw_history(app, frame, history_area);
    draw_status_bar(app, frame, status_area);
}

fn draw_headline(app: &App, frame: &mut Frame, area: Rect) {
    let line = if app.is_waiting() {
        Line::from(Span::styled(
            "Fetching an article…",
            Style::default().fg(Color::DarkGray),
        ))
    } else if let Some(title) = &app.headline {
        Line::from(Span::styled(
            title.as_str(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(Span::styled(
            format!("Error: {}", app.failure.as_deref().unwrap_or_default()),
            Style::default().fg(Color::Red),
        ))
    };

    let headline = Paragraph::new(line)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(" Is it The Onion? ")
                .borders(Borders::ALL),
        );
    frame.render_widget(headline, area);
}

/// The article that was just guessed, with its link and preview image.
fn draw_previous(app: &App, frame: &mut Frame, area: Rect) {
    let mut lines = Vec::new();

    if let Some(correct) = app.last_outcome {
        let (mark, color) = if correct {
            ("Correct", Color::Green)
        } else {
            ("Incorrect", Color::Red)
        };
        lines.push(Line::from(Span::styled(
            mark,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
    }

    if let Some(prev) = &app.previous {
        lines.push(Line::from(prev.title.as_str()));
        lines.push(Line::from(Span::styled(
            format!("from r/{} ({})", prev.source_category, prev.source_category.label()),
            Style::default().fg(Color::Cyan),
        )));
        if let Some(link) = &prev.link {
            lines.push(Line::from(vec![
                Span::styled("link  ", Style::default().fg(Color::DarkGray)),
                Span::raw(link.as_str()),
            ]));
        }
        if let Some(image) = &prev.image_url {
            lines.push(Line::from(vec![
                Span::styled("image ", Style::default().fg(Color::DarkGray)),
                Span::raw(image.as_str()),
            ]));
        }
    }

    let previous = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().title(" Previous ").borders(Borders::ALL));
    frame.render_widget(previous, area);
}

fn draw_history(app: &App, frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = app
        .history
        .iter()
        .map(|record| {
            let (mark, color) = if record.correct {
                ("✓", Color::Green)
            } else {
                ("✗", Color::Red)
            };
            ListItem::new(Line::from(vec![
                Span::styled(
                    record.guessed_at.format("%H:%M:%S ").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(mark, Style::default().fg(color)),
                Span::raw(" "),
                Span::styled(
                    record.candidate.title.as_str(),
                    Style::default().fg(Color::White),
                ),
                Span::raw("  "),
                Span::styled(
                    format!("[{}]", record.candidate.source_category),
                    Style::default().fg(Color::Cyan),
                ),
            ]))
        })
        .collect();

    let list = List::new(items).block(Block::default().title(" History ").borders(Borders::ALL));
    frame.render_widget(list, area);
}

fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let totals = app
        .totals
        .map(|t| format!("all players: {} right / {} wrong", t.correct, t.incorrect))
        .unwrap_or_default();

    let status = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(app.status.as_str(), Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("attempts {}  streak {}", app.attempts, app.streak),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled(totals, Style::default().fg(Color::DarkGray)),
        Span::raw("  q: quit"),
    ]));
    frame.render_widget(status, area);
}
