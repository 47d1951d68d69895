use crate::app::App;
use crate::message::{Message, MessageType};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub fn draw<C>(f: &mut Frame, app: &App<C>) {
    let [content_area, input_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(3)]).areas(f.area());

    draw_game_content(f, app, content_area);
    draw_user_input(f, app, input_area);
}

pub fn draw_game_content<C>(f: &mut Frame, app: &App<C>, area: Rect) {
    let mut block = Block::default()
        .title(" Fantasy Adventure ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    if app.is_thinking() {
        block = block.title_bottom(Line::from(app.spinner().title()).centered());
    }

    let content_area = block.inner(area);
    f.render_widget(block, area);

    let max_width = content_area.width.saturating_sub(1).max(1) as usize;
    let max_height = content_area.height as usize;

    let all_lines = parse_game_content(app.game_content(), max_width);

    // The offset counts from the bottom, clamp it to the top of the transcript.
    let max_scroll = all_lines.len().saturating_sub(max_height);
    let start = max_scroll - app.scroll_offset().min(max_scroll);

    let visible_lines: Vec<Line> = all_lines
        .into_iter()
        .skip(start)
        .take(max_height)
        .map(|(mut line, alignment)| {
            line.alignment = Some(alignment);
            line
        })
        .collect();

    f.render_widget(Paragraph::new(visible_lines), content_area);
}

pub fn parse_game_content(messages: &[Message], max_width: usize) -> Vec<(Line<'static>, Alignment)> {
    let mut all_lines = Vec::new();

    for message in messages {
        let (base_style, alignment) = match message.message_type {
            MessageType::Game => (Style::default().fg(Color::Green), Alignment::Left),
            MessageType::User => (Style::default().fg(Color::Cyan), Alignment::Right),
            MessageType::System => (Style::default().fg(Color::Yellow), Alignment::Center),
        };

        if let Some(speaker) = &message.speaker {
            all_lines.push((
                Line::from(Span::styled(
                    format!("{speaker}:"),
                    base_style.add_modifier(Modifier::BOLD),
                )),
                alignment,
            ));
        }

        for line in textwrap::wrap(&message.content, max_width) {
            all_lines.push((parse_markdown(&line, base_style), alignment));
        }
        all_lines.push((Line::default(), alignment));
    }

    all_lines
}

pub fn draw_user_input<C>(f: &mut Frame, app: &App<C>, area: Rect) {
    let block = Block::default()
        .title(" Your action: 'Enter' to send, 'PgUp'/'PgDn' to scroll, 'Esc' to quit ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if app.is_thinking() {
            Color::DarkGray
        } else {
            Color::White
        }));

    let inner_area = block.inner(area);
    f.render_widget(block, area);

    // Keep the end of a long input in view, the cursor sits after it.
    let max_width = inner_area.width.saturating_sub(1) as usize;
    let char_count = app.input().chars().count();
    let visible: String = app
        .input()
        .chars()
        .skip(char_count.saturating_sub(max_width))
        .collect();
    let cursor_x = visible.chars().count() as u16;

    let input = Paragraph::new(visible).style(Style::default().fg(Color::Yellow));
    f.render_widget(input, inner_area);

    f.set_cursor_position(Position::new(inner_area.x + cursor_x, inner_area.y));
}

/// Renders `###` headers and `**bold**` runs; everything else keeps `base_style`.
fn parse_markdown(line: &str, base_style: Style) -> Line<'static> {
    if let Some(header) = line.trim_start().strip_prefix("###") {
        return Line::from(Span::styled(
            header.trim().to_uppercase(),
            base_style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        ));
    }

    // Odd segments sit between a pair of `**` markers.
    let spans: Vec<Span<'static>> = line
        .split("**")
        .enumerate()
        .filter(|(_, segment)| !segment.is_empty())
        .map(|(i, segment)| {
            let style = if i % 2 == 1 {
                base_style.add_modifier(Modifier::BOLD)
            } else {
                base_style
            };
            Span::styled(segment.to_string(), style)
        })
        .collect();

    Line::from(spans)
}
