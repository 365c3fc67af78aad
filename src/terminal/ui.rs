use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::terminal::view::{ComposeView, DetailView, ListView, RowTone, Screen, View};

pub fn draw(f: &mut Frame, screen: &Screen) {
    let [top, main, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(f.area());

    draw_tabs(f, top, screen);

    match &screen.body {
        View::MailboxList(list) => draw_list(f, main, list),
        View::Compose(compose) => draw_compose(f, main, compose),
        View::Detail(detail) => draw_detail(f, main, detail.as_ref()),
    }

    f.render_widget(Paragraph::new(hints(&screen.body)), footer);

    if let Some(msg) = &screen.alert {
        draw_alert(f, msg);
    }
}

fn key_hint(key: &str, what: &str) -> Vec<Span<'static>> {
    vec![
        Span::styled(key.to_string(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(" {what}  ")),
    ]
}

fn draw_tabs(f: &mut Frame, area: Rect, screen: &Screen) {
    let mut spans = Vec::new();
    for (key, name) in [("i", "Inbox"), ("c", "Compose"), ("s", "Sent"), ("a", "Archived")] {
        spans.extend(key_hint(key, name));
    }
    spans.push(Span::styled(
        screen.user.clone(),
        Style::default().fg(Color::Cyan),
    ));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_list(f: &mut Frame, area: Rect, list: &ListView) {
    let block = Block::default()
        .title(format!(" {} ", list.header))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let items: Vec<ListItem> = list
        .rows
        .iter()
        .map(|r| {
            let style = match r.tone {
                RowTone::Unread => Style::default().add_modifier(Modifier::BOLD),
                RowTone::Read => Style::default().fg(Color::Gray).bg(Color::DarkGray),
            };
            ListItem::new(Text::from(vec![
                Line::from(vec![Span::raw("From: "), Span::raw(r.sender.clone())]),
                Line::from(vec![Span::raw("Subject: "), Span::raw(r.subject.clone())]),
                Line::from(vec![Span::raw("Time: "), Span::raw(r.timestamp.clone())]),
            ]))
            .style(style)
        })
        .collect();

    let widget = List::new(items)
        .block(block)
        .highlight_symbol("➜ ")
        .highlight_style(Style::default().fg(Color::Green));

    let mut state = ListState::default();
    state.select(list.selected);
    f.render_stateful_widget(widget, area, &mut state);
}

fn draw_compose(f: &mut Frame, area: Rect, compose: &ComposeView) {
    let block = Block::default()
        .title(" New Email ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [to, subject, body] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(3),
    ])
    .areas(inner);

    for (field, area) in compose.fields.iter().zip([to, subject, body]) {
        let border = if field.focused {
            Color::Green
        } else {
            Color::DarkGray
        };
        let cursor = if field.focused { compose.cursor } else { 0 };
        let layout = field_layout(&field.value, cursor, area);
        let p = Paragraph::new(layout.rows.into_iter().map(Line::from).collect::<Vec<_>>())
            .block(
                Block::default()
                    .title(format!(" {} ", field.label))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border)),
            )
            .scroll((layout.scroll, 0));
        f.render_widget(p, area);

        if field.focused {
            f.set_cursor_position(layout.cursor);
        }
    }
}

/// A field's text broken into rows that fit its bordered area, scrolled so
/// the cursor stays visible.
struct FieldLayout {
    rows: Vec<String>,
    scroll: u16,
    cursor: Position,
}

fn field_layout(value: &str, cursor: usize, area: Rect) -> FieldLayout {
    let width = usize::from(area.width.saturating_sub(2).max(1));
    let height = usize::from(area.height.saturating_sub(2).max(1));

    let (row, col) = cursor_cell(value, cursor, width);
    let scroll = row.saturating_sub(height - 1);

    // row - scroll < height and col < width, both fit the area
    let x = area.x.saturating_add(1).saturating_add(col as u16);
    let y = area.y.saturating_add(1).saturating_add((row - scroll) as u16);

    FieldLayout {
        rows: char_rows(value, width),
        scroll: u16::try_from(scroll).unwrap_or(u16::MAX),
        cursor: Position::new(x, y),
    }
}

/// Breaks at newlines and after every `width` chars.
fn char_rows(value: &str, width: usize) -> Vec<String> {
    let mut rows = Vec::new();
    for line in value.split('\n') {
        let chars: Vec<char> = line.chars().collect();
        if chars.is_empty() {
            rows.push(String::new());
        } else {
            rows.extend(chars.chunks(width).map(|c| c.iter().collect::<String>()));
        }
    }
    rows
}

/// Row and column of char offset `cursor` in the `char_rows` layout.
fn cursor_cell(value: &str, cursor: usize, width: usize) -> (usize, usize) {
    let (mut row, mut col) = (0, 0);
    for c in value.chars().take(cursor) {
        if c == '\n' {
            row += 1;
            col = 0;
            continue;
        }
        if col == width {
            row += 1;
            col = 0;
        }
        col += 1;
    }
    if col == width { (row + 1, 0) } else { (row, col) }
}

fn draw_detail(f: &mut Frame, area: Rect, detail: Option<&DetailView>) {
    let block = Block::default()
        .title(" Email ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let Some(d) = detail else {
        f.render_widget(Paragraph::new("").block(block), area);
        return;
    };

    let mut controls = Vec::new();
    for c in &d.controls {
        controls.push(Span::styled(
            format!("[{}] {}", c.key, c.label),
            Style::default().fg(Color::Cyan),
        ));
        controls.push(Span::raw("  "));
    }

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(controls),
        Line::raw(""),
        Line::from(vec![Span::styled("From: ", bold), Span::raw(d.sender.clone())]),
        Line::from(vec![Span::styled("To: ", bold), Span::raw(d.recipients.clone())]),
        Line::from(vec![Span::styled("Subject: ", bold), Span::raw(d.subject.clone())]),
        Line::from(vec![
            Span::styled("Timestamp: ", bold),
            Span::raw(d.timestamp.clone()),
        ]),
        Line::raw(""),
    ];
    lines.extend(d.body_lines.iter().map(|l| Line::raw(l.clone())));

    let p = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);
}

fn draw_alert(f: &mut Frame, msg: &str) {
    let [area] = Layout::vertical([Constraint::Length(5)])
        .flex(Flex::Center)
        .areas(f.area());
    let [area] = Layout::horizontal([Constraint::Percentage(50)])
        .flex(Flex::Center)
        .areas(area);

    let p = Paragraph::new(vec![Line::raw(msg.to_string()), Line::raw(""), Line::raw("Enter: OK")])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(Clear, area);
    f.render_widget(p, area);
}

fn hints(body: &View) -> Line<'static> {
    let mut spans = Vec::new();
    match body {
        View::MailboxList(_) => {
            spans.extend(key_hint("j/k", "move"));
            spans.extend(key_hint("Enter", "open"));
            spans.extend(key_hint("q", "quit"));
        }
        View::Compose(_) => {
            spans.extend(key_hint("Tab", "next field"));
            spans.extend(key_hint("Ctrl-S", "send"));
            spans.extend(key_hint("Esc", "cancel"));
        }
        View::Detail(_) => {
            spans.extend(key_hint("Esc", "back"));
            spans.extend(key_hint("q", "quit"));
        }
    }
    Line::from(spans)
}
