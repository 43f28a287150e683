use crate::{
    screens::pr_editor::{ContentState, PrEditorScreen},
    syntax_highlight::HighlightedLine,
    theme::Theme,
};
use ratatui::{
    layout::{Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

fn gutter_width(line_count: usize) -> usize {
    line_count.max(1).to_string().len().max(3)
}

pub fn render(f: &mut Frame, area: Rect, screen: &mut PrEditorScreen, theme: &Theme, is_focused: bool) {
    let border_style = if is_focused {
        Style::default().fg(theme.border_focused())
    } else {
        Style::default().fg(theme.border())
    };

    let Some(filename) = screen.selected_file().map(|file| file.filename.clone()) else {
        let block = Block::default()
            .title(" Editor ")
            .borders(Borders::ALL)
            .border_style(border_style)
            .style(Style::default().bg(theme.bg()));
        let hint = Paragraph::new("Select a file to view its content")
            .style(Style::default().fg(theme.muted()))
            .block(block);
        f.render_widget(hint, area);
        return;
    };

    let content = screen.content_state();
    let editing = screen.is_editing();
    let mut title = format!(" {filename} ");
    if screen.buffer().is_modified() {
        title.push_str("[modified] ");
    }
    if editing {
        title.push_str("-- INSERT -- ");
    }

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
        .style(Style::default().bg(theme.bg()).fg(theme.fg()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if content == ContentState::Loading {
        let loading = Paragraph::new("Loading file...").style(Style::default().fg(theme.muted()));
        f.render_widget(loading, inner);
        return;
    }

    let height = usize::from(inner.height);
    screen.buffer_mut().scroll_to_cursor(height);
    let scroll = screen.buffer().scroll();
    let highlighted: Option<Vec<HighlightedLine>> = screen
        .highlighted_lines(&theme.name, scroll + height)
        .map(|lines| lines.iter().skip(scroll).cloned().collect());
    let buffer = screen.buffer();
    let gutter = gutter_width(buffer.lines().len());

    let text_style = match content {
        ContentState::Failed => Style::default().fg(theme.error()),
        _ => Style::default().fg(theme.fg()),
    };

    let mut lines = Vec::with_capacity(height);
    for (offset, text) in buffer.lines().iter().skip(scroll).take(height).enumerate() {
        let spans = highlighted
            .as_ref()
            .and_then(|visible| visible.get(offset))
            .cloned()
            .unwrap_or_else(|| vec![(text_style, text.clone())]);

        let mut line = vec![Span::styled(
            format!("{:>gutter$} ", scroll + offset + 1),
            Style::default().fg(theme.line_number()),
        )];
        line.extend(spans.into_iter().map(|(style, text)| Span::styled(text, style)));
        lines.push(Line::from(line));
    }

    f.render_widget(Paragraph::new(lines), inner);

    let total = buffer.lines().len();
    if total > height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .thumb_style(Style::default().fg(theme.accent()))
            .track_style(Style::default().fg(theme.border()));
        let mut state = ScrollbarState::new(total.saturating_sub(height)).position(scroll);
        f.render_stateful_widget(scrollbar, area, &mut state);
    }

    let (row, col) = buffer.cursor();
    let x = inner.x as usize + gutter + 1 + col;
    let y = inner.y as usize + row.saturating_sub(scroll);
    if is_focused && x < inner.right() as usize && y < inner.bottom() as usize {
        if editing {
            f.set_cursor_position(Position::new(x as u16, y as u16));
        } else if let Some(cell) = f.buffer_mut().cell_mut(Position::new(x as u16, y as u16)) {
            cell.set_style(
                Style::default()
                    .bg(theme.cursor())
                    .add_modifier(Modifier::REVERSED),
            );
        }
    }
}
