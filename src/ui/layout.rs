use crate::{
    screens::{Alert, AlertLevel, Prompt},
    theme::Theme,
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub struct AppLayout;

impl AppLayout {
    /// Header line, screen content, key hint bar.
    pub fn split_main(area: Rect) -> (Rect, Rect, Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(area);

        (chunks[0], chunks[1], chunks[2])
    }

    /// File list, editor and analysis panes of the pull request screen.
    pub fn split_editor(area: Rect) -> (Rect, Rect, Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(22),
                Constraint::Percentage(46),
                Constraint::Percentage(32),
            ])
            .split(area);

        (chunks[0], chunks[1], chunks[2])
    }

    pub fn render_error(f: &mut Frame, area: Rect, error: &str, theme: &Theme) {
        let block = Block::default()
            .title(" Error ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.error()))
            .style(Style::default().bg(theme.bg()));

        let error_area = centered_rect(60, 30, area);
        let paragraph = Paragraph::new(error)
            .block(block)
            .style(Style::default().fg(theme.error()))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        f.render_widget(paragraph, error_area);
    }

    /// Centered one-line notice such as "Loading..." or an empty-list message.
    pub fn render_notice(f: &mut Frame, area: Rect, message: &str, theme: &Theme) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(45),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(area);

        let paragraph = Paragraph::new(message)
            .style(Style::default().fg(theme.muted()))
            .alignment(Alignment::Center);
        f.render_widget(paragraph, rows[1]);
    }

    pub fn render_alert(f: &mut Frame, area: Rect, alert: &Alert, theme: &Theme) {
        let (title, color) = match alert.level {
            AlertLevel::Success => (" Success ", theme.success()),
            AlertLevel::Warning => (" Warning ", theme.warning()),
            AlertLevel::Error => (" Error ", theme.error()),
        };

        let popup = centered_rect(50, 25, area);
        f.render_widget(Clear, popup);

        let text = vec![
            Line::from(Span::styled(
                alert.message.as_str(),
                Style::default().fg(theme.fg()),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press any key to continue",
                Style::default().fg(theme.muted()),
            )),
        ];
        let paragraph = Paragraph::new(text)
            .block(
                Block::default()
                    .title(title)
                    .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color))
                    .style(Style::default().bg(theme.bg())),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        f.render_widget(paragraph, popup);
    }

    /// Modal text input. `busy` replaces the inline message while a request
    /// for the submitted value is running.
    pub fn render_prompt(
        f: &mut Frame,
        area: Rect,
        prompt: &Prompt,
        busy: Option<&str>,
        theme: &Theme,
    ) {
        let popup = centered_rect(60, 40, area);
        f.render_widget(Clear, popup);

        let block = Block::default()
            .title(format!(" {} ", prompt.title))
            .title_style(
                Style::default()
                    .fg(theme.title())
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border_focused()))
            .style(Style::default().bg(theme.bg()));
        let inner = block.inner(popup);
        f.render_widget(block, popup);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(3),
                Constraint::Length(2),
            ])
            .split(inner);

        if let Some(hint) = &prompt.hint {
            let hint = Paragraph::new(hint.as_str())
                .style(Style::default().fg(theme.subtitle()))
                .wrap(Wrap { trim: true });
            f.render_widget(hint, rows[0]);
        }

        let input_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.accent()));
        let input_inner = input_block.inner(rows[1]);

        // Keep the cursor visible on long values
        let width = usize::from(input_inner.width.max(1));
        let skip = (prompt.cursor + 1).saturating_sub(width);
        let visible: String = prompt.value.chars().skip(skip).collect();
        let input = Paragraph::new(visible)
            .style(Style::default().fg(theme.fg()))
            .block(input_block);
        f.render_widget(input, rows[1]);

        let cursor_x = u16::try_from(prompt.cursor - skip).unwrap_or(u16::MAX);
        f.set_cursor_position(Position::new(
            input_inner.x.saturating_add(cursor_x),
            input_inner.y,
        ));

        let footer = match (busy, &prompt.message) {
            (Some(busy), _) => Span::styled(busy, Style::default().fg(theme.info())),
            (None, Some(message)) => {
                Span::styled(message.as_str(), Style::default().fg(theme.error()))
            }
            (None, None) => Span::styled(
                "Enter to submit, Esc to cancel",
                Style::default().fg(theme.muted()),
            ),
        };
        f.render_widget(
            Paragraph::new(Line::from(footer)).wrap(Wrap { trim: true }),
            rows[2],
        );
    }
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_is_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(50, 50, area);
        assert_eq!(popup.width, 50);
        assert_eq!(popup.height, 20);
        assert_eq!(popup.x, 25);
        assert_eq!(popup.y, 10);
    }

    #[test]
    fn test_split_main_reserves_header_and_hints() {
        let (header, content, hints) = AppLayout::split_main(Rect::new(0, 0, 80, 24));
        assert_eq!(header.height, 1);
        assert_eq!(hints.height, 3);
        assert_eq!(content.height, 20);
    }
}
