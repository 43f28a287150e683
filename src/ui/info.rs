use crate::{
    screens::{
        how_it_works::{HowItWorksScreen, BENEFITS, INTRO, STEPS},
        LandingScreen,
    },
    theme::Theme,
    ui::layout::{centered_rect, AppLayout},
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

const TAGLINE: &str = "AI code review for your GitHub pull requests";

pub fn render_landing(f: &mut Frame, area: Rect, screen: &LandingScreen, theme: &Theme) {
    let panel = centered_rect(60, 70, area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(3),
        ])
        .split(panel);

    let title = Paragraph::new(vec![
        Line::from(Span::styled(
            "♞ KnightLint",
            Style::default()
                .fg(theme.title())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(TAGLINE, Style::default().fg(theme.subtitle()))),
    ])
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let items: Vec<ListItem> = screen
        .items()
        .iter()
        .map(|item| ListItem::new(Line::from(item.label())))
        .collect();
    let menu = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border()))
                .style(Style::default().bg(theme.bg()).fg(theme.fg())),
        )
        .highlight_style(
            Style::default()
                .bg(theme.selection_bg())
                .fg(theme.selection_fg())
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");
    let mut state = ListState::default().with_selected(Some(screen.selected()));
    f.render_stateful_widget(menu, chunks[2], &mut state);

    if let Some(prompt) = screen.sign_in_prompt() {
        AppLayout::render_prompt(f, area, prompt, None, theme);
    }
}

fn how_it_works_lines(theme: &Theme) -> Vec<Line<'static>> {
    let heading = Style::default()
        .fg(theme.title())
        .add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(Span::styled("How KnightLint works", heading)),
        Line::from(""),
        Line::from(Span::styled(INTRO, Style::default().fg(theme.fg()))),
        Line::from(""),
    ];

    for (index, (title, text)) in STEPS.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{}. ", index + 1),
                Style::default()
                    .fg(theme.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(*title, Style::default().add_modifier(Modifier::BOLD)),
        ]));
        lines.push(Line::from(Span::styled(
            format!("   {text}"),
            Style::default().fg(theme.subtitle()),
        )));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled("Why use it", heading)));
    lines.push(Line::from(""));
    for (headline, text) in BENEFITS {
        lines.push(Line::from(vec![
            Span::styled("• ", Style::default().fg(theme.accent())),
            Span::styled(headline, Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(format!(": {text}"), Style::default().fg(theme.subtitle())),
        ]));
    }
    lines
}

pub fn render_how_it_works(f: &mut Frame, area: Rect, screen: &HowItWorksScreen, theme: &Theme) {
    let paragraph = Paragraph::new(how_it_works_lines(theme))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border()))
                .style(Style::default().bg(theme.bg()).fg(theme.fg())),
        )
        .wrap(Wrap { trim: false })
        .scroll((screen.scroll(), 0));
    f.render_widget(paragraph, area);
}
