use crate::{
    api::PrState,
    screens::{
        pr_list::{self, PrListScreen},
        repo_list::{RepoCard, RepoListScreen},
        GridState, LoadState,
    },
    theme::Theme,
    ui::layout::AppLayout,
};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const CARD_WIDTH: u16 = 38;
const CARD_HEIGHT: u16 = 8;

/// Columns that fit in `width`, at least one.
pub fn columns_for(width: u16) -> usize {
    usize::from((width / CARD_WIDTH).max(1))
}

/// First grid row to draw so the selected card stays on screen.
fn first_visible_row(selected: usize, columns: usize, visible_rows: usize) -> usize {
    let row = selected / columns.max(1);
    (row + 1).saturating_sub(visible_rows.max(1))
}

struct Card<'a> {
    title: String,
    lines: Vec<Line<'a>>,
}

fn render_grid(f: &mut Frame, area: Rect, cards: Vec<Card>, grid: &mut GridState, theme: &Theme) {
    let columns = columns_for(area.width);
    grid.columns = columns;

    let visible_rows = usize::from((area.height / CARD_HEIGHT).max(1));
    let top = first_visible_row(grid.selected, columns, visible_rows);
    let card_width = area.width / columns as u16;

    for (index, card) in cards.into_iter().enumerate() {
        let row = index / columns;
        if row < top || row >= top + visible_rows {
            continue;
        }
        let col = (index % columns) as u16;
        let y = area.y + (row - top) as u16 * CARD_HEIGHT;
        let height = CARD_HEIGHT.min(area.bottom().saturating_sub(y));
        if height < 3 {
            continue;
        }
        let rect = Rect::new(area.x + col * card_width, y, card_width, height);

        let selected = index == grid.selected;
        let (border, title) = if selected {
            (
                Style::default().fg(theme.border_focused()),
                Style::default()
                    .fg(theme.selection_fg())
                    .bg(theme.selection_bg())
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            (
                Style::default().fg(theme.border()),
                Style::default()
                    .fg(theme.title())
                    .add_modifier(Modifier::BOLD),
            )
        };

        let paragraph = Paragraph::new(card.lines)
            .block(
                Block::default()
                    .title(Span::styled(format!(" {} ", card.title), title))
                    .borders(Borders::ALL)
                    .border_style(border)
                    .style(Style::default().bg(theme.bg()).fg(theme.fg())),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, rect);
    }
}

fn repo_card<'a>(card: &'a RepoCard, theme: &Theme) -> Card<'a> {
    let mut lines = vec![Line::from(Span::styled(
        card.repo
            .description
            .as_deref()
            .unwrap_or("No description"),
        Style::default().fg(theme.subtitle()),
    ))];

    let languages = card
        .languages
        .as_ref()
        .map(|breakdown| breakdown.percentages())
        .unwrap_or_default();
    if languages.is_empty() {
        if let Some(language) = card.primary_language() {
            lines.push(Line::from(Span::styled(
                language.to_string(),
                Style::default().fg(theme.accent()),
            )));
        }
    } else {
        let shares: Vec<String> = languages
            .iter()
            .take(3)
            .map(|(name, share)| format!("{name} {share:.1}%"))
            .collect();
        lines.push(Line::from(Span::styled(
            shares.join("  "),
            Style::default().fg(theme.accent()),
        )));
    }

    if let Some(stats) = &card.stats {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} open", stats.open_prs),
                Style::default().fg(theme.success()),
            ),
            Span::styled(" · ", Style::default().fg(theme.muted())),
            Span::styled(
                format!("{} closed", stats.closed_prs),
                Style::default().fg(theme.muted()),
            ),
            Span::styled(" · ", Style::default().fg(theme.muted())),
            Span::styled(
                format!("{} total PRs", stats.total_prs),
                Style::default().fg(theme.fg()),
            ),
        ]));
    }

    if let Some(updated) = &card.repo.updated_at {
        lines.push(Line::from(Span::styled(
            format!("Updated {}", updated.format("%Y-%m-%d")),
            Style::default().fg(theme.muted()),
        )));
    }

    Card {
        title: card.repo.name.clone(),
        lines,
    }
}

pub fn render_repo_list(f: &mut Frame, area: Rect, screen: &mut RepoListScreen, theme: &Theme) {
    if let Some(message) = screen.status_message() {
        match screen.state() {
            LoadState::Failed(_) => AppLayout::render_error(f, area, message, theme),
            _ => AppLayout::render_notice(f, area, message, theme),
        }
    } else if matches!(screen.state(), LoadState::Loading) {
        AppLayout::render_notice(f, area, "Loading repositories...", theme);
    } else {
        let cards: Vec<Card> = screen.cards().iter().map(|c| repo_card(c, theme)).collect();
        let mut grid = screen.grid;
        render_grid(f, area, cards, &mut grid, theme);
        screen.grid = grid;
    }

    if let Some(prompt) = screen.verify_prompt() {
        let busy = screen.is_verifying().then_some("Verifying repository...");
        AppLayout::render_prompt(f, area, prompt, busy, theme);
    }
}

pub fn render_pr_list(
    f: &mut Frame,
    area: Rect,
    screen: &mut PrListScreen,
    theme: &Theme,
    date_format: &str,
) {
    if let Some(message) = screen.status_message() {
        match screen.state() {
            LoadState::Failed(_) => AppLayout::render_error(f, area, message, theme),
            _ => AppLayout::render_notice(f, area, message, theme),
        }
        return;
    }
    if matches!(screen.state(), LoadState::Loading) {
        AppLayout::render_notice(f, area, "Loading pull requests...", theme);
        return;
    }

    let cards: Vec<Card> = screen
        .pull_requests()
        .iter()
        .map(|pr| {
            let state_color = match pr.state {
                PrState::Open => theme.success(),
                _ => theme.muted(),
            };
            let mut lines = vec![Line::from(Span::styled(
                pr_list::description(pr).lines().next().unwrap_or_default(),
                Style::default().fg(theme.subtitle()),
            ))];
            if let Some(badge) = pr_list::branch_badge(pr) {
                lines.push(Line::from(Span::styled(
                    badge,
                    Style::default().fg(theme.accent()),
                )));
            }

            let mut meta = vec![
                Span::styled(
                    pr.state.label(),
                    Style::default().fg(state_color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!(" by {}", pr.author), Style::default().fg(theme.fg())),
            ];
            if let Some(date) = pr_list::format_date(pr.created_at.as_ref(), date_format) {
                meta.push(Span::styled(
                    format!(" · {date}"),
                    Style::default().fg(theme.muted()),
                ));
            }
            lines.push(Line::from(meta));

            if let Some(count) = pr.changed_files {
                lines.push(Line::from(Span::styled(
                    format!("{count} files changed"),
                    Style::default().fg(theme.muted()),
                )));
            }

            Card {
                title: format!("#{} {}", pr.number, pr.title),
                lines,
            }
        })
        .collect();

    let mut grid = screen.grid;
    render_grid(f, area, cards, &mut grid, theme);
    screen.grid = grid;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_for_width() {
        assert_eq!(columns_for(10), 1);
        assert_eq!(columns_for(CARD_WIDTH * 2), 2);
        assert_eq!(columns_for(CARD_WIDTH * 3 + 5), 3);
    }

    #[test]
    fn test_first_visible_row_follows_selection() {
        assert_eq!(first_visible_row(0, 3, 2), 0);
        assert_eq!(first_visible_row(5, 3, 2), 0);
        assert_eq!(first_visible_row(6, 3, 2), 1);
        assert_eq!(first_visible_row(11, 3, 2), 2);
    }
}
