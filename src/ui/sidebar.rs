use crate::{
    api::{FileStatus, PrFile},
    theme::Theme,
};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

pub fn status_symbol(status: FileStatus) -> &'static str {
    match status {
        FileStatus::Added => "+",
        FileStatus::Modified | FileStatus::Changed => "M",
        FileStatus::Removed => "-",
        FileStatus::Renamed => "R",
        FileStatus::Copied => "C",
        FileStatus::Unknown => "?",
    }
}

fn status_color(status: FileStatus, theme: &Theme) -> Color {
    match status {
        FileStatus::Added => theme.added(),
        FileStatus::Removed => theme.removed(),
        FileStatus::Modified | FileStatus::Changed => theme.warning(),
        FileStatus::Renamed | FileStatus::Copied => theme.info(),
        FileStatus::Unknown => theme.muted(),
    }
}

/// Changed files of the pull request. `cursor` is the highlighted row,
/// `open` the file whose content is in the editor.
pub struct Sidebar<'a> {
    pub files: &'a [PrFile],
    pub cursor: usize,
    pub open: Option<usize>,
}

impl Sidebar<'_> {
    pub fn render(&self, f: &mut Frame, area: Rect, theme: &Theme, is_focused: bool) {
        let items: Vec<ListItem> = self
            .files
            .iter()
            .enumerate()
            .map(|(index, file)| {
                let marker = if self.open == Some(index) { "●" } else { " " };
                let color = status_color(file.status, theme);
                ListItem::new(Line::from(vec![
                    Span::styled(marker, Style::default().fg(theme.accent())),
                    Span::styled(
                        format!("{} ", status_symbol(file.status)),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(file.filename.clone(), Style::default().fg(theme.sidebar_fg())),
                    Span::styled(
                        format!(" +{}", file.additions),
                        Style::default().fg(theme.added()),
                    ),
                    Span::styled(
                        format!(" -{}", file.deletions),
                        Style::default().fg(theme.removed()),
                    ),
                ]))
            })
            .collect();

        let border_style = if is_focused {
            Style::default().fg(theme.border_focused())
        } else {
            Style::default().fg(theme.border())
        };

        let files_list = List::new(items)
            .block(
                Block::default()
                    .title(format!(" Files ({}) ", self.files.len()))
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .style(
                        Style::default()
                            .bg(theme.sidebar_bg())
                            .fg(theme.sidebar_fg()),
                    ),
            )
            .highlight_style(
                Style::default()
                    .bg(theme.sidebar_selected())
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("│");

        let mut state = ListState::default();
        if !self.files.is_empty() {
            state.select(Some(self.cursor.min(self.files.len() - 1)));
        }
        f.render_stateful_widget(files_list, area, &mut state);
    }
}
