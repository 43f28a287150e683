use crate::{
    api::{Analysis, IssueCategory, Severity},
    screens::pr_editor::{AnalysisState, PrEditorScreen, NO_ISSUES},
    theme::Theme,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};

/// Fixed across themes so severities read the same everywhere.
pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::High => Color::Red,
        Severity::Medium => Color::Yellow,
        Severity::Low => Color::Green,
    }
}

/// Tab title with the issue count once a result is available.
pub fn tab_title(category: IssueCategory, analysis: Option<&Analysis>) -> String {
    match analysis {
        Some(analysis) => format!("{} ({})", category.title(), analysis.issues(category).len()),
        None => category.title().to_string(),
    }
}

fn issue_lines<'a>(analysis: &'a Analysis, category: IssueCategory, theme: &Theme) -> Vec<Line<'a>> {
    let issues = analysis.issues(category);
    if issues.is_empty() {
        return vec![Line::from(Span::styled(
            format!("✓ {NO_ISSUES}"),
            Style::default().fg(theme.success()),
        ))];
    }

    let mut lines = Vec::new();
    for issue in issues {
        lines.push(Line::from(vec![
            Span::styled(
                format!("[{}]", issue.severity.label()),
                Style::default()
                    .fg(severity_color(issue.severity))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(issue.description.as_str(), Style::default().fg(theme.fg())),
        ]));
        if let Some(filename) = &issue.filename {
            let location = match issue.line {
                Some(line) => format!("  {filename}:{line}"),
                None => format!("  {filename}"),
            };
            lines.push(Line::from(Span::styled(
                location,
                Style::default().fg(theme.muted()),
            )));
        }
        if let Some(suggestion) = &issue.suggestion {
            lines.push(Line::from(Span::styled(
                format!("  → {suggestion}"),
                Style::default().fg(theme.info()),
            )));
        }
        lines.push(Line::from(""));
    }
    lines
}

pub fn render(f: &mut Frame, area: Rect, screen: &PrEditorScreen, theme: &Theme, is_focused: bool) {
    let border_style = if is_focused {
        Style::default().fg(theme.border_focused())
    } else {
        Style::default().fg(theme.border())
    };
    let title = match screen.analysis() {
        AnalysisState::Analyzing { recheck: true, .. } => " Analysis (rechecking...) ",
        AnalysisState::Analyzing { .. } => " Analysis (running...) ",
        _ => " Analysis ",
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
        .style(Style::default().bg(theme.bg()).fg(theme.fg()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(inner);

    let shown = screen.shown_analysis();
    let active = IssueCategory::ALL
        .iter()
        .position(|c| *c == screen.active_tab())
        .unwrap_or(0);
    let tabs = Tabs::new(IssueCategory::ALL.iter().map(|c| tab_title(*c, shown)))
        .select(active)
        .style(Style::default().fg(theme.muted()))
        .highlight_style(
            Style::default()
                .fg(theme.accent())
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
        .divider("|");
    f.render_widget(tabs, chunks[0]);

    let body: Vec<Line> = match (screen.analysis(), shown) {
        (_, Some(analysis)) => {
            let mut lines = Vec::new();
            if !analysis.summary.is_empty() {
                lines.push(Line::from(Span::styled(
                    analysis.summary.as_str(),
                    Style::default().fg(theme.subtitle()),
                )));
                lines.push(Line::from(""));
            }
            lines.extend(issue_lines(analysis, screen.active_tab(), theme));
            lines
        }
        (AnalysisState::Analyzing { .. }, None) => vec![Line::from(Span::styled(
            "The knight is reviewing this pull request...",
            Style::default().fg(theme.info()),
        ))],
        _ => vec![Line::from(Span::styled(
            "No analysis yet. Run one to see security, quality and performance findings.",
            Style::default().fg(theme.muted()),
        ))],
    };

    let paragraph = Paragraph::new(body)
        .wrap(Wrap { trim: false })
        .scroll((screen.analysis_scroll(), 0));
    f.render_widget(paragraph, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Issue;

    fn issue(severity: Severity) -> Issue {
        Issue {
            severity,
            description: "Unused variable".to_string(),
            suggestion: None,
            filename: Some("a.py".to_string()),
            line: Some(3),
        }
    }

    #[test]
    fn test_severity_colors_are_fixed() {
        assert_eq!(severity_color(Severity::High), Color::Red);
        assert_eq!(severity_color(Severity::Medium), Color::Yellow);
        assert_eq!(severity_color(Severity::Low), Color::Green);
    }

    #[test]
    fn test_tab_titles_carry_counts() {
        let analysis = Analysis {
            code_quality_issues: vec![issue(Severity::High)],
            ..Default::default()
        };
        assert_eq!(tab_title(IssueCategory::Quality, Some(&analysis)), "Code Quality (1)");
        assert_eq!(tab_title(IssueCategory::Security, Some(&analysis)), "Security (0)");
        assert_eq!(tab_title(IssueCategory::Security, None), "Security");
    }

    #[test]
    fn test_empty_category_says_no_issues_found() {
        let theme = Theme::builtin("knight-night").unwrap();
        let analysis = Analysis {
            code_quality_issues: vec![issue(Severity::High)],
            ..Default::default()
        };

        for category in [IssueCategory::Security, IssueCategory::Performance] {
            let lines = issue_lines(&analysis, category, &theme);
            assert_eq!(lines.len(), 1);
            assert!(lines[0].to_string().contains(NO_ISSUES));
        }

        let lines = issue_lines(&analysis, IssueCategory::Quality, &theme);
        assert_eq!(lines[0].spans[0].content, "[HIGH]");
        assert_eq!(lines[0].spans[0].style.fg, Some(Color::Red));
    }
}
