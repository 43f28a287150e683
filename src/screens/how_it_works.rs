use super::Effect;
use crate::events::Action;

pub const INTRO: &str = "KnightLint is an intelligent code review assistant that analyzes your pull \
requests using AI to catch issues before they reach production.";

/// Numbered steps: (title, text).
pub const STEPS: [(&str, &str); 3] = [
    (
        "Connect your repository",
        "Sign in with GitHub and select the repository you want to protect.",
    ),
    (
        "AI analysis in action",
        "The knight scans your code for security vulnerabilities, code quality issues \
         and performance bottlenecks.",
    ),
    (
        "Get actionable insights",
        "Receive a detailed analysis with specific recommendations and edit your code directly.",
    ),
];

/// Reasons to use it: (headline, text).
pub const BENEFITS: [(&str, &str); 5] = [
    (
        "Save time",
        "Catch bugs and vulnerabilities before manual review and cut down on review rounds.",
    ),
    (
        "Enhanced security",
        "AI-powered analysis finds security flaws that manual reviews might miss.",
    ),
    (
        "Improve code quality",
        "Learn best practices and sharpen your skills with every review.",
    ),
    (
        "Ship faster",
        "Speed up your development cycle with automated reviews.",
    ),
    (
        "Fix in place",
        "Edit the flagged file and commit the fix to the pull request branch without leaving the terminal.",
    ),
];

#[derive(Debug, Default)]
pub struct HowItWorksScreen {
    scroll: u16,
}

impl HowItWorksScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn handle_action(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::NavigateDown => self.scroll = self.scroll.saturating_add(1),
            Action::NavigateUp => self.scroll = self.scroll.saturating_sub(1),
            Action::PageDown => self.scroll = self.scroll.saturating_add(10),
            Action::PageUp => self.scroll = self.scroll.saturating_sub(10),
            Action::Home => self.scroll = 0,
            Action::SignIn | Action::Select => return vec![Effect::OpenSignIn],
            _ => {}
        }
        Vec::new()
    }
}
