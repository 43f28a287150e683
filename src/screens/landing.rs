use super::{Effect, Prompt, PromptEvent};
use crate::{
    events::{Action, InputMode},
    router::Route,
    session::{Session, SessionError},
};
use crossterm::event::KeyEvent;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandingItem {
    Continue,
    SignIn,
    HowItWorks,
}

impl LandingItem {
    pub fn label(&self) -> &'static str {
        match self {
            LandingItem::Continue => "Continue to your repositories",
            LandingItem::SignIn => "Sign in with GitHub",
            LandingItem::HowItWorks => "How it works",
        }
    }
}

#[derive(Debug)]
pub struct LandingScreen {
    items: Vec<LandingItem>,
    selected: usize,
    login_url: String,
    sign_in: Option<Prompt>,
}

impl LandingScreen {
    pub fn new(has_session: bool, login_url: &str) -> Self {
        let mut items = Vec::with_capacity(3);
        if has_session {
            items.push(LandingItem::Continue);
        }
        items.extend([LandingItem::SignIn, LandingItem::HowItWorks]);

        Self {
            items,
            selected: 0,
            login_url: login_url.to_string(),
            sign_in: None,
        }
    }

    pub fn items(&self) -> &[LandingItem] {
        &self.items
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn sign_in_prompt(&self) -> Option<&Prompt> {
        self.sign_in.as_ref()
    }

    pub fn input_mode(&self) -> InputMode {
        if self.sign_in.is_some() {
            InputMode::Insert
        } else {
            InputMode::Normal
        }
    }

    pub fn open_sign_in(&mut self) {
        self.sign_in = Some(
            Prompt::new("Paste the callback URL")
                .with_hint(format!("Open {} in your browser", self.login_url)),
        );
    }

    pub fn handle_action(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::NavigateUp => self.selected = self.selected.saturating_sub(1),
            Action::NavigateDown => {
                self.selected = (self.selected + 1).min(self.items.len() - 1);
            }
            Action::Select => return self.activate(self.items[self.selected]),
            Action::SignIn => self.open_sign_in(),
            Action::HowItWorks => return vec![Effect::Navigate(Route::HowItWorks)],
            _ => {}
        }
        Vec::new()
    }

    fn activate(&mut self, item: LandingItem) -> Vec<Effect> {
        match item {
            LandingItem::Continue => vec![Effect::Navigate(Route::SelectRepo)],
            LandingItem::SignIn => {
                self.open_sign_in();
                Vec::new()
            }
            LandingItem::HowItWorks => vec![Effect::Navigate(Route::HowItWorks)],
        }
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Vec<Effect> {
        let Some(prompt) = self.sign_in.as_mut() else {
            return Vec::new();
        };

        match prompt.handle_key(key) {
            PromptEvent::Submit(callback) => match Session::from_callback_url(&callback) {
                Ok(session) => {
                    info!(user = session.username(), "signed in from callback URL");
                    self.sign_in = None;
                    vec![Effect::SignIn(session), Effect::Navigate(Route::SelectRepo)]
                }
                Err(err) => {
                    // The URL itself may carry a token
                    let reason = match err {
                        SessionError::MissingCredentials => "missing credentials",
                        SessionError::InvalidUrl(_) => "unparseable URL",
                    };
                    warn!(reason, "rejected callback URL");
                    prompt.message = Some(SessionError::MissingCredentials.to_string());
                    Vec::new()
                }
            },
            PromptEvent::Cancel => {
                self.sign_in = None;
                Vec::new()
            }
            PromptEvent::Edited => {
                prompt.message = None;
                Vec::new()
            }
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        if let Some(prompt) = self.sign_in.as_mut() {
            prompt.paste(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::test_support::*;
    use crossterm::event::KeyCode;

    const LOGIN: &str = "http://localhost:8000/login";

    #[test]
    fn test_continue_only_with_session() {
        assert_eq!(
            LandingScreen::new(false, LOGIN).items(),
            &[LandingItem::SignIn, LandingItem::HowItWorks]
        );

        let mut screen = LandingScreen::new(true, LOGIN);
        assert_eq!(screen.items()[0], LandingItem::Continue);
        assert_eq!(
            screen.handle_action(Action::Select),
            vec![Effect::Navigate(Route::SelectRepo)]
        );
    }

    #[test]
    fn test_how_it_works_navigation() {
        let mut screen = LandingScreen::new(false, LOGIN);
        screen.handle_action(Action::NavigateDown);
        screen.handle_action(Action::NavigateDown);
        assert_eq!(screen.selected(), 1);
        assert_eq!(
            screen.handle_action(Action::Select),
            vec![Effect::Navigate(Route::HowItWorks)]
        );
    }

    #[test]
    fn test_callback_url_creates_session() {
        let mut screen = LandingScreen::new(false, LOGIN);
        screen.handle_action(Action::SignIn);
        assert_eq!(screen.input_mode(), InputMode::Insert);
        assert!(screen.sign_in_prompt().unwrap().hint.as_deref().unwrap().contains(LOGIN));

        screen.handle_paste("http://localhost:3000/select-repo?token=abc&username=octo");
        let effects = screen.handle_input(key(KeyCode::Enter));

        assert_eq!(
            effects,
            vec![
                Effect::SignIn(Session::new("abc", "octo").unwrap()),
                Effect::Navigate(Route::SelectRepo)
            ]
        );
        assert_eq!(screen.input_mode(), InputMode::Normal);
    }

    #[test]
    fn test_callback_without_credentials_is_rejected() {
        let mut screen = LandingScreen::new(false, LOGIN);
        screen.open_sign_in();
        screen.handle_paste("http://localhost:3000/select-repo?token=abc");

        assert!(screen.handle_input(key(KeyCode::Enter)).is_empty());
        assert_eq!(
            screen.sign_in_prompt().unwrap().message.as_deref(),
            Some("The callback URL did not contain a token and username.")
        );

        screen.handle_input(key(KeyCode::Esc));
        assert!(screen.sign_in_prompt().is_none());
    }
}
