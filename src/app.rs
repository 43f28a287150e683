use crate::{
    engine::{Completion, Engine, ScreenId},
    events::{Action, InputMode},
    router::Route,
    screens::{Alert, Effect, Screen},
    session::Session,
    settings::Settings,
    theme::Theme,
};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEventKind};
use std::collections::HashMap;
use tracing::{debug, info, warn};

pub struct App {
    pub session: Option<Session>,
    pub screen: Screen,
    /// Bumped on every navigation; completions for older screens are dropped.
    generation: ScreenId,
    engine: Engine,
    pub settings: Settings,
    pub theme: Theme,
    key_mapping: HashMap<KeyEvent, Action>,
    pub alert: Option<Alert>,
    pub should_quit: bool,
    login_url: String,
}

impl App {
    pub fn new(
        engine: Engine,
        settings: Settings,
        theme: Theme,
        session: Option<Session>,
        route: Route,
    ) -> Result<Self> {
        let key_mapping = settings.keybindings.create_mapping()?;
        let login_url = engine.client().login_url().to_string();
        let (screen, effects) = Screen::mount(&route, session.as_ref(), &login_url);

        let mut app = Self {
            session,
            screen,
            generation: 0,
            engine,
            settings,
            theme,
            key_mapping,
            alert: None,
            should_quit: false,
            login_url,
        };
        app.apply_effects(effects);
        Ok(app)
    }

    pub fn navigate(&mut self, route: Route) {
        self.generation += 1;
        debug!(path = %route.path(), generation = self.generation, "navigating");
        let (screen, effects) = Screen::mount(&route, self.session.as_ref(), &self.login_url);
        self.screen = screen;
        self.apply_effects(effects);
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Dispatch(dispatch) => {
                    self.engine
                        .dispatch(self.generation, self.session.clone(), dispatch)
                }
                Effect::Navigate(route) => self.navigate(route),
                Effect::Alert(alert) => self.alert = Some(alert),
                Effect::SignIn(session) => {
                    debug!(user = session.username(), "session established");
                    self.session = Some(session);
                }
                Effect::OpenSignIn => {
                    self.navigate(Route::Landing);
                    if let Screen::Landing(landing) = &mut self.screen {
                        landing.open_sign_in();
                    }
                }
            }
        }
    }

    pub fn handle_completion(&mut self, completion: Completion) {
        if completion.screen != self.generation {
            debug!(
                screen = completion.screen,
                current = self.generation,
                "discarding completion for an unmounted screen"
            );
            return;
        }
        let effects = self
            .screen
            .apply(completion.slot, completion.id, completion.outcome);
        self.apply_effects(effects);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        // Any key dismisses the alert and is otherwise ignored
        if self.alert.take().is_some() {
            return;
        }

        if self.screen.input_mode() == InputMode::Insert {
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                self.should_quit = true;
                return;
            }
            let effects = self.screen.handle_input(key);
            self.apply_effects(effects);
            return;
        }

        if let Some(action) = Action::from_key_event(key, &self.key_mapping) {
            self.handle_action(action);
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        if self.alert.is_none() && self.screen.input_mode() == InputMode::Insert {
            self.screen.handle_paste(text);
        }
    }

    pub fn handle_mouse(&mut self, kind: MouseEventKind) {
        if self.alert.is_some() || self.screen.input_mode() == InputMode::Insert {
            return;
        }
        match kind {
            MouseEventKind::ScrollUp => self.handle_action(Action::NavigateUp),
            MouseEventKind::ScrollDown => self.handle_action(Action::NavigateDown),
            _ => {}
        }
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.quit(),
            Action::CycleTheme => self.cycle_theme(),
            Action::Logout => self.logout(),
            _ => {
                let effects = self.screen.handle_action(action);
                self.apply_effects(effects);
            }
        }
    }

    pub fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            info!(user = session.username(), "signed out");
        }
        self.navigate(Route::Landing);
    }

    pub fn cycle_theme(&mut self) {
        let result = self
            .settings
            .cycle_theme()
            .and_then(|_| self.settings.get_theme());
        match result {
            Ok(theme) => {
                info!(theme = %theme.name, "theme changed");
                self.theme = theme;
            }
            Err(err) => {
                warn!("could not switch theme: {err:#}");
                self.alert = Some(Alert::warning(format!("Could not switch theme: {err}")));
            }
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::BackendClient;
    use crate::screens::test_support::{key, session};
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app_at(
        server_uri: &str,
        session: Option<Session>,
        route: Route,
    ) -> (App, UnboundedReceiver<Completion>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let engine = Engine::new(BackendClient::new(server_uri).unwrap(), tx);
        let theme = Theme::builtin("knight-night").unwrap();
        let app = App::new(engine, Settings::default(), theme, session, route).unwrap();
        (app, rx)
    }

    async fn next_completion(rx: &mut UnboundedReceiver<Completion>) -> Completion {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("engine should reply")
            .expect("channel open")
    }

    fn repo(name: &str) -> Route {
        Route::Repo {
            repo_name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_completions_for_replaced_screen_are_dropped() {
        let server = MockServer::start().await;
        for (name, title) in [("old", "Old change"), ("new", "New change")] {
            Mock::given(method("GET"))
                .and(path("/repo-pull-requests"))
                .and(query_param("repo_name", name))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "pull_requests": [{"number": 1, "title": title, "user": "octo"}]
                })))
                .mount(&server)
                .await;
        }

        let (mut app, mut rx) = app_at(&server.uri(), Some(session()), repo("old"));
        app.navigate(repo("new"));

        for _ in 0..2 {
            let completion = next_completion(&mut rx).await;
            app.handle_completion(completion);
        }

        match &app.screen {
            Screen::PrList(list) => {
                assert_eq!(list.repo_name(), "new");
                assert_eq!(list.pull_requests().len(), 1);
                assert_eq!(list.pull_requests()[0].title, "New change");
            }
            _ => panic!("expected the pull request list"),
        }
    }

    #[tokio::test]
    async fn test_sign_in_from_callback_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user-repos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"repositories": []})))
            .mount(&server)
            .await;

        let (mut app, mut rx) = app_at(&server.uri(), None, Route::Landing);
        app.handle_action(Action::SignIn);
        assert_eq!(app.screen.input_mode(), InputMode::Insert);

        // Typed keys go to the prompt, not the action map
        app.handle_key(key(KeyCode::Char('q')));
        assert!(!app.should_quit);
        app.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));

        app.handle_paste("http://localhost:3000/select-repo?token=gho_abc&username=octo");
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.session.as_ref().map(Session::username), Some("octo"));
        assert_eq!(app.screen.route(), Route::SelectRepo);

        let completion = next_completion(&mut rx).await;
        assert_eq!(completion.screen, app.generation);
        app.handle_completion(completion);
        match &app.screen {
            Screen::RepoList(list) => assert!(list.cards().is_empty()),
            _ => panic!("expected the repository list"),
        }
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let server = MockServer::start().await;
        let (mut app, _rx) = app_at(&server.uri(), Some(session()), Route::HowItWorks);

        app.handle_action(Action::Logout);
        assert!(app.session.is_none());
        assert_eq!(app.screen.route(), Route::Landing);

        // Data screens now refuse to load
        app.navigate(Route::SelectRepo);
        match &app.screen {
            Screen::RepoList(list) => assert!(list.status_message().is_some()),
            _ => panic!("expected the repository list"),
        }
    }

    #[tokio::test]
    async fn test_alert_swallows_next_key() {
        let server = MockServer::start().await;
        let (mut app, _rx) = app_at(&server.uri(), None, Route::HowItWorks);
        app.alert = Some(Alert::warning("Please select a file first."));

        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.alert.is_none());
        assert!(!app.should_quit);

        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_open_sign_in_lands_with_prompt() {
        let server = MockServer::start().await;
        let (mut app, _rx) = app_at(&server.uri(), None, Route::HowItWorks);

        app.handle_action(Action::SignIn);
        match &app.screen {
            Screen::Landing(landing) => {
                let prompt = landing.sign_in_prompt().expect("prompt open");
                assert!(prompt.hint.as_deref().unwrap().contains(&app.login_url));
            }
            _ => panic!("expected the landing screen"),
        }
    }
}
