use crate::session::Session;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Login suffix that marks an authinfo entry as ours.
const LOGIN_SUFFIX: &str = "^knightlint";

/// One `machine ... login ... password ...` entry from .authinfo/.netrc
#[derive(Debug, Clone, PartialEq)]
struct AuthInfo {
    machine: String,
    login: String,
    password: String,
}

impl AuthInfo {
    fn session_for(&self, host: &str) -> Option<Session> {
        if self.machine != host {
            return None;
        }
        let username = self.login.strip_suffix(LOGIN_SUFFIX)?;
        Session::new(self.password.as_str(), username)
    }
}

/// Finds a stored session from multiple sources with priority ordering:
/// command-line flags, then ~/.authinfo or ~/.netrc, then the
/// KNIGHTLINT_TOKEN and KNIGHTLINT_USERNAME environment variables.
pub fn find_session(
    cli_token: Option<String>,
    cli_username: Option<String>,
    backend_host: &str,
) -> Option<Session> {
    if let (Some(token), Some(username)) = (&cli_token, &cli_username) {
        if let Some(session) = Session::new(token.as_str(), username.as_str()) {
            debug!("using session from command line");
            return Some(session);
        }
    }

    match home_dir().map(|home| read_authinfo_session(&home, backend_host)) {
        Some(Ok(Some(session))) => {
            debug!("using session from authinfo");
            return Some(session);
        }
        Some(Err(err)) => warn!("failed to read authinfo: {err:#}"),
        _ => {}
    }

    let token = std::env::var("KNIGHTLINT_TOKEN").ok()?;
    let username = std::env::var("KNIGHTLINT_USERNAME").ok()?;
    let session = Session::new(token, username)?;
    debug!("using session from environment");
    Some(session)
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Reads a session from `home`/.authinfo or `home`/.netrc.
/// Looks for entries matching: machine BACKEND_HOST login USERNAME^knightlint password TOKEN
fn read_authinfo_session(home: &Path, host: &str) -> Result<Option<Session>> {
    for path in [home.join(".authinfo"), home.join(".netrc")] {
        if !path.exists() {
            continue;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path)?.permissions().mode() & 0o777;
            if mode != 0o600 && mode != 0o400 {
                warn!(
                    "{} has permissions {:o} (should be 600 or 400)",
                    path.display(),
                    mode
                );
            }
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        if let Some(session) = parse_authinfo(&contents)
            .iter()
            .find_map(|entry| entry.session_for(host))
        {
            return Ok(Some(session));
        }
    }

    Ok(None)
}

/// Parses .authinfo/.netrc file format
/// Format: machine HOSTNAME login USERNAME password PASSWORD
fn parse_authinfo(contents: &str) -> Vec<AuthInfo> {
    let mut entries = Vec::new();
    let mut machine: Option<String> = None;
    let mut login: Option<String> = None;
    let mut password: Option<String> = None;
    let mut tokens = contents.split_whitespace();

    while let Some(token) = tokens.next() {
        let Some(value) = tokens.clone().next() else {
            break;
        };
        match token {
            "machine" => {
                if let (Some(m), Some(l), Some(p)) = (machine.take(), login.take(), password.take())
                {
                    entries.push(AuthInfo {
                        machine: m,
                        login: l,
                        password: p,
                    });
                }
                machine = Some(value.to_string());
            }
            "login" => login = Some(value.to_string()),
            "password" => password = Some(value.to_string()),
            _ => continue,
        }
        tokens.next();
    }

    if let (Some(machine), Some(login), Some(password)) = (machine, login, password) {
        entries.push(AuthInfo {
            machine,
            login,
            password,
        });
    }

    entries
}
