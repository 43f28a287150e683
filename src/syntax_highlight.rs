use once_cell::sync::Lazy;
use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, HighlightState, Style as SyntectStyle, Theme, ThemeSet};
use syntect::parsing::{ParseState, SyntaxReference, SyntaxSet};

/// Editor lines carry no trailing newline
static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_nonewlines);

static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

const FALLBACK_THEME: &str = "base16-ocean.dark";

/// Extensions whose syntect name differs from what `find_syntax_by_extension`
/// would pick, or that it does not know.
static EXTENSION_SYNTAX: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("py", "Python"),
        ("pyi", "Python"),
        ("rs", "Rust"),
        ("js", "JavaScript"),
        ("mjs", "JavaScript"),
        ("jsx", "JavaScript"),
        ("ts", "JavaScript"),
        ("tsx", "JavaScript"),
        ("go", "Go"),
        ("java", "Java"),
        ("kt", "Java"),
        ("c", "C"),
        ("h", "C"),
        ("cpp", "C++"),
        ("cc", "C++"),
        ("hpp", "C++"),
        ("cs", "C#"),
        ("rb", "Ruby"),
        ("php", "PHP"),
        ("sh", "Bourne Again Shell (bash)"),
        ("bash", "Bourne Again Shell (bash)"),
        ("zsh", "Bourne Again Shell (bash)"),
        ("html", "HTML"),
        ("css", "CSS"),
        ("scss", "CSS"),
        ("json", "JSON"),
        ("yaml", "YAML"),
        ("yml", "YAML"),
        ("toml", "Makefile"),
        ("md", "Markdown"),
        ("sql", "SQL"),
    ])
});

/// Pick a syntect theme that sits well on the app theme's background.
fn syntect_theme_for(app_theme: &str) -> &'static str {
    match app_theme {
        "knight-night" | "nord" => "base16-ocean.dark",
        "dracula" => "base16-mocha.dark",
        "gruvbox-dark" => "base16-eighties.dark",
        "knight-day" => "InspiredGitHub",
        _ => FALLBACK_THEME,
    }
}

fn syntect_theme(app_theme: &str) -> Option<&'static Theme> {
    THEME_SET
        .themes
        .get(syntect_theme_for(app_theme))
        .or_else(|| THEME_SET.themes.get(FALLBACK_THEME))
}

/// Styled fragments of one highlighted line.
pub type HighlightedLine = Vec<(Style, String)>;

/// Parser state is saved before every `CHECKPOINT_STRIDE`th line, so an edit
/// re-highlights from the nearest checkpoint instead of the top of the file.
const CHECKPOINT_STRIDE: usize = 128;

/// Highlighted lines of one file, kept across frames.
///
/// Lines are highlighted lazily and only as far down as has been asked for.
/// Editing a line must be reported through [`HighlightCache::invalidate_from`],
/// since parse state flows from each line into the next.
pub struct HighlightCache {
    filename: String,
    app_theme: String,
    theme: &'static Theme,
    syntax: &'static SyntaxReference,
    lines: Vec<HighlightedLine>,
    checkpoints: Vec<(HighlightState, ParseState)>,
    /// Positioned right after the last cached line.
    live: Option<HighlightLines<'static>>,
}

impl HighlightCache {
    pub fn new(filename: &str, app_theme: &str) -> Option<Self> {
        Some(Self {
            filename: filename.to_string(),
            app_theme: app_theme.to_string(),
            theme: syntect_theme(app_theme)?,
            syntax: detect_syntax(filename),
            lines: Vec::new(),
            checkpoints: Vec::new(),
            live: None,
        })
    }

    pub fn is_for(&self, filename: &str, app_theme: &str) -> bool {
        self.filename == filename && self.app_theme == app_theme
    }

    /// Forget every cached line at or below `row`.
    pub fn invalidate_from(&mut self, row: usize) {
        if row >= self.lines.len() {
            return;
        }
        let checkpoint = row / CHECKPOINT_STRIDE;
        self.checkpoints.truncate(checkpoint + 1);
        self.lines.truncate(checkpoint * CHECKPOINT_STRIDE);
        self.live = None;
    }

    /// Highlighted lines `0..end` of `source`, filling in whatever is missing.
    pub fn lines(&mut self, source: &[String], end: usize) -> &[HighlightedLine] {
        let end = end.min(source.len());
        while self.lines.len() < end {
            let mut live = match self.live.take() {
                Some(live) => live,
                None => self.resume(),
            };
            let row = self.lines.len();

            if row % CHECKPOINT_STRIDE == 0 && self.checkpoints.len() == row / CHECKPOINT_STRIDE {
                let (highlight, parse) = live.state();
                self.checkpoints.push((highlight.clone(), parse.clone()));
                live = HighlightLines::from_state(self.theme, highlight, parse);
            }
            self.lines.push(highlight_line(&mut live, &source[row]));
            self.live = Some(live);
        }
        &self.lines[..end]
    }

    /// Parser positioned at the end of the cached lines.
    fn resume(&mut self) -> HighlightLines<'static> {
        let row = self.lines.len();
        match self.checkpoints.get(row / CHECKPOINT_STRIDE) {
            Some((highlight, parse)) if row % CHECKPOINT_STRIDE == 0 => {
                HighlightLines::from_state(self.theme, highlight.clone(), parse.clone())
            }
            _ => {
                self.lines.clear();
                self.checkpoints.clear();
                HighlightLines::new(self.syntax, self.theme)
            }
        }
    }
}

impl fmt::Debug for HighlightCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HighlightCache")
            .field("filename", &self.filename)
            .field("app_theme", &self.app_theme)
            .field("syntax", &self.syntax.name)
            .field("cached_lines", &self.lines.len())
            .finish()
    }
}

fn highlight_line(lines: &mut HighlightLines<'static>, line: &str) -> HighlightedLine {
    match lines.highlight_line(line, &SYNTAX_SET) {
        Ok(ranges) => ranges
            .into_iter()
            .map(|(style, text)| (syntect_style_to_ratatui_style(&style), text.to_string()))
            .collect(),
        Err(err) => {
            tracing::debug!("highlighting failed: {err}");
            vec![(Style::default(), line.to_string())]
        }
    }
}

/// Detect the syntax definition for a given filename
fn detect_syntax(filename: &str) -> &'static SyntaxReference {
    let path = Path::new(filename);
    let by_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .and_then(|ext| {
            EXTENSION_SYNTAX
                .get(ext.as_str())
                .and_then(|name| SYNTAX_SET.find_syntax_by_name(name))
                .or_else(|| SYNTAX_SET.find_syntax_by_extension(&ext))
        });
    if let Some(syntax) = by_extension {
        return syntax;
    }

    let basename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename)
        .to_lowercase();
    let by_name = match basename.as_str() {
        "makefile" | "gnumakefile" => SYNTAX_SET.find_syntax_by_name("Makefile"),
        "dockerfile" | "containerfile" => SYNTAX_SET.find_syntax_by_name("Bourne Again Shell (bash)"),
        _ => None,
    };
    by_name.unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text())
}

/// Convert syntect style to ratatui style, keeping only the foreground so the
/// app theme's background shows through
pub fn syntect_style_to_ratatui_style(style: &SyntectStyle) -> Style {
    let mut ratatui_style = Style::default().fg(Color::Rgb(
        style.foreground.r,
        style.foreground.g,
        style.foreground.b,
    ));

    if style.font_style.contains(FontStyle::BOLD) {
        ratatui_style = ratatui_style.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        ratatui_style = ratatui_style.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        ratatui_style = ratatui_style.add_modifier(Modifier::UNDERLINED);
    }

    ratatui_style
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_syntax_common_extensions() {
        assert_eq!(detect_syntax("app/main.py").name, "Python");
        assert_eq!(detect_syntax("src/lib.rs").name, "Rust");
        assert_eq!(detect_syntax("main.go").name, "Go");
        assert!(detect_syntax("web/app.JS").name.contains("JavaScript"));
    }

    #[test]
    fn test_detect_syntax_special_files() {
        assert_eq!(detect_syntax("Makefile").name, "Makefile");
        assert_eq!(detect_syntax("notes.unknownext").name, "Plain Text");
    }

    #[test]
    fn test_every_app_theme_has_a_syntect_theme() {
        for name in ["knight-night", "knight-day", "dracula", "nord", "gruvbox-dark", "custom"] {
            assert!(syntect_theme(name).is_some(), "{name}");
        }
    }

    fn text_of(line: &HighlightedLine) -> String {
        line.iter().map(|(_, text)| text.as_str()).collect()
    }

    fn python_source(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("value_{i} = {i}  # line {i}")).collect()
    }

    #[test]
    fn test_highlight_keeps_text() {
        let mut cache = HighlightCache::new("a.py", "knight-night").unwrap();
        let source = vec!["def greet(name):".to_string()];
        let lines = cache.lines(&source, 1);
        assert_eq!(text_of(&lines[0]), "def greet(name):");
        assert!(lines[0].len() > 1);
    }

    #[test]
    fn test_only_requested_lines_are_highlighted() {
        let mut cache = HighlightCache::new("a.py", "knight-night").unwrap();
        let source = python_source(1000);
        assert_eq!(cache.lines(&source, 50).len(), 50);
        assert_eq!(cache.lines.len(), 50);

        // Asking again reuses the cached lines
        cache.lines(&source, 40);
        assert_eq!(cache.lines.len(), 50);
    }

    #[test]
    fn test_invalidate_rewinds_to_checkpoint() {
        let mut cache = HighlightCache::new("a.py", "knight-night").unwrap();
        let mut source = python_source(300);
        cache.lines(&source, 300);

        // Opening a string changes how every following line parses
        source[200] = "text = \"\"\"".to_string();
        cache.invalidate_from(200);
        assert_eq!(cache.lines.len(), CHECKPOINT_STRIDE);

        let edited = cache.lines(&source, 300).to_vec();
        let mut fresh = HighlightCache::new("a.py", "knight-night").unwrap();
        assert_eq!(edited, fresh.lines(&source, 300));
        assert_eq!(text_of(&edited[200]), source[200]);
        assert_eq!(text_of(&edited[299]), source[299]);
    }

    #[test]
    fn test_cache_identity() {
        let cache = HighlightCache::new("a.py", "knight-night").unwrap();
        assert!(cache.is_for("a.py", "knight-night"));
        assert!(!cache.is_for("a.py", "knight-day"));
        assert!(!cache.is_for("b.py", "knight-night"));
    }
}
