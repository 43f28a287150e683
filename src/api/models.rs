use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Repository {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserReposResponse {
    #[serde(default, alias = "repos")]
    pub repositories: Vec<Repository>,
}

/// Pull request counts for one repository.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RepoStats {
    #[serde(default, alias = "open")]
    pub open_prs: u32,
    #[serde(default, alias = "closed")]
    pub closed_prs: u32,
    #[serde(default, alias = "total")]
    pub total_prs: u32,
}

/// Bytes of code per language, as reported by GitHub.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguageBreakdown {
    pub bytes: BTreeMap<String, u64>,
}

impl LanguageBreakdown {
    pub fn primary(&self) -> Option<&str> {
        self.bytes
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(name, _)| name.as_str())
    }

    /// Languages sorted by share, largest first, with their percentage.
    pub fn percentages(&self) -> Vec<(String, f64)> {
        let total: u64 = self.bytes.values().sum();
        if total == 0 {
            return Vec::new();
        }
        let mut shares: Vec<(String, f64)> = self
            .bytes
            .iter()
            .map(|(name, bytes)| (name.clone(), *bytes as f64 * 100.0 / total as f64))
            .collect();
        shares.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        shares
    }
}

impl<'de> Deserialize<'de> for LanguageBreakdown {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // The backend either wraps the map in `{"languages": {...}}` or returns it bare.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Wrapped { languages: BTreeMap<String, u64> },
            Bare(BTreeMap<String, u64>),
        }

        let bytes = match Wire::deserialize(deserializer)? {
            Wire::Wrapped { languages } => languages,
            Wire::Bare(map) => map,
        };
        Ok(Self { bytes })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrState {
    #[default]
    Open,
    Closed,
    #[serde(other)]
    Unknown,
}

impl PrState {
    pub fn label(&self) -> &'static str {
        match self {
            PrState::Open => "open",
            PrState::Closed => "closed",
            PrState::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PullRequest {
    #[serde(default)]
    pub id: u64,
    pub number: u64,
    pub title: String,
    #[serde(default, alias = "user")]
    pub author: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub state: PrState,
    #[serde(default, alias = "head")]
    pub head_ref: Option<String>,
    #[serde(default, alias = "base")]
    pub base_ref: Option<String>,
    #[serde(default)]
    pub changed_files: Option<u32>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestsResponse {
    #[serde(default)]
    pub pull_requests: Vec<PullRequest>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
    Copied,
    Changed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PrFile {
    pub filename: String,
    pub status: FileStatus,
    #[serde(default)]
    pub additions: u32,
    #[serde(default)]
    pub deletions: u32,
    #[serde(default)]
    pub changes: u32,
    #[serde(default)]
    pub patch: Option<String>,
    pub raw_url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PrDetails {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, alias = "user")]
    pub author: String,
    #[serde(default)]
    pub state: PrState,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub files: Vec<PrFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileContentResponse {
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Lenient mapping of the severity strings the analysis model produces.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "critical" | "high" => Severity::High,
            "medium" | "moderate" => Severity::Medium,
            _ => Severity::Low,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Severity::from_label(&label))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    #[serde(default, alias = "message")]
    pub description: String,
    #[serde(default)]
    pub suggestion: Option<String>,
    #[serde(default, alias = "file")]
    pub filename: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueCategory {
    Security,
    Quality,
    Performance,
}

impl IssueCategory {
    pub const ALL: [IssueCategory; 3] = [
        IssueCategory::Security,
        IssueCategory::Quality,
        IssueCategory::Performance,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            IssueCategory::Security => "Security",
            IssueCategory::Quality => "Code Quality",
            IssueCategory::Performance => "Performance",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Analysis {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub security_issues: Vec<Issue>,
    #[serde(default)]
    pub code_quality_issues: Vec<Issue>,
    #[serde(default)]
    pub performance_issues: Vec<Issue>,
}

impl Analysis {
    pub fn issues(&self, category: IssueCategory) -> &[Issue] {
        match category {
            IssueCategory::Security => &self.security_issues,
            IssueCategory::Quality => &self.code_quality_issues,
            IssueCategory::Performance => &self.performance_issues,
        }
    }

    pub fn total_issues(&self) -> usize {
        IssueCategory::ALL
            .iter()
            .map(|category| self.issues(*category).len())
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommitRequest {
    pub file_path: String,
    pub content: String,
    pub commit_message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CommitOutcome {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "sha")]
    pub commit_sha: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VerifiedRepo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub private: Option<bool>,
}
