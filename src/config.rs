//! Client configuration and session credentials.

use std::fmt;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_RAW_BASE: &str = "https://raw.githubusercontent.com";
pub const DEFAULT_USER_AGENT: &str = concat!("folio/", env!("CARGO_PKG_VERSION"));
/// Number of commits shown on the dashboard.
pub const DEFAULT_RECENT_CHANGES: usize = 5;

/// Settings for talking to the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the REST API.
    pub api_base: String,
    /// Base URL used to build public links to raw files.
    pub raw_base: String,
    pub user_agent: String,
    pub recent_changes: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            raw_base: DEFAULT_RAW_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            recent_changes: DEFAULT_RECENT_CHANGES,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_raw_base(mut self, raw_base: impl Into<String>) -> Self {
        self.raw_base = raw_base.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_recent_changes(mut self, recent_changes: usize) -> Self {
        self.recent_changes = recent_changes;
        self
    }
}

/// Error type for credential validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsError {
    /// A required field was empty.
    MissingField(&'static str),
    /// The repository identifier is not of the form `owner/name`.
    InvalidRepository(String),
}

impl fmt::Display for CredentialsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialsError::MissingField(field) => write!(f, "missing {}", field),
            CredentialsError::InvalidRepository(repo) => {
                write!(f, "repository must be owner/name, got {:?}", repo)
            }
        }
    }
}

impl std::error::Error for CredentialsError {}

/// Token, repository and branch supplied at login.
///
/// Lives only as long as the session holding it. The token is never
/// printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
    owner: String,
    name: String,
    branch: String,
}

impl Credentials {
    /// Validate and build credentials. Fields are trimmed.
    pub fn new(
        token: impl AsRef<str>,
        repository: impl AsRef<str>,
        branch: impl AsRef<str>,
    ) -> Result<Self, CredentialsError> {
        let token = token.as_ref().trim();
        let repository = repository.as_ref().trim();
        let branch = branch.as_ref().trim();

        if token.is_empty() {
            return Err(CredentialsError::MissingField("token"));
        }
        if repository.is_empty() {
            return Err(CredentialsError::MissingField("repository"));
        }
        if branch.is_empty() {
            return Err(CredentialsError::MissingField("branch"));
        }

        let (owner, name) = repository
            .split_once('/')
            .filter(|(owner, name)| !owner.is_empty() && !name.is_empty() && !name.contains('/'))
            .ok_or_else(|| CredentialsError::InvalidRepository(repository.to_string()))?;

        Ok(Self {
            token: token.to_string(),
            owner: owner.to_string(),
            name: name.to_string(),
            branch: branch.to_string(),
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// The `owner/name` identifier.
    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("repository", &self.repository())
            .field("branch", &self.branch)
            .finish()
    }
}
