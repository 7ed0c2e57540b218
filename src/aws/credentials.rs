use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::AppError;

/// AWS access key pair, optionally with a session token
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("session_token", &self.session_token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Where credentials should come from, in order of preference
#[derive(Debug, Clone, Default)]
pub struct CredentialSource {
    /// Key pair given on the command line
    pub explicit: Option<(String, String)>,
    /// Profile of the shared credentials file
    pub profile: String,
    /// The profile was named on the command line; environment keys are then ignored
    pub explicit_profile: bool,
    /// Shared credentials file; defaults to `~/.aws/credentials`
    pub credentials_file: Option<PathBuf>,
}

impl CredentialSource {
    pub fn resolve(&self) -> Result<Credentials, AppError> {
        self.resolve_with_env(|name| std::env::var(name).ok())
    }

    /// Resolution with an injectable environment, for tests
    pub fn resolve_with_env<F>(&self, env: F) -> Result<Credentials, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some((id, secret)) = &self.explicit {
            debug!("using credentials from the command line");
            return Ok(Credentials {
                access_key_id: id.clone(),
                secret_access_key: secret.clone(),
                session_token: None,
            });
        }

        if !self.explicit_profile {
            if let (Some(id), Some(secret)) =
                (env("AWS_ACCESS_KEY_ID"), env("AWS_SECRET_ACCESS_KEY"))
            {
                debug!("using credentials from the environment");
                return Ok(Credentials {
                    access_key_id: id,
                    secret_access_key: secret,
                    session_token: env("AWS_SESSION_TOKEN"),
                });
            }
        }

        let path = match &self.credentials_file {
            Some(path) => path.clone(),
            None => match env("AWS_SHARED_CREDENTIALS_FILE") {
                Some(path) => PathBuf::from(path),
                None => default_credentials_path()?,
            },
        };
        debug!(profile = %self.profile, path = %path.display(), "using shared credentials file");
        load_profile(&path, &self.profile)
    }
}

fn default_credentials_path() -> Result<PathBuf, AppError> {
    dirs::home_dir()
        .map(|home| home.join(".aws").join("credentials"))
        .ok_or_else(|| AppError::Credentials("Could not find home directory".to_string()))
}

/// Read one profile out of an INI-style shared credentials file
pub fn load_profile(path: &Path, profile: &str) -> Result<Credentials, AppError> {
    let content = fs::read_to_string(path).map_err(|e| {
        AppError::Credentials(format!("Cannot read {}: {}", path.display(), e))
    })?;

    let sections = parse_ini(&content);
    let section = sections.get(profile).ok_or_else(|| {
        AppError::Credentials(format!(
            "Profile '{}' not found in {}",
            profile,
            path.display()
        ))
    })?;

    let field = |key: &str| {
        section.get(key).cloned().ok_or_else(|| {
            AppError::Credentials(format!("Profile '{}' has no {}", profile, key))
        })
    };

    Ok(Credentials {
        access_key_id: field("aws_access_key_id")?,
        secret_access_key: field("aws_secret_access_key")?,
        session_token: section.get("aws_session_token").cloned(),
    })
}

fn parse_ini(content: &str) -> HashMap<String, HashMap<String, String>> {
    let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut current: Option<String> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = name.trim();
            // ~/.aws/config style headers
            let name = name.strip_prefix("profile ").unwrap_or(name).trim();
            sections.entry(name.to_string()).or_default();
            current = Some(name.to_string());
            continue;
        }

        if let (Some(section), Some((key, value))) = (&current, line.split_once('=')) {
            sections
                .entry(section.clone())
                .or_default()
                .insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    sections
}
