use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsernameError {
    #[error("username is required")]
    Empty,
    #[error("username must be at most {0} characters")]
    TooLong(usize),
    #[error("username must be at least {0} characters")]
    TooShort(usize),
    #[error("username contains an invalid character: {0:?}")]
    InvalidCharacter(char),
}

/// A username on an external platform. Only the characters the supported
/// platforms allow in handles are accepted, which keeps the value safe to
/// interpolate into upstream URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformUsername(String);

impl PlatformUsername {
    pub const MAX_LEN: usize = 64;

    pub fn parse(raw: &str) -> Result<Self, UsernameError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UsernameError::Empty);
        }
        if trimmed.chars().count() > Self::MAX_LEN {
            return Err(UsernameError::TooLong(Self::MAX_LEN));
        }
        if let Some(c) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
        {
            return Err(UsernameError::InvalidCharacter(c));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PlatformUsername {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlatformUsername {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The site-wide public handle of a profile, stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublicUsername(String);

impl PublicUsername {
    pub const MIN_LEN: usize = 3;
    pub const MAX_LEN: usize = 30;

    pub fn parse(raw: &str) -> Result<Self, UsernameError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UsernameError::Empty);
        }
        if let Some(c) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_')))
        {
            return Err(UsernameError::InvalidCharacter(c));
        }
        let len = trimmed.len();
        if len < Self::MIN_LEN {
            return Err(UsernameError::TooShort(Self::MIN_LEN));
        }
        if len > Self::MAX_LEN {
            return Err(UsernameError::TooLong(Self::MAX_LEN));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PublicUsername {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
