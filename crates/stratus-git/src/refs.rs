//! Git reference names.

use std::fmt;

/// The reference a clone tracks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GitRef {
    /// A branch reference (e.g., "master", "develop").
    Branch(String),

    /// A tag reference (e.g., "v1.0.0").
    Tag(String),
}

impl GitRef {
    /// Parses a configured branch string.
    ///
    /// - Starts with "refs/tags/" or "tags/" → Tag
    /// - Otherwise → Branch, with any "refs/heads/" prefix removed
    pub fn parse(label: &str) -> Self {
        let label = label.trim();

        if let Some(tag_name) = label.strip_prefix("refs/tags/") {
            return Self::Tag(tag_name.to_string());
        }
        if let Some(tag_name) = label.strip_prefix("tags/") {
            return Self::Tag(tag_name.to_string());
        }

        let branch = label.strip_prefix("refs/heads/").unwrap_or(label);
        Self::Branch(branch.to_string())
    }

    /// Returns the reference name without prefix.
    pub fn name(&self) -> &str {
        match self {
            Self::Branch(name) | Self::Tag(name) => name,
        }
    }

    /// Returns the full name the remote advertises this reference under.
    pub fn full_name(&self) -> String {
        match self {
            Self::Branch(name) => format!("refs/heads/{}", name),
            Self::Tag(name) => format!("refs/tags/{}", name),
        }
    }

    /// Validates the reference name.
    ///
    /// Returns an error message if the name is invalid.
    pub fn validate(&self) -> Result<(), &'static str> {
        let name = self.name();

        if name.is_empty() {
            return Err("reference name cannot be empty");
        }

        if name.starts_with('/') || name.ends_with('/') {
            return Err("reference name cannot start or end with '/'");
        }

        if name.starts_with('-') {
            return Err("reference name cannot start with '-'");
        }

        if name.contains("..") || name.contains("//") {
            return Err("reference name cannot contain '..' or '//'");
        }

        if name
            .chars()
            .any(|c| c.is_control() || matches!(c, ' ' | '~' | '^' | ':' | '?' | '*' | '[' | '\\' | '\''))
        {
            return Err("reference name contains invalid characters");
        }

        Ok(())
    }
}

impl fmt::Display for GitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Branch(name) => write!(f, "{}", name),
            Self::Tag(name) => write!(f, "tags/{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(GitRef::parse("master"), GitRef::Branch("master".to_string()));
        assert_eq!(
            GitRef::parse("refs/heads/feature/x"),
            GitRef::Branch("feature/x".to_string())
        );
        assert_eq!(GitRef::parse("refs/tags/v1"), GitRef::Tag("v1".to_string()));
        assert_eq!(GitRef::parse("tags/v2"), GitRef::Tag("v2".to_string()));
    }

    #[test]
    fn test_full_name() {
        assert_eq!(GitRef::parse("master").full_name(), "refs/heads/master");
        assert_eq!(GitRef::parse("tags/v1").full_name(), "refs/tags/v1");
        assert_eq!(GitRef::parse("refs/tags/v1").full_name(), "refs/tags/v1");
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for label in ["master", "refs/heads/develop", "tags/v1", "refs/tags/v2"] {
            let git_ref = GitRef::parse(label);
            assert_eq!(GitRef::parse(&git_ref.to_string()), git_ref);
        }
    }

    #[test]
    fn test_validate() {
        assert!(GitRef::parse("master").validate().is_ok());
        assert!(GitRef::parse("release/2024").validate().is_ok());

        assert!(GitRef::parse("").validate().is_err());
        assert!(GitRef::parse("main/").validate().is_err());
        assert!(GitRef::parse("--upload-pack=x").validate().is_err());
        assert!(GitRef::parse("a..b").validate().is_err());
        assert!(GitRef::parse("it's").validate().is_err());
    }
}
