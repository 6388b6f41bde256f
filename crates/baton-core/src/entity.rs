use serde::{Deserialize, Serialize};

/// What a catalog key or result row refers to.
///
/// The remote catalog encodes the kind both as a one-letter `type`
/// discriminator on result rows and as the first character of every key:
/// `r` = artist, `a` = album, `t` = track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Artist,
    Album,
    Track,
}

impl EntityKind {
    /// Infer the kind from a catalog key's first character.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.chars().next()? {
            'r' => Some(Self::Artist),
            'a' => Some(Self::Album),
            't' => Some(Self::Track),
            _ => None,
        }
    }

    /// Infer the kind from a result row's `type` discriminator.
    pub fn from_type_tag(tag: &str) -> Option<Self> {
        match tag {
            "r" => Some(Self::Artist),
            "a" => Some(Self::Album),
            "t" => Some(Self::Track),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Artist => "artist",
            Self::Album => "album",
            Self::Track => "track",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_key_prefix() {
        assert_eq!(EntityKind::from_key("r123"), Some(EntityKind::Artist));
        assert_eq!(EntityKind::from_key("a456"), Some(EntityKind::Album));
        assert_eq!(EntityKind::from_key("t789"), Some(EntityKind::Track));
    }

    #[test]
    fn test_unknown_or_empty_key_has_no_kind() {
        assert_eq!(EntityKind::from_key("x1"), None);
        assert_eq!(EntityKind::from_key(""), None);
    }

    #[test]
    fn test_kind_from_type_tag() {
        assert_eq!(EntityKind::from_type_tag("r"), Some(EntityKind::Artist));
        assert_eq!(EntityKind::from_type_tag("playlist"), None);
    }
}
