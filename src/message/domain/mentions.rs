//! Extraction of user mentions from message text.

use super::UserId;

/// Mentions found in a piece of message text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedMentions {
    /// Mentioned users in order of first appearance, without duplicates.
    pub users: Vec<UserId>,
    /// Whether the text pings everyone (`@everyone` or `@here`).
    pub everyone: bool,
}

/// Parses `<@id>` and `<@!id>` user mentions and the everyone flag.
///
/// Role mentions (`<@&id>`) and malformed tokens are skipped.
///
/// # Examples
///
/// ```
/// use herald::message::domain::{UserId, parse_mentions};
///
/// let parsed = parse_mentions("<@12>, see <@!34> and <@12> @here");
/// assert_eq!(parsed.users, vec![UserId::new("12"), UserId::new("34")]);
/// assert!(parsed.everyone);
/// ```
#[must_use]
pub fn parse_mentions(content: &str) -> ParsedMentions {
    let mut users: Vec<UserId> = Vec::new();
    for chunk in content.split("<@").skip(1) {
        let Some((raw, _)) = chunk.split_once('>') else {
            continue;
        };
        let token = raw.strip_prefix('!').unwrap_or(raw);
        if !is_mention_token(token) {
            continue;
        }
        if !users.iter().any(|user| user.as_str() == token) {
            users.push(UserId::new(token));
        }
    }

    ParsedMentions {
        users,
        everyone: content.contains("@everyone") || content.contains("@here"),
    }
}

fn is_mention_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
