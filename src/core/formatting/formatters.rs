//! Pure display helpers shared by the command handlers.
//!
//! Nothing here knows about Discord types; handlers pass in primitives and
//! get strings back.

use std::fmt;
use std::time::Duration;

/// Discord rejects messages longer than this many characters.
pub const MESSAGE_LIMIT: usize = 2000;

/// Field separator used in the `git log` format string.
pub const GIT_FIELD_SEPARATOR: char = '\u{1f}';

/// A single commit of the bot's own repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub hash: String,
    pub summary: String,
}

/// Parses `git log --format=%H%x1f%s` output. Malformed lines are skipped.
pub fn parse_git_log(output: &str) -> Vec<Commit> {
    output
        .lines()
        .filter_map(|line| {
            let (hash, summary) = line.split_once(GIT_FIELD_SEPARATOR)?;
            let hash = hash.trim();
            if hash.is_empty() {
                return None;
            }
            Some(Commit {
                hash: hash.to_string(),
                summary: summary.trim().to_string(),
            })
        })
        .collect()
}

/// ``[`abcdef`](<repo>/commit/<hash>) summary``
pub fn format_commit(commit: &Commit, repository_url: &str) -> String {
    let short: String = commit.hash.chars().take(6).collect();
    format!(
        "[`{}`]({}/commit/{}) {}",
        short,
        repository_url.trim_end_matches('/'),
        commit.hash,
        commit.summary
    )
}

pub fn format_commits(commits: &[Commit], repository_url: &str) -> String {
    commits
        .iter()
        .map(|commit| format_commit(commit, repository_url))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rank icon for the leaderboard; everything past fourth place is platinum.
pub fn placement(place: usize) -> &'static str {
    match place {
        1 => "<:top500:632281138832080926>",
        2 => "<:grandmaster:632281128966946826>",
        3 => "<:master:632281117394993163>",
        4 => "<:diamond:632281105571119105>",
        _ => "<:platinum:632281092875091998>",
    }
}

/// Human readable uptime, e.g. `1 days, 2 hours, 3 minutes, 4 seconds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uptime(pub Duration);

impl fmt::Display for Uptime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.as_secs();
        let days = secs / 86_400;
        let hours = (secs % 86_400) / 3_600;
        let minutes = (secs % 3_600) / 60;
        let seconds = secs % 60;
        write!(
            f,
            "{} days, {} hours, {} minutes, {} seconds",
            days, hours, minutes, seconds
        )
    }
}

/// Wraps `text` in a fenced code block with the given language tag.
pub fn code_block(language: &str, text: &str) -> String {
    format!("```{}\n{}\n```", language, text)
}

/// The `Kind\nmessage` block every owner command uses to report a fault.
pub fn prolog_block(kind: &str, message: &str) -> String {
    format!("```prolog\n{}\n{}```", kind, message)
}

/// Splits `text` into pieces of at most `limit` characters, preferring to
/// break after a newline.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    if limit == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();
        if current_len + line_len <= limit {
            current.push_str(line);
            current_len += line_len;
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len <= limit {
            current.push_str(line);
            current_len = line_len;
            continue;
        }

        // A single line longer than the limit is cut on character boundaries.
        let chars: Vec<char> = line.chars().collect();
        for piece in chars.chunks(limit) {
            if piece.len() == limit {
                chunks.push(piece.iter().collect());
            } else {
                current = piece.iter().collect();
                current_len = piece.len();
            }
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Splits `text` so every piece fits in a message once fenced with `language`.
pub fn fenced_chunks(language: &str, text: &str) -> Vec<String> {
    let overhead = code_block(language, "").chars().count();
    split_message(text, MESSAGE_LIMIT.saturating_sub(overhead))
        .into_iter()
        .map(|chunk| code_block(language, chunk.trim_end_matches('\n')))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_git_log() {
        let output = "abcdef123456\u{1f}Fix status command\n\n0123456789ab\u{1f}Bump deps\nbroken line\n";
        let commits = parse_git_log(output);
        assert_eq!(
            commits,
            vec![
                Commit {
                    hash: "abcdef123456".to_string(),
                    summary: "Fix status command".to_string()
                },
                Commit {
                    hash: "0123456789ab".to_string(),
                    summary: "Bump deps".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_format_commit() {
        let commit = Commit {
            hash: "abcdef123456".to_string(),
            summary: "Fix status command".to_string(),
        };
        assert_eq!(
            format_commit(&commit, "https://github.com/davidetacchini/OverBot/"),
            "[`abcdef`](https://github.com/davidetacchini/OverBot/commit/abcdef123456) Fix status command"
        );
    }

    #[test]
    fn test_placement_icons() {
        assert!(placement(1).contains("top500"));
        assert!(placement(2).contains("grandmaster"));
        assert!(placement(4).contains("diamond"));
        assert!(placement(5).contains("platinum"));
        assert!(placement(42).contains("platinum"));
    }

    #[test]
    fn test_uptime_display() {
        let uptime = Uptime(Duration::from_secs(86_400 + 2 * 3_600 + 3 * 60 + 4));
        assert_eq!(uptime.to_string(), "1 days, 2 hours, 3 minutes, 4 seconds");
        assert_eq!(
            Uptime(Duration::ZERO).to_string(),
            "0 days, 0 hours, 0 minutes, 0 seconds"
        );
    }

    #[test]
    fn test_prolog_block() {
        assert_eq!(
            prolog_block("ExtensionNotFound", "Extension 'cogs.x' could not be loaded."),
            "```prolog\nExtensionNotFound\nExtension 'cogs.x' could not be loaded.```"
        );
    }

    #[test]
    fn test_split_message_prefers_newlines() {
        let chunks = split_message("aaaa\nbbbb\ncc", 6);
        assert_eq!(chunks, vec!["aaaa\n", "bbbb\n", "cc"]);
    }

    #[test]
    fn test_split_message_cuts_long_lines() {
        let chunks = split_message("abcdefgh", 3);
        assert_eq!(chunks, vec!["abc", "def", "gh"]);
        assert!(split_message("", 10).is_empty());
    }

    #[test]
    fn test_fenced_chunks_fit_the_limit() {
        let text = "x".repeat(5000);
        let chunks = fenced_chunks("py", &text);
        assert!(chunks.len() >= 3);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= MESSAGE_LIMIT);
            assert!(chunk.starts_with("```py\n"));
            assert!(chunk.ends_with("\n```"));
        }
    }
}
