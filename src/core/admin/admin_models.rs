use std::fmt;

/// Row of the `command` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRow {
    pub id: i64,
    pub name: String,
    pub used: i64,
}

impl fmt::Display for CommandRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, '{}', {})", self.id, self.name, self.used)
    }
}

/// `server` projection used by the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerUsage {
    pub id: u64,
    pub commands_runned: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: i64,
    pub platform: String,
    pub name: String,
}

/// Row of the legacy `prefixes` table; guild ids were stored as text there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyPrefix {
    pub guild_id: String,
    pub prefix: String,
}

/// Numbers shown by the `admin` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminPanel {
    pub profiles: i64,
    pub prefixes: i64,
    pub guilds: i64,
    pub session_commands: u64,
    pub lifetime_commands: i64,
}

/// Outcome of a migration that skips rows it cannot apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub applied: usize,
    pub skipped: usize,
}

/// A single cell of an ad-hoc query result.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Null => write!(f, "None"),
            QueryValue::Integer(i) => write!(f, "{}", i),
            QueryValue::Real(r) => write!(f, "{}", r),
            QueryValue::Text(s) => write!(f, "'{}'", s),
            QueryValue::Blob(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<QueryValue>>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// One `<Record col=value ...>` line per row.
    pub fn render(&self) -> String {
        self.rows
            .iter()
            .map(|row| {
                let fields: Vec<String> = self
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(column, value)| format!("{}={}", column, value))
                    .collect();
                format!("<Record {}>", fields.join(" "))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_records() {
        let result = QueryResult {
            columns: vec!["id".into(), "prefix".into(), "note".into()],
            rows: vec![
                vec![
                    QueryValue::Integer(1),
                    QueryValue::Text("-".into()),
                    QueryValue::Null,
                ],
                vec![
                    QueryValue::Integer(2),
                    QueryValue::Text("!".into()),
                    QueryValue::Real(0.5),
                ],
            ],
        };
        assert_eq!(
            result.render(),
            "<Record id=1 prefix='-' note=None>\n<Record id=2 prefix='!' note=0.5>"
        );
    }

    #[test]
    fn test_command_row_display() {
        let row = CommandRow {
            id: 3,
            name: "ping".into(),
            used: 12,
        };
        assert_eq!(row.to_string(), "(3, 'ping', 12)");
    }
}
