//! Query modules for the synced tables stored in Redis.

use serde::de::DeserializeOwned;
use tracing::warn;

pub mod projects;
pub mod tasks;
pub mod team;

/// Decode one stored row for a listing. A row that no longer parses is
/// logged and skipped so one bad hash cannot hide the rest of the table.
fn decode_listed<T: DeserializeOwned>(table: &str, id: &str, json: &str) -> Option<T> {
    match serde_json::from_str(json) {
        Ok(row) => Some(row),
        Err(error) => {
            warn!(table, id, error = %error, "Skipping undecodable row");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::TeamMemberRow;

    #[test]
    fn test_undecodable_row_is_skipped() {
        let good = r#"{"id":"m-1","name":"Rina","role":"Frontend Dev"}"#;
        let row: Option<TeamMemberRow> = decode_listed("team", "m-1", good);
        assert_eq!(row.map(|r| r.name).as_deref(), Some("Rina"));

        let bad: Option<TeamMemberRow> = decode_listed("team", "m-2", "{\"id\":\"m-2\"");
        assert!(bad.is_none());
    }
}
