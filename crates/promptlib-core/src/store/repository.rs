//! Prompt repository implementation

#![allow(clippy::cast_possible_wrap)] // SQLite uses i64 for LIMIT

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::models::{Prompt, PromptId};

const UPSERT_SQL: &str = "INSERT INTO prompts (id, name, text, created_at, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5)
     ON CONFLICT(id) DO UPDATE SET
         name = excluded.name,
         text = excluded.text,
         created_at = excluded.created_at,
         updated_at = excluded.updated_at";

/// Trait for prompt storage operations
pub trait PromptRepository {
    /// Get a prompt by ID
    fn get(&self, id: &PromptId) -> Result<Option<Prompt>>;

    /// List every prompt, most recently updated first
    fn list_all(&self) -> Result<Vec<Prompt>>;

    /// Insert a prompt or overwrite the row with the same ID
    fn upsert(&self, prompt: &Prompt) -> Result<()>;

    /// Upsert a batch of prompts in one transaction, returning the row count
    fn bulk_upsert(&self, prompts: &[Prompt]) -> Result<usize>;

    /// Delete a prompt; returns whether a row was removed
    fn delete(&self, id: &PromptId) -> Result<bool>;

    /// Move the row keyed by `from` to `to`, keeping every other field.
    ///
    /// Returns the re-keyed prompt, or `None` when no row exists under `from`.
    fn rekey(&self, from: &PromptId, to: &PromptId) -> Result<Option<Prompt>>;

    /// List up to `limit` IDs starting with `prefix`
    fn ids_with_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<PromptId>>;

    /// Number of stored prompts
    fn count(&self) -> Result<usize>;
}

/// `SQLite` implementation of `PromptRepository`
pub struct SqlitePromptRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqlitePromptRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Parse a prompt from a database row
    fn parse_prompt(row: &rusqlite::Row<'_>) -> rusqlite::Result<Prompt> {
        let id: String = row.get(0)?;
        Ok(Prompt {
            id: id.parse().map_err(|_| {
                rusqlite::Error::InvalidColumnType(0, "id".into(), rusqlite::types::Type::Text)
            })?,
            name: row.get(1)?,
            text: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    fn upsert_with(conn: &Connection, prompt: &Prompt) -> Result<()> {
        conn.execute(
            UPSERT_SQL,
            params![
                prompt.id.as_str(),
                prompt.name,
                prompt.text,
                prompt.created_at,
                prompt.updated_at
            ],
        )?;
        Ok(())
    }
}

impl PromptRepository for SqlitePromptRepository<'_> {
    fn get(&self, id: &PromptId) -> Result<Option<Prompt>> {
        let prompt = self
            .conn
            .query_row(
                "SELECT id, name, text, created_at, updated_at FROM prompts WHERE id = ?1",
                params![id.as_str()],
                Self::parse_prompt,
            )
            .optional()?;
        Ok(prompt)
    }

    fn list_all(&self) -> Result<Vec<Prompt>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, text, created_at, updated_at
             FROM prompts
             ORDER BY updated_at DESC, id ASC",
        )?;

        let prompts = stmt
            .query_map([], Self::parse_prompt)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(prompts)
    }

    fn upsert(&self, prompt: &Prompt) -> Result<()> {
        Self::upsert_with(self.conn, prompt)
    }

    fn bulk_upsert(&self, prompts: &[Prompt]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(UPSERT_SQL)?;
            for prompt in prompts {
                stmt.execute(params![
                    prompt.id.as_str(),
                    prompt.name,
                    prompt.text,
                    prompt.created_at,
                    prompt.updated_at
                ])?;
            }
        }
        tx.commit()?;
        Ok(prompts.len())
    }

    fn delete(&self, id: &PromptId) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM prompts WHERE id = ?1", params![id.as_str()])?;
        Ok(rows > 0)
    }

    fn rekey(&self, from: &PromptId, to: &PromptId) -> Result<Option<Prompt>> {
        let tx = self.conn.unchecked_transaction()?;

        let Some(existing) = self.get(from)? else {
            return Ok(None);
        };

        let rekeyed = Prompt {
            id: to.clone(),
            ..existing
        };
        tx.execute("DELETE FROM prompts WHERE id = ?1", params![from.as_str()])?;
        Self::upsert_with(&tx, &rekeyed)?;
        tx.commit()?;

        Ok(Some(rekeyed))
    }

    fn ids_with_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<PromptId>> {
        let mut stmt = self.conn.prepare(
            "SELECT id FROM prompts
             WHERE substr(id, 1, length(?1)) = ?1
             ORDER BY updated_at DESC
             LIMIT ?2",
        )?;

        let ids = stmt
            .query_map(params![prefix, limit as i64], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        ids.into_iter().map(PromptId::parse).collect()
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM prompts", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Database;
    use pretty_assertions::assert_eq;

    fn setup() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn prompt(id: &str, name: &str, text: &str, updated_at: i64) -> Prompt {
        Prompt {
            id: PromptId::parse(id).unwrap(),
            name: name.to_string(),
            text: text.to_string(),
            created_at: 1,
            updated_at,
        }
    }

    #[test]
    fn test_upsert_and_get() {
        let db = setup();
        let repo = SqlitePromptRepository::new(db.connection());

        let original = prompt("a", "Name", "Body", 10);
        repo.upsert(&original).unwrap();
        assert_eq!(repo.get(&original.id).unwrap(), Some(original.clone()));

        let changed = Prompt {
            name: "Renamed".to_string(),
            ..original.clone()
        };
        repo.upsert(&changed).unwrap();
        assert_eq!(repo.get(&original.id).unwrap(), Some(changed));
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_list_all_orders_by_updated_at_desc() {
        let db = setup();
        let repo = SqlitePromptRepository::new(db.connection());

        repo.upsert(&prompt("old", "Old", "x", 10)).unwrap();
        repo.upsert(&prompt("new", "New", "x", 30)).unwrap();
        repo.upsert(&prompt("mid", "Mid", "x", 20)).unwrap();

        let ids: Vec<String> = repo
            .list_all()
            .unwrap()
            .into_iter()
            .map(|p| p.id.to_string())
            .collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_bulk_upsert_is_idempotent() {
        let db = setup();
        let repo = SqlitePromptRepository::new(db.connection());
        let batch = vec![prompt("a", "A", "x", 1), prompt("b", "B", "y", 2)];

        repo.bulk_upsert(&batch).unwrap();
        let first = repo.list_all().unwrap();
        repo.bulk_upsert(&batch).unwrap();
        let second = repo.list_all().unwrap();

        assert_eq!(first, second);
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn test_bulk_upsert_keeps_rows_missing_from_batch() {
        let db = setup();
        let repo = SqlitePromptRepository::new(db.connection());
        repo.upsert(&prompt("local-only", "Draft", "x", 5)).unwrap();

        repo.bulk_upsert(&[prompt("remote", "Remote", "y", 6)])
            .unwrap();

        assert_eq!(repo.count().unwrap(), 2);
        assert!(repo
            .get(&PromptId::parse("local-only").unwrap())
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_delete() {
        let db = setup();
        let repo = SqlitePromptRepository::new(db.connection());
        let p = prompt("a", "A", "x", 1);
        repo.upsert(&p).unwrap();

        assert!(repo.delete(&p.id).unwrap());
        assert!(!repo.delete(&p.id).unwrap());
        assert!(repo.get(&p.id).unwrap().is_none());
    }

    #[test]
    fn test_rekey_moves_row() {
        let db = setup();
        let repo = SqlitePromptRepository::new(db.connection());
        let p = prompt("local", "Keep me", "body", 7);
        repo.upsert(&p).unwrap();

        let to = PromptId::parse("server-1").unwrap();
        let moved = repo.rekey(&p.id, &to).unwrap().unwrap();

        assert_eq!(moved.id, to);
        assert_eq!(moved.name, "Keep me");
        assert_eq!(moved.updated_at, 7);
        assert!(repo.get(&p.id).unwrap().is_none());
        assert_eq!(repo.get(&to).unwrap(), Some(moved));
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_rekey_missing_row_is_noop() {
        let db = setup();
        let repo = SqlitePromptRepository::new(db.connection());

        let result = repo
            .rekey(
                &PromptId::parse("gone").unwrap(),
                &PromptId::parse("server").unwrap(),
            )
            .unwrap();
        assert!(result.is_none());
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_ids_with_prefix() {
        let db = setup();
        let repo = SqlitePromptRepository::new(db.connection());
        repo.upsert(&prompt("abc-1", "A", "x", 1)).unwrap();
        repo.upsert(&prompt("abc-2", "B", "x", 2)).unwrap();
        repo.upsert(&prompt("xyz", "C", "x", 3)).unwrap();

        let ids = repo.ids_with_prefix("abc", 10).unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0].as_str(), "abc-2");

        assert!(repo.ids_with_prefix("nope", 10).unwrap().is_empty());
    }
}
