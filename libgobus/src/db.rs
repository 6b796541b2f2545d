//! Local device storage for GoBus
//!
//! A small sqlite database standing in for the mobile client's key/value
//! device storage. Exactly two surfaces are persisted: the session and the
//! recent-search list. The recent-search list is mirrored wholesale on
//! every mutation and read back ordered, matching the in-memory list.

use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use std::path::Path;

use crate::error::Result;
use crate::types::{RecentSearch, Session, User};

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the local state database and run migrations
    pub async fn new(db_path: &str) -> Result<Self> {
        let expanded_path = shellexpand::tilde(db_path).to_string();
        let path = Path::new(&expanded_path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(crate::error::DbError::IoError)?;
        }

        // Forward slashes work for SQLite URLs on both Windows and Unix;
        // mode=rwc creates the database file if it doesn't exist.
        let db_url = format!("sqlite://{}?mode=rwc", expanded_path.replace('\\', "/"));

        let pool = SqlitePool::connect(&db_url)
            .await
            .map_err(crate::error::DbError::SqlxError)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(crate::error::DbError::MigrationError)?;

        Ok(Self { pool })
    }

    /// Persist the session (single fixed row)
    pub async fn save_session(&self, session: &Session) -> Result<()> {
        let user = session.user.as_ref();

        sqlx::query(
            r#"
            INSERT INTO session (id, name, email, avatar, role, phone, token, is_logged_in)
            VALUES (1, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                email = excluded.email,
                avatar = excluded.avatar,
                role = excluded.role,
                phone = excluded.phone,
                token = excluded.token,
                is_logged_in = excluded.is_logged_in
            "#,
        )
        .bind(user.map(|u| u.name.clone()))
        .bind(user.map(|u| u.email.clone()))
        .bind(user.and_then(|u| u.avatar.clone()))
        .bind(user.and_then(|u| u.role.clone()))
        .bind(user.and_then(|u| u.phone.clone()))
        .bind(&session.token)
        .bind(if session.is_logged_in { 1 } else { 0 })
        .execute(&self.pool)
        .await
        .map_err(crate::error::DbError::SqlxError)?;

        Ok(())
    }

    /// Load the persisted session, if one was ever saved
    pub async fn load_session(&self) -> Result<Option<Session>> {
        let row = sqlx::query(
            r#"
            SELECT name, email, avatar, role, phone, token, is_logged_in
            FROM session WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(crate::error::DbError::SqlxError)?;

        Ok(row.map(|r| {
            let name: Option<String> = r.get("name");
            let user = name.map(|name| User {
                name,
                email: r.get::<Option<String>, _>("email").unwrap_or_default(),
                avatar: r.get("avatar"),
                role: r.get("role"),
                phone: r.get("phone"),
            });

            Session {
                user,
                token: r.get("token"),
                is_logged_in: r.get::<i64, _>("is_logged_in") != 0,
            }
        }))
    }

    /// Mirror the full recent-search list, replacing whatever was stored
    pub async fn replace_recent_searches(&self, searches: &[RecentSearch]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(crate::error::DbError::SqlxError)?;

        sqlx::query("DELETE FROM recent_searches")
            .execute(&mut *tx)
            .await
            .map_err(crate::error::DbError::SqlxError)?;

        for (position, search) in searches.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO recent_searches (position, search_id, from_name, to_name, from_id, to_id)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(position as i64)
            .bind(&search.id)
            .bind(&search.from)
            .bind(&search.to)
            .bind(&search.from_id)
            .bind(&search.to_id)
            .execute(&mut *tx)
            .await
            .map_err(crate::error::DbError::SqlxError)?;
        }

        tx.commit().await.map_err(crate::error::DbError::SqlxError)?;

        Ok(())
    }

    /// Load the recent-search list, most recent first
    pub async fn load_recent_searches(&self) -> Result<Vec<RecentSearch>> {
        let rows = sqlx::query(
            r#"
            SELECT search_id, from_name, to_name, from_id, to_id
            FROM recent_searches ORDER BY position ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(crate::error::DbError::SqlxError)?;

        Ok(rows
            .into_iter()
            .map(|r| RecentSearch {
                id: r.get("search_id"),
                from: r.get("from_name"),
                to: r.get("to_name"),
                from_id: r.get("from_id"),
                to_id: r.get("to_id"),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_db() -> (TempDir, Database) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Database::new(&db_path.to_string_lossy()).await.unwrap();
        (temp_dir, db)
    }

    fn sample_search(pair: (&str, &str)) -> RecentSearch {
        RecentSearch::new(
            format!("from-{}", pair.0),
            format!("to-{}", pair.1),
            pair.0.to_string(),
            pair.1.to_string(),
        )
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let (_tmp, db) = create_test_db().await;

        assert!(db.load_session().await.unwrap().is_none());

        let session = Session {
            user: Some(User {
                name: "Asha".to_string(),
                email: "asha@example.com".to_string(),
                avatar: None,
                role: Some("driver".to_string()),
                phone: Some("9999999999".to_string()),
            }),
            token: Some("tok-123".to_string()),
            is_logged_in: true,
        };
        db.save_session(&session).await.unwrap();

        let loaded = db.load_session().await.unwrap().unwrap();
        assert!(loaded.is_logged_in);
        assert_eq!(loaded.token.as_deref(), Some("tok-123"));
        assert_eq!(loaded.user.as_ref().unwrap().name, "Asha");
        assert_eq!(loaded.user.as_ref().unwrap().role.as_deref(), Some("driver"));
    }

    #[tokio::test]
    async fn test_session_overwrite_on_logout() {
        let (_tmp, db) = create_test_db().await;

        let session = Session {
            user: Some(User {
                name: "Asha".to_string(),
                email: "asha@example.com".to_string(),
                avatar: None,
                role: None,
                phone: None,
            }),
            token: Some("tok".to_string()),
            is_logged_in: true,
        };
        db.save_session(&session).await.unwrap();
        db.save_session(&Session::default()).await.unwrap();

        let loaded = db.load_session().await.unwrap().unwrap();
        assert!(!loaded.is_logged_in);
        assert!(loaded.user.is_none());
        assert!(loaded.token.is_none());
    }

    #[tokio::test]
    async fn test_recent_searches_round_trip_preserves_order() {
        let (_tmp, db) = create_test_db().await;

        let searches = vec![
            sample_search(("a2", "b2")),
            sample_search(("a1", "b1")),
        ];
        db.replace_recent_searches(&searches).await.unwrap();

        let loaded = db.load_recent_searches().await.unwrap();
        assert_eq!(loaded, searches);
    }

    #[tokio::test]
    async fn test_recent_searches_replace_is_wholesale() {
        let (_tmp, db) = create_test_db().await;

        db.replace_recent_searches(&[
            sample_search(("a1", "b1")),
            sample_search(("a2", "b2")),
            sample_search(("a3", "b3")),
        ])
        .await
        .unwrap();

        let replacement = vec![sample_search(("a9", "b9"))];
        db.replace_recent_searches(&replacement).await.unwrap();

        let loaded = db.load_recent_searches().await.unwrap();
        assert_eq!(loaded, replacement);
    }

    #[tokio::test]
    async fn test_recent_searches_empty_replace() {
        let (_tmp, db) = create_test_db().await;

        db.replace_recent_searches(&[sample_search(("a1", "b1"))])
            .await
            .unwrap();
        db.replace_recent_searches(&[]).await.unwrap();

        assert!(db.load_recent_searches().await.unwrap().is_empty());
    }
}
