use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use riquer_core::{default_roster, ConversationSession, Language, Teacher};
use sqlx::{Row, SqlitePool};

pub trait SessionRepository: Send + Sync {
    async fn load_session(&self, session_id: &str) -> Result<Option<ConversationSession>>;
    async fn upsert_session(&self, session: &ConversationSession) -> Result<()>;
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64>;
}

pub trait TeacherRepository: Send + Sync {
    async fn list_teachers(&self) -> Result<Vec<Teacher>>;
    async fn upsert_teacher(&self, teacher: Teacher) -> Result<()>;
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    sessions: Arc<RwLock<HashMap<String, ConversationSession>>>,
    teachers: Arc<RwLock<HashMap<String, Teacher>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let store = Self::default();
        {
            let mut teachers = store.teachers.write();
            for teacher in default_roster() {
                teachers.insert(teacher.name.clone(), teacher);
            }
        }
        store
    }
}

impl SessionRepository for MemoryStore {
    async fn load_session(&self, session_id: &str) -> Result<Option<ConversationSession>> {
        let session = self.sessions.read().get(session_id).cloned();
        Ok(session.filter(|value| value.expires_at > Utc::now()))
    }

    async fn upsert_session(&self, session: &ConversationSession) -> Result<()> {
        self.sessions
            .write()
            .insert(session.session_id.clone(), session.clone());
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut removed = 0_u64;
        self.sessions.write().retain(|_, value| {
            let keep = value.expires_at > now;
            if !keep {
                removed += 1;
            }
            keep
        });

        Ok(removed)
    }
}

impl TeacherRepository for MemoryStore {
    async fn list_teachers(&self) -> Result<Vec<Teacher>> {
        let mut teachers = self.teachers.read().values().cloned().collect::<Vec<_>>();
        teachers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(teachers)
    }

    async fn upsert_teacher(&self, teacher: Teacher) -> Result<()> {
        self.teachers.write().insert(teacher.name.clone(), teacher);
        Ok(())
    }
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("failed connecting to sqlite at {}", database_url))?;

        let store = Self { pool };
        store.ensure_schema().await?;
        store.seed_roster_if_empty().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
              session_id TEXT PRIMARY KEY,
              user_name TEXT,
              user_contact TEXT,
              language TEXT NOT NULL,
              expires_at TEXT NOT NULL,
              turns_json TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS teachers (
              name TEXT PRIMARY KEY,
              email TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn seed_roster_if_empty(&self) -> Result<()> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM teachers")
            .fetch_one(&self.pool)
            .await?;
        if count > 0 {
            return Ok(());
        }

        for teacher in default_roster() {
            self.upsert_teacher(teacher).await?;
        }
        Ok(())
    }
}

impl SessionRepository for SqliteStore {
    async fn load_session(&self, session_id: &str) -> Result<Option<ConversationSession>> {
        let row = sqlx::query(
            r#"
            SELECT session_id, user_name, user_contact, language, expires_at, turns_json
            FROM sessions
            WHERE session_id = ?1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let language = Language::from_optional_str(Some(row.get::<String, _>("language").as_str()))
            .unwrap_or_default();
        let turns_json: String = row.get("turns_json");
        let turns = serde_json::from_str(&turns_json).unwrap_or_default();
        let expires_at: DateTime<Utc> = row
            .get::<String, _>("expires_at")
            .parse()
            .unwrap_or_else(|_| Utc::now());

        if expires_at <= Utc::now() {
            return Ok(None);
        }

        Ok(Some(ConversationSession {
            session_id: row.get("session_id"),
            user_name: row.get("user_name"),
            user_contact: row.get("user_contact"),
            language,
            expires_at,
            turns,
        }))
    }

    async fn upsert_session(&self, session: &ConversationSession) -> Result<()> {
        let turns_json = serde_json::to_string(&session.turns)?;

        sqlx::query(
            r#"
            INSERT INTO sessions (session_id, user_name, user_contact, language, expires_at, turns_json)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(session_id) DO UPDATE SET
              user_name=excluded.user_name,
              user_contact=excluded.user_contact,
              language=excluded.language,
              expires_at=excluded.expires_at,
              turns_json=excluded.turns_json
            "#,
        )
        .bind(&session.session_id)
        .bind(&session.user_name)
        .bind(&session.user_contact)
        .bind(session.language.as_code())
        .bind(session.expires_at.to_rfc3339())
        .bind(turns_json)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?1")
            .bind(now.to_rfc3339())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

impl TeacherRepository for SqliteStore {
    async fn list_teachers(&self) -> Result<Vec<Teacher>> {
        let rows = sqlx::query(
            r#"
            SELECT name, email
            FROM teachers
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Teacher {
                name: row.get("name"),
                email: row.get("email"),
            })
            .collect())
    }

    async fn upsert_teacher(&self, teacher: Teacher) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO teachers (name, email)
            VALUES (?1, ?2)
            ON CONFLICT(name) DO UPDATE SET email=excluded.email
            "#,
        )
        .bind(&teacher.name)
        .bind(&teacher.email)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    Sqlite(SqliteStore),
}

impl Store {
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    pub async fn sqlite(database_url: &str) -> Result<Self> {
        let sqlite = SqliteStore::connect(database_url).await?;
        Ok(Self::Sqlite(sqlite))
    }
}

impl SessionRepository for Store {
    async fn load_session(&self, session_id: &str) -> Result<Option<ConversationSession>> {
        match self {
            Store::Memory(store) => store.load_session(session_id).await,
            Store::Sqlite(store) => store.load_session(session_id).await,
        }
    }

    async fn upsert_session(&self, session: &ConversationSession) -> Result<()> {
        match self {
            Store::Memory(store) => store.upsert_session(session).await,
            Store::Sqlite(store) => store.upsert_session(session).await,
        }
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        match self {
            Store::Memory(store) => store.purge_expired(now).await,
            Store::Sqlite(store) => store.purge_expired(now).await,
        }
    }
}

impl TeacherRepository for Store {
    async fn list_teachers(&self) -> Result<Vec<Teacher>> {
        match self {
            Store::Memory(store) => store.list_teachers().await,
            Store::Sqlite(store) => store.list_teachers().await,
        }
    }

    async fn upsert_teacher(&self, teacher: Teacher) -> Result<()> {
        match self {
            Store::Memory(store) => store.upsert_teacher(teacher).await,
            Store::Sqlite(store) => store.upsert_teacher(teacher).await,
        }
    }
}
