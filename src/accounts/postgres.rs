//! Postgres-backed [`UserRepository`].

use async_trait::async_trait;
use sqlx::{Connection, PgPool, Row};
use tracing::{Instrument, info_span};

use super::{
    Account,
    repository::{InsertOutcome, Lookup, StoreError, UserRepository},
};

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

#[derive(Clone, Debug)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `users` table if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error if the schema statement fails.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let span = info_span!("db.query", db.system = "postgresql", db.operation = "CREATE");
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&self.pool)
            .instrument(span)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Lookup, StoreError> {
        let query = "SELECT username, full_name, email, password_hash FROM users WHERE username = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        Ok(row.map_or(Lookup::NotFound, |row| {
            Lookup::Found(Account {
                username: row.get("username"),
                full_name: row.get("full_name"),
                email: row.get("email"),
                password_hash: row.get("password_hash"),
            })
        }))
    }

    async fn insert(&self, account: &Account) -> Result<InsertOutcome, StoreError> {
        let query = r"
            INSERT INTO users
                (username, full_name, email, password_hash)
            VALUES ($1, $2, $3, $4)
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(&account.username)
            .bind(&account.full_name)
            .bind(&account.email)
            .bind(&account.password_hash)
            .execute(&self.pool)
            .instrument(span)
            .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Created),
            Err(err) if is_unique_violation(&err) => Ok(InsertOutcome::Conflict),
            Err(err) => Err(err.into()),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self.pool.acquire().instrument(acquire_span).await?;
        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping().instrument(ping_span).await?;
        Ok(())
    }
}

/// SQLSTATE 23505: `unique_violation`.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    #[derive(Debug)]
    struct TestDbError {
        code: Option<&'static str>,
    }

    impl fmt::Display for TestDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test database error")
        }
    }

    impl StdError for TestDbError {}

    impl DatabaseError for TestDbError {
        fn message(&self) -> &'static str {
            "test database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn unique_violation_is_detected_by_sqlstate() {
        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("23505"),
        }));
        assert!(is_unique_violation(&err));

        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("23502"),
        }));
        assert!(!is_unique_violation(&err));

        let err = sqlx::Error::Database(Box::new(TestDbError { code: None }));
        assert!(!is_unique_violation(&err));

        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        assert!(!is_unique_violation(&sqlx::Error::PoolTimedOut));
    }

    #[test]
    fn schema_declares_username_uniqueness() {
        assert!(SCHEMA_SQL.contains("CREATE TABLE IF NOT EXISTS users"));
        assert!(SCHEMA_SQL.contains("username      TEXT PRIMARY KEY"));
    }

    #[tokio::test]
    async fn lazy_pool_reports_unreachable_store() {
        // Nothing listens on port 1; the lookup must surface a store error,
        // never a "not found".
        let pool = sqlx::postgres::PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy("postgres://passgate@127.0.0.1:1/passgate");
        let Ok(pool) = pool else {
            return;
        };
        let repo = PgUserRepository::new(pool);
        assert!(matches!(
            repo.find_by_username("alice").await,
            Err(StoreError::Query(_))
        ));
        assert!(repo.ping().await.is_err());
    }

    /// Runs against the database named by `PASSGATE_TEST_DSN`; skipped when unset.
    /// Usernames carry a ULID suffix so runs never collide with existing rows.
    mod live {
        use super::super::*;
        use crate::accounts::{
            AuthError, NewAccount, RegistrationService, hasher::tests::test_hasher,
        };
        use anyhow::{Context, Result};
        use secrecy::SecretString;
        use sqlx::postgres::PgPoolOptions;
        use std::{sync::Arc, time::Duration};
        use ulid::Ulid;

        const TEST_DSN_ENV: &str = "PASSGATE_TEST_DSN";

        async fn get_test_repository() -> Result<Option<PgUserRepository>> {
            let Ok(dsn) = std::env::var(TEST_DSN_ENV) else {
                eprintln!("Skipping database test: {TEST_DSN_ENV} is not set");
                return Ok(None);
            };

            let pool = PgPoolOptions::new()
                .max_connections(10)
                .acquire_timeout(Duration::from_secs(30))
                .connect(&dsn)
                .await
                .context("failed to connect to test database")?;

            let repo = PgUserRepository::new(pool);
            repo.ensure_schema()
                .await
                .context("failed to execute schema SQL")?;
            Ok(Some(repo))
        }

        fn unique_username(prefix: &str) -> String {
            format!("{prefix}-{}", Ulid::new())
        }

        fn account(username: &str) -> Account {
            Account {
                username: username.to_string(),
                full_name: "Alice A".to_string(),
                email: "a@x.com".to_string(),
                password_hash: "$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$aGFzaGhhc2g".to_string(),
            }
        }

        async fn row_count(repo: &PgUserRepository, username: &str) -> Result<i64> {
            let row = sqlx::query("SELECT COUNT(*) AS count FROM users WHERE username = $1")
                .bind(username)
                .fetch_one(&repo.pool)
                .await?;
            Ok(row.get("count"))
        }

        #[tokio::test]
        async fn insert_then_find_round_trip() -> Result<()> {
            let Some(repo) = get_test_repository().await? else {
                return Ok(());
            };
            let username = unique_username("alice");

            assert!(matches!(
                repo.find_by_username(&username).await?,
                Lookup::NotFound
            ));
            assert_eq!(repo.insert(&account(&username)).await?, InsertOutcome::Created);

            match repo.find_by_username(&username).await? {
                Lookup::Found(found) => assert_eq!(found, account(&username)),
                Lookup::NotFound => panic!("inserted account not found"),
            }
            repo.ping().await?;
            Ok(())
        }

        #[tokio::test]
        async fn duplicate_insert_is_a_conflict() -> Result<()> {
            let Some(repo) = get_test_repository().await? else {
                return Ok(());
            };
            let username = unique_username("dup");

            assert_eq!(repo.insert(&account(&username)).await?, InsertOutcome::Created);
            let mut second = account(&username);
            second.full_name = "Someone Else".to_string();
            assert_eq!(repo.insert(&second).await?, InsertOutcome::Conflict);

            assert_eq!(row_count(&repo, &username).await?, 1);
            match repo.find_by_username(&username).await? {
                Lookup::Found(found) => assert_eq!(found.full_name, "Alice A"),
                Lookup::NotFound => panic!("account vanished after conflict"),
            }
            Ok(())
        }

        #[tokio::test]
        async fn concurrent_registrations_store_one_row() -> Result<()> {
            let Some(repo) = get_test_repository().await? else {
                return Ok(());
            };
            let username = unique_username("race");
            let service = Arc::new(RegistrationService::new(
                Arc::new(repo.clone()),
                Arc::new(test_hasher()),
                Duration::from_secs(30),
            ));

            let tasks: Vec<_> = (0..8)
                .map(|_| {
                    let service = Arc::clone(&service);
                    let username = username.clone();
                    tokio::spawn(async move {
                        service
                            .register(NewAccount {
                                username,
                                full_name: "Alice A".to_string(),
                                email: "a@x.com".to_string(),
                                password: SecretString::from("p@ss".to_string()),
                            })
                            .await
                    })
                })
                .collect();

            let mut created = 0;
            let mut conflicts = 0;
            for task in tasks {
                match task.await? {
                    Ok(_) => created += 1,
                    Err(AuthError::Conflict) => conflicts += 1,
                    Err(err) => return Err(err.into()),
                }
            }

            assert_eq!(created, 1);
            assert_eq!(conflicts, 7);
            assert_eq!(row_count(&repo, &username).await?, 1);
            Ok(())
        }

        #[tokio::test]
        async fn store_refuses_nul_in_text() -> Result<()> {
            let Some(repo) = get_test_repository().await? else {
                return Ok(());
            };
            // Registration and login validate usernames before they get here.
            assert!(matches!(
                repo.find_by_username("al\u{0}ice").await,
                Err(StoreError::Query(_))
            ));
            Ok(())
        }
    }
}
