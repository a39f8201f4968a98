use std::collections::HashSet;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tutorline_auth::{AuthError, Authenticator};
use tutorline_chats::Role;
use tutorline_config::{AuthConfig, DatabaseConfig};

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

fn default_auth_config() -> AuthConfig {
    AuthConfig {
        session_ttl_seconds: 3_600,
    }
}

struct TestContext {
    pool: SqlitePool,
    authenticator: Authenticator,
    _temp_dir: TempDir,
    config: AuthConfig,
}

impl TestContext {
    async fn new(config: AuthConfig) -> TestResult<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("auth.sqlite");
        let database = DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 5,
        };

        let pool = tutorline_database::initialize_database(&database).await?;
        let authenticator = Authenticator::new(pool.clone(), config.clone());

        Ok(Self {
            pool,
            authenticator,
            _temp_dir: temp_dir,
            config,
        })
    }

    async fn new_default() -> TestResult<Self> {
        Self::new(default_auth_config()).await
    }

    fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }
}

#[tokio::test]
async fn register_user_persists_role_and_public_id() -> TestResult {
    let ctx = TestContext::new_default().await?;

    let user = ctx
        .authenticator()
        .register_user("tutor@example.com", Some("Ada Tutor"), Role::Tutor)
        .await?;

    let role: String = sqlx::query_scalar("SELECT role FROM users WHERE id = ?")
        .bind(user.id)
        .fetch_one(ctx.pool())
        .await?;
    assert_eq!(role, "tutor");
    assert!(!user.public_id.is_empty(), "public id should be generated");
    assert_eq!(user.caller().role, Role::Tutor);
    assert_eq!(user.caller().user_id, user.id);
    Ok(())
}

#[tokio::test]
async fn register_user_rejects_duplicate_email() -> TestResult {
    let ctx = TestContext::new_default().await?;
    ctx.authenticator()
        .register_user("alice@example.com", None, Role::Student)
        .await?;

    let err = ctx
        .authenticator()
        .register_user("alice@example.com", None, Role::Admin)
        .await
        .expect_err("duplicate email should be rejected");
    assert!(matches!(err, AuthError::UserExists));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(ctx.pool())
        .await?;
    assert_eq!(count, 1);
    Ok(())
}

#[tokio::test]
async fn authenticate_token_returns_user_and_session_for_active_token() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let user = ctx
        .authenticator()
        .register_user("admin@example.com", None, Role::Admin)
        .await?;
    let session = ctx.authenticator().issue_session(user.id).await?;

    let (resolved_user, resolved_session) = ctx
        .authenticator()
        .authenticate_token(&session.token)
        .await?;

    assert_eq!(resolved_user.id, user.id);
    assert_eq!(resolved_user.role, Role::Admin);
    assert_eq!(resolved_session.token, session.token);
    assert_eq!(resolved_session.expires_at, session.expires_at);
    Ok(())
}

#[tokio::test]
async fn authenticate_token_deletes_expired_sessions() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let user = ctx
        .authenticator()
        .register_user("alice@example.com", None, Role::Student)
        .await?;

    let token = "expired-token";
    let created_at = (Utc::now() - Duration::hours(2)).to_rfc3339();
    let expires_at = (Utc::now() - Duration::hours(1)).to_rfc3339();

    sqlx::query(
        "INSERT INTO sessions (user_id, token, created_at, expires_at) VALUES (?, ?, ?, ?)",
    )
    .bind(user.id)
    .bind(token)
    .bind(&created_at)
    .bind(&expires_at)
    .execute(ctx.pool())
    .await?;

    let err = ctx
        .authenticator()
        .authenticate_token(token)
        .await
        .expect_err("expired token should be rejected");
    assert!(matches!(err, AuthError::SessionExpired));

    let remaining: Option<i64> = sqlx::query_scalar("SELECT 1 FROM sessions WHERE token = ?")
        .bind(token)
        .fetch_optional(ctx.pool())
        .await?;
    assert!(
        remaining.is_none(),
        "expired session should be removed from the database"
    );

    Ok(())
}

#[tokio::test]
async fn authenticate_token_rejects_unknown_and_empty_tokens() -> TestResult {
    let ctx = TestContext::new_default().await?;

    let err = ctx
        .authenticator()
        .authenticate_token("missing-token")
        .await
        .expect_err("unknown token should not authenticate");
    assert!(matches!(err, AuthError::SessionNotFound));

    let err = ctx
        .authenticator()
        .authenticate_token("")
        .await
        .expect_err("empty token should not authenticate");
    assert!(matches!(err, AuthError::InvalidSession));
    Ok(())
}

#[tokio::test]
async fn authenticate_token_rejects_malformed_expiry() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let user = ctx
        .authenticator()
        .register_user("alice@example.com", None, Role::Student)
        .await?;

    sqlx::query(
        "INSERT INTO sessions (user_id, token, created_at, expires_at) VALUES (?, ?, ?, ?)",
    )
    .bind(user.id)
    .bind("garbled")
    .bind(Utc::now().to_rfc3339())
    .bind("next tuesday")
    .execute(ctx.pool())
    .await?;

    let err = ctx
        .authenticator()
        .authenticate_token("garbled")
        .await
        .expect_err("malformed expiry should be rejected");
    assert!(matches!(err, AuthError::InvalidSession));
    Ok(())
}

#[tokio::test]
async fn unknown_roles_resolve_to_student() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let user = ctx
        .authenticator()
        .register_user("alice@example.com", None, Role::Tutor)
        .await?;

    sqlx::query("UPDATE users SET role = 'superuser' WHERE id = ?")
        .bind(user.id)
        .execute(ctx.pool())
        .await?;

    let fetched = ctx.authenticator().user_profile(user.id).await?;
    assert_eq!(fetched.role, Role::Student);
    Ok(())
}

#[tokio::test]
async fn user_profile_fetches_optional_fields_correctly() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let user = ctx
        .authenticator()
        .register_user("alice@example.com", None, Role::Student)
        .await?;

    let fetched = ctx.authenticator().user_profile(user.id).await?;
    assert_eq!(fetched.email.as_deref(), Some("alice@example.com"));
    assert!(
        fetched.display_name.is_none(),
        "display name should be None"
    );

    sqlx::query("UPDATE users SET display_name = ? WHERE id = ?")
        .bind("Alice Example")
        .bind(user.id)
        .execute(ctx.pool())
        .await?;

    let updated = ctx.authenticator().user_profile(user.id).await?;
    assert_eq!(updated.display_name.as_deref(), Some("Alice Example"));

    let missing = ctx.authenticator().user_profile(user.id + 100).await;
    assert!(matches!(missing, Err(AuthError::UserNotFound)));
    Ok(())
}

#[tokio::test]
async fn issue_session_applies_configured_ttl_and_persists_record() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let user = ctx
        .authenticator()
        .register_user("alice@example.com", None, Role::Student)
        .await?;
    let session = ctx.authenticator().issue_session(user.id).await?;

    let ttl = Duration::seconds(ctx.config.session_ttl_seconds as i64);
    let diff = session.expires_at - Utc::now();
    assert!(
        (diff - ttl).num_seconds().abs() <= 2,
        "issued session should honour TTL"
    );

    let stored_expires: String =
        sqlx::query_scalar("SELECT expires_at FROM sessions WHERE token = ?")
            .bind(&session.token)
            .fetch_one(ctx.pool())
            .await?;
    let parsed = DateTime::parse_from_rfc3339(&stored_expires)?.with_timezone(&Utc);
    assert_eq!(parsed, session.expires_at);

    Ok(())
}

#[tokio::test]
async fn issue_session_requires_an_existing_user() -> TestResult {
    let ctx = TestContext::new_default().await?;

    let err = ctx
        .authenticator()
        .issue_session(42)
        .await
        .expect_err("sessions need a user");
    assert!(matches!(err, AuthError::UserNotFound));
    Ok(())
}

#[tokio::test]
async fn issued_tokens_are_unique_and_urlsafe() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let user = ctx
        .authenticator()
        .register_user("alice@example.com", None, Role::Student)
        .await?;

    let mut tokens = HashSet::new();
    for _ in 0..5 {
        let session = ctx.authenticator().issue_session(user.id).await?;
        assert!(
            URL_SAFE_NO_PAD.decode(session.token.as_bytes()).is_ok(),
            "token should be URL safe base64"
        );
        assert!(
            tokens.insert(session.token.clone()),
            "tokens should be unique per session"
        );
    }
    Ok(())
}
