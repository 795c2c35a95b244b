use std::sync::{Arc, OnceLock};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    Router,
};
use sqlx::PgPool;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::api;
use crate::core::{
    config::Settings, redis::RedisHandle, security, state::AppState, time::primitive_now_utc,
};
use crate::db::models::{School, User};
use crate::db::types::UserRole;
use crate::repositories;
use crate::tasks::gamification;

const TEST_DATABASE_URL_DB: &str = "ecoly_test";
const TEST_SECRET_KEY: &str = "test-secret";
const TEST_REDIS_DB: &str = "1";
const TEST_PASSWORD: &str = "eco-password";

/// Seeded by the catalog migration.
pub(crate) const THEME_BIODIVERSIDADE: &str = "theme-biodiversity";

pub(crate) struct TestContext {
    pub(crate) state: AppState,
    pub(crate) app: Router,
    _guard: OwnedMutexGuard<()>,
}

pub(crate) async fn env_lock() -> OwnedMutexGuard<()> {
    static LOCK: OnceLock<Arc<Mutex<()>>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Arc::new(Mutex::new(()))).clone();
    lock.lock_owned().await
}

pub(crate) fn set_test_env() {
    // Load .env so REDIS_PASSWORD and other settings are available
    dotenvy::dotenv().ok();

    std::env::set_var("ECOLY_ENV", "test");
    std::env::set_var("ECOLY_STRICT_CONFIG", "0");
    std::env::set_var("SECRET_KEY", TEST_SECRET_KEY);
    std::env::set_var("POSTGRES_SERVER", "localhost");
    std::env::set_var("POSTGRES_PORT", "5432");
    std::env::set_var("POSTGRES_USER", "ecoly_test");
    std::env::set_var("POSTGRES_PASSWORD", "ecoly_test");
    std::env::set_var("POSTGRES_DB", TEST_DATABASE_URL_DB);
    std::env::set_var("REDIS_HOST", "127.0.0.1");
    std::env::set_var("REDIS_PORT", "6379");
    std::env::set_var("REDIS_DB", TEST_REDIS_DB);
    std::env::remove_var("REDIS_PASSWORD");
    std::env::set_var("PROMETHEUS_ENABLED", "0");
    std::env::remove_var("IMAGE_HOST_ENDPOINT");
    std::env::remove_var("IMAGE_HOST_API_KEY");
    std::env::remove_var("FIRST_ADMIN_PASSWORD");
}

pub(crate) async fn setup_test_context() -> TestContext {
    let guard = env_lock().await;
    set_test_env();

    let settings = Settings::load().expect("settings");
    let db = prepare_db(&settings).await;

    let redis = RedisHandle::new(settings.redis().redis_url());
    redis.connect().await.expect("redis connect");
    reset_redis(settings.redis().redis_url()).await.expect("redis reset");

    let (gamification_handle, gamification_rx) = gamification::channel();
    gamification::spawn(db.clone(), gamification_rx);

    let state = AppState::new(settings, db, redis, None, gamification_handle);
    let app = api::router::router(state.clone());

    TestContext { state, app, _guard: guard }
}

async fn prepare_db(settings: &Settings) -> PgPool {
    let db = crate::db::init_pool(settings).await.expect("db pool");
    let current_db: String = sqlx::query_scalar("SELECT current_database()")
        .fetch_one(&db)
        .await
        .expect("current database");
    assert_eq!(current_db, TEST_DATABASE_URL_DB);

    reset_public_schema(&db).await.expect("reset schema");
    ensure_schema(&db).await.expect("schema");
    let has_id: Option<i32> = sqlx::query_scalar(
        "SELECT 1 FROM information_schema.columns \
         WHERE table_schema = 'public' AND table_name = 'users' AND column_name = 'id'",
    )
    .fetch_optional(&db)
    .await
    .expect("users schema");
    assert!(has_id.is_some(), "users.id missing");

    reset_db(&db).await.expect("reset db");
    db
}

async fn reset_public_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("DROP SCHEMA IF EXISTS public CASCADE").execute(pool).await?;
    sqlx::query("CREATE SCHEMA public").execute(pool).await?;
    Ok(())
}

pub(crate) async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    let migrations_dir =
        std::env::var("ECOLY_MIGRATIONS_DIR").unwrap_or_else(|_| "migrations".to_string());
    let mut migrator = sqlx::migrate::Migrator::new(std::path::Path::new(&migrations_dir))
        .await
        .map_err(|error| sqlx::Error::Migrate(Box::new(error)))?;
    migrator.set_ignore_missing(true);
    migrator.run(pool).await.map_err(|error| sqlx::Error::Migrate(Box::new(error)))?;
    Ok(())
}

/// Clears domain tables between tests; the badge and theme catalogs are
/// seeded data and stay.
pub(crate) async fn reset_db(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "TRUNCATE seeds, user_badges, ata_images, meetings, activity_images, activities, \
         users, schools RESTART IDENTITY CASCADE",
    )
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn reset_redis(url: String) -> redis::RedisResult<()> {
    let client = redis::Client::open(url)?;
    let mut manager = redis::aio::ConnectionManager::new(client).await?;
    redis::cmd("FLUSHDB").query_async::<_, ()>(&mut manager).await?;
    Ok(())
}

pub(crate) async fn insert_school(pool: &PgPool, name: &str) -> School {
    repositories::schools::create(pool, &Uuid::new_v4().to_string(), name, primitive_now_utc())
        .await
        .expect("insert school")
}

pub(crate) async fn insert_user(
    pool: &PgPool,
    email: &str,
    name: &str,
    role: UserRole,
    school_id: &str,
) -> User {
    let hashed_password = security::hash_password(TEST_PASSWORD).expect("hash password");
    let now = primitive_now_utc();

    repositories::users::create(
        pool,
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            email,
            hashed_password,
            name,
            role,
            school_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .expect("insert user")
}

pub(crate) fn bearer_token(user: &User, settings: &Settings) -> String {
    security::create_access_token(&user.id, user.role, &user.school_id, settings, None)
        .expect("token")
}

pub(crate) fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    if let Some(body) = body {
        let bytes = serde_json::to_vec(&body).expect("serialize body");
        builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(bytes))
            .expect("request body")
    } else {
        builder.body(Body::empty()).expect("request body")
    }
}

pub(crate) async fn read_json(response: axum::response::Response<Body>) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("response body");
    serde_json::from_slice(&body).unwrap_or_else(|err| {
        let body_text = String::from_utf8_lossy(&body);
        panic!("json parse: {err}; body: {body_text}");
    })
}
