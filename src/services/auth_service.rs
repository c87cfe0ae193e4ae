use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sqlx::FromRow;
use std::sync::LazyLock;
use uuid::Uuid;

use crate::{
    db::with_timeout,
    dto::auth::{Claims, SignInRequest, SignInResponse, SignUpRequest},
    error::{AppError, AppResult},
    models::Owner,
    response::{ApiResponse, Meta},
    state::AppState,
};

const TOKEN_TTL_HOURS: i64 = 24;

/// Verified against when the email is unknown, so both rejection paths pay
/// for one argon2 verification.
static UNKNOWN_OWNER_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("unknown-owner-placeholder").ok());

#[derive(FromRow)]
struct OwnerRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<OwnerRow> for Owner {
    fn from(row: OwnerRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

pub async fn sign_up(state: &AppState, payload: SignUpRequest) -> AppResult<ApiResponse<Owner>> {
    let SignUpRequest {
        name,
        email,
        password,
    } = payload;
    let email = email.trim().to_lowercase();

    if name.trim().is_empty() || email.is_empty() || password.is_empty() {
        return Err(AppError::Validation("name, email and password are required".into()));
    }
    if !email.contains('@') {
        return Err(AppError::Validation("email is invalid".into()));
    }

    let timeout = state.config.db_timeout;
    let exist: Option<(Uuid,)> = with_timeout(
        timeout,
        sqlx::query_as::<_, (Uuid,)>("SELECT id FROM owners WHERE email = $1")
            .bind(email.as_str())
            .fetch_optional(&state.pool),
    )
    .await?;

    if exist.is_some() {
        return Err(AppError::Conflict("Email is already taken".to_string()));
    }

    let password_hash = hash_password(&password)?;

    let insert = sqlx::query_as::<_, OwnerRow>(
        "INSERT INTO owners (id, name, email, password_hash) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(name.trim())
    .bind(email.as_str())
    .bind(password_hash)
    .fetch_one(&state.pool);
    let owner = with_timeout(timeout, async {
        insert.await.map_err(|err| {
            // Lost a race with a concurrent sign-up for the same email.
            if matches!(&err, sqlx::Error::Database(db) if db.is_unique_violation()) {
                AppError::Conflict("Email is already taken".to_string())
            } else {
                AppError::DbError(err)
            }
        })
    })
    .await?;

    tracing::info!(owner_id = %owner.id, "owner signed up");
    Ok(ApiResponse::success("Owner created", owner.into(), None))
}

pub async fn sign_in(
    state: &AppState,
    payload: SignInRequest,
) -> AppResult<ApiResponse<SignInResponse>> {
    let SignInRequest { email, password } = payload;
    let owner: Option<OwnerRow> = with_timeout(
        state.config.db_timeout,
        sqlx::query_as::<_, OwnerRow>("SELECT * FROM owners WHERE email = $1")
            .bind(email.trim().to_lowercase())
            .fetch_optional(&state.pool),
    )
    .await?;

    let owner = match owner {
        Some(o) => o,
        None => {
            if let Some(hash) = UNKNOWN_OWNER_HASH.as_deref() {
                let _ = verify_password(&password, hash);
            }
            return Err(AppError::Unauthorized);
        }
    };

    if !verify_password(&password, &owner.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    let token = issue_token(owner.id, &owner.name, &state.config.jwt_secret)?;

    tracing::info!(owner_id = %owner.id, "owner signed in");
    Ok(ApiResponse::success(
        "Signed in",
        SignInResponse {
            token: format!("Bearer {}", token),
            owner_id: owner.id,
            name: owner.name,
        },
        Some(Meta::empty()),
    ))
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn issue_token(owner_id: Uuid, name: &str, secret: &str) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(TOKEN_TTL_HOURS))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: owner_id.to_string(),
        name: name.to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}
