//! TOTP enrollment and verification.
//!
//! Secrets are 20 random bytes stored base32 encoded. Codes are SHA1, six
//! digits, 30 second steps, and one step of clock skew is accepted. Backup
//! codes are stored as bcrypt hashes and can each be used once.

use anyhow::anyhow;
use rayon::prelude::*;
use sqlx::PgPool;
use totp_rs::{Algorithm, Secret, TOTP};
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::{AppError, hash_password, verify_password};
use scolaris_models::two_factor::{GenerateTwoFactorResponse, TwoFactorStatusResponse};

const ISSUER: &str = "Scolaris";
const BACKUP_CODE_COUNT: usize = 8;
const BACKUP_CODE_LENGTH: usize = 10;

fn build_totp(secret_bytes: Vec<u8>, email: &str) -> Result<TOTP, AppError> {
    TOTP::new(
        Algorithm::SHA1,
        6,
        1,
        30,
        secret_bytes,
        Some(ISSUER.to_string()),
        email.to_string(),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create TOTP: {}", e)))
}

fn check_totp(secret: &str, code: &str, email: &str) -> Result<bool, AppError> {
    let secret_bytes = Secret::Encoded(secret.to_string())
        .to_bytes()
        .map_err(|e| AppError::internal_error(format!("Invalid secret: {}", e)))?;

    build_totp(secret_bytes, email)?
        .check_current(code)
        .map_err(|e| AppError::internal_error(format!("Failed to verify TOTP: {}", e)))
}

fn is_totp_code(code: &str) -> bool {
    code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit())
}

/// Eight codes of ten characters from `[0-9A-Z]`.
pub fn generate_backup_codes() -> Vec<String> {
    use rand::Rng as _;
    let mut rng = rand::thread_rng();
    (0..BACKUP_CODE_COUNT)
        .map(|_| {
            (0..BACKUP_CODE_LENGTH)
                .map(|_| {
                    let idx = rng.gen_range(0..36u8);
                    if idx < 10 {
                        (b'0' + idx) as char
                    } else {
                        (b'A' + (idx - 10)) as char
                    }
                })
                .collect()
        })
        .collect()
}

pub struct TwoFactorService;

impl TwoFactorService {
    #[instrument(skip(db))]
    pub async fn status(db: &PgPool, user_id: Uuid) -> Result<TwoFactorStatusResponse, AppError> {
        #[derive(sqlx::FromRow)]
        struct Status {
            two_factor_enabled: bool,
            remaining: i64,
        }

        let status = sqlx::query_as::<_, Status>(
            r#"SELECT u.two_factor_enabled,
                      (SELECT COUNT(*) FROM two_factor_backup_codes c
                       WHERE c.user_id = u.id AND c.used = FALSE) AS remaining
               FROM users u WHERE u.id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        Ok(TwoFactorStatusResponse {
            enabled: status.two_factor_enabled,
            backup_codes_remaining: status.remaining,
        })
    }

    /// Stores a fresh secret with 2FA still disabled and replaces the backup
    /// codes. `verify_setup` turns 2FA on.
    #[instrument(skip(db))]
    pub async fn generate(
        db: &PgPool,
        user_id: Uuid,
        email: &str,
    ) -> Result<GenerateTwoFactorResponse, AppError> {
        if Self::status(db, user_id).await?.enabled {
            return Err(AppError::bad_request(anyhow!("2FA is already enabled")));
        }

        // ThreadRng is not Send, so the random bytes are drawn before any await
        let secret_bytes: Vec<u8> = {
            use rand::RngCore;
            let mut bytes = vec![0u8; 20];
            rand::thread_rng().fill_bytes(&mut bytes);
            bytes
        };
        let secret = Secret::Raw(secret_bytes.clone()).to_encoded().to_string();

        let totp = build_totp(secret_bytes, email)?;
        let otpauth_url = totp.get_url();
        let qr_base64 = totp
            .get_qr_base64()
            .map_err(|e| AppError::internal_error(format!("Failed to generate QR code: {}", e)))?;

        let backup_codes = generate_backup_codes();
        let code_hashes: Vec<String> = backup_codes
            .par_iter()
            .map(|code| hash_password(code))
            .collect::<Result<Vec<_>, _>>()?;

        let mut tx = db.begin().await?;

        sqlx::query(
            "UPDATE users SET two_factor_secret = $1, two_factor_enabled = FALSE, updated_at = NOW()
             WHERE id = $2",
        )
        .bind(&secret)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM two_factor_backup_codes WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO two_factor_backup_codes (user_id, code_hash)
            SELECT $1, unnest($2::text[])
            "#,
        )
        .bind(user_id)
        .bind(&code_hashes)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(GenerateTwoFactorResponse {
            secret,
            qr_code_url: format!("data:image/png;base64,{}", qr_base64),
            otpauth_url,
            backup_codes,
        })
    }

    #[instrument(skip(db, code))]
    pub async fn verify_setup(db: &PgPool, user_id: Uuid, code: &str) -> Result<(), AppError> {
        #[derive(sqlx::FromRow)]
        struct Setup {
            two_factor_enabled: bool,
            two_factor_secret: Option<String>,
            email: String,
        }

        let user = sqlx::query_as::<_, Setup>(
            "SELECT two_factor_enabled, two_factor_secret, email FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        if user.two_factor_enabled {
            return Err(AppError::bad_request(anyhow!("2FA is already enabled")));
        }

        let secret = user
            .two_factor_secret
            .ok_or_else(|| AppError::bad_request(anyhow!("2FA not set up for this user")))?;

        if !check_totp(&secret, code, &user.email)? {
            return Err(AppError::bad_request(anyhow!("Invalid 2FA token")));
        }

        sqlx::query("UPDATE users SET two_factor_enabled = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(db)
            .await?;

        Ok(())
    }

    #[instrument(skip(db, password))]
    pub async fn disable(db: &PgPool, user_id: Uuid, password: &str) -> Result<(), AppError> {
        #[derive(sqlx::FromRow)]
        struct Account {
            password: String,
            two_factor_enabled: bool,
        }

        let user = sqlx::query_as::<_, Account>(
            "SELECT password, two_factor_enabled FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        if !user.two_factor_enabled {
            return Err(AppError::bad_request(anyhow!("2FA is not enabled")));
        }

        if !verify_password(password, &user.password)? {
            return Err(AppError::bad_request(anyhow!("Invalid password")));
        }

        let mut tx = db.begin().await?;

        sqlx::query(
            "UPDATE users SET two_factor_enabled = FALSE, two_factor_secret = NULL, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM two_factor_backup_codes WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Checks a login code. Six digits are tried as a TOTP first; anything
    /// else, or a TOTP mismatch, is tried as a backup code, which is then
    /// marked used.
    #[instrument(skip(db, code))]
    pub async fn verify_code(db: &PgPool, user_id: Uuid, code: &str) -> Result<bool, AppError> {
        #[derive(sqlx::FromRow)]
        struct Factor {
            two_factor_enabled: bool,
            two_factor_secret: Option<String>,
            email: String,
        }

        let user = sqlx::query_as::<_, Factor>(
            "SELECT two_factor_enabled, two_factor_secret, email FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid or expired temporary token"))?;

        let secret = match (user.two_factor_enabled, user.two_factor_secret) {
            (true, Some(secret)) => secret,
            _ => return Err(AppError::bad_request(anyhow!("2FA is not enabled"))),
        };

        let code = code.trim();
        if is_totp_code(code) && check_totp(&secret, code, &user.email)? {
            return Ok(true);
        }

        Self::consume_backup_code(db, user_id, &code.to_uppercase()).await
    }

    async fn consume_backup_code(db: &PgPool, user_id: Uuid, code: &str) -> Result<bool, AppError> {
        #[derive(sqlx::FromRow)]
        struct BackupCode {
            id: Uuid,
            code_hash: String,
        }

        let codes = sqlx::query_as::<_, BackupCode>(
            "SELECT id, code_hash FROM two_factor_backup_codes WHERE user_id = $1 AND used = FALSE",
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;

        let matched = codes
            .par_iter()
            .find_any(|c| verify_password(code, &c.code_hash).unwrap_or(false))
            .map(|c| c.id);

        let Some(id) = matched else {
            return Ok(false);
        };

        // A concurrent login may have used the same code first
        let result = sqlx::query(
            "UPDATE two_factor_backup_codes SET used = TRUE, used_at = NOW()
             WHERE id = $1 AND used = FALSE",
        )
        .bind(id)
        .execute(db)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
