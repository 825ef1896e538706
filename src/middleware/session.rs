//! Cookie sessions.
//!
//! Login opens a session next to the bearer tokens it returns. A session
//! opened for an account with 2FA stays pending until verify-login marks it
//! verified; until then [`AuthUser`](super::auth::AuthUser) rejects it.

use tower_sessions::Session;
use uuid::Uuid;

use scolaris_core::AppError;

const USER_KEY: &str = "user_id";
const TWO_FACTOR_VERIFIED_KEY: &str = "two_factor_verified";

/// The user a session belongs to and whether its login is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLogin {
    pub user_id: Uuid,
    pub two_factor_verified: bool,
}

/// Binds the session to `user_id` under a fresh id.
pub async fn open_session(
    session: &Session,
    user_id: Uuid,
    two_factor_verified: bool,
) -> Result<(), AppError> {
    session.cycle_id().await?;
    session.insert(USER_KEY, user_id).await?;
    session
        .insert(TWO_FACTOR_VERIFIED_KEY, two_factor_verified)
        .await?;
    Ok(())
}

pub async fn session_login(session: &Session) -> Result<Option<SessionLogin>, AppError> {
    let Some(user_id) = session.get::<Uuid>(USER_KEY).await? else {
        return Ok(None);
    };

    let two_factor_verified = session
        .get::<bool>(TWO_FACTOR_VERIFIED_KEY)
        .await?
        .unwrap_or(false);

    Ok(Some(SessionLogin {
        user_id,
        two_factor_verified,
    }))
}

pub async fn close_session(session: &Session) -> Result<(), AppError> {
    session.flush().await?;
    Ok(())
}
