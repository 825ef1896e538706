use axum::{
    RequestPartsExt,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tower_sessions::Session;
use uuid::Uuid;

use scolaris_auth::{Claims, verify_token};
use scolaris_core::AppError;
use scolaris_core::permissions::{self, PermissionSet};

use crate::middleware::session::session_login;
use crate::state::AppState;

/// The caller of an authenticated request.
///
/// A bearer access token is used when the request carries an
/// `Authorization` header, otherwise the login cookie session. The role and
/// permissions are read from the database when the request is extracted, so
/// permission changes apply without waiting for the access token to expire.
/// Tokens revoked by logout are rejected here.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Option<String>,
    pub permissions: PermissionSet,
    /// Claims of the bearer token; `None` for cookie sessions.
    pub claims: Option<Claims>,
}

impl AuthUser {
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    pub fn has_any_permission(&self, required: &[&str]) -> bool {
        self.permissions.has_any(required)
    }

    /// Fails with 403 unless the caller holds `permission`.
    pub fn require(&self, permission: &str) -> Result<(), AppError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(forbidden(permission))
        }
    }

    /// Allows the caller acting on their own record, or holding `permission`.
    pub fn require_self_or(&self, user_id: Uuid, permission: &str) -> Result<(), AppError> {
        if self.user_id == user_id {
            return Ok(());
        }
        self.require(permission)
    }
}

pub fn forbidden(permission: &str) -> AppError {
    AppError::forbidden(format!(
        "Access denied. Missing required permission: {}",
        permission
    ))
}

#[derive(sqlx::FromRow)]
struct AccessRow {
    email: String,
    is_active: bool,
    role_name: Option<String>,
    revoked: bool,
    permissions: Vec<String>,
}

/// Returns the bearer token of the request, with the 401 messages clients rely on.
pub async fn bearer_token(parts: &mut Parts) -> Result<String, AppError> {
    let TypedHeader(Authorization(bearer)) = parts
        .extract::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|rejection| {
            if rejection.is_missing() {
                AppError::unauthorized("Missing authorization header")
            } else {
                AppError::unauthorized("Invalid authorization header format")
            }
        })?;

    Ok(bearer.token().to_string())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION)
            && let Some(session) = parts.extensions.get::<Session>().cloned()
            && let Some(login) = session_login(&session).await?
        {
            if !login.two_factor_verified {
                return Err(AppError::forbidden("2FA verification required"));
            }
            return load_user(state, login.user_id, None).await;
        }

        let token = bearer_token(parts).await?;
        let claims = verify_token(&token, &state.jwt_config)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::unauthorized("Invalid or expired token"))?;

        load_user(state, user_id, Some(claims)).await
    }
}

async fn load_user(
    state: &AppState,
    user_id: Uuid,
    claims: Option<Claims>,
) -> Result<AuthUser, AppError> {
    let row = sqlx::query_as::<_, AccessRow>(
        r#"SELECT
            u.email,
            u.is_active,
            r.role_name,
            EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = $2) AS revoked,
            ARRAY(
                SELECT DISTINCT perm
                FROM permissions p, unnest(p.permissions_allowed) AS perm
                WHERE p.role_id = u.role_id
                ORDER BY perm
            ) AS permissions
           FROM users u
           LEFT JOIN roles r ON r.id = u.role_id
           WHERE u.id = $1"#,
    )
    .bind(user_id)
    .bind(claims.as_ref().map(|c| c.jti))
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::unauthorized("Invalid or expired token"))?;

    if row.revoked {
        return Err(AppError::unauthorized("Token has been revoked"));
    }

    if !row.is_active {
        return Err(AppError::forbidden("Account is deactivated"));
    }

    Ok(AuthUser {
        user_id,
        email: row.email,
        role: row.role_name,
        permissions: PermissionSet::from_tokens(row.permissions),
        claims,
    })
}

/// Declares an extractor that succeeds only when the caller holds the
/// given permission token.
#[macro_export]
macro_rules! require_permission {
    ($name:ident, $permission:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthUser);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = scolaris_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user = <$crate::middleware::auth::AuthUser as axum::extract::FromRequestParts<
                    $crate::state::AppState,
                >>::from_request_parts(parts, state)
                .await?;

                auth_user.require($permission)?;

                Ok($name(auth_user))
            }
        }
    };
}

require_permission!(RequireUserRead, permissions::USER_READ);

require_permission!(RequireRoleCreate, permissions::ROLE_CREATE);
require_permission!(RequireRoleRead, permissions::ROLE_READ);
require_permission!(RequireRoleUpdate, permissions::ROLE_UPDATE);
require_permission!(RequireRoleDelete, permissions::ROLE_DELETE);

require_permission!(RequirePermissionCreate, permissions::PERMISSION_CREATE);
require_permission!(RequirePermissionRead, permissions::PERMISSION_READ);
require_permission!(RequirePermissionUpdate, permissions::PERMISSION_UPDATE);
require_permission!(RequirePermissionDelete, permissions::PERMISSION_DELETE);

require_permission!(RequireFiliereCreate, permissions::FILIERE_CREATE);
require_permission!(RequireFiliereRead, permissions::FILIERE_READ);
require_permission!(RequireFiliereUpdate, permissions::FILIERE_UPDATE);
require_permission!(RequireFiliereDelete, permissions::FILIERE_DELETE);

require_permission!(RequireNiveauCreate, permissions::NIVEAU_CREATE);
require_permission!(RequireNiveauRead, permissions::NIVEAU_READ);
require_permission!(RequireNiveauUpdate, permissions::NIVEAU_UPDATE);
require_permission!(RequireNiveauDelete, permissions::NIVEAU_DELETE);

require_permission!(RequireGroupeCreate, permissions::GROUPE_CREATE);
require_permission!(RequireGroupeRead, permissions::GROUPE_READ);
require_permission!(RequireGroupeUpdate, permissions::GROUPE_UPDATE);
require_permission!(RequireGroupeDelete, permissions::GROUPE_DELETE);

require_permission!(RequireModuleCreate, permissions::MODULE_CREATE);
require_permission!(RequireModuleRead, permissions::MODULE_READ);
require_permission!(RequireModuleUpdate, permissions::MODULE_UPDATE);
require_permission!(RequireModuleDelete, permissions::MODULE_DELETE);

require_permission!(RequireRoomCreate, permissions::ROOM_CREATE);
require_permission!(RequireRoomRead, permissions::ROOM_READ);
require_permission!(RequireRoomUpdate, permissions::ROOM_UPDATE);
require_permission!(RequireRoomDelete, permissions::ROOM_DELETE);

require_permission!(RequireEventCreate, permissions::EVENT_CREATE);
require_permission!(RequireEventRead, permissions::EVENT_READ);
require_permission!(RequireEventUpdate, permissions::EVENT_UPDATE);
require_permission!(RequireEventDelete, permissions::EVENT_DELETE);

require_permission!(RequireAttendanceCreate, permissions::ATTENDANCE_CREATE);
require_permission!(RequireAttendanceRead, permissions::ATTENDANCE_READ);
require_permission!(RequireAttendanceUpdate, permissions::ATTENDANCE_UPDATE);
require_permission!(RequireAttendanceDelete, permissions::ATTENDANCE_DELETE);

require_permission!(RequireSessionCreate, permissions::SESSION_CREATE);
require_permission!(RequireSessionRead, permissions::SESSION_READ);
require_permission!(RequireSessionUpdate, permissions::SESSION_UPDATE);
require_permission!(RequireSessionDelete, permissions::SESSION_DELETE);

require_permission!(RequireGradeCreate, permissions::GRADE_CREATE);
require_permission!(RequireGradeRead, permissions::GRADE_READ);
require_permission!(RequireGradeUpdate, permissions::GRADE_UPDATE);
require_permission!(RequireGradeDelete, permissions::GRADE_DELETE);

require_permission!(RequireAbsenceCreate, permissions::ABSENCE_CREATE);
require_permission!(RequireAbsenceRead, permissions::ABSENCE_READ);
require_permission!(RequireAbsenceUpdate, permissions::ABSENCE_UPDATE);
require_permission!(RequireAbsenceDelete, permissions::ABSENCE_DELETE);

require_permission!(RequireDocumentCreate, permissions::DOCUMENT_CREATE);
require_permission!(RequireDocumentRead, permissions::DOCUMENT_READ);
require_permission!(RequireDocumentUpdate, permissions::DOCUMENT_UPDATE);
require_permission!(RequireDocumentDelete, permissions::DOCUMENT_DELETE);

require_permission!(RequireResourceCreate, permissions::RESOURCE_CREATE);
require_permission!(RequireResourceRead, permissions::RESOURCE_READ);
require_permission!(RequireResourceUpdate, permissions::RESOURCE_UPDATE);
require_permission!(RequireResourceDelete, permissions::RESOURCE_DELETE);

require_permission!(RequireOpportunityCreate, permissions::OPPORTUNITY_CREATE);
require_permission!(RequireOpportunityUpdate, permissions::OPPORTUNITY_UPDATE);
require_permission!(RequireOpportunityDelete, permissions::OPPORTUNITY_DELETE);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use scolaris_auth::TokenPurpose;

    fn auth_user(tokens: &[&str]) -> AuthUser {
        let user_id = Uuid::new_v4();
        AuthUser {
            email: "prof@scolaris.ma".to_string(),
            claims: Some(Claims {
                sub: user_id.to_string(),
                email: "prof@scolaris.ma".to_string(),
                role_id: None,
                role: Some("Teacher".to_string()),
                permissions: vec![],
                purpose: TokenPurpose::Access,
                jti: Uuid::new_v4(),
                exp: 9999999999,
                iat: 1,
            }),
            user_id,
            role: Some("Teacher".to_string()),
            permissions: PermissionSet::from_tokens(tokens.iter().copied()),
        }
    }

    #[test]
    fn test_require_reports_missing_permission() {
        let user = auth_user(&["grade:read"]);
        assert!(user.require("grade:read").is_ok());

        let err = user.require("grade:delete").unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(
            err.error.to_string(),
            "Access denied. Missing required permission: grade:delete"
        );
    }

    #[test]
    fn test_membership_is_exact() {
        let user = auth_user(&["grade:read"]);
        assert!(!user.has_permission("grade:rea"));
        assert!(!user.has_permission("grade"));
        assert!(user.has_any_permission(&["user:read", "grade:read"]));
    }

    #[test]
    fn test_self_access_without_permission() {
        let user = auth_user(&[]);
        assert!(user.require_self_or(user.user_id, "user:update").is_ok());
        assert!(user.require_self_or(Uuid::new_v4(), "user:update").is_err());
    }

    #[test]
    fn test_permission_grants_access_to_others() {
        let user = auth_user(&["user:update"]);
        assert!(user.require_self_or(Uuid::new_v4(), "user:update").is_ok());
    }
}
