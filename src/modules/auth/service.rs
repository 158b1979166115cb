use sqlx::PgPool;
use tracing::instrument;

use caseflow_auth::create_access_token;
use caseflow_config::JwtConfig;
use caseflow_core::{AppError, verify_password};
use caseflow_rbac::RoleId;

use crate::metrics::{track_login_failure, track_login_success};

use super::model::{LoginRequest, LoginResponse, UserCredentials, UserProfile};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, dto, jwt_config), fields(username = %dto.username))]
    pub async fn login_user(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let user = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, username, password_hash, user_type, center_id, is_active \
             FROM users WHERE username = $1",
        )
        .bind(dto.username.trim())
        .fetch_optional(db)
        .await?;

        let Some(user) = user else {
            track_login_failure("unknown_user");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        if !verify_password(&dto.password, &user.password_hash)? {
            track_login_failure("bad_password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        if !user.is_active {
            track_login_failure("inactive");
            return Err(AppError::forbidden("Account is disabled".to_string()));
        }

        let role = RoleId::try_from(user.user_type).ok();
        if role.is_none() {
            tracing::warn!(user_type = user.user_type, "User has a role outside the role table");
        }

        let access_token = create_access_token(
            user.id,
            &user.username,
            user.user_type,
            user.center_id,
            jwt_config,
        )?;

        track_login_success(role.map_or("unknown", |r| r.name()));
        tracing::info!(user_id = user.id, center_id = ?user.center_id, "User logged in");

        Ok(LoginResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: jwt_config.access_token_expiry,
            user: UserProfile {
                id: user.id,
                username: user.username,
                user_type: user.user_type,
                role: role.map(|r| r.name().to_string()),
                center_id: user.center_id,
            },
        })
    }
}
