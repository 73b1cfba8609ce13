//! User registration, login and account handlers.

use crate::{
    api::{
        AppState,
        extract::{Json, Path},
        response::{ApiResponse, ApiResult, MessageBody},
    },
    core::user::{self, NewUser, UserWithEnergy},
    entities::{Role, UserModel},
    errors::Error,
};
use axum::extract::State;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/users/register`. Missing required fields are reported as 400.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Login name, required
    pub username: Option<String>,
    /// Contact email, required
    pub email: Option<String>,
    /// Plain-text password, required
    pub password: Option<String>,
    /// `user` (default) or `admin`
    pub role: Option<String>,
    /// Street name
    pub address: Option<String>,
    /// House number
    pub number: Option<String>,
    /// Address complement
    pub complement: Option<String>,
    /// Neighborhood
    pub neighborhood: Option<String>,
    /// City
    pub city: Option<String>,
    /// State
    pub state: Option<String>,
    /// Postal code
    pub cep: Option<String>,
}

/// Response of a successful registration.
#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    /// New user ID
    pub id: i64,
    /// Login name as stored
    pub username: String,
    /// Email as stored
    pub email: String,
    /// Assigned role
    pub role: Role,
}

/// Body of `POST /api/users/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login name
    pub username: Option<String>,
    /// Plain-text password
    pub password: Option<String>,
}

/// Response of a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Always `true`
    pub success: bool,
    /// The logged-in user, without the password hash
    pub user: UserModel,
}

fn parse_role(role: Option<&str>) -> Result<Role, Error> {
    match role.map(str::trim) {
        None | Some("" | "user") => Ok(Role::User),
        Some("admin") => Ok(Role::Admin),
        Some(_) => Err(Error::validation("role must be 'user' or 'admin'")),
    }
}

/// POST /api/users/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<RegisteredUser> {
    let role = parse_role(req.role.as_deref())?;
    let new_user = NewUser {
        username: req.username.unwrap_or_default(),
        email: req.email.unwrap_or_default(),
        password: req.password.unwrap_or_default(),
        role,
        address: req.address,
        number: req.number,
        complement: req.complement,
        neighborhood: req.neighborhood,
        city: req.city,
        state: req.state,
        cep: req.cep,
    };

    let created = user::register_user(&state.db, new_user, state.config.security.bcrypt_cost).await?;
    Ok(ApiResponse::Created(RegisteredUser {
        id: created.id,
        username: created.username,
        email: created.email,
        role: created.role,
    }))
}

/// POST /api/users/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let username = req.username.unwrap_or_default();
    let password = req.password.unwrap_or_default();
    let found = user::authenticate(&state.db, &username, &password).await?;
    Ok(ApiResponse::Ok(LoginResponse {
        success: true,
        user: found,
    }))
}

/// GET /api/users
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<UserWithEnergy>> {
    Ok(ApiResponse::Ok(user::list_users_with_energy(&state.db).await?))
}

/// GET /api/users/{userId}
pub async fn get(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<UserModel> {
    Ok(ApiResponse::Ok(user::get_user(&state.db, user_id).await?))
}

/// DELETE /api/users/{userId}
pub async fn delete(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<MessageBody> {
    user::delete_user(&state.db, user_id).await?;
    Ok(ApiResponse::Ok(MessageBody {
        message: "User deleted",
    }))
}
