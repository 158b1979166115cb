//! JWT claim structure for access tokens.

use caseflow_core::serde::deserialize_lenient_i32;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// JWT claims for access tokens.
///
/// The claims carry everything the RBAC and tenant layers need, so
/// authorization never hits the database:
///
/// - `sub`: User ID (subject)
/// - `username`: Login name, used in logs
/// - `user_type`: Role id (1 = App Admin ... 5 = Org Caseworker)
/// - `center_id`: Home center of the user (None for users without one)
/// - `exp` / `iat`: Expiry and issued-at timestamps
///
/// `user_type` and `center_id` accept numeric strings as well as numbers;
/// values that are not integers decode as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User ID (subject claim)
    pub sub: String,
    /// Login name
    pub username: String,
    /// Role id of the user
    #[serde(default, deserialize_with = "deserialize_lenient_i32")]
    pub user_type: Option<i32>,
    /// Center the user belongs to
    #[serde(default, deserialize_with = "deserialize_lenient_i32")]
    pub center_id: Option<i32>,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: usize,
}
