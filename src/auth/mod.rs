use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::error::AppError;

/// Headers populated by the identity provider in front of this service.
/// The core trusts them; token verification happens upstream.
const USER_ID_HEADER: &str = "x-user-id";
const USER_ROLE_HEADER: &str = "x-user-role";
const COMPANY_ID_HEADER: &str = "x-company-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Organizer,
    Validator,
    Customer,
}

impl Role {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Role::Admin),
            "organizer" => Some(Role::Organizer),
            "validator" => Some(Role::Validator),
            "customer" => Some(Role::Customer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
    pub company_id: Option<Uuid>,
}

impl AuthUser {
    /// Reviewers may approve or reject orders and check tickets in.
    pub fn is_reviewer(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Organizer | Role::Validator)
    }

    pub fn require_reviewer(&self) -> Result<(), AppError> {
        if self.is_reviewer() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Only reviewers may perform this action".to_string(),
            ))
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::Forbidden("Administrator role required".to_string()))
        }
    }

    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Your role does not permit this action".to_string(),
            ))
        }
    }

    /// Selects the query-shaping policy for this request. A closed set of
    /// variants replaces per-endpoint role conditionals: admins see
    /// everything, organizers and validators are scoped to their company
    /// when they have one, everyone else is scoped to their own rows.
    pub fn scope(&self) -> AccessScope {
        match self.role {
            Role::Admin => AccessScope::Admin,
            Role::Organizer | Role::Validator => match self.company_id {
                Some(company_id) => AccessScope::Company(company_id),
                None => AccessScope::Owner(self.id),
            },
            Role::Customer => AccessScope::Owner(self.id),
        }
    }
}

/// How listing and reporting queries are filtered for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessScope {
    /// No filtering; the admin role bypasses the company dimension.
    Admin,
    /// Rows owned by, created by, or organized by this user.
    Owner(Uuid),
    /// Rows belonging to events of this company.
    Company(Uuid),
}

impl AccessScope {
    /// Bind parameters for scope-aware SQL: `(company_filter, owner_filter)`.
    /// Queries apply each filter only when its parameter is non-null.
    pub fn params(&self) -> (Option<Uuid>, Option<Uuid>) {
        match self {
            AccessScope::Admin => (None, None),
            AccessScope::Owner(user_id) => (None, Some(*user_id)),
            AccessScope::Company(company_id) => (Some(*company_id), None),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header_value(parts, USER_ID_HEADER)
            .ok_or_else(|| AppError::AuthError("Missing user identity".to_string()))?
            .parse::<Uuid>()
            .map_err(|_| AppError::AuthError("Malformed user id".to_string()))?;

        let role = header_value(parts, USER_ROLE_HEADER)
            .and_then(|v| Role::parse(&v))
            .ok_or_else(|| AppError::AuthError("Missing or unknown role".to_string()))?;

        let company_id = match header_value(parts, COMPANY_ID_HEADER) {
            Some(raw) => Some(
                raw.parse::<Uuid>()
                    .map_err(|_| AppError::AuthError("Malformed company id".to_string()))?,
            ),
            None => None,
        };

        Ok(AuthUser { id, role, company_id })
    }
}

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
