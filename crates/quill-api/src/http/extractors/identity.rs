//! Caller identity extractor.
//!
//! The upstream identity proxy authenticates the caller and forwards:
//! - `X-Account-Id: <uuid>` (required)
//! - `X-Organization-Id: <uuid>` (required only where a conversation is
//!   created or listed)
//!
//! The first request seen for an account provisions its balance row with
//! the configured opening credits.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use quill_types::account::{AccountId, OrganizationId};

use crate::http::error::AppError;
use crate::state::AppState;

pub const ACCOUNT_HEADER: &str = "x-account-id";
pub const ORGANIZATION_HEADER: &str = "x-organization-id";

/// The calling account, already provisioned.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub account_id: AccountId,
    pub organization_id: Option<OrganizationId>,
}

impl Caller {
    /// Organization scope, required by conversation create/list.
    pub fn organization(&self) -> Result<OrganizationId, AppError> {
        self.organization_id.ok_or_else(|| {
            AppError::Validation(format!("Missing {ORGANIZATION_HEADER} header"))
        })
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let caller = parse_caller(parts)?;
        state
            .pipeline
            .ledger()
            .ensure_account(&caller.account_id, state.config.initial_credits)
            .await?;
        Ok(caller)
    }
}

fn parse_caller(parts: &Parts) -> Result<Caller, AppError> {
    let account = header_str(parts, ACCOUNT_HEADER)?
        .ok_or_else(|| AppError::Unauthorized(format!("Missing {ACCOUNT_HEADER} header")))?;
    let account_id: AccountId = account
        .parse()
        .map_err(|_| AppError::Unauthorized(format!("Invalid {ACCOUNT_HEADER} header")))?;

    let organization_id = header_str(parts, ORGANIZATION_HEADER)?
        .map(|raw| {
            raw.parse::<uuid::Uuid>()
                .map(OrganizationId::from_uuid)
                .map_err(|_| AppError::Validation(format!("Invalid {ORGANIZATION_HEADER} header")))
        })
        .transpose()?;

    Ok(Caller {
        account_id,
        organization_id,
    })
}

fn header_str<'a>(parts: &'a Parts, name: &str) -> Result<Option<&'a str>, AppError> {
    parts
        .headers
        .get(name)
        .map(|v| {
            v.to_str()
                .map(str::trim)
                .map_err(|_| AppError::Validation(format!("Invalid {name} header encoding")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    #[test]
    fn parses_account_and_optional_org() {
        let account = AccountId::new();
        let (parts, _) = Request::builder()
            .header(ACCOUNT_HEADER, account.to_string())
            .body(())
            .unwrap()
            .into_parts();
        let caller = parse_caller(&parts).unwrap();
        assert_eq!(caller.account_id, account);
        assert!(caller.organization_id.is_none());
        assert!(matches!(caller.organization(), Err(AppError::Validation(_))));
    }

    #[test]
    fn missing_or_malformed_account_is_unauthorized() {
        let (parts, _) = Request::builder().body(()).unwrap().into_parts();
        assert!(matches!(parse_caller(&parts), Err(AppError::Unauthorized(_))));

        let (parts, _) = Request::builder()
            .header(ACCOUNT_HEADER, "not-a-uuid")
            .body(())
            .unwrap()
            .into_parts();
        assert!(matches!(parse_caller(&parts), Err(AppError::Unauthorized(_))));
    }
}
