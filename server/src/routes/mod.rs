//! HTTP handlers, grouped the way the command handlers are.
//!
//! Every JSON endpoint responds with the success envelope
//! `{"success": true, ...payload}` or `{"success": false, "error": "..."}`.
//! The lone exception is the payment webhook, which acknowledges with the
//! provider's own `{"received": true}` shape.

pub mod accounts;
pub mod admin;
pub mod arcade;
pub mod billing;
pub mod drops;
pub mod engagement;
pub mod ws;

use crate::ServiceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dropclub_engine::LedgerError;
use dropclub_types::api::{self, Failure};
use serde::Serialize;

pub(crate) fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(api::ok(data))).into_response()
}

pub(crate) fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(Failure::new(message))).into_response()
}

pub(crate) fn unauthorized() -> Response {
    failure(StatusCode::UNAUTHORIZED, "You must be logged in.")
}

pub(crate) fn service_error(err: ServiceError) -> Response {
    match err {
        ServiceError::Ledger(err) => failure(ledger_status(&err), err.to_string()),
        ServiceError::Internal => failure(StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
    }
}

fn ledger_status(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::AccountNotFound => StatusCode::UNAUTHORIZED,
        LedgerError::EmailTaken
        | LedgerError::AlreadyEntered
        | LedgerError::AlreadyReferred
        | LedgerError::WinnerAlreadyPicked => StatusCode::CONFLICT,
        LedgerError::DropNotFound | LedgerError::UnknownReward => StatusCode::NOT_FOUND,
        LedgerError::CooldownActive => StatusCode::TOO_MANY_REQUESTS,
        // An empty catalog is a deployment mistake, not a client one
        LedgerError::EmptyCatalog => StatusCode::INTERNAL_SERVER_ERROR,
        LedgerError::InvalidEmail
        | LedgerError::InvalidUsername
        | LedgerError::DropClosed
        | LedgerError::InsufficientBalance
        | LedgerError::InvalidDrop
        | LedgerError::EndsInPast
        | LedgerError::NoEntrants
        | LedgerError::WinnerNotEntered
        | LedgerError::InvalidComment
        | LedgerError::MissingGuess
        | LedgerError::InvalidReferralCode
        | LedgerError::SelfReferral => StatusCode::BAD_REQUEST,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ledger_status(&LedgerError::AccountNotFound),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ledger_status(&LedgerError::EmailTaken), StatusCode::CONFLICT);
        assert_eq!(
            ledger_status(&LedgerError::DropNotFound),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ledger_status(&LedgerError::CooldownActive),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ledger_status(&LedgerError::InsufficientBalance),
            StatusCode::BAD_REQUEST
        );
    }
}
