use super::{failure, ok, service_error, unauthorized};
use crate::{auth, Service, ServiceError};
use axum::{
    extract::State as AxumState,
    http::{HeaderMap, StatusCode},
    response::Response,
    Json,
};
use dropclub_types::{
    api::{
        EntriesResponse, EntryView, LedgerResponse, LoginRequest, Profile, ProfileResponse,
        RegisterRequest, SessionResponse, WinsResponse,
    },
    AccountId, LEDGER_PAGE_SIZE,
};
use std::sync::Arc;
use uuid::Uuid;

/// The `/api/me` payload, shared by every endpoint that hands back a
/// refreshed profile.
pub(super) fn profile_response(
    service: &Service,
    account_id: AccountId,
) -> Result<Option<ProfileResponse>, ServiceError> {
    service.query(|state| {
        state.account(&account_id).map(|account| ProfileResponse {
            entries: state.entries_for(&account_id).len() as u64,
            wins: state.wins_for(&account_id).len() as u64,
            referrals: state.referral_count(&account_id),
            rank: state.leaderboard().rank(account_id),
            profile: Profile::from(&account),
        })
    })
}

pub async fn register(
    AxumState(service): AxumState<Arc<Service>>,
    Json(request): Json<RegisterRequest>,
) -> Response {
    let salt = auth::generate_salt(&mut rand::thread_rng());
    let hash = auth::hash_password(&request.password, &salt);
    let admin = service.config().is_admin(&request.email);
    let id = Uuid::new_v4();

    let account = match service.command(|ledger| {
        ledger.register(id, &request.email, &request.username, &hash, &salt, admin)
    }) {
        Ok(account) => account,
        Err(err) => return service_error(err),
    };
    let token = match service.create_session(account.id) {
        Ok(token) => token,
        Err(err) => return service_error(err),
    };
    ok(SessionResponse {
        token,
        profile: Profile::from(&account),
    })
}

pub async fn login(
    AxumState(service): AxumState<Arc<Service>>,
    Json(request): Json<LoginRequest>,
) -> Response {
    let account = match service.query(|state| state.account_by_email(&request.email)) {
        Ok(Some(account)) => account,
        Ok(None) => return failure(StatusCode::UNAUTHORIZED, "Invalid email or password"),
        Err(err) => return service_error(err),
    };
    if !auth::verify_password(
        &request.password,
        &account.password_salt,
        &account.password_hash,
    ) {
        return failure(StatusCode::UNAUTHORIZED, "Invalid email or password");
    }
    let token = match service.create_session(account.id) {
        Ok(token) => token,
        Err(err) => return service_error(err),
    };
    ok(SessionResponse {
        token,
        profile: Profile::from(&account),
    })
}

pub async fn me(AxumState(service): AxumState<Arc<Service>>, headers: HeaderMap) -> Response {
    let Some(account_id) = service.authenticate(&headers) else {
        return unauthorized();
    };
    match profile_response(&service, account_id) {
        Ok(Some(profile)) => ok(profile),
        Ok(None) => unauthorized(),
        Err(err) => service_error(err),
    }
}

pub async fn entries(AxumState(service): AxumState<Arc<Service>>, headers: HeaderMap) -> Response {
    let Some(account_id) = service.authenticate(&headers) else {
        return unauthorized();
    };
    let entries = match service.query(|state| {
        state
            .entries_for(&account_id)
            .into_iter()
            .filter_map(|entry| {
                state.find_drop(entry.drop_id).map(|drop| EntryView {
                    drop,
                    entered_at: entry.created_at,
                })
            })
            .collect::<Vec<_>>()
    }) {
        Ok(entries) => entries,
        Err(err) => return service_error(err),
    };
    ok(EntriesResponse { entries })
}

pub async fn wins(AxumState(service): AxumState<Arc<Service>>, headers: HeaderMap) -> Response {
    let Some(account_id) = service.authenticate(&headers) else {
        return unauthorized();
    };
    match service.query(|state| state.wins_for(&account_id)) {
        Ok(wins) => ok(WinsResponse { wins }),
        Err(err) => service_error(err),
    }
}

pub async fn ledger(AxumState(service): AxumState<Arc<Service>>, headers: HeaderMap) -> Response {
    let Some(account_id) = service.authenticate(&headers) else {
        return unauthorized();
    };
    match service.query(|state| state.ledger_for(&account_id, LEDGER_PAGE_SIZE)) {
        Ok(records) => ok(LedgerResponse { records }),
        Err(err) => service_error(err),
    }
}

pub async fn reset(AxumState(service): AxumState<Arc<Service>>, headers: HeaderMap) -> Response {
    let Some(account_id) = service.authenticate(&headers) else {
        return unauthorized();
    };
    if !service.config().enable_reset {
        return failure(StatusCode::FORBIDDEN, "Reset is disabled");
    }
    if let Err(err) = service.command(|ledger| ledger.reset_account(account_id)) {
        return service_error(err);
    }
    match profile_response(&service, account_id) {
        Ok(Some(profile)) => ok(profile),
        Ok(None) => unauthorized(),
        Err(err) => service_error(err),
    }
}
