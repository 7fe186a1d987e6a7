use super::{ok, service_error, unauthorized};
use crate::Service;
use axum::{extract::State as AxumState, http::HeaderMap, response::Response, Json};
use dropclub_types::api::{ArcadeReceipt, MysteryReceipt, PlayRequest};
use std::sync::Arc;

pub async fn play(
    AxumState(service): AxumState<Arc<Service>>,
    headers: HeaderMap,
    Json(request): Json<PlayRequest>,
) -> Response {
    let Some(account_id) = service.authenticate(&headers) else {
        return unauthorized();
    };
    match service.command(|ledger| ledger.play(account_id, request.game, request.guess)) {
        Ok((outcome, account)) => ok(ArcadeReceipt {
            outcome,
            points: account.points,
            lifetime_points: account.lifetime_points,
        }),
        Err(err) => service_error(err),
    }
}

pub async fn mystery(AxumState(service): AxumState<Arc<Service>>, headers: HeaderMap) -> Response {
    let Some(account_id) = service.authenticate(&headers) else {
        return unauthorized();
    };
    match service.command(|ledger| ledger.open_mystery_box(account_id)) {
        Ok((reward, account)) => ok(MysteryReceipt {
            reward,
            points: account.points,
        }),
        Err(err) => service_error(err),
    }
}
