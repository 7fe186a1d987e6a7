use super::{failure, ok, service_error, unauthorized};
use crate::Service;
use axum::{
    extract::{Path, State as AxumState},
    http::{HeaderMap, StatusCode},
    response::Response,
    Json,
};
use dropclub_types::{
    api::{
        CommentRequest, CommentResponse, CommentsResponse, DropResponse, DropsResponse,
        EnterReceipt,
    },
    DropId,
};
use std::sync::Arc;

pub async fn list(AxumState(service): AxumState<Arc<Service>>) -> Response {
    match service.query(|state| state.drops()) {
        Ok(drops) => ok(DropsResponse { drops }),
        Err(err) => service_error(err),
    }
}

pub async fn detail(
    AxumState(service): AxumState<Arc<Service>>,
    Path(id): Path<DropId>,
) -> Response {
    match service.query(|state| state.find_drop(id)) {
        Ok(Some(drop)) => ok(DropResponse { drop }),
        Ok(None) => failure(StatusCode::NOT_FOUND, "Drop not found"),
        Err(err) => service_error(err),
    }
}

pub async fn enter(
    AxumState(service): AxumState<Arc<Service>>,
    Path(id): Path<DropId>,
    headers: HeaderMap,
) -> Response {
    let Some(account_id) = service.authenticate(&headers) else {
        return failure(StatusCode::UNAUTHORIZED, "You must be logged in to enter.");
    };
    match service.command(|ledger| ledger.enter_drop(account_id, id)) {
        Ok((drop, account)) => ok(EnterReceipt {
            drop_id: drop.id,
            points: account.points,
            entry_count: drop.entry_count,
        }),
        Err(err) => service_error(err),
    }
}

pub async fn comments(
    AxumState(service): AxumState<Arc<Service>>,
    Path(id): Path<DropId>,
) -> Response {
    match service.query(|state| state.find_drop(id).map(|_| state.comments_for(id))) {
        Ok(Some(comments)) => ok(CommentsResponse { comments }),
        Ok(None) => failure(StatusCode::NOT_FOUND, "Drop not found"),
        Err(err) => service_error(err),
    }
}

pub async fn post_comment(
    AxumState(service): AxumState<Arc<Service>>,
    Path(id): Path<DropId>,
    headers: HeaderMap,
    Json(request): Json<CommentRequest>,
) -> Response {
    let Some(account_id) = service.authenticate(&headers) else {
        return unauthorized();
    };
    match service.command(|ledger| ledger.post_comment(account_id, id, &request.body)) {
        Ok(comment) => ok(CommentResponse { comment }),
        Err(err) => service_error(err),
    }
}
