use super::{failure, ok, service_error, unauthorized};
use crate::Service;
use axum::{
    body::Bytes,
    extract::{Path, State as AxumState},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    Json,
};
use dropclub_types::{
    api::{
        Ack, CreateDropRequest, DropResponse, StatsResponse, UpdateDropRequest, UploadResponse,
        WinnerRequest,
    },
    DropId,
};
use std::{path::PathBuf, sync::Arc};
use uuid::Uuid;

fn require_admin(service: &Service, headers: &HeaderMap) -> Result<(), Response> {
    let Some(account_id) = service.authenticate(headers) else {
        return Err(unauthorized());
    };
    let admin = match service.query(|state| state.account(&account_id).map(|account| account.admin))
    {
        Ok(admin) => admin.unwrap_or(false),
        Err(err) => return Err(service_error(err)),
    };
    if !admin {
        return Err(failure(StatusCode::FORBIDDEN, "Admin access required"));
    }
    Ok(())
}

pub async fn create_drop(
    AxumState(service): AxumState<Arc<Service>>,
    headers: HeaderMap,
    Json(request): Json<CreateDropRequest>,
) -> Response {
    if let Err(response) = require_admin(&service, &headers) {
        return response;
    }
    match service.command(|ledger| {
        ledger.create_drop(
            &request.title,
            &request.prize,
            request.image_url.clone(),
            request.ends_at,
            request.entry_cost.unwrap_or(0),
        )
    }) {
        Ok(drop) => ok(DropResponse { drop }),
        Err(err) => service_error(err),
    }
}

pub async fn update_drop(
    AxumState(service): AxumState<Arc<Service>>,
    Path(id): Path<DropId>,
    headers: HeaderMap,
    Json(request): Json<UpdateDropRequest>,
) -> Response {
    if let Err(response) = require_admin(&service, &headers) {
        return response;
    }
    match service.command(|ledger| {
        ledger.update_drop(
            id,
            request.title.clone(),
            request.prize.clone(),
            request.image_url.clone(),
        )
    }) {
        Ok(drop) => ok(DropResponse { drop }),
        Err(err) => service_error(err),
    }
}

pub async fn delete_drop(
    AxumState(service): AxumState<Arc<Service>>,
    Path(id): Path<DropId>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = require_admin(&service, &headers) {
        return response;
    }
    match service.command(|ledger| ledger.delete_drop(id)) {
        Ok(()) => ok(Ack {}),
        Err(err) => service_error(err),
    }
}

pub async fn pick_winner(
    AxumState(service): AxumState<Arc<Service>>,
    Path(id): Path<DropId>,
    headers: HeaderMap,
    Json(request): Json<WinnerRequest>,
) -> Response {
    if let Err(response) = require_admin(&service, &headers) {
        return response;
    }
    match service.command(|ledger| ledger.pick_winner(id, request.account_id)) {
        Ok((drop, _winner)) => ok(DropResponse { drop }),
        Err(err) => service_error(err),
    }
}

pub async fn stats(AxumState(service): AxumState<Arc<Service>>, headers: HeaderMap) -> Response {
    if let Err(response) = require_admin(&service, &headers) {
        return response;
    }
    match service.query(|state| state.stats()) {
        Ok(stats) => ok(StatsResponse {
            accounts: stats.accounts,
            drops: stats.drops,
            entries: stats.entries,
            points_outstanding: stats.points_outstanding,
        }),
        Err(err) => service_error(err),
    }
}

/// Stores a raw image body under a random name and returns its public path.
pub async fn upload(
    AxumState(service): AxumState<Arc<Service>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(response) = require_admin(&service, &headers) {
        return response;
    }
    let extension = match headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    {
        Some("image/png") => "png",
        Some("image/jpeg") => "jpg",
        Some("image/webp") => "webp",
        Some("image/gif") => "gif",
        _ => "bin",
    };
    let name = format!("{}.{}", Uuid::new_v4(), extension);
    let dir = PathBuf::from(&service.config().upload_dir);
    if let Err(err) = tokio::fs::create_dir_all(&dir).await {
        tracing::error!("Failed to create upload directory: {}", err);
        return failure(StatusCode::INTERNAL_SERVER_ERROR, "Upload failed");
    }
    if let Err(err) = tokio::fs::write(dir.join(&name), &body).await {
        tracing::error!("Failed to write upload: {}", err);
        return failure(StatusCode::INTERNAL_SERVER_ERROR, "Upload failed");
    }
    ok(UploadResponse {
        url: format!("/uploads/{name}"),
    })
}
