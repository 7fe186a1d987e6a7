use super::{failure, ok, service_error};
use crate::{webhook, Service};
use axum::{
    extract::State as AxumState,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use dropclub_types::{
    api::{CheckoutRequest, CheckoutResponse, PacksResponse, WebhookAck},
    WebhookEvent, EVENT_CHECKOUT_COMPLETED, PURCHASE_MARKER,
};
use std::sync::Arc;

pub async fn packs(AxumState(service): AxumState<Arc<Service>>) -> Response {
    ok(PacksResponse {
        packs: service.config().packs.clone(),
    })
}

pub async fn checkout(
    AxumState(service): AxumState<Arc<Service>>,
    headers: HeaderMap,
    Json(request): Json<CheckoutRequest>,
) -> Response {
    let Some(account_id) = service.authenticate(&headers) else {
        return failure(
            StatusCode::UNAUTHORIZED,
            "You must be logged in to subscribe.",
        );
    };
    let config = service.config();
    let Some(pack) = config.packs.iter().find(|pack| pack.id == request.pack_id) else {
        return failure(StatusCode::NOT_FOUND, "Unknown point pack");
    };

    // Points only land later, through the signed webhook
    let url = format!(
        "{}?pack={}&account={}",
        config.checkout_url, pack.id, account_id
    );
    ok(CheckoutResponse { url })
}

fn received() -> Response {
    Json(WebhookAck { received: true }).into_response()
}

/// Payment provider callback. The raw body is needed for signature
/// verification, so JSON parsing happens only after the HMAC checks out.
pub async fn webhook(
    AxumState(service): AxumState<Arc<Service>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let Some(signature) = headers
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok())
    else {
        return failure(StatusCode::BAD_REQUEST, "Missing signature");
    };
    let config = service.config();
    if let Err(err) = webhook::verify(
        &config.webhook_secret,
        signature,
        &body,
        config.webhook_tolerance_secs,
        Utc::now(),
    ) {
        tracing::warn!("Rejected payment webhook: {}", err);
        return failure(StatusCode::BAD_REQUEST, "Invalid signature");
    }

    let event: WebhookEvent = match serde_json::from_str(&body) {
        Ok(event) => event,
        Err(err) => {
            tracing::warn!("Could not parse payment event: {}", err);
            return failure(StatusCode::BAD_REQUEST, "Malformed event");
        }
    };
    if event.kind != EVENT_CHECKOUT_COMPLETED {
        return received();
    }
    let metadata = event.data.object.metadata;
    let Some(user_id) = metadata.user_id else {
        return received();
    };

    let result = if metadata.kind.as_deref() == Some(PURCHASE_MARKER) {
        let points = metadata
            .points
            .as_deref()
            .and_then(|points| points.parse::<u64>().ok());
        let (Some(points), Some(pack_id)) = (points, metadata.pack_id.as_deref()) else {
            return failure(StatusCode::BAD_REQUEST, "Malformed purchase metadata");
        };
        service.command(|ledger| ledger.apply_purchase(&event.id, user_id, points, pack_id))
    } else {
        service.command(|ledger| ledger.apply_subscription(&event.id, user_id))
    };
    match result {
        Ok(_) => received(),
        Err(err) => service_error(err),
    }
}
