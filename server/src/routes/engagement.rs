use super::{accounts::profile_response, ok, service_error, unauthorized};
use crate::Service;
use axum::{extract::State as AxumState, http::HeaderMap, response::Response, Json};
use dropclub_types::{
    api::{
        AchievementView, AchievementsResponse, CodeResponse, FeedResponse, LeaderboardResponse,
        LeaderboardRow, MarkReadResponse, NotificationsResponse, RedeemReceipt, RedeemRequest,
        ReferralRequest, RewardsResponse, StreakReceipt,
    },
    ACHIEVEMENTS, FEED_PAGE_SIZE, REWARD_CATALOG,
};
use std::sync::Arc;

pub async fn claim_streak(
    AxumState(service): AxumState<Arc<Service>>,
    headers: HeaderMap,
) -> Response {
    let Some(account_id) = service.authenticate(&headers) else {
        return unauthorized();
    };
    match service.command(|ledger| ledger.claim_streak(account_id)) {
        Ok((streak, bonus, already_claimed)) => ok(StreakReceipt {
            streak,
            bonus,
            already_claimed,
        }),
        Err(err) => service_error(err),
    }
}

pub async fn referral_code(
    AxumState(service): AxumState<Arc<Service>>,
    headers: HeaderMap,
) -> Response {
    let Some(account_id) = service.authenticate(&headers) else {
        return unauthorized();
    };
    // Mints on first request, so sharing works without a separate setup step
    match service.command(|ledger| ledger.ensure_referral_code(account_id)) {
        Ok(code) => ok(CodeResponse { code }),
        Err(err) => service_error(err),
    }
}

pub async fn apply_referral(
    AxumState(service): AxumState<Arc<Service>>,
    headers: HeaderMap,
    Json(request): Json<ReferralRequest>,
) -> Response {
    let Some(account_id) = service.authenticate(&headers) else {
        return unauthorized();
    };
    if let Err(err) = service.command(|ledger| ledger.apply_referral(account_id, &request.code)) {
        return service_error(err);
    }
    match profile_response(&service, account_id) {
        Ok(Some(profile)) => ok(profile),
        Ok(None) => unauthorized(),
        Err(err) => service_error(err),
    }
}

pub async fn feed(AxumState(service): AxumState<Arc<Service>>) -> Response {
    match service.query(|state| state.feed(FEED_PAGE_SIZE)) {
        Ok(items) => ok(FeedResponse { items }),
        Err(err) => service_error(err),
    }
}

pub async fn leaderboard(AxumState(service): AxumState<Arc<Service>>) -> Response {
    let standings = match service.query(|state| {
        state
            .leaderboard()
            .standings
            .iter()
            .filter_map(|(id, lifetime_points)| {
                state.account(id).map(|account| LeaderboardRow {
                    account: *id,
                    username: account.username,
                    lifetime_points: *lifetime_points,
                    vip: account.vip,
                    login_streak: account.login_streak,
                })
            })
            .collect::<Vec<_>>()
    }) {
        Ok(standings) => standings,
        Err(err) => return service_error(err),
    };
    ok(LeaderboardResponse { standings })
}

pub async fn achievements(
    AxumState(service): AxumState<Arc<Service>>,
    headers: HeaderMap,
) -> Response {
    let Some(account_id) = service.authenticate(&headers) else {
        return unauthorized();
    };
    let achievements = match service.query(|state| {
        let earned = state.achievements_for(&account_id);
        ACHIEVEMENTS
            .iter()
            .map(|def| {
                let earned_at = earned
                    .iter()
                    .find(|row| row.id == def.id)
                    .map(|row| row.created_at);
                AchievementView {
                    id: def.id,
                    name: def.name.to_string(),
                    description: def.description.to_string(),
                    icon: def.icon.to_string(),
                    earned: earned_at.is_some(),
                    earned_at,
                }
            })
            .collect::<Vec<_>>()
    }) {
        Ok(achievements) => achievements,
        Err(err) => return service_error(err),
    };
    ok(AchievementsResponse { achievements })
}

pub async fn notifications(
    AxumState(service): AxumState<Arc<Service>>,
    headers: HeaderMap,
) -> Response {
    let Some(account_id) = service.authenticate(&headers) else {
        return unauthorized();
    };
    match service.query(|state| state.notifications_for(&account_id)) {
        Ok(notifications) => ok(NotificationsResponse { notifications }),
        Err(err) => service_error(err),
    }
}

pub async fn mark_read(AxumState(service): AxumState<Arc<Service>>, headers: HeaderMap) -> Response {
    let Some(account_id) = service.authenticate(&headers) else {
        return unauthorized();
    };
    let ids = match service.query(|state| {
        state
            .notifications_for(&account_id)
            .into_iter()
            .filter(|notification| !notification.read)
            .map(|notification| notification.id)
            .collect::<Vec<_>>()
    }) {
        Ok(ids) => ids,
        Err(err) => return service_error(err),
    };
    match service.command(|ledger| ledger.mark_notifications_read(account_id, &ids)) {
        Ok(updated) => ok(MarkReadResponse { updated }),
        Err(err) => service_error(err),
    }
}

pub async fn rewards(AxumState(_service): AxumState<Arc<Service>>) -> Response {
    ok(RewardsResponse {
        rewards: REWARD_CATALOG.to_vec(),
    })
}

pub async fn redeem(
    AxumState(service): AxumState<Arc<Service>>,
    headers: HeaderMap,
    Json(request): Json<RedeemRequest>,
) -> Response {
    let Some(account_id) = service.authenticate(&headers) else {
        return unauthorized();
    };
    match service.command(|ledger| ledger.redeem_reward(account_id, &request.reward_id)) {
        Ok((redemption, account)) => ok(RedeemReceipt {
            reward_id: redemption.reward_id,
            cost: redemption.cost,
            points: account.points,
        }),
        Err(err) => service_error(err),
    }
}
