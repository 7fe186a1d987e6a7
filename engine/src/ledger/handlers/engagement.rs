use super::super::*;
use dropclub_types::{
    constants::{REFERRAL_BONUS, REFERRAL_CODE_LENGTH, STREAK_MILESTONES},
    reward_item, Redemption, Referral,
};
use rand::Rng;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn streak_bonus(streak: u32) -> u64 {
    if streak >= 30 {
        100
    } else if streak >= 7 {
        20
    } else if streak >= 3 {
        5
    } else {
        0
    }
}

impl<'a, S: State> Ledger<'a, S> {
    /// Claim the daily streak. Calendar days decide everything: a second
    /// claim on the same day is a no-op, a claim the day after the last
    /// one extends the streak, anything else resets it to 1.
    ///
    /// Returns `(streak, bonus, already_claimed)`.
    pub fn claim_streak(
        &mut self,
        account_id: AccountId,
    ) -> Result<(u32, u64, bool), LedgerError> {
        let mut account = self.account(&account_id)?;
        let today = self.now.date_naive();
        if account.last_login == Some(today) {
            return Ok((account.login_streak, 0, true));
        }

        let streak = match account.last_login {
            Some(last) if Some(last) == today.pred_opt() => account.login_streak + 1,
            _ => 1,
        };
        account.login_streak = streak;
        account.last_login = Some(today);

        let bonus = streak_bonus(streak);
        if bonus > 0 {
            self.credit(&mut account, bonus, "Daily streak bonus");
        }
        if STREAK_MILESTONES.contains(&streak) {
            self.push_feed(
                Some(account_id),
                &account.username,
                FeedKind::Achievement,
                format!("hit a {streak}-day login streak! 🔥"),
            );
            if let Some(id) = AchievementId::for_streak(streak) {
                self.award(account_id, id);
            }
        }
        self.store_account(account);
        Ok((streak, bonus, false))
    }

    /// Return the account's referral code, minting one on first use.
    pub fn ensure_referral_code(&mut self, account_id: AccountId) -> Result<String, LedgerError> {
        let mut account = self.account(&account_id)?;
        if let Some(code) = account.referral_code {
            return Ok(code);
        }

        let code = loop {
            let candidate: String = (0..REFERRAL_CODE_LENGTH)
                .map(|_| CODE_ALPHABET[self.rng.gen_range(0..CODE_ALPHABET.len())] as char)
                .collect();
            if self.get(&Key::ReferralCode(candidate.clone())).is_none() {
                break candidate;
            }
        };
        self.insert(
            Key::ReferralCode(code.clone()),
            Value::ReferralCode(account_id),
        );
        account.referral_code = Some(code.clone());
        self.store_account(account);
        Ok(code)
    }

    /// Redeem someone else's referral code. Both sides are credited in
    /// the same changeset; the referral row is keyed by referee, so this
    /// can succeed at most once per account.
    pub fn apply_referral(
        &mut self,
        referee_id: AccountId,
        code: &str,
    ) -> Result<(Account, Account), LedgerError> {
        let mut referee = self.account(&referee_id)?;
        if referee.referred_by.is_some() || self.get(&Key::Referral(referee_id)).is_some() {
            return Err(LedgerError::AlreadyReferred);
        }

        let normalized = code.trim().to_uppercase();
        let referrer_id = match self.get(&Key::ReferralCode(normalized)) {
            Some(Value::ReferralCode(id)) => id,
            _ => return Err(LedgerError::InvalidReferralCode),
        };
        if referrer_id == referee_id {
            return Err(LedgerError::SelfReferral);
        }
        let mut referrer = self.account(&referrer_id)?;

        self.insert(
            Key::Referral(referee_id),
            Value::Referral(Referral {
                referrer: referrer_id,
                referee: referee_id,
                created_at: self.now,
            }),
        );
        referee.referred_by = Some(referrer_id);
        self.credit(&mut referee, REFERRAL_BONUS, "Referral bonus");
        self.credit(&mut referrer, REFERRAL_BONUS, "Referral bonus");
        self.award(referrer_id, AchievementId::Recruiter);
        self.push_feed(
            Some(referee_id),
            "A new member",
            FeedKind::Signup,
            format!(
                "was referred by {} (+{} PTS each!)",
                referrer.username, REFERRAL_BONUS
            ),
        );
        self.notify(
            referrer_id,
            "Referral bonus!",
            format!(
                "{} joined with your code (+{} PTS).",
                referee.username, REFERRAL_BONUS
            ),
        );
        self.store_account(referee.clone());
        self.store_account(referrer.clone());
        Ok((referee, referrer))
    }

    /// Spend points on a catalog reward.
    pub fn redeem_reward(
        &mut self,
        account_id: AccountId,
        reward_id: &str,
    ) -> Result<(Redemption, Account), LedgerError> {
        let mut account = self.account(&account_id)?;
        let item = reward_item(reward_id).ok_or(LedgerError::UnknownReward)?;

        self.debit(&mut account, item.cost, format!("Redeemed {}", item.name))?;
        if item.id == "badge_vip" {
            account.vip = true;
        }
        let id = self.next(Counter::Redemption);
        let redemption = Redemption {
            id,
            account: account_id,
            reward_id: item.id.to_string(),
            cost: item.cost,
            created_at: self.now,
        };
        self.insert(Key::Redemption(id), Value::Redemption(redemption.clone()));
        self.store_account(account.clone());
        Ok((redemption, account))
    }

    /// Mark the given notifications read, skipping any that belong to
    /// someone else. Returns how many actually flipped.
    pub fn mark_notifications_read(
        &mut self,
        account_id: AccountId,
        ids: &[u64],
    ) -> Result<u64, LedgerError> {
        self.account(&account_id)?;
        let mut flipped = 0;
        for id in ids {
            if let Some(Value::Notification(mut notification)) = self.get(&Key::Notification(*id)) {
                if notification.account == account_id && !notification.read {
                    notification.read = true;
                    self.insert(Key::Notification(*id), Value::Notification(notification));
                    flipped += 1;
                }
            }
        }
        Ok(flipped)
    }
}
