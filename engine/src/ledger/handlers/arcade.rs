use super::super::*;
use crate::games::{self, WeightedTable};
use dropclub_types::{
    constants::{FEED_THRESHOLD, JACKPOT_THRESHOLD, MYSTERY_BOX_COST},
    ArcadeOutcome, GameKind, HiLoGuess, MysteryReward,
};

impl<'a, S: State> Ledger<'a, S> {
    /// Resolve one free arcade play. Payouts are computed here and only
    /// here; the client never reports a result.
    pub fn play(
        &mut self,
        account_id: AccountId,
        game: GameKind,
        guess: Option<HiLoGuess>,
    ) -> Result<(ArcadeOutcome, Account), LedgerError> {
        let mut account = self.account(&account_id)?;
        if let Some(cooldown) = self.policy.arcade_cooldown {
            if let Some(last) = account.last_played {
                if self.now - last < cooldown {
                    return Err(LedgerError::CooldownActive);
                }
            }
        }

        let outcome = match game {
            GameKind::Scratch => games::scratch::resolve(&mut self.rng),
            GameKind::Wheel => games::wheel::resolve(&mut self.rng),
            GameKind::Slots => games::slots::resolve(&mut self.rng),
            GameKind::CoinFlip => games::coin_flip::resolve(&mut self.rng),
            GameKind::HiLo => {
                let guess = guess.ok_or(LedgerError::MissingGuess)?;
                games::hi_lo::resolve(&mut self.rng, guess)
            }
        };

        account.last_played = Some(self.now);
        let payout = outcome.payout();
        if payout > 0 {
            self.credit(
                &mut account,
                payout,
                format!("Won {payout} PTS on {}", outcome.kind()),
            );
            self.award(account_id, AchievementId::FirstWin);
        }
        if payout >= FEED_THRESHOLD {
            let kind = if payout >= JACKPOT_THRESHOLD {
                FeedKind::Jackpot
            } else {
                FeedKind::Win
            };
            self.push_feed(
                Some(account_id),
                &account.username,
                kind,
                format!("won {payout} PTS on {}! 🎉", outcome.kind()),
            );
        }
        if payout >= JACKPOT_THRESHOLD {
            self.award(account_id, AchievementId::Jackpot);
        }
        self.store_account(account.clone());
        Ok((outcome, account))
    }

    /// Buy and open a mystery box: a 100 point debit, a weighted draw
    /// over the active catalog, and the credit of whatever came out, all
    /// in one unit.
    pub fn open_mystery_box(
        &mut self,
        account_id: AccountId,
    ) -> Result<(MysteryReward, Account), LedgerError> {
        let mut account = self.account(&account_id)?;
        let catalog: Vec<MysteryReward> = match self.get(&Key::MysteryCatalog) {
            Some(Value::MysteryCatalog(catalog)) => {
                catalog.into_iter().filter(|reward| reward.active).collect()
            }
            _ => Vec::new(),
        };
        if catalog.is_empty() {
            return Err(LedgerError::EmptyCatalog);
        }

        self.debit(&mut account, MYSTERY_BOX_COST, "Mystery Box")?;
        let weights: Vec<(u32, u32)> = catalog
            .iter()
            .map(|reward| (reward.id, reward.weight))
            .collect();
        let picked = WeightedTable::new(&weights).draw(&mut self.rng);
        let reward = catalog
            .into_iter()
            .find(|reward| reward.id == picked)
            .ok_or(LedgerError::EmptyCatalog)?;

        self.credit(
            &mut account,
            reward.value,
            format!("Mystery Box: {}", reward.name),
        );
        self.push_feed(
            Some(account_id),
            &account.username,
            FeedKind::MysteryBox,
            format!("opened a Mystery Box and got {} {}!", reward.icon, reward.name),
        );
        self.store_account(account.clone());
        Ok((reward, account))
    }
}
