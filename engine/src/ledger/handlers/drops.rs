use super::super::*;
use dropclub_types::{
    constants::{DEFAULT_DROP_IMAGE, MAX_COMMENT_LENGTH},
    Comment, Drop, DropId, DropStatus, Entry,
};
use rand::Rng;

impl<'a, S: State> Ledger<'a, S> {
    pub fn create_drop(
        &mut self,
        title: &str,
        prize: &str,
        image_url: Option<String>,
        ends_at: DateTime<Utc>,
        entry_cost: u64,
    ) -> Result<Drop, LedgerError> {
        let title = title.trim();
        let prize = prize.trim();
        if title.is_empty() || prize.is_empty() {
            return Err(LedgerError::InvalidDrop);
        }
        if ends_at <= self.now {
            return Err(LedgerError::EndsInPast);
        }

        let id = self.next(Counter::Drop);
        let drop = Drop {
            id,
            title: title.to_string(),
            prize: prize.to_string(),
            image_url: image_url.unwrap_or_else(|| DEFAULT_DROP_IMAGE.to_string()),
            ends_at,
            entry_cost,
            entry_count: 0,
            status: DropStatus::Active,
            winner: None,
            entrants: Vec::new(),
            created_at: self.now,
        };
        self.insert(Key::Drop(id), Value::Drop(drop.clone()));
        self.push_feed(
            None,
            "DROPCLUB",
            FeedKind::DropNew,
            format!("🚨 New drop just went live: {title}!"),
        );
        self.events.push(Update::Drop { drop: drop.clone() });
        Ok(drop)
    }

    pub fn update_drop(
        &mut self,
        id: DropId,
        title: Option<String>,
        prize: Option<String>,
        image_url: Option<String>,
    ) -> Result<Drop, LedgerError> {
        let mut drop = self.find_drop(id)?;
        if let Some(title) = title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(LedgerError::InvalidDrop);
            }
            drop.title = title;
        }
        if let Some(prize) = prize {
            let prize = prize.trim().to_string();
            if prize.is_empty() {
                return Err(LedgerError::InvalidDrop);
            }
            drop.prize = prize;
        }
        if let Some(image_url) = image_url {
            drop.image_url = image_url;
        }
        self.insert(Key::Drop(id), Value::Drop(drop.clone()));
        self.events.push(Update::Drop { drop: drop.clone() });
        Ok(drop)
    }

    pub fn delete_drop(&mut self, id: DropId) -> Result<(), LedgerError> {
        let drop = self.find_drop(id)?;
        for entrant in &drop.entrants {
            self.delete(&Key::Entry(id, *entrant));
        }
        self.delete(&Key::Drop(id));
        Ok(())
    }

    /// The entry gate. All checks and writes happen in one unit: a
    /// rejected step leaves nothing behind, and the (drop, account)
    /// storage key makes a second entry structurally impossible.
    pub fn enter_drop(
        &mut self,
        account_id: AccountId,
        drop_id: DropId,
    ) -> Result<(Drop, Account), LedgerError> {
        let mut account = self.account(&account_id)?;
        let mut drop = self.find_drop(drop_id)?;
        if !drop.is_open(self.now) {
            return Err(LedgerError::DropClosed);
        }
        if self.get(&Key::Entry(drop_id, account_id)).is_some() {
            return Err(LedgerError::AlreadyEntered);
        }
        if drop.entry_cost > 0 {
            self.debit(&mut account, drop.entry_cost, format!("Entered {}", drop.title))?;
        }

        let entry = Entry {
            drop_id,
            account: account_id,
            created_at: self.now,
        };
        self.insert(Key::Entry(drop_id, account_id), Value::Entry(entry));
        drop.entry_count += 1;
        drop.entrants.push(account_id);
        self.insert(Key::Drop(drop_id), Value::Drop(drop.clone()));
        self.push_feed(
            Some(account_id),
            &account.username,
            FeedKind::Entry,
            format!("entered {}!", drop.title),
        );
        self.award(account_id, AchievementId::FirstEntry);
        self.store_account(account.clone());
        self.events.push(Update::Drop { drop: drop.clone() });
        Ok((drop, account))
    }

    /// Settle a drop. An explicit winner must have entered; without one
    /// the winner is drawn uniformly over the entrants. Completion is
    /// terminal.
    pub fn pick_winner(
        &mut self,
        drop_id: DropId,
        explicit: Option<AccountId>,
    ) -> Result<(Drop, Account), LedgerError> {
        let mut drop = self.find_drop(drop_id)?;
        if drop.winner.is_some() {
            return Err(LedgerError::WinnerAlreadyPicked);
        }

        let winner_id = match explicit {
            Some(id) => {
                if self.get(&Key::Entry(drop_id, id)).is_none() {
                    return Err(LedgerError::WinnerNotEntered);
                }
                id
            }
            None => {
                if drop.entrants.is_empty() {
                    return Err(LedgerError::NoEntrants);
                }
                drop.entrants[self.rng.gen_range(0..drop.entrants.len())]
            }
        };
        let winner = self.account(&winner_id)?;

        drop.winner = Some(winner_id);
        drop.status = DropStatus::Completed;
        drop.ends_at = drop.ends_at.min(self.now);
        self.insert(Key::Drop(drop_id), Value::Drop(drop.clone()));
        self.notify(
            winner_id,
            "🎉 You won!",
            format!("You won {}! Prize: {}", drop.title, drop.prize),
        );
        self.push_feed(
            Some(winner_id),
            &winner.username,
            FeedKind::Win,
            format!("won {}! 🎉", drop.title),
        );
        self.events.push(Update::Drop { drop: drop.clone() });
        Ok((drop, winner))
    }

    pub fn post_comment(
        &mut self,
        account_id: AccountId,
        drop_id: DropId,
        body: &str,
    ) -> Result<Comment, LedgerError> {
        let account = self.account(&account_id)?;
        self.find_drop(drop_id)?;
        let body = body.trim();
        if body.is_empty() || body.chars().count() > MAX_COMMENT_LENGTH {
            return Err(LedgerError::InvalidComment);
        }

        let id = self.next(Counter::Comment);
        let comment = Comment {
            id,
            drop_id,
            account: account_id,
            username: account.username,
            body: body.to_string(),
            created_at: self.now,
        };
        self.insert(Key::Comment(id), Value::Comment(comment.clone()));
        self.events.push(Update::Comment {
            comment: comment.clone(),
        });
        Ok(comment)
    }
}
