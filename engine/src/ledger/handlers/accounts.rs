use super::super::*;
use dropclub_types::constants::MAX_NAME_LENGTH;

impl<'a, S: State> Ledger<'a, S> {
    /// Create an account. The id is minted by the caller so the engine
    /// stays deterministic under a seeded RNG.
    pub fn register(
        &mut self,
        id: AccountId,
        email: &str,
        username: &str,
        password_hash: &str,
        password_salt: &str,
        admin: bool,
    ) -> Result<Account, LedgerError> {
        let email = email.trim().to_lowercase();
        if email.len() < 3 || !email.contains('@') {
            return Err(LedgerError::InvalidEmail);
        }
        let username = username.trim();
        if username.is_empty() || username.chars().count() > MAX_NAME_LENGTH {
            return Err(LedgerError::InvalidUsername);
        }
        if self.get(&Key::AccountEmail(email.clone())).is_some() {
            return Err(LedgerError::EmailTaken);
        }

        let account = Account::new(
            id,
            email.clone(),
            username.to_string(),
            password_hash.to_string(),
            password_salt.to_string(),
            admin,
            self.now,
        );
        self.insert(Key::AccountEmail(email), Value::AccountEmail(id));
        self.store_account(account.clone());
        Ok(account)
    }

    /// Zero out balances and streak state. No ledger record is written;
    /// the points-equals-record-sum invariant restarts here.
    pub fn reset_account(&mut self, id: AccountId) -> Result<Account, LedgerError> {
        let mut account = self.account(&id)?;
        account.points = 0;
        account.lifetime_points = 0;
        account.login_streak = 0;
        account.last_login = None;
        account.last_played = None;
        self.update_leaderboard(&account);
        self.emit_balance(&account);
        self.store_account(account.clone());
        Ok(account)
    }
}
