use super::super::*;

impl<'a, S: State> Ledger<'a, S> {
    /// Credit a completed point purchase. Processed events are keyed by
    /// provider event id, so a replayed webhook credits nothing;
    /// `Ok(None)` means this event was already handled.
    pub fn apply_purchase(
        &mut self,
        event_id: &str,
        account_id: AccountId,
        points: u64,
        pack_id: &str,
    ) -> Result<Option<Account>, LedgerError> {
        if self.get(&Key::WebhookEvent(event_id.to_string())).is_some() {
            tracing::debug!("Ignoring replayed payment event {}", event_id);
            return Ok(None);
        }
        let mut account = self.account(&account_id)?;
        self.insert(
            Key::WebhookEvent(event_id.to_string()),
            Value::WebhookEvent(self.now),
        );
        self.credit(&mut account, points, format!("Purchased {pack_id}"));
        self.store_account(account.clone());
        Ok(Some(account))
    }

    /// Flip the subscriber flag from a completed subscription checkout.
    /// Same replay rule as [`Ledger::apply_purchase`].
    pub fn apply_subscription(
        &mut self,
        event_id: &str,
        account_id: AccountId,
    ) -> Result<Option<Account>, LedgerError> {
        if self.get(&Key::WebhookEvent(event_id.to_string())).is_some() {
            tracing::debug!("Ignoring replayed payment event {}", event_id);
            return Ok(None);
        }
        let mut account = self.account(&account_id)?;
        self.insert(
            Key::WebhookEvent(event_id.to_string()),
            Value::WebhookEvent(self.now),
        );
        account.subscriber = true;
        self.store_account(account.clone());
        Ok(Some(account))
    }
}
