use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use chrono::{DateTime, Duration, Utc};

/* ledger.rs contains the store for requester cooldowns.
 * A cooldown maps a requester identity to the instant after which
 * the requester may receive tokens again.
 * Only the disbursement workflow commits entries, only the sweeper prunes them.
 */

pub trait CooldownStore: Send + Sync {
    // Gets the eligible-again instant stored for an identity, if any
    fn eligible_at(&self, identity: &str) -> Option<DateTime<Utc>>;

    // Sets or overwrites the entry for an identity to now + cooldown
    fn commit(&self, identity: &str, now: DateTime<Utc>, cooldown: Duration);

    // Removes every entry whose instant is at or before now.
    // Returns the number of entries removed.
    fn prune(&self, now: DateTime<Utc>) -> usize;

    fn is_on_cooldown(&self, identity: &str, now: DateTime<Utc>) -> bool {
        self.time_remaining(identity, now).is_some()
    }

    // Time left until the identity is eligible again. None if not on cooldown.
    fn time_remaining(&self, identity: &str, now: DateTime<Utc>) -> Option<Duration> {
        match self.eligible_at(identity) {
            Some(instant) if instant > now => Some(instant - now),
            _ => None,
        }
    }
}

/* In-memory cooldown store.
 * State lives only as long as the process, nothing is persisted.
 */
#[derive(Debug, Default)]
pub struct CooldownLedger {
    entries: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl CooldownLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    // A poisoned map is still consistent, every write is a single insert or retain
    fn entries(&self) -> MutexGuard<'_, HashMap<String, DateTime<Utc>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CooldownStore for CooldownLedger {
    fn eligible_at(&self, identity: &str) -> Option<DateTime<Utc>> {
        self.entries().get(identity).copied()
    }

    fn commit(&self, identity: &str, now: DateTime<Utc>, cooldown: Duration) {
        let instant = now
            .checked_add_signed(cooldown)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.entries().insert(identity.to_string(), instant);
    }

    fn prune(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, instant| *instant > now);
        before - entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_commit_sets_cooldown() {
        let ledger = CooldownLedger::new();
        assert!(!ledger.is_on_cooldown("123", at(0)));

        ledger.commit("123", at(0), Duration::days(1));
        assert_eq!(ledger.eligible_at("123"), Some(at(0) + Duration::days(1)));
        assert!(ledger.is_on_cooldown("123", at(0)));
        assert!(!ledger.is_on_cooldown("456", at(0)));
    }

    #[test]
    fn test_cooldown_window_bounds() {
        let ledger = CooldownLedger::new();
        let start = at(0);
        let cooldown = Duration::days(2);
        ledger.commit("123", start, cooldown);

        assert!(ledger.is_on_cooldown("123", start + Duration::seconds(1)));
        assert!(ledger.is_on_cooldown("123", start + Duration::days(1)));
        assert!(ledger.is_on_cooldown(
            "123",
            start + cooldown - Duration::milliseconds(1)
        ));
        assert!(!ledger.is_on_cooldown("123", start + cooldown));
        assert!(!ledger.is_on_cooldown("123", start + cooldown + Duration::hours(1)));
    }

    #[test]
    fn test_time_remaining() {
        let ledger = CooldownLedger::new();
        ledger.commit("123", at(0), Duration::hours(10));

        assert_eq!(ledger.time_remaining("123", at(4)), Some(Duration::hours(6)));
        assert_eq!(ledger.time_remaining("123", at(10)), None);
        assert_eq!(ledger.time_remaining("456", at(4)), None);
    }

    #[test]
    fn test_commit_overwrites() {
        let ledger = CooldownLedger::new();
        ledger.commit("123", at(0), Duration::hours(1));
        ledger.commit("123", at(5), Duration::hours(1));

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.eligible_at("123"), Some(at(6)));
    }

    #[test]
    fn test_commit_saturates() {
        let ledger = CooldownLedger::new();
        ledger.commit("123", DateTime::<Utc>::MAX_UTC, Duration::days(1));
        assert_eq!(ledger.eligible_at("123"), Some(DateTime::<Utc>::MAX_UTC));
    }

    #[test]
    fn test_prune_removes_only_expired() {
        let ledger = CooldownLedger::new();
        ledger.commit("expired", at(0), Duration::hours(1));
        ledger.commit("boundary", at(0), Duration::hours(3));
        ledger.commit("live", at(0), Duration::hours(5));

        assert_eq!(ledger.prune(at(3)), 2);
        assert_eq!(ledger.eligible_at("expired"), None);
        assert_eq!(ledger.eligible_at("boundary"), None);
        assert_eq!(ledger.eligible_at("live"), Some(at(5)));

        assert_eq!(ledger.prune(at(3)), 0);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_prune_empty() {
        let ledger = CooldownLedger::new();
        assert_eq!(ledger.prune(at(0)), 0);
        assert!(ledger.is_empty());
    }
}
