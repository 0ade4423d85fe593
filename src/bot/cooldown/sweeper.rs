use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::{
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};

use super::ledger::CooldownStore;

pub const PRUNE_INTERVAL: Duration = Duration::from_secs(10);

/* Spawns the background task that prunes expired cooldowns.
 * Runs on a fixed interval regardless of message traffic, until aborted.
 */
pub fn spawn_sweeper(store: Arc<dyn CooldownStore>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let removed = store.prune(Utc::now());
            if removed > 0 {
                log::debug!("Cooldown Sweeper - Pruned {} expired cooldowns", removed);
            }
        }
    })
}
