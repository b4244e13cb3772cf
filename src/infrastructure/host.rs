//! Host environment implementations - time and caller identity

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::domain::gateway::HostGateway;
use crate::shared::types::AccountId;

/// Wall-clock host for a fixed operating account.
pub struct SystemHost {
    caller: AccountId,
}

impl SystemHost {
    pub fn new(caller: AccountId) -> Self {
        Self { caller }
    }
}

impl HostGateway for SystemHost {
    fn now(&self) -> u64 {
        chrono::Utc::now().timestamp().max(0) as u64
    }

    fn caller(&self) -> AccountId {
        self.caller
    }
}

/// Scripted host: time only moves when told to, and the caller can be
/// switched between operations. Used by the scenario runner and tests.
pub struct ManualHost {
    now: AtomicU64,
    caller: Mutex<AccountId>,
}

impl ManualHost {
    pub fn new(now: u64, caller: AccountId) -> Self {
        Self {
            now: AtomicU64::new(now),
            caller: Mutex::new(caller),
        }
    }

    pub fn set_now(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: u64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }

    pub fn set_caller(&self, caller: AccountId) {
        *self.caller.lock().expect("host poisoned") = caller;
    }
}

impl HostGateway for ManualHost {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }

    fn caller(&self) -> AccountId {
        *self.caller.lock().expect("host poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_host_reads_wall_clock() {
        let host = SystemHost::new(AccountId::from_name("operator"));
        // Any reasonable wall clock is far past the 2020s epoch.
        assert!(host.now() > 1_500_000_000);
        assert_eq!(host.caller(), AccountId::from_name("operator"));
    }

    #[test]
    fn test_manual_host_scripts_time_and_caller() {
        let host = ManualHost::new(100, AccountId::from_name("alice"));
        assert_eq!(host.now(), 100);

        host.advance(50);
        assert_eq!(host.now(), 150);

        host.set_caller(AccountId::from_name("bob"));
        assert_eq!(host.caller(), AccountId::from_name("bob"));
    }
}
