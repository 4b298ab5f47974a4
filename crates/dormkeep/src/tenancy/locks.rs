use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::service::LifecycleError;
use crate::domain::TenantId;
use crate::store::StoreError;

/// One mutex per tenant so placement changes for the same tenant never interleave
/// while different tenants proceed in parallel. Entries live only while some
/// caller holds or waits on them.
#[derive(Debug, Default)]
pub(crate) struct TenantLocks {
    locks: Mutex<HashMap<TenantId, Arc<Mutex<()>>>>,
}

impl TenantLocks {
    /// Run `work` while holding the tenant's mutex.
    pub(crate) fn serialize<T, F>(
        &self,
        tenant_id: TenantId,
        work: F,
    ) -> Result<T, LifecycleError>
    where
        F: FnOnce() -> Result<T, LifecycleError>,
    {
        let handle = self.acquire(tenant_id)?;
        let outcome = {
            let _guard = handle
                .lock()
                .map_err(|_| StoreError::Unavailable("tenant lock poisoned".to_string()))?;
            work()
        };
        self.release(tenant_id, &handle);
        outcome
    }

    fn acquire(&self, tenant_id: TenantId) -> Result<Arc<Mutex<()>>, StoreError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| StoreError::Unavailable("tenant lock table poisoned".to_string()))?;
        Ok(Arc::clone(locks.entry(tenant_id).or_default()))
    }

    /// Drop the map entry once only the map and this caller reference it.
    fn release(&self, tenant_id: TenantId, handle: &Arc<Mutex<()>>) {
        let Ok(mut locks) = self.locks.lock() else {
            return;
        };
        if Arc::strong_count(handle) == 2 {
            locks.remove(&tenant_id);
        }
    }

    #[cfg(test)]
    pub(crate) fn tracked(&self) -> usize {
        self.locks.lock().map(|locks| locks.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;

    #[test]
    fn entries_are_dropped_after_the_last_caller() {
        let locks = TenantLocks::default();
        let value = locks.serialize(TenantId(1), || Ok(7)).expect("runs");
        assert_eq!(value, 7);
        assert_eq!(locks.tracked(), 0);
    }

    #[test]
    fn waiting_callers_keep_the_entry_alive() {
        let locks = Arc::new(TenantLocks::default());
        let barrier = Arc::new(Barrier::new(8));
        let counter = Arc::new(Mutex::new(0u32));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let barrier = Arc::clone(&barrier);
                let counter = Arc::clone(&counter);
                std::thread::spawn(move || {
                    barrier.wait();
                    locks
                        .serialize(TenantId(3), || {
                            *counter.lock().expect("counter") += 1;
                            Ok(())
                        })
                        .expect("serialized");
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("worker completes");
        }

        assert_eq!(*counter.lock().expect("counter"), 8);
        assert_eq!(locks.tracked(), 0);
    }
}
