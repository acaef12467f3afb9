// In-memory claim store for unit tests
// Claim transactions are serialized by an owned mutex guard, writes are staged until commit.

use crate::domain::Claim;
use crate::error::Result;
use crate::port::{ClaimRepositoryTransaction, Transaction, TransactionalClaimRepository};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default)]
pub(crate) struct InMemoryState {
    claims: Vec<Claim>,
    counters: HashMap<String, i64>,
}

#[derive(Default)]
pub(crate) struct InMemoryClaimRepository {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryClaimRepository {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn claims(&self) -> Vec<Claim> {
        self.state.lock().await.claims.clone()
    }

    pub(crate) async fn counter(&self, name: &str) -> Option<i64> {
        self.state.lock().await.counters.get(name).copied()
    }
}

#[async_trait]
impl TransactionalClaimRepository for InMemoryClaimRepository {
    async fn begin_claim(&self, counter_name: &str) -> Result<Box<dyn ClaimRepositoryTransaction>> {
        let guard = self.state.clone().lock_owned().await;
        let mut pending_counters = HashMap::new();
        if !guard.counters.contains_key(counter_name) {
            pending_counters.insert(counter_name.to_string(), 0);
        }

        Ok(Box::new(InMemoryTransaction {
            guard,
            pending_claims: Vec::new(),
            pending_counters,
        }))
    }
}

struct InMemoryTransaction {
    guard: OwnedMutexGuard<InMemoryState>,
    pending_claims: Vec<Claim>,
    pending_counters: HashMap<String, i64>,
}

#[async_trait]
impl Transaction for InMemoryTransaction {
    async fn commit(mut self: Box<Self>) -> Result<()> {
        let pending_claims = std::mem::take(&mut self.pending_claims);
        let pending_counters = std::mem::take(&mut self.pending_counters);
        self.guard.claims.extend(pending_claims);
        self.guard.counters.extend(pending_counters);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl ClaimRepositoryTransaction for InMemoryTransaction {
    async fn find_recent_claim(
        &mut self,
        origin_signal: Option<&str>,
        client_token: &str,
        since: i64,
    ) -> Result<Option<Claim>> {
        Ok(self
            .guard
            .claims
            .iter()
            .chain(self.pending_claims.iter())
            .filter(|c| c.claimed_at >= since)
            .filter(|c| {
                c.client_token == client_token
                    || (origin_signal.is_some() && c.origin_signal.as_deref() == origin_signal)
            })
            .max_by_key(|c| c.claimed_at)
            .cloned())
    }

    async fn increment_counter(&mut self, counter_name: &str) -> Result<i64> {
        let current = self
            .pending_counters
            .get(counter_name)
            .or_else(|| self.guard.counters.get(counter_name))
            .copied()
            .unwrap_or(0);
        self.pending_counters
            .insert(counter_name.to_string(), current + 1);
        Ok(current)
    }

    async fn insert(&mut self, claim: &Claim) -> Result<()> {
        self.pending_claims.push(claim.clone());
        Ok(())
    }
}
