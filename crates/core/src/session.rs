use crate::allocation;
use crate::domain::{AllocationRecord, Instrument, RiskProfile};
use crate::error::AdvisorError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionSource {
    Suggested,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub profile: RiskProfile,
    pub source: SelectionSource,
    pub selected_at: DateTime<Utc>,
}

/// Per-user advisory state. Owned by whoever serves the user; never global.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub selection: Option<Selection>,
    pub last_investment: Option<f64>,
}

impl Session {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            last_seen_at: now,
            selection: None,
            last_investment: None,
        }
    }

    /// Replaces any previous selection.
    pub fn commit(&mut self, profile: RiskProfile, source: SelectionSource, now: DateTime<Utc>) {
        self.selection = Some(Selection {
            profile,
            source,
            selected_at: now,
        });
    }

    pub fn profile(&self) -> Option<RiskProfile> {
        self.selection.as_ref().map(|s| s.profile)
    }

    pub fn allocate(
        &self,
        instruments: &[Instrument],
        total_investment: f64,
    ) -> Result<Vec<AllocationRecord>, AdvisorError> {
        allocation::allocate(instruments, self.profile(), total_investment)
    }
}

/// Sessions keyed by id. Each session's selection is invisible to the others.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn create(&self, now: DateTime<Utc>) -> Session {
        let session = Session::new(now);
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session.id, session.clone());
        session
    }

    /// Snapshot of a live session; marks it as seen.
    pub fn get(&self, id: Uuid, now: DateTime<Utc>) -> Result<Session, AdvisorError> {
        self.update(id, now, |_| ())
            .map(|((), session)| session)
    }

    pub fn commit(
        &self,
        id: Uuid,
        profile: RiskProfile,
        source: SelectionSource,
        now: DateTime<Utc>,
    ) -> Result<Selection, AdvisorError> {
        self.update(id, now, |s| {
            s.commit(profile, source, now);
        })
        .and_then(|((), session)| session.selection.ok_or(AdvisorError::NoProfileSelected))
    }

    /// Allocates for the session's current selection and remembers the amount.
    pub fn allocate(
        &self,
        id: Uuid,
        instruments: &[Instrument],
        total_investment: f64,
        now: DateTime<Utc>,
    ) -> Result<(RiskProfile, Vec<AllocationRecord>), AdvisorError> {
        let (records, session) = self.update(id, now, |s| -> Result<_, AdvisorError> {
            let records = s.allocate(instruments, total_investment)?;
            s.last_investment = Some(total_investment);
            Ok(records)
        })?;
        let records = records?;
        let profile = session.profile().ok_or(AdvisorError::NoProfileSelected)?;
        Ok((profile, records))
    }

    pub fn remove(&self, id: Uuid) -> Result<(), AdvisorError> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .map(|_| ())
            .ok_or(AdvisorError::SessionNotFound(id))
    }

    /// Drops sessions idle for longer than the ttl. Returns how many were dropped.
    pub fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        let Ok(ttl) = chrono::Duration::from_std(self.ttl) else {
            return 0;
        };
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, s| now - s.last_seen_at <= ttl);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn update<T>(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut Session) -> T,
    ) -> Result<(T, Session), AdvisorError> {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let session = sessions
            .get_mut(&id)
            .ok_or(AdvisorError::SessionNotFound(id))?;
        session.last_seen_at = now;
        let out = f(session);
        Ok((out, session.clone()))
    }
}
