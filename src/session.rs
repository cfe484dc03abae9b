mod errors;
mod history;

pub use errors::SessionError;
pub use history::History;

use std::{
    error::Error,
    result,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use dashmap::DashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    config::SessionConfig,
    saml::{SamlMessage, message::encode_for_parameter},
};

pub(crate) const DEFAULT_HISTORY_LIMIT: usize = 50;
pub(crate) const DEFAULT_MAX_SESSIONS: usize = 100;

type Result<T> = result::Result<T, SessionError>;

#[derive(Debug, Clone)]
struct Session {
    message: SamlMessage,
    history: History,
}

/// Editing sessions over decoded SAML messages.
///
/// Each session keeps the message it was opened with and a bounded history
/// of the documents derived from it. Transformations only ever see a copy of
/// the current document.
#[derive(Debug, Clone)]
pub struct SessionManager {
    sessions: Arc<DashMap<Uuid, Session>>,
    // Reserved session slots, taken before insertion
    open_count: Arc<AtomicUsize>,
    history_limit: usize,
    max_sessions: usize,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionManager {
    /// Creates a manager keeping 50 snapshots per session and at most 100
    /// open sessions.
    ///
    /// # Examples
    ///
    /// ```
    /// # use saml_raider::session::SessionManager;
    /// let manager = SessionManager::new()
    ///     .with_history_limit(20)
    ///     .with_max_sessions(10);
    /// assert_eq!(manager.len(), 0);
    /// ```
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            open_count: Arc::new(AtomicUsize::new(0)),
            history_limit: DEFAULT_HISTORY_LIMIT,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new()
            .with_history_limit(config.history_limit)
            .with_max_sessions(config.max_sessions)
    }

    /// Configures how many snapshots each session keeps.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Configures the maximum number of sessions open at the same time.
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions;
        self
    }

    /// Opens a session on the decoded document of `message`.
    pub fn open(&self, message: SamlMessage) -> Result<Uuid> {
        self.open_count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |open| {
                (open < self.max_sessions).then_some(open + 1)
            })
            .map_err(|_| SessionError::MaxSessions)?;
        let id = Uuid::new_v4();
        let history = History::new(message.decoded.clone(), self.history_limit);
        self.sessions.insert(id, Session { message, history });
        info!("Opened editing session {id}");
        Ok(id)
    }

    /// The current document of a session.
    pub fn current(&self, id: Uuid) -> Result<String> {
        self.with_session(id, |session| session.history.current().to_string())
    }

    /// The message a session was opened with.
    pub fn message(&self, id: Uuid) -> Result<SamlMessage> {
        self.with_session(id, |session| session.message.clone())
    }

    /// The current document encoded with the session's binding.
    pub fn encoded(&self, id: Uuid) -> Result<String> {
        self.with_session(id, |session| {
            encode_for_parameter(session.history.current(), session.message.binding)
        })
    }

    /// Runs `transform` on the current document and records the result.
    ///
    /// A failing transform leaves the history untouched. No lock is held
    /// while `transform` runs, so it may call back into the manager.
    pub fn apply<F, E>(&self, id: Uuid, transform: F) -> Result<String>
    where
        F: FnOnce(&str) -> result::Result<String, E>,
        E: Error + Send + Sync + 'static,
    {
        let current = self.current(id)?;
        let document =
            transform(&current).map_err(|e| SessionError::Transform(Box::new(e)))?;

        let mut session = self.sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        if session.history.push(document.clone()) {
            debug!("Session {id} now holds {} snapshot(s)", session.history.len());
        }
        Ok(document)
    }

    /// Replaces the current document with a manual edit.
    ///
    /// Returns false when `xml` equals the current document.
    pub fn set_document(&self, id: Uuid, xml: String) -> Result<bool> {
        let mut session = self.sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        Ok(session.history.push(xml))
    }

    /// Steps back one snapshot. `None` when there is nothing to undo.
    pub fn undo(&self, id: Uuid) -> Result<Option<String>> {
        let mut session = self.sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        Ok(session.history.undo().map(str::to_string))
    }

    /// Steps forward one snapshot. `None` when there is nothing to redo.
    pub fn redo(&self, id: Uuid) -> Result<Option<String>> {
        let mut session = self.sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        Ok(session.history.redo().map(str::to_string))
    }

    pub fn close(&self, id: Uuid) -> Result<()> {
        self.sessions
            .remove(&id)
            .ok_or(SessionError::NotFound(id))?;
        self.open_count.fetch_sub(1, Ordering::AcqRel);
        info!("Closed editing session {id}");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn with_session<T>(&self, id: Uuid, read: impl FnOnce(&Session) -> T) -> Result<T> {
        self.sessions
            .get(&id)
            .map(|session| read(session.value()))
            .ok_or(SessionError::NotFound(id))
    }
}
