//! Session lifecycle for a CCNET device
//!
//! A session represents one logical connection to a device and tracks:
//! - Lifecycle state (closed, open, polling)
//! - Number of frames written since the session was opened

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No transport held
    Closed,

    /// Transport acquired and device reset
    Open,

    /// Poll loop running
    Polling,
}

/// Session manager
///
/// Guards the lifecycle transitions. Thread-safe and can be cloned cheaply
/// (Arc internally), so the poll loop and the owning device share one state.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    /// Frames written to the transport since open
    frames_sent: AtomicU64,

    /// Current session state
    state: parking_lot::RwLock<SessionState>,
}

impl Session {
    /// Create a new closed session
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SessionInner {
                frames_sent: AtomicU64::new(0),
                state: parking_lot::RwLock::new(SessionState::Closed),
            }),
        }
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        *self.inner.state.read()
    }

    /// Check if a transport is held
    pub fn is_open(&self) -> bool {
        !matches!(self.state(), SessionState::Closed)
    }

    /// Check if the poll loop is running
    pub fn is_polling(&self) -> bool {
        matches!(self.state(), SessionState::Polling)
    }

    /// `Closed` -> `Open`
    pub fn open(&self) -> Result<()> {
        let mut state = self.inner.state.write();

        if *state != SessionState::Closed {
            return Err(Error::AlreadyOpen);
        }

        self.inner.frames_sent.store(0, Ordering::Release);
        *state = SessionState::Open;

        Ok(())
    }

    /// `Open` -> `Polling`
    pub fn start_polling(&self) -> Result<()> {
        let mut state = self.inner.state.write();

        match *state {
            SessionState::Open => {
                *state = SessionState::Polling;
                Ok(())
            }
            SessionState::Closed => Err(Error::NotOpen),
            SessionState::Polling => Err(Error::AlreadyPolling),
        }
    }

    /// `Polling` -> `Open`
    ///
    /// Returns `false` without touching the state when not polling.
    pub fn stop_polling(&self) -> bool {
        let mut state = self.inner.state.write();

        if *state != SessionState::Polling {
            return false;
        }

        *state = SessionState::Open;
        true
    }

    /// `Open`/`Polling` -> `Closed`
    pub fn close(&self) -> Result<()> {
        let mut state = self.inner.state.write();

        if *state == SessionState::Closed {
            return Err(Error::NotOpen);
        }

        *state = SessionState::Closed;
        Ok(())
    }

    /// Count a frame written to the transport
    pub fn record_frame(&self) {
        self.inner.frames_sent.fetch_add(1, Ordering::AcqRel);
    }

    /// Frames written since the session was opened
    pub fn frames_sent(&self) -> u64 {
        self.inner.frames_sent.load(Ordering::Acquire)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_new() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::Closed);
        assert!(!session.is_open());
        assert!(!session.is_polling());
        assert_eq!(session.frames_sent(), 0);
    }

    #[test]
    fn test_session_open() {
        let session = Session::new();
        session.open().unwrap();

        assert_eq!(session.state(), SessionState::Open);
        assert!(session.is_open());
        assert!(!session.is_polling());
    }

    #[test]
    fn test_session_polling() {
        let session = Session::new();
        session.open().unwrap();
        session.start_polling().unwrap();

        assert_eq!(session.state(), SessionState::Polling);
        assert!(session.is_polling());

        assert!(session.stop_polling());
        assert_eq!(session.state(), SessionState::Open);
    }

    #[test]
    fn test_stop_polling_twice() {
        let session = Session::new();
        session.open().unwrap();
        session.start_polling().unwrap();

        assert!(session.stop_polling());
        assert!(!session.stop_polling());
        assert_eq!(session.state(), SessionState::Open);
    }

    #[test]
    fn test_session_close() {
        let session = Session::new();
        session.open().unwrap();
        session.start_polling().unwrap();

        session.close().unwrap();

        assert_eq!(session.state(), SessionState::Closed);
    }

    #[test]
    fn test_invalid_state_transitions() {
        let session = Session::new();

        // Cannot poll or close without opening
        assert!(matches!(session.start_polling(), Err(Error::NotOpen)));
        assert!(matches!(session.close(), Err(Error::NotOpen)));
        assert!(!session.stop_polling());
        assert_eq!(session.state(), SessionState::Closed);

        // Cannot open twice
        session.open().unwrap();
        assert!(matches!(session.open(), Err(Error::AlreadyOpen)));

        // Cannot start polling twice
        session.start_polling().unwrap();
        assert!(matches!(session.start_polling(), Err(Error::AlreadyPolling)));
        assert!(matches!(session.open(), Err(Error::AlreadyOpen)));
    }

    #[test]
    fn test_frame_counter_resets_on_open() {
        let session = Session::new();
        session.open().unwrap();
        session.record_frame();
        session.record_frame();
        assert_eq!(session.frames_sent(), 2);

        session.close().unwrap();
        session.open().unwrap();
        assert_eq!(session.frames_sent(), 0);
    }

    #[test]
    fn test_session_clone() {
        let session1 = Session::new();
        session1.open().unwrap();

        let session2 = session1.clone();

        // Both share same state
        session1.start_polling().unwrap();
        assert!(session2.is_polling());
    }
}
