//! Exclusive pointer capture.
//!
//! A panel that starts a gesture asks the [`PointerArbiter`] for the pointer.
//! While it holds the returned [`CaptureToken`], every other consumer sees the
//! pointer as taken. Dropping the token (normally at pointer-up) releases it.

use std::cell::Cell;
use std::rc::Rc;

/// Shared owner of the pointer. Cloning yields another handle to the same slot.
#[derive(Clone, Default)]
pub struct PointerArbiter {
    holder: Rc<Cell<Option<&'static str>>>,
}

impl PointerArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant the pointer to `owner`, or `None` if someone already holds it.
    pub fn try_capture(&self, owner: &'static str) -> Option<CaptureToken> {
        if self.holder.get().is_some() {
            return None;
        }
        self.holder.set(Some(owner));
        Some(CaptureToken {
            owner,
            slot: Rc::clone(&self.holder),
        })
    }

    /// Who currently holds the pointer.
    #[cfg(test)]
    pub fn holder(&self) -> Option<&'static str> {
        self.holder.get()
    }

    #[cfg(test)]
    pub fn is_captured(&self) -> bool {
        self.holder.get().is_some()
    }
}

/// Proof of pointer ownership. Released on drop.
pub struct CaptureToken {
    owner: &'static str,
    slot: Rc<Cell<Option<&'static str>>>,
}

#[cfg(test)]
impl CaptureToken {
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// Give the pointer back explicitly.
    pub fn release(self) {}
}

impl Drop for CaptureToken {
    fn drop(&mut self) {
        if self.slot.get() == Some(self.owner) {
            self.slot.set(None);
        }
    }
}

impl std::fmt::Debug for CaptureToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureToken")
            .field("owner", &self.owner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_is_exclusive() {
        let arbiter = PointerArbiter::new();
        let token = arbiter.try_capture("gather").unwrap();
        assert_eq!(token.owner(), "gather");
        assert!(arbiter.try_capture("camera").is_none());
        assert_eq!(arbiter.holder(), Some("gather"));
    }

    #[test]
    fn drop_releases() {
        let arbiter = PointerArbiter::new();
        {
            let _token = arbiter.try_capture("gather").unwrap();
            assert!(arbiter.is_captured());
        }
        assert!(!arbiter.is_captured());
        assert!(arbiter.try_capture("camera").is_some());
    }

    #[test]
    fn explicit_release() {
        let arbiter = PointerArbiter::new();
        let token = arbiter.try_capture("gather").unwrap();
        token.release();
        assert_eq!(arbiter.holder(), None);
    }

    #[test]
    fn clones_share_the_slot() {
        let arbiter = PointerArbiter::new();
        let other = arbiter.clone();
        let _token = arbiter.try_capture("gather").unwrap();
        assert_eq!(other.holder(), Some("gather"));
    }
}
