//! Single-owner tokens for resources shared between workers.
//!
//! A [`Token`] is a one-slot channel holding the resource itself. Acquiring the
//! token takes the resource out of the slot, blocking while another worker has
//! it, and the returned [`TokenGuard`] puts it back when dropped. Guards should
//! be dropped as soon as the access is done.
use crossbeam_channel::{bounded, Receiver, Sender};
use std::ops::{Deref, DerefMut};

use crate::error::ContigMapError;

pub struct Token<T> {
    label: &'static str,
    sender: Sender<T>,
    receiver: Receiver<T>,
}

impl<T> Token<T> {
    /// Create a token holding `resource`. The label names the resource in errors.
    pub fn new(label: &'static str, resource: T) -> Self {
        let (sender, receiver) = bounded(1);
        sender
            .send(resource)
            .expect("a fresh token slot is empty and connected");
        Self {
            label,
            sender,
            receiver,
        }
    }

    /// Take the resource, blocking until it is available.
    pub fn acquire(&self) -> Result<TokenGuard<'_, T>, ContigMapError> {
        let resource = self
            .receiver
            .recv()
            .map_err(|_| ContigMapError::TokenLost(self.label))?;
        Ok(TokenGuard {
            resource: Some(resource),
            sender: &self.sender,
        })
    }

    /// Run `f` with exclusive access to the resource.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, ContigMapError> {
        let mut guard = self.acquire()?;
        Ok(f(&mut guard))
    }

    /// Consume the token and return the resource once no guard holds it.
    pub fn into_inner(self) -> Result<T, ContigMapError> {
        self.receiver
            .recv()
            .map_err(|_| ContigMapError::TokenLost(self.label))
    }
}

/// Exclusive access to a token's resource, returned to the token on drop.
pub struct TokenGuard<'a, T> {
    resource: Option<T>,
    sender: &'a Sender<T>,
}

impl<T> Deref for TokenGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.resource {
            Some(resource) => resource,
            None => unreachable!("token guard is only emptied on drop"),
        }
    }
}

impl<T> DerefMut for TokenGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.resource {
            Some(resource) => resource,
            None => unreachable!("token guard is only emptied on drop"),
        }
    }
}

impl<T> Drop for TokenGuard<'_, T> {
    fn drop(&mut self) {
        if let Some(resource) = self.resource.take() {
            // the slot was emptied by this guard's acquire, so it has room
            let _ = self.sender.try_send(resource);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_exclusive_access_across_threads() {
        let token = Token::new("counter", Vec::new());
        thread::scope(|s| {
            for worker in 0..8 {
                let token = &token;
                s.spawn(move || {
                    for i in 0..100 {
                        token.acquire().unwrap().push((worker, i));
                    }
                });
            }
        });
        let values = token.into_inner().unwrap();
        assert_eq!(values.len(), 800);
    }

    #[test]
    fn test_with_returns_value() {
        let token = Token::new("number", 41);
        let next = token
            .with(|n| {
                *n += 1;
                *n
            })
            .unwrap();
        assert_eq!(next, 42);
        assert_eq!(token.into_inner().unwrap(), 42);
    }

    #[test]
    fn test_resource_returned_after_panic() {
        let token = Token::new("number", 1);
        let result = thread::scope(|s| {
            s.spawn(|| {
                let _guard = token.acquire().unwrap();
                panic!("worker failed");
            })
            .join()
        });
        assert!(result.is_err());
        assert_eq!(*token.acquire().unwrap(), 1);
    }
}
