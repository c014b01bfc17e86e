//! FILENAME: app/src/requests.rs
// PURPOSE: Request supersession for one fetch channel.
// CONTEXT: Starting a request cancels the one before it on the same channel.
// A result that arrives after a newer request has started is reported as
// Superseded and must never be written into visible state.

use crate::log_debug;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

/// What a supervised request produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The request was still the newest on its channel.
    Current(T),
    /// A newer request started first; the result was discarded.
    Superseded,
}

impl<T> Outcome<T> {
    pub fn is_superseded(&self) -> bool {
        matches!(self, Outcome::Superseded)
    }

    pub fn current(self) -> Option<T> {
        match self {
            Outcome::Current(value) => Some(value),
            Outcome::Superseded => None,
        }
    }
}

/// Handle for one in-flight request.
#[derive(Debug, Clone)]
pub struct RequestTicket {
    generation: u64,
    token: CancellationToken,
}

impl RequestTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

#[derive(Debug)]
struct Channel {
    generation: u64,
    token: CancellationToken,
}

#[derive(Debug)]
pub struct RequestSupervisor {
    name: &'static str,
    channel: Mutex<Channel>,
}

impl RequestSupervisor {
    pub fn new(name: &'static str) -> Self {
        RequestSupervisor {
            name,
            channel: Mutex::new(Channel {
                generation: 0,
                token: CancellationToken::new(),
            }),
        }
    }

    fn channel(&self) -> MutexGuard<'_, Channel> {
        match self.channel.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn generation(&self) -> u64 {
        self.channel().generation
    }

    /// Starts a new generation, cancelling the previous one.
    pub fn begin(&self) -> RequestTicket {
        let mut channel = self.channel();
        channel.token.cancel();
        channel.generation += 1;
        channel.token = CancellationToken::new();
        log_debug!("FETCH", "{} generation {} started", self.name, channel.generation);
        RequestTicket {
            generation: channel.generation,
            token: channel.token.clone(),
        }
    }

    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.channel().generation == ticket.generation
    }

    /// Wraps `result` according to whether `ticket` is still current.
    pub fn finish<T>(&self, ticket: &RequestTicket, result: T) -> Outcome<T> {
        if self.is_current(ticket) {
            Outcome::Current(result)
        } else {
            log_debug!("FETCH", "{} generation {} superseded", self.name, ticket.generation);
            Outcome::Superseded
        }
    }

    /// Runs `request` as the newest generation on this channel.
    ///
    /// If another request starts before this one completes, `request` is
    /// dropped at its next suspension point and Superseded is returned.
    pub async fn run<T, F>(&self, request: F) -> Outcome<T>
    where
        F: Future<Output = T>,
    {
        let ticket = self.begin();
        self.run_ticket(&ticket, request).await
    }

    /// Runs `request` under an already issued `ticket`. Callers that write
    /// the result into shared state keep the ticket to re-check
    /// [`is_current`](Self::is_current) while holding their own lock.
    pub async fn run_ticket<T, F>(&self, ticket: &RequestTicket, request: F) -> Outcome<T>
    where
        F: Future<Output = T>,
    {
        tokio::select! {
            _ = ticket.token.cancelled() => {
                log_debug!("FETCH", "{} generation {} cancelled", self.name, ticket.generation);
                Outcome::Superseded
            }
            result = request => self.finish(ticket, result),
        }
    }

    /// Cancels whatever is in flight without starting anything new.
    pub fn cancel(&self) {
        let mut channel = self.channel();
        channel.token.cancel();
        channel.generation += 1;
        channel.token = CancellationToken::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_older_ticket_is_superseded() {
        let supervisor = RequestSupervisor::new("rows");
        let a = supervisor.begin();
        let b = supervisor.begin();
        assert!(a.token().is_cancelled());
        assert!(!b.token().is_cancelled());
        assert_eq!(supervisor.finish(&a, "A"), Outcome::Superseded);
        assert_eq!(supervisor.finish(&b, "B"), Outcome::Current("B"));
    }

    #[test]
    fn test_cancel_supersedes_in_flight() {
        let supervisor = RequestSupervisor::new("views");
        let a = supervisor.begin();
        supervisor.cancel();
        assert!(supervisor.finish(&a, ()).is_superseded());
    }

    #[tokio::test]
    async fn test_run_discards_slow_request() {
        let supervisor = RequestSupervisor::new("map-data");
        let (slow, fast) = tokio::join!(
            supervisor.run(std::future::pending::<&str>()),
            async {
                tokio::task::yield_now().await;
                supervisor.run(async { "B" }).await
            }
        );
        assert_eq!(slow, Outcome::Superseded);
        assert_eq!(fast, Outcome::Current("B"));
    }
}
