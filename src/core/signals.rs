//! # OS signal handling for the signal bridge.
//!
//! [`Signal`] names the termination signals an application can react to;
//! [`SignalListener`] registers them and resolves when the first one arrives.
//!
//! ## Signals
//! **Unix platforms:** every [`Signal`] maps to a tokio `SignalKind`.
//!
//! **Other platforms:** only [`Signal::Interrupt`] is supported (via
//! [`tokio::signal::ctrl_c`]); other entries are ignored.
//!
//! Listeners are created per run. Once tokio has installed a handler for a signal it
//! stays installed for the process lifetime; the default action (terminate) no longer
//! applies after the first registration.

use std::fmt;

/// Termination-style OS signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// `SIGINT` (Ctrl-C in a terminal).
    Interrupt,
    /// `SIGTERM` (default kill signal, used by systemd/Kubernetes).
    Terminate,
    /// `SIGQUIT`.
    Quit,
    /// `SIGHUP`.
    Hangup,
    /// `SIGUSR1`.
    User1,
    /// `SIGUSR2`.
    User2,
}

impl Signal {
    /// Conventional signal name (`SIGTERM`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Interrupt => "SIGINT",
            Signal::Terminate => "SIGTERM",
            Signal::Quit => "SIGQUIT",
            Signal::Hangup => "SIGHUP",
            Signal::User1 => "SIGUSR1",
            Signal::User2 => "SIGUSR2",
        }
    }

    /// Default shutdown set: terminate, quit, interrupt.
    pub fn defaults() -> Vec<Signal> {
        vec![Signal::Terminate, Signal::Quit, Signal::Interrupt]
    }

    #[cfg(unix)]
    fn kind(self) -> tokio::signal::unix::SignalKind {
        use tokio::signal::unix::SignalKind;

        match self {
            Signal::Interrupt => SignalKind::interrupt(),
            Signal::Terminate => SignalKind::terminate(),
            Signal::Quit => SignalKind::quit(),
            Signal::Hangup => SignalKind::hangup(),
            Signal::User1 => SignalKind::user_defined1(),
            Signal::User2 => SignalKind::user_defined2(),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registered listeners for a set of signals.
#[cfg(unix)]
pub(crate) struct SignalListener {
    streams: Vec<(Signal, tokio::signal::unix::Signal)>,
}

#[cfg(unix)]
impl SignalListener {
    /// Registers a listener for every distinct signal in `set`.
    ///
    /// Returns `Err` if the OS refuses a registration.
    pub(crate) fn register(set: &[Signal]) -> std::io::Result<Self> {
        use tokio::signal::unix::signal;

        let mut streams: Vec<(Signal, tokio::signal::unix::Signal)> = Vec::with_capacity(set.len());
        for &sig in set {
            if streams.iter().any(|(s, _)| *s == sig) {
                continue;
            }
            streams.push((sig, signal(sig.kind())?));
        }
        Ok(Self { streams })
    }

    /// Names of the registered signals.
    pub(crate) fn armed(&self) -> Vec<Signal> {
        self.streams.iter().map(|(s, _)| *s).collect()
    }

    /// Waits for the first delivered signal.
    ///
    /// Never completes when no signal is registered.
    pub(crate) async fn recv(&mut self) -> Option<Signal> {
        if self.streams.is_empty() {
            return std::future::pending().await;
        }
        let waits = self.streams.iter_mut().map(|(sig, stream)| {
            let sig = *sig;
            Box::pin(async move { stream.recv().await.map(|()| sig) })
        });
        let (delivered, _, _) = futures::future::select_all(waits).await;
        delivered
    }
}

/// Registered listeners for a set of signals.
#[cfg(not(unix))]
pub(crate) struct SignalListener {
    ctrl_c: bool,
}

#[cfg(not(unix))]
impl SignalListener {
    pub(crate) fn register(set: &[Signal]) -> std::io::Result<Self> {
        Ok(Self {
            ctrl_c: set.contains(&Signal::Interrupt),
        })
    }

    pub(crate) fn armed(&self) -> Vec<Signal> {
        if self.ctrl_c { vec![Signal::Interrupt] } else { Vec::new() }
    }

    pub(crate) async fn recv(&mut self) -> Option<Signal> {
        if !self.ctrl_c {
            return std::future::pending().await;
        }
        tokio::signal::ctrl_c().await.ok().map(|()| Signal::Interrupt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_terminate_quit_interrupt() {
        assert_eq!(
            Signal::defaults(),
            vec![Signal::Terminate, Signal::Quit, Signal::Interrupt]
        );
        assert_eq!(Signal::Terminate.to_string(), "SIGTERM");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn register_deduplicates() {
        let listener =
            SignalListener::register(&[Signal::User2, Signal::User2, Signal::Hangup]).unwrap();
        assert_eq!(listener.armed(), vec![Signal::User2, Signal::Hangup]);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_set_never_fires() {
        let mut listener = SignalListener::register(&[]).unwrap();
        let res = tokio::time::timeout(std::time::Duration::from_secs(1), listener.recv()).await;
        assert!(res.is_err());
    }
}
