use std::io;

#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};
#[cfg(windows)]
use tokio::signal::windows::{ctrl_c, CtrlC};

/// A Ctrl+C listener registered at construction.
///
/// Once installed, an interrupt arriving at any point (including mid-fetch)
/// is queued rather than killing the process, and `recv` reports it at the
/// next suspension point.
pub struct Interrupt {
    #[cfg(unix)]
    signal: Signal,
    #[cfg(windows)]
    signal: CtrlC,
}

impl Interrupt {
    /// Must be called inside a tokio runtime.
    pub fn install() -> io::Result<Self> {
        #[cfg(unix)]
        let signal = signal(SignalKind::interrupt())?;
        #[cfg(windows)]
        let signal = ctrl_c()?;
        Ok(Self { signal })
    }

    pub async fn recv(mut self) {
        if self.signal.recv().await.is_none() {
            // Signal stream closed: never report an interrupt.
            std::future::pending::<()>().await;
        }
    }
}
