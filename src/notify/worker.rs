use std::sync::mpsc::{SyncSender, TrySendError, sync_channel};
use std::thread;

use super::{Notification, Notifier};

/// Hands notifications to a worker thread over a bounded channel, keeping
/// delivery latency out of the request path. A full queue drops the
/// notification and logs it: dispatch is best-effort by contract, and
/// retry policy belongs to the delivery collaborator.
pub struct ChannelNotifier {
    tx: SyncSender<Notification>,
}

impl ChannelNotifier {
    pub fn spawn<D>(capacity: usize, deliver: D) -> Self
    where
        D: Fn(Notification) -> Result<(), String> + Send + 'static,
    {
        let (tx, rx) = sync_channel::<Notification>(capacity);
        thread::Builder::new()
            .name("notifier".into())
            .spawn(move || {
                for notification in rx {
                    let kind = notification.kind.as_str();
                    if let Err(reason) = deliver(notification) {
                        log::error!("Notification delivery failed ({kind}): {reason}");
                    }
                }
            })
            .expect("Failed to spawn notifier worker");
        Self { tx }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        match self.tx.try_send(notification) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                log::warn!(
                    "Notification queue full, dropping {}",
                    dropped.kind.as_str()
                );
            }
            Err(TrySendError::Disconnected(dropped)) => {
                log::error!(
                    "Notifier worker gone, dropping {}",
                    dropped.kind.as_str()
                );
            }
        }
    }
}
