//! Async driver running a [`ScanSession`] against UI commands.
//!
//! The driver keeps the session's single lookup in flight while further
//! commands (typically duplicate decode events from the camera) keep
//! arriving. Those duplicates hit the session's guard and are dropped.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, OptionFuture};
use tokio::sync::mpsc;

use super::event::{CameraPermission, ScanEvent};
use super::session::{LookupTicket, ScanError, ScanNotice, ScanPhase, ScanSession};
use crate::lookup::{LookupError, ProductSource};
use crate::models::Product;

type Resolution = (LookupTicket, Result<Product, LookupError>);

/// Input to the driver, as produced by the scanner screen.
#[derive(Debug, Clone)]
pub enum ScanCommand {
    /// User pressed "scan"
    Start,
    /// Camera decode callback
    Decode(ScanEvent),
    /// User acknowledged the result notice
    Dismiss,
    /// Scanner closed or camera turned off
    Stop,
    GrantPermission,
    DenyPermission,
}

/// Output of the driver, rendered by the scanner screen.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanUpdate {
    /// Decode callbacks are registered
    Armed,
    /// A barcode was accepted and is being looked up
    LookupStarted(String),
    /// The lookup resolved; the notice stays until dismissed
    Finished(ScanNotice),
    /// Camera inactive
    Idle,
    /// A command was refused, e.g. scanning without camera permission
    Rejected(ScanError),
}

pub struct ScanDriver<S> {
    session: ScanSession,
    source: Arc<S>,
}

impl<S> ScanDriver<S>
where
    S: ProductSource + 'static,
{
    pub fn new(session: ScanSession, source: Arc<S>) -> Self {
        Self { session, source }
    }

    /// Processes commands until the command channel closes or the update
    /// receiver is dropped, then hands the session back so callers can read
    /// the scanned items. An in-flight lookup is dropped on exit.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<ScanCommand>,
        updates: mpsc::Sender<ScanUpdate>,
    ) -> ScanSession {
        let mut inflight: OptionFuture<BoxFuture<'static, Resolution>> = None.into();

        loop {
            tokio::select! {
                Some((ticket, outcome)) = &mut inflight => {
                    inflight = None.into();
                    let notice = self.session.complete(&ticket, outcome).cloned();
                    if let Some(notice) = notice {
                        if updates.send(ScanUpdate::Finished(notice)).await.is_err() {
                            break;
                        }
                    }
                }
                command = commands.recv() => {
                    let Some(command) = command else {
                        break;
                    };
                    let pending = self.apply(command, &mut inflight);
                    if !publish(&updates, pending).await {
                        break;
                    }
                }
            }
        }

        if updates.is_closed() {
            tracing::debug!(
                session = %self.session.id(),
                "Update receiver dropped, stopping scan driver"
            );
        }

        self.session
    }

    fn apply(
        &mut self,
        command: ScanCommand,
        inflight: &mut OptionFuture<BoxFuture<'static, Resolution>>,
    ) -> Vec<ScanUpdate> {
        match command {
            ScanCommand::Start => match self.session.start_scanning() {
                Ok(()) => vec![ScanUpdate::Armed],
                Err(e) => vec![ScanUpdate::Rejected(e)],
            },
            ScanCommand::Decode(event) => match self.session.on_decode(&event) {
                Some(ticket) => {
                    let barcode = ticket.barcode().to_string();
                    *inflight = Some(self.lookup(ticket)).into();
                    vec![ScanUpdate::LookupStarted(barcode)]
                }
                None => Vec::new(),
            },
            ScanCommand::Dismiss => {
                if !self.session.dismiss() {
                    return Vec::new();
                }
                if self.session.is_armed() {
                    vec![ScanUpdate::Armed]
                } else {
                    vec![ScanUpdate::Idle]
                }
            }
            ScanCommand::Stop => {
                // Dropping the future cancels the request.
                *inflight = None.into();
                self.session.stop();
                vec![ScanUpdate::Idle]
            }
            ScanCommand::GrantPermission => {
                self.session.set_permission(CameraPermission::Granted);
                Vec::new()
            }
            ScanCommand::DenyPermission => {
                let was_active = self.session.phase() != &ScanPhase::Idle;
                self.session.set_permission(CameraPermission::Denied);
                if was_active {
                    *inflight = None.into();
                    vec![ScanUpdate::Idle]
                } else {
                    Vec::new()
                }
            }
        }
    }

    fn lookup(&self, ticket: LookupTicket) -> BoxFuture<'static, Resolution> {
        let source = Arc::clone(&self.source);
        async move {
            let outcome = source.lookup(ticket.barcode()).await;
            (ticket, outcome)
        }
        .boxed()
    }
}

/// Sends updates in order. Returns false once the receiver is gone.
async fn publish(updates: &mpsc::Sender<ScanUpdate>, pending: Vec<ScanUpdate>) -> bool {
    for update in pending {
        if updates.send(update).await.is_err() {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::NutritionLedger;
    use crate::scan::ScanMode;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// In-memory product source that counts calls and answers after a delay.
    struct FakeSource {
        products: HashMap<String, Product>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn new(delay: Duration) -> Self {
            let mut products = HashMap::new();
            products.insert(
                "0001".to_string(),
                Product::new("Apple")
                    .with_calories(95.0)
                    .with_protein(0.5)
                    .with_carbohydrates(25.0)
                    .with_fat(0.3),
            );
            Self {
                products,
                delay,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ProductSource for FakeSource {
        async fn lookup(&self, barcode: &str) -> Result<Product, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.products
                .get(barcode)
                .cloned()
                .ok_or_else(|| LookupError::NotFound(barcode.to_string()))
        }
    }

    fn spawn_driver(
        source: Arc<FakeSource>,
        mode: ScanMode,
    ) -> (
        mpsc::Sender<ScanCommand>,
        mpsc::Receiver<ScanUpdate>,
        tokio::task::JoinHandle<ScanSession>,
        NutritionLedger,
    ) {
        let ledger = NutritionLedger::new();
        let session = ScanSession::new(ledger.clone(), mode);
        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        let (upd_tx, upd_rx) = mpsc::channel(64);
        let handle = tokio::spawn(ScanDriver::new(session, source).run(cmd_rx, upd_tx));
        (cmd_tx, upd_rx, handle, ledger)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_triggers_single_lookup() {
        let source = Arc::new(FakeSource::new(Duration::from_millis(500)));
        let (tx, mut rx, handle, ledger) = spawn_driver(source.clone(), ScanMode::Single);

        tx.send(ScanCommand::GrantPermission).await.unwrap();
        tx.send(ScanCommand::Start).await.unwrap();
        assert_eq!(rx.recv().await, Some(ScanUpdate::Armed));

        for _ in 0..30 {
            tx.send(ScanCommand::Decode(ScanEvent::new("ean13", "0001")))
                .await
                .unwrap();
        }

        assert_eq!(
            rx.recv().await,
            Some(ScanUpdate::LookupStarted("0001".into()))
        );
        match rx.recv().await {
            Some(ScanUpdate::Finished(ScanNotice::Added(product))) => {
                assert_eq!(product.name, "Apple")
            }
            other => panic!("unexpected update: {:?}", other),
        }

        drop(tx);
        let session = handle.await.unwrap();
        assert_eq!(source.calls(), 1);
        assert_eq!(ledger.snapshot().total_calories, 95.0);
        assert_eq!(session.items().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_without_permission_is_rejected() {
        let source = Arc::new(FakeSource::new(Duration::ZERO));
        let (tx, mut rx, handle, _) = spawn_driver(source.clone(), ScanMode::Single);

        tx.send(ScanCommand::DenyPermission).await.unwrap();
        tx.send(ScanCommand::Start).await.unwrap();
        assert_eq!(
            rx.recv().await,
            Some(ScanUpdate::Rejected(ScanError::PermissionDenied))
        );

        tx.send(ScanCommand::GrantPermission).await.unwrap();
        tx.send(ScanCommand::Start).await.unwrap();
        assert_eq!(rx.recv().await, Some(ScanUpdate::Armed));

        drop(tx);
        handle.await.unwrap();
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_then_dismiss_returns_to_idle() {
        let source = Arc::new(FakeSource::new(Duration::from_millis(10)));
        let (tx, mut rx, handle, ledger) = spawn_driver(source, ScanMode::Single);

        tx.send(ScanCommand::GrantPermission).await.unwrap();
        tx.send(ScanCommand::Start).await.unwrap();
        tx.send(ScanCommand::Decode(ScanEvent::barcode("9999")))
            .await
            .unwrap();

        assert_eq!(rx.recv().await, Some(ScanUpdate::Armed));
        assert_eq!(
            rx.recv().await,
            Some(ScanUpdate::LookupStarted("9999".into()))
        );
        assert_eq!(
            rx.recv().await,
            Some(ScanUpdate::Finished(ScanNotice::NotFound {
                barcode: "9999".into()
            }))
        );

        tx.send(ScanCommand::Dismiss).await.unwrap();
        assert_eq!(rx.recv().await, Some(ScanUpdate::Idle));

        drop(tx);
        let session = handle.await.unwrap();
        assert_eq!(session.phase(), &ScanPhase::Idle);
        assert_eq!(ledger.snapshot().total_calories, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_inflight_lookup() {
        let source = Arc::new(FakeSource::new(Duration::from_secs(5)));
        let (tx, mut rx, handle, ledger) = spawn_driver(source.clone(), ScanMode::Single);

        tx.send(ScanCommand::GrantPermission).await.unwrap();
        tx.send(ScanCommand::Start).await.unwrap();
        tx.send(ScanCommand::Decode(ScanEvent::barcode("0001")))
            .await
            .unwrap();
        assert_eq!(rx.recv().await, Some(ScanUpdate::Armed));
        assert_eq!(
            rx.recv().await,
            Some(ScanUpdate::LookupStarted("0001".into()))
        );

        tx.send(ScanCommand::Stop).await.unwrap();
        assert_eq!(rx.recv().await, Some(ScanUpdate::Idle));

        tokio::time::sleep(Duration::from_secs(10)).await;
        drop(tx);
        let session = handle.await.unwrap();

        assert_eq!(rx.recv().await, None);
        assert_eq!(ledger.snapshot().total_calories, 0.0);
        assert!(session.items().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_continuous_mode_accumulates() {
        let source = Arc::new(FakeSource::new(Duration::from_millis(10)));
        let (tx, mut rx, handle, ledger) = spawn_driver(source.clone(), ScanMode::Continuous);

        tx.send(ScanCommand::GrantPermission).await.unwrap();
        tx.send(ScanCommand::Start).await.unwrap();
        assert_eq!(rx.recv().await, Some(ScanUpdate::Armed));

        for _ in 0..2 {
            tx.send(ScanCommand::Decode(ScanEvent::barcode("0001")))
                .await
                .unwrap();
            assert!(matches!(rx.recv().await, Some(ScanUpdate::LookupStarted(_))));
            assert!(matches!(
                rx.recv().await,
                Some(ScanUpdate::Finished(ScanNotice::Added(_)))
            ));
            tx.send(ScanCommand::Dismiss).await.unwrap();
            assert_eq!(rx.recv().await, Some(ScanUpdate::Armed));
        }

        drop(tx);
        let session = handle.await.unwrap();
        assert_eq!(source.calls(), 2);
        assert_eq!(session.items().len(), 2);
        assert_eq!(ledger.snapshot().total_calories, 190.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_exits_when_updates_dropped() {
        let source = Arc::new(FakeSource::new(Duration::from_millis(10)));
        let (tx, rx, handle, ledger) = spawn_driver(source.clone(), ScanMode::Continuous);

        drop(rx);
        tx.send(ScanCommand::GrantPermission).await.unwrap();
        tx.send(ScanCommand::Start).await.unwrap();
        let _ = tx.send(ScanCommand::Decode(ScanEvent::barcode("0001"))).await;

        // The command sender is still alive; only the dropped receiver ends the loop.
        let session = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("driver kept running")
            .unwrap();

        assert_eq!(source.calls(), 0);
        assert!(session.items().is_empty());
        assert_eq!(ledger.snapshot().total_calories, 0.0);
        drop(tx);
    }
}
