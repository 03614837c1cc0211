//! Processing Orchestrator
//!
//! Runs one processing cycle: build the context, invoke every registered
//! processor in a fixed order, aggregate the non-empty results, hand the
//! aggregate to the commit sink and fan out notifications. At most one
//! cycle runs at any instant; overlapping triggers collapse into a skip.

use crate::engine::entry::now_millis;
use crate::engine::error::EngineError;
use crate::engine::pricing::{LtpStore, PriceHistorySink};
use crate::engine::processing::{
    CommitSink, GttOrderProcessor, MarketOrderProcessor, NotificationSink, OrderProcessor,
    ProcessingContext, ProcessingResult,
};
use crate::engine::routing::BookRouter;
use crate::metrics;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Outcome of one cycle trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Another cycle was already running; this trigger collapsed into it.
    Skipped,
    /// The cycle ran but produced no trades and no order updates.
    Idle,
    /// The cycle produced results and handed them to the commit sink.
    Committed { trades: usize, orders: usize },
}

pub struct ProcessingOrchestrator {
    processors: Vec<Box<dyn OrderProcessor>>,
    router: Arc<BookRouter>,
    ltp: Arc<LtpStore>,
    history: Arc<dyn PriceHistorySink>,
    commit: Arc<dyn CommitSink>,
    notifications: Arc<dyn NotificationSink>,
    /// Single-slot execution guard: holding it is the "a cycle is running"
    /// state, `try_lock` failure is the collapse path.
    cycle_gate: Mutex<()>,
}

impl ProcessingOrchestrator {
    /// Orchestrator with the standard processor set, market matching first.
    pub fn new(
        router: Arc<BookRouter>,
        ltp: Arc<LtpStore>,
        history: Arc<dyn PriceHistorySink>,
        commit: Arc<dyn CommitSink>,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        Self::with_processors(
            vec![
                Box::new(MarketOrderProcessor),
                Box::new(GttOrderProcessor),
            ],
            router,
            ltp,
            history,
            commit,
            notifications,
        )
    }

    pub fn with_processors(
        processors: Vec<Box<dyn OrderProcessor>>,
        router: Arc<BookRouter>,
        ltp: Arc<LtpStore>,
        history: Arc<dyn PriceHistorySink>,
        commit: Arc<dyn CommitSink>,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            processors,
            router,
            ltp,
            history,
            commit,
            notifications,
            cycle_gate: Mutex::new(()),
        }
    }

    pub fn run_cycle(&self) -> CycleOutcome {
        let Ok(_gate) = self.cycle_gate.try_lock() else {
            log::debug!("processing cycle already in progress; trigger collapsed");
            return CycleOutcome::Skipped;
        };
        let started = Instant::now();
        log::info!("starting order processing cycle");

        let context = ProcessingContext::new(
            now_millis(),
            self.ltp.snapshot(),
            self.router.clone(),
            self.ltp.clone(),
            self.history.clone(),
        );

        log::debug!("executing {} registered order processor(s)", self.processors.len());
        let mut aggregate: Vec<ProcessingResult> = Vec::new();
        for processor in &self.processors {
            match processor.process(&context) {
                Ok(result) => {
                    if result.is_empty() {
                        continue;
                    }
                    log::debug!(
                        "processor {} produced {} trade(s) and {} order update(s)",
                        processor.name(),
                        result.trades().len(),
                        result.processed_orders().len()
                    );
                    aggregate.push(result);
                }
                Err(e) => {
                    // Isolated: the failing processor's result is discarded,
                    // the remaining processors still run.
                    let failure = EngineError::ProcessorFailure {
                        processor: processor.name(),
                        reason: e.to_string(),
                    };
                    metrics::PROCESSOR_FAILURE_VEC
                        .with_label_values(&[processor.name()])
                        .inc();
                    log::error!("{}", failure);
                }
            }
        }

        if aggregate.is_empty() {
            log::info!("no trades or order updates were generated in this cycle");
            metrics::CYCLE_HISTOGRAM.observe(started.elapsed().as_secs_f64());
            return CycleOutcome::Idle;
        }

        let trades: usize = aggregate.iter().map(|r| r.trades().len()).sum();
        let orders: usize = aggregate.iter().map(|r| r.processed_orders().len()).sum();

        if let Err(e) = self.commit.commit(&aggregate) {
            // In-memory books are already mutated and are not rolled back;
            // the commit sink's idempotency is the recovery path.
            log::error!(
                "CRITICAL: a failure occurred during the commit phase: {:?}",
                EngineError::Commit(e)
            );
        }

        for result in &aggregate {
            for order in result.processed_orders() {
                self.notifications.order_updated(order);
            }
        }

        metrics::TRADE_COUNTER.inc_by(trades as f64);
        metrics::CYCLE_HISTOGRAM.observe(started.elapsed().as_secs_f64());
        log::info!(
            "finished order processing cycle: {} trade(s), {} order update(s)",
            trades,
            orders
        );
        CycleOutcome::Committed { trades, orders }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::entry::{Order, OrderSide, OrderStatus, Trade};
    use crate::engine::pricing::PriceSample;
    use rust_decimal_macros::dec;
    use std::sync::mpsc;
    use std::thread;
    use uuid::Uuid;

    struct NullHistory;

    impl PriceHistorySink for NullHistory {
        fn record(&self, _sample: PriceSample) {}
    }

    #[derive(Default)]
    struct RecordingCommit {
        committed: Mutex<Vec<(usize, usize)>>,
        fail: bool,
    }

    impl CommitSink for RecordingCommit {
        fn commit(&self, results: &[ProcessingResult]) -> anyhow::Result<()> {
            let trades = results.iter().map(|r| r.trades().len()).sum();
            let orders = results.iter().map(|r| r.processed_orders().len()).sum();
            self.committed.lock().unwrap().push((trades, orders));
            if self.fail {
                anyhow::bail!("storage unavailable");
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNotifications {
        orders: Mutex<Vec<Uuid>>,
    }

    impl NotificationSink for RecordingNotifications {
        fn order_updated(&self, order: &Order) {
            self.orders.lock().unwrap().push(order.id);
        }
    }

    struct StubProcessor {
        name: &'static str,
        trades: usize,
        orders: usize,
    }

    impl OrderProcessor for StubProcessor {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process(&self, _ctx: &ProcessingContext) -> Result<ProcessingResult, EngineError> {
            let mut result = ProcessingResult::new();
            for _ in 0..self.trades {
                result.add_trade(Trade::new(
                    Uuid::new_v4(),
                    "AAPL".into(),
                    Uuid::new_v4(),
                    Uuid::new_v4(),
                    dec!(100),
                    1,
                    0,
                ));
            }
            for _ in 0..self.orders {
                let mut order = Order::market(
                    Uuid::new_v4(),
                    Uuid::new_v4(),
                    "AAPL".into(),
                    OrderSide::Buy,
                    0,
                    Some(dec!(100)),
                );
                order.status = OrderStatus::Filled;
                result.add_processed_order(order);
            }
            Ok(result)
        }
    }

    struct FailingProcessor;

    impl OrderProcessor for FailingProcessor {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn process(&self, _ctx: &ProcessingContext) -> Result<ProcessingResult, EngineError> {
            Err(EngineError::ProcessorFailure {
                processor: "failing",
                reason: "boom".into(),
            })
        }
    }

    fn orchestrator_with(
        processors: Vec<Box<dyn OrderProcessor>>,
        commit: Arc<RecordingCommit>,
        notifications: Arc<RecordingNotifications>,
    ) -> ProcessingOrchestrator {
        ProcessingOrchestrator::with_processors(
            processors,
            Arc::new(BookRouter::new()),
            Arc::new(LtpStore::new()),
            Arc::new(NullHistory),
            commit,
            notifications,
        )
    }

    #[test]
    fn empty_results_are_discarded_and_nothing_is_committed() {
        let commit = Arc::new(RecordingCommit::default());
        let notifications = Arc::new(RecordingNotifications::default());
        let orchestrator = orchestrator_with(
            vec![Box::new(StubProcessor { name: "noop", trades: 0, orders: 0 })],
            commit.clone(),
            notifications.clone(),
        );

        assert_eq!(orchestrator.run_cycle(), CycleOutcome::Idle);
        assert!(commit.committed.lock().unwrap().is_empty());
        assert!(notifications.orders.lock().unwrap().is_empty());
    }

    #[test]
    fn a_failing_processor_does_not_stop_the_others() {
        let commit = Arc::new(RecordingCommit::default());
        let notifications = Arc::new(RecordingNotifications::default());
        let orchestrator = orchestrator_with(
            vec![
                Box::new(FailingProcessor),
                Box::new(StubProcessor { name: "working", trades: 2, orders: 1 }),
            ],
            commit.clone(),
            notifications.clone(),
        );

        assert_eq!(
            orchestrator.run_cycle(),
            CycleOutcome::Committed { trades: 2, orders: 1 }
        );
        assert_eq!(*commit.committed.lock().unwrap(), vec![(2, 1)]);
    }

    #[test]
    fn commit_failure_still_finishes_the_cycle_and_notifies() {
        let commit = Arc::new(RecordingCommit { fail: true, ..Default::default() });
        let notifications = Arc::new(RecordingNotifications::default());
        let orchestrator = orchestrator_with(
            vec![Box::new(StubProcessor { name: "working", trades: 1, orders: 3 })],
            commit.clone(),
            notifications.clone(),
        );

        assert_eq!(
            orchestrator.run_cycle(),
            CycleOutcome::Committed { trades: 1, orders: 3 }
        );
        assert_eq!(notifications.orders.lock().unwrap().len(), 3);
    }

    #[test]
    fn overlapping_triggers_collapse_into_one_cycle() {
        struct BlockingCommit {
            entered: Mutex<mpsc::Sender<()>>,
            release: Mutex<mpsc::Receiver<()>>,
        }

        impl CommitSink for BlockingCommit {
            fn commit(&self, _results: &[ProcessingResult]) -> anyhow::Result<()> {
                self.entered.lock().unwrap().send(()).unwrap();
                self.release.lock().unwrap().recv().unwrap();
                Ok(())
            }
        }

        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let orchestrator = Arc::new(ProcessingOrchestrator::with_processors(
            vec![Box::new(StubProcessor { name: "working", trades: 1, orders: 0 })],
            Arc::new(BookRouter::new()),
            Arc::new(LtpStore::new()),
            Arc::new(NullHistory),
            Arc::new(BlockingCommit {
                entered: Mutex::new(entered_tx),
                release: Mutex::new(release_rx),
            }),
            Arc::new(RecordingNotifications::default()),
        ));

        let background = {
            let orchestrator = orchestrator.clone();
            thread::spawn(move || orchestrator.run_cycle())
        };
        // Wait until the first cycle is parked inside the commit step.
        entered_rx.recv().unwrap();

        assert_eq!(orchestrator.run_cycle(), CycleOutcome::Skipped);

        release_tx.send(()).unwrap();
        assert_eq!(
            background.join().unwrap(),
            CycleOutcome::Committed { trades: 1, orders: 0 }
        );
    }

    #[test]
    fn matched_books_flow_through_a_full_cycle() {
        let router = Arc::new(BookRouter::new());
        router
            .add_order(Order::market(
                Uuid::new_v4(),
                Uuid::new_v4(),
                "AAPL".into(),
                OrderSide::Buy,
                10,
                Some(dec!(101)),
            ))
            .unwrap();
        router
            .add_order(Order::market(
                Uuid::new_v4(),
                Uuid::new_v4(),
                "AAPL".into(),
                OrderSide::Sell,
                10,
                Some(dec!(100)),
            ))
            .unwrap();

        let commit = Arc::new(RecordingCommit::default());
        let notifications = Arc::new(RecordingNotifications::default());
        let orchestrator = ProcessingOrchestrator::new(
            router.clone(),
            Arc::new(LtpStore::new()),
            Arc::new(NullHistory),
            commit.clone(),
            notifications.clone(),
        );

        assert_eq!(
            orchestrator.run_cycle(),
            CycleOutcome::Committed { trades: 1, orders: 2 }
        );
        assert_eq!(*commit.committed.lock().unwrap(), vec![(1, 2)]);
        assert_eq!(notifications.orders.lock().unwrap().len(), 2);
        assert!(router
            .market_books()
            .buy_book("AAPL")
            .unwrap()
            .lock()
            .unwrap()
            .is_empty());
    }
}
