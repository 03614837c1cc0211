use crate::config;
use crate::engine::entry::{Order, OrderSide, OrderStatus};
use crate::engine::exchange::Exchange;
use crate::engine::pricing::{PriceHistorySink, PriceSample};
use crate::engine::processing::{CommitSink, NotificationSink, ProcessingResult};
use crate::metrics;

use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response};
use once_cell::sync::OnceCell;
use prometheus::{Encoder, TextEncoder};
use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

static INSTANCE: OnceCell<Mutex<Server>> = OnceCell::new();
pub fn instance() -> &'static Mutex<Server> {
    INSTANCE.get_or_init(|| Mutex::new(Server::builder()))
}

pub struct Server {
    exchange: Arc<Exchange>,
}

impl Server {
    fn builder() -> Self {
        let model = config::instance().lock().unwrap().price_model();
        let exchange = Arc::new(Exchange::new(
            model,
            Arc::new(LogPriceHistorySink),
            Arc::new(LogCommitSink),
            Arc::new(LogNotificationSink),
        ));
        Server { exchange }
    }

    pub async fn start(&mut self) {
        self.start_metrics_server().await;
        self.start_cycle_worker();
        self.start_price_worker();
        self.start_order_feed();
    }

    pub fn stop(&mut self) {
        log::info!("server stop");
    }

    async fn start_metrics_server(&mut self) {
        let addr = config::instance()
            .lock()
            .unwrap()
            .metrics_addr
            .as_str()
            .parse()
            .unwrap();
        let make_svc = make_service_fn(move |_| {
            let registry = metrics::REGISTRY_INSTANCE.clone();
            async move {
                Ok::<_, hyper::Error>(service_fn(move |_: Request<Body>| {
                    let registry = registry.clone();
                    async move {
                        let encoder = TextEncoder::new();
                        let metric_families = registry.gather();
                        let mut buffer = Vec::new();
                        encoder.encode(&metric_families, &mut buffer).unwrap();
                        Ok::<_, hyper::Error>(Response::new(Body::from(buffer)))
                    }
                }))
            }
        });
        metrics::init_registry();
        let server = hyper::Server::bind(&addr).serve(make_svc);
        tokio::spawn(async move {
            tokio::pin!(server);
            server.await.unwrap()
        });
        log::info!("metrics server started on {}", addr);
    }

    /// Periodic trigger for the processing cycle. Overlapping triggers
    /// collapse inside the orchestrator's single-cycle guard.
    fn start_cycle_worker(&self) {
        let exchange = self.exchange.clone();
        let interval_ms = config::instance().lock().unwrap().cycle_interval_ms;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
            loop {
                ticker.tick().await;
                let exchange = exchange.clone();
                // Matching is synchronous CPU work; keep it off the runtime workers.
                let _ = tokio::task::spawn_blocking(move || exchange.run_cycle()).await;
            }
        });
        log::info!("cycle worker started, interval {}ms", interval_ms);
    }

    fn start_price_worker(&self) {
        let exchange = self.exchange.clone();
        let interval_ms = config::instance().lock().unwrap().price.tick_interval_ms;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
            loop {
                ticker.tick().await;
                let exchange = exchange.clone();
                let _ = tokio::task::spawn_blocking(move || exchange.price_tick()).await;
            }
        });
        log::info!("price worker started, interval {}ms", interval_ms);
    }

    /// Synthetic ingress: feeds random orders into the exchange so the
    /// engine has something to match when running standalone.
    fn start_order_feed(&self) {
        let sim = config::instance().lock().unwrap().simulation.clone();
        if !sim.enabled || sim.symbols.is_empty() {
            return;
        }
        let symbol_count = sim.symbols.len();
        let interval_ms = sim.order_interval_ms;
        let exchange = self.exchange.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
            loop {
                ticker.tick().await;
                let order = random_order(&sim.symbols, &exchange);
                if let Err(e) = exchange.place_order(order) {
                    log::warn!("order rejected: {}", e);
                }
            }
        });
        log::info!(
            "order feed started for {} symbol(s), interval {}ms",
            symbol_count,
            interval_ms
        );
    }
}

fn random_order(symbols: &[String], exchange: &Exchange) -> Order {
    use crate::engine::entry::TriggerDirection;

    let mut rng = rand::thread_rng();
    let symbol = symbols[rng.gen_range(0..symbols.len())].clone();
    let side = if rng.gen_bool(0.5) { OrderSide::Buy } else { OrderSide::Sell };
    let quantity = rng.gen_range(1..=100);
    let reference = exchange.reference_prices().get_or_default(&symbol);

    match rng.gen_range(0..10u8) {
        // Mostly market orders, submitted without a price so the reference
        // price gets stamped on admission.
        0..=6 => Order::market(Uuid::new_v4(), Uuid::new_v4(), symbol, side, quantity, None),
        7..=8 => {
            let price = jitter(reference, &mut rng);
            Order::limit(Uuid::new_v4(), Uuid::new_v4(), symbol, side, quantity, price)
        }
        _ => {
            let trigger = jitter(reference, &mut rng);
            let direction = match side {
                OrderSide::Buy => TriggerDirection::Below,
                OrderSide::Sell => TriggerDirection::Above,
            };
            Order::gtt(
                Uuid::new_v4(),
                Uuid::new_v4(),
                symbol,
                side,
                quantity,
                trigger,
                trigger,
                direction,
            )
        }
    }
}

/// Price within ±2% of the given one, rounded to two decimals.
fn jitter<R: Rng>(price: Decimal, rng: &mut R) -> Decimal {
    let factor = Decimal::from_f64(1.0 + rng.gen_range(-0.02..0.02)).unwrap_or(Decimal::ONE);
    (price * factor).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Stand-in for the durable persistence collaborator: logs the aggregate
/// and succeeds. A real deployment plugs a transactional store in here.
struct LogCommitSink;

impl CommitSink for LogCommitSink {
    fn commit(&self, results: &[ProcessingResult]) -> anyhow::Result<()> {
        let trades: usize = results.iter().map(|r| r.trades().len()).sum();
        let orders: usize = results.iter().map(|r| r.processed_orders().len()).sum();
        log::info!("committing {} trade(s) and {} order update(s)", trades, orders);
        Ok(())
    }
}

struct LogNotificationSink;

impl NotificationSink for LogNotificationSink {
    fn order_updated(&self, order: &Order) {
        let message = match order.status {
            OrderStatus::Filled => format!(
                "Your {:?} order for {} has been fully executed.",
                order.side, order.symbol
            ),
            OrderStatus::Partial => format!(
                "Your {:?} order for {} has been partially executed.",
                order.side, order.symbol
            ),
            OrderStatus::Expired => {
                format!("Your {:?} order for {} has expired.", order.side, order.symbol)
            }
            OrderStatus::Cancelled => format!(
                "Your {:?} order for {} has been cancelled.",
                order.side, order.symbol
            ),
            _ => format!(
                "Update on your {:?} order for {}. Status: {:?}",
                order.side, order.symbol, order.status
            ),
        };
        let payload = serde_json::json!({
            "orderId": order.id,
            "userId": order.user_id,
            "symbol": order.symbol,
            "status": order.status,
            "message": message,
        });
        log::info!("notification: {}", payload);
    }
}

struct LogPriceHistorySink;

impl PriceHistorySink for LogPriceHistorySink {
    fn record(&self, sample: PriceSample) {
        log::debug!(
            "price sample: {} {} qty {} at {}",
            sample.symbol,
            sample.price,
            sample.quantity,
            sample.at
        );
    }
}
