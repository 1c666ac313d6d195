//! Общие утилиты для тестов
//!
//! Счётчики вызовов фабрик, однократная инициализация логирования и
//! перехват событий `tracing` для проверок в тестах.

use parking_lot::Mutex;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Once,
};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{layer::Context, layer::SubscriberExt, Layer, Registry};

use crate::structured_logging::{init_structured_logging, JsonVisitor, LoggingConfig};

/// Потокобезопасный счётчик вызовов; клоны делят одно значение
#[derive(Debug, Clone, Default)]
pub struct CallCounter {
    count: Arc<AtomicUsize>,
}

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Увеличить счётчик, вернуть новое значение
    pub fn increment(&self) -> usize {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

static TEST_LOGGING: Once = Once::new();

/// Инициализировать логирование для тестов один раз на процесс.
///
/// Уровень DEBUG; `RUST_LOG` имеет приоритет. Если subscriber уже
/// установлен кем-то другим, вызов ничего не делает.
pub fn init_test_logging() {
    TEST_LOGGING.call_once(|| {
        let config = LoggingConfig {
            level: Level::DEBUG,
            color_output: false,
            include_line_numbers: true,
            ..LoggingConfig::default()
        };
        let _ = init_structured_logging(config);
    });
}

/// Событие, перехваченное `capture_events`
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    pub message: String,
}

#[derive(Default)]
struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = JsonVisitor::default();
        event.record(&mut visitor);

        self.events.lock().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message: visitor.message.unwrap_or_default(),
        });
    }
}

/// Выполнить `f` под локальным subscriber и вернуть все события текущего потока
pub fn capture_events<R>(f: impl FnOnce() -> R) -> (R, Vec<CapturedEvent>) {
    let layer = CaptureLayer::default();
    let events = Arc::clone(&layer.events);

    let subscriber = Registry::default().with(layer);
    let result = tracing::subscriber::with_default(subscriber, f);

    let captured = std::mem::take(&mut *events.lock());
    (result, captured)
}
