pub mod structured_logging;
pub mod test_utils;

pub use structured_logging::{
    init_structured_logging,
    LoggingConfig,
    StructuredLogEntry,
};

pub use test_utils::{capture_events, init_test_logging, CallCounter, CapturedEvent};
