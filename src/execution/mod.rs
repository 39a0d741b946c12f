// Per-timeframe state, session fan-out and the order boundary
pub mod candle_window;
pub mod coordinator;
pub mod executor;
pub mod session;

pub use candle_window::{CandleWindow, WindowOp, DEFAULT_WINDOW_CAPACITY};
pub use coordinator::{CoordinatorEvent, CoordinatorPhase, TimeframeCoordinator, TimeframeView};
pub use executor::{OrderRequest, OrderSink, PaperOrderSink};
pub use session::{SessionConfig, SessionError, SessionManager, SessionSnapshot};
