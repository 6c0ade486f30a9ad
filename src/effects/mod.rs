//! Time-driven visual effects that ride along with the train.

mod smoke;

pub use smoke::{Flipbook, FlipbookInstance, SmokeEmitter, SMOKE_FRAME_DELAYS, SMOKE_INTERVAL};
