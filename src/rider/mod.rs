//! Riders that follow a built track by arc length, and the train consist
//! that moves a locomotive and its cars together.

mod train;
mod transport;

pub use train::{car_offset, RiderId, Train, CAR_GAP, CAR_OFFSET};
pub use transport::{CameraPose, Headlight, Rider, RiderPose};
