mod cache;
mod rentcast;

pub use cache::{Clock, FileCache, SystemClock};
pub use rentcast::RentCastClient;
