pub mod advertiser;
pub mod cli;
pub mod daemon;
pub mod dispatch;
pub mod transport;

pub use daemon::Router;
