pub mod cache;
pub mod football_data;
pub mod provider;
pub mod retry;
pub mod service;

pub use cache::StandingsCache;
pub use football_data::FootballData;
pub use provider::StandingsProvider;
pub use retry::RetryPolicy;
pub use service::StandingsService;
