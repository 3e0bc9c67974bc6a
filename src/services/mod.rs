pub mod box_office;
pub mod catalog;
pub mod classifier;
pub mod collector;
pub mod enricher;
pub mod movies;
pub mod ranker;
pub mod trending;

pub use box_office::{BoxOfficeReport, BoxOfficeService, BoxOfficeSettings};
pub use movies::MovieService;
pub use trending::{TrendingService, TrendingStore};
