pub mod model;
pub mod service;

pub use model::{
    DetailPhotosOutcome, DetailView, FeedSession, FeedSnapshot, LoadMoreOutcome, SkipReason,
};
pub use service::FeedLoader;
