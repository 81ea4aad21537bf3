pub mod traits;
pub mod transport;
pub mod payloads;
pub mod newsapi;
pub mod gnews;
pub mod rss_feed;
pub mod hacker_news;
pub mod registry;

pub use traits::{FetchRequest, NewsProvider, ProviderKind};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
pub use registry::ProviderRegistry;
