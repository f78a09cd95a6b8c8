pub mod content_repo;
pub use content_repo::ContentRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
