pub mod availability_service;
pub use availability_service::AvailabilityService;
pub mod order_service;
pub use order_service::OrderService;
pub mod pricing_service;
pub use pricing_service::PricingEngine;
pub mod search_service;
pub use search_service::SearchService;
