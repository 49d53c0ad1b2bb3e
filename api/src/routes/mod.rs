pub mod health_route;
pub mod metrics_route;
pub mod structural_search;
