pub mod structural_search_event;
pub mod structural_search_request;
pub mod structural_search_route;
