//! Filter implementations for the bus tracking pipeline.

pub mod route;
pub mod status;

pub use route::RouteFilter;
pub use status::StatusFilter;
