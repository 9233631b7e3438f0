//! Interception Module
//!
//! Decides, per request, whether to serve from the cache, populate it after
//! the handler runs, or invalidate tagged entries before a mutation.

mod interceptor;
mod policy;

pub use interceptor::{CacheInterceptor, CacheStatus, Intercepted};
pub use policy::{RequestInfo, RequestKind, RoutePolicy};
