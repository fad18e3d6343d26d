//! Browser-agnostic helpers: time, token inspection, durable storage, the
//! session store and route guard decisions.

pub mod clock;
pub mod guard;
pub mod session;
pub mod storage;
pub mod token;
