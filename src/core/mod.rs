// src/core/mod.rs

pub mod net;
pub mod sanitize;

pub use net::{Fetch, HttpFetcher};
pub use sanitize::clean_redirect_link;
