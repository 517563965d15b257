pub mod error;
pub mod fetcher;
pub mod nws_client;
