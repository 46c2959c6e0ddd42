pub mod app;
pub mod cli;
pub mod configuration;
pub mod fetcher;
pub mod logging;
pub mod persister;
pub mod record;
pub mod storage;
