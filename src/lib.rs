pub mod capture;
pub mod client;
pub mod errors;
pub mod logging;
pub mod order;
pub mod protocol;
pub mod station;
pub mod station_config;
pub mod ui;
