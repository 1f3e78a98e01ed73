pub mod error;
pub mod events;
pub mod lifecycle;
pub mod ports;
pub mod repo;
pub mod service;
pub mod session;
pub mod uploads;
pub mod views;
