//! CTT Express delivery carrier integration.
//!
//! [`carrier::CttExpressCarrier`] maps ERP pickings onto the CTT Express
//! clients API through the [`api::CttApi`] trait, and surfaces vendor errors
//! as [`error::CarrierError`].

pub mod api;
pub mod carrier;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod host;
pub mod mapper;
pub mod master_data;
pub mod models;
pub mod payload_log;
pub mod scheduler;
pub mod shipment;
pub mod store;

pub use carrier::CttExpressCarrier;
pub use error::{CarrierError, CarrierResult};
