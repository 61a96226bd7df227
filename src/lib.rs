//! Client-side cart and order lifecycle for the Central Pet Care store.
//!
//! The cart lives in local storage and is hydrated against the product
//! catalog on demand; checkout, payment and order tracking talk to the REST
//! backend through [`client::ApiClient`].

pub mod cli;
pub mod client;
pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod response;
pub mod sandbox;
pub mod services;
pub mod state;
pub mod storage;
