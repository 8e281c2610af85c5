//! Google Maps Platform adapters (Geocoding and Directions APIs).

mod client;
mod dto;

pub use client::GoogleMapsClient;
