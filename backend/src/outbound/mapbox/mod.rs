//! Mapbox adapters (Geocoding v5 and Directions v5 APIs).

mod client;
mod dto;

pub use client::MapboxClient;
