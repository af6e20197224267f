//! Route Handlers

pub mod health;
pub mod home;
pub mod precipitation;
pub mod stations;
pub mod temperature;
