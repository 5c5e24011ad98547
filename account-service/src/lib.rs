//! Account Service - Bank accounts with deposit, withdrawal and transfer.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
