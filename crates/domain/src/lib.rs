//! Domain layer for the NotifyHub backend.
//!
//! This crate contains:
//! - Domain models (Project, Template, NotificationDefinition, DeliveryAttempt)
//! - Storage capability traits and an in-memory implementation
//! - The template renderer, channel-adapter abstraction and dispatch service

pub mod models;
pub mod services;
