//! Lead Qualification API Library
//!
//! Scores inbound sales leads from their self-reported data and from
//! public profile signals (LinkedIn, Instagram, Facebook, Twitter), and
//! renders a plain-text qualification summary for each lead.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `integrations`: External profile providers.
//! - `config`: Configuration management.
//! - `domain_classifier`: Work vs. personal email domain detection.
//! - `employment`: Current employer inference.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Lead input and qualification output models.
//! - `normalizers`: Raw provider payloads to normalized signal records.
//! - `qualification`: Per-lead and batch orchestration.
//! - `scoring`: Scoring policy and rules.
//! - `services`: HTTP profile provider client.
//! - `signals`: Normalized profile signals.
//! - `summary`: Qualification summary rendering.

pub mod api;
pub mod core;
pub mod integrations;

pub mod config;
pub mod domain_classifier;
pub mod employment;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod normalizers;
pub mod qualification;
pub mod scoring;
pub mod services;
pub mod signals;
pub mod summary;
