//! Formpilot - Conversational Form-Filling Assistant
//!
//! This crate implements a guided dialogue that walks a user through a
//! fixed registration form one field at a time: extract, validate,
//! confirm, commit, advance.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
