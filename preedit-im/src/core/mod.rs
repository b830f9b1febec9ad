//! Core composition functionality
//!
//! This module contains the composition state machine, offset translation
//! and the controller that drives the host document.

pub mod controller;
pub mod decoration;
pub mod error;
pub mod state;
pub mod translator;
