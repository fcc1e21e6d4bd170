//! CrowdSense library — portable presence-density engine.
//!
//! CrowdSense estimates how many unknown people are near an installation by
//! counting BLE advertisers per scan cycle, and turns the estimate into a
//! one-byte actuation command (stop / footstep / vibration) served to the
//! effect controller over I2C.
//!
//! This crate contains all filtering, counting, classification, and command
//! encoding logic with no platform dependencies, testable on any host with
//! `cargo test`. The ESP32 firmware binary (`src/bin/firmware.rs`) is a thin
//! consumer that provides the BLE radio, the I2C responder, and the LED
//! indicator.

#![cfg_attr(not(test), no_std)]

pub mod board;
pub mod census;
pub mod channel;
pub mod command;
pub mod cycle;
pub mod defaults;
pub mod filter;
pub mod protocol;
pub mod scanner;
