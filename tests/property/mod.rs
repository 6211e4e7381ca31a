// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module

mod cascade_atomicity;
mod rear_port_positions;
