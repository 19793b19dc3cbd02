// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module

mod branch_fan_out;
mod fan_out;
mod merge_laws;
