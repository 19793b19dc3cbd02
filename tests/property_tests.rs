// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Entry Point
//!
//! This test suite uses proptest to verify laws that must hold for all
//! configurations: the override merge and subnet fan-out.

mod property;
