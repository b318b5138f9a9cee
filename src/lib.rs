//! Mealboard - A Meal Sharing Board with Wellness News
//!
//! This crate provides a small web app where visitors share meals and
//! browse short news snippets for a handful of wellness topics.

pub mod config;
pub mod fetcher;
pub mod routes;
pub mod store;
