//! Tree navigation engine for a terminal database browser.
//!
//! One generic [`navigator::Navigator`] drives both the catalog browser
//! ([`catalog::DbKind`]) and the JSON value inspector
//! ([`json_view::JsonKind`]).

pub mod app;
pub mod async_task;
pub mod catalog;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod filter;
pub mod flatten;
pub mod fuzzy;
pub mod json_view;
pub mod main_lib;
pub mod navigation;
pub mod navigator;
pub mod query;
pub mod screenshot;
pub mod search;
pub mod theme;
pub mod tree;
pub mod ui;
pub mod viewport;
