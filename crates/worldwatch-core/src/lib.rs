//! Snapshot collection, spike detection, and tracker lifecycle for Worldwatch.
//!
//! This crate owns the collect -> diff -> report cycle and the controller
//! that starts and stops it. It knows nothing about HTTP or chat surfaces:
//! data comes in through a [`DataSource`] and reports go out through an
//! [`EventSink`].
//!
//! # Modules
//!
//! - [`collector`] -- [`DataSource`] trait and the [`SnapshotCollector`]
//!   that normalizes raw table rows into a [`SnapshotSet`].
//! - [`config`] -- [`TrackerOptions`] and the validated [`TrackerConfig`].
//! - [`controller`] -- [`LifecycleController`]: Start, Stop, Status.
//! - [`diff`] -- The pure spike detection algorithm.
//! - [`error`] -- Error types for every layer.
//! - [`job`] -- The background polling loop.
//! - [`limits`] -- Process-wide floors and caps.
//! - [`sink`] -- [`EventSink`] trait and [`ChannelSink`].
//! - [`stub`] -- [`ScriptedSource`], a data source that replays canned polls.
//!
//! [`DataSource`]: collector::DataSource
//! [`SnapshotCollector`]: collector::SnapshotCollector
//! [`SnapshotSet`]: worldwatch_types::SnapshotSet
//! [`TrackerOptions`]: config::TrackerOptions
//! [`TrackerConfig`]: config::TrackerConfig
//! [`LifecycleController`]: controller::LifecycleController
//! [`EventSink`]: sink::EventSink
//! [`ChannelSink`]: sink::ChannelSink
//! [`ScriptedSource`]: stub::ScriptedSource

pub mod collector;
pub mod config;
pub mod controller;
pub mod diff;
pub mod error;
pub mod job;
pub mod limits;
pub mod sink;
pub mod stub;
