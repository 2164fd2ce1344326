//! Carscope: interactive dashboards over a synthetic car-owner table.
//!
//! The core pipeline is pure and UI-free:
//!
//! ```text
//!   load_file ─▶ OwnerDataset ─▶ apply(criteria) ─▶ FilteredView ─▶ render(mode)
//!                                                                      │
//!                                                  ChartSpec + summary ◀┘
//! ```
//!
//! [`data`] owns the table, loading, filtering and fabrication; [`chart`]
//! composes renderer-agnostic chart specs and the text lines; [`profile`]
//! captures the two dashboard variants as configuration; [`state`] ties
//! it together for the egui shell in [`app`] and [`ui`].

pub mod app;
pub mod chart;
pub mod color;
pub mod data;
pub mod profile;
pub mod rng;
pub mod state;
pub mod ui;
