//! Attribute filter builder: an egui widget that composes "is one of" and
//! threshold predicates against a catalog of attributes, plus the catalog
//! loaders and the desktop host around it.

pub mod app;
pub mod builder;
pub mod color;
pub mod config;
pub mod data;
pub mod state;
pub mod ui;

pub use builder::{Action, FilterBuilder, Stage};
pub use data::catalog::{AttributeCatalog, DomainKind};
pub use data::predicate::{Comparison, Predicate};
