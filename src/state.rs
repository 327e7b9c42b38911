use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Result;

use crate::builder::FilterBuilder;
use crate::color::BubbleColors;
use crate::config::Config;
use crate::data::catalog::AttributeCatalog;
use crate::data::loader;
use crate::data::predicate::Predicate;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// The hosted filter widget.
    pub builder: FilterBuilder,

    /// What the consumer callback last received.
    pub received: Rc<RefCell<Vec<Predicate>>>,

    /// Bubble colour per attribute of the current catalog.
    pub colors: BubbleColors,

    /// File the current catalog came from.
    pub catalog_path: Option<PathBuf>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&received);
        let mut builder = FilterBuilder::default()
            .with_strict_thresholds(config.strict_thresholds)
            .on_filters_changed(move |filters: &[Predicate]| {
                log::info!("Filters changed ({} active)", filters.len());
                *sink.borrow_mut() = filters.to_vec();
            });
        builder.visible = config.visible;

        Self {
            builder,
            received,
            colors: BubbleColors::default(),
            catalog_path: None,
            status_message: None,
            loading: false,
        }
    }

    /// Hand a new catalog to the widget and recolour the bubbles.
    pub fn set_catalog(&mut self, catalog: AttributeCatalog, path: Option<PathBuf>) {
        self.colors = BubbleColors::new(&catalog);
        self.builder.set_possible_filters(catalog);
        self.catalog_path = path;
        self.status_message = None;
        self.loading = false;
    }

    /// Load a catalog file; failures end up in `status_message`.
    pub fn open_catalog(&mut self, path: &Path) {
        self.loading = true;
        match loader::load_file(path) {
            Ok(catalog) => self.set_catalog(catalog, Some(path.to_path_buf())),
            Err(e) => {
                log::error!("Failed to load catalog: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                self.loading = false;
            }
        }
    }

    /// The last filter set as pretty JSON.
    pub fn received_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&*self.received.borrow())?)
    }
}
