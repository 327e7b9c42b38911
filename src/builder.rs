use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use crate::data::catalog::{infer_domain, parse_number, AttributeCatalog, DomainKind};
use crate::data::predicate::{Comparison, Predicate, PredicateId};

// ---------------------------------------------------------------------------
// Pending selection – the predicate under construction
// ---------------------------------------------------------------------------

const DEFAULT_THRESHOLD: &str = "0";

/// The threshold text does not parse as a number.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("'{0}' is not a number")]
pub struct ThresholdError(pub String);

/// Attribute, comparison and values picked so far.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub attribute: String,
    pub domain: DomainKind,
    pub comparison: Comparison,
    /// Candidate values in catalog order.
    pub values: Vec<String>,
    /// Values currently ticked.
    pub included: BTreeSet<String>,
    /// Raw threshold text, parsed at commit time.
    pub threshold: String,
}

impl Selection {
    fn new(attribute: &str, values: &[String]) -> Self {
        // One checkbox per distinct value, first occurrence wins.
        let mut seen = BTreeSet::new();
        let distinct: Vec<String> = values
            .iter()
            .filter(|v| seen.insert(v.as_str()))
            .cloned()
            .collect();

        Selection {
            attribute: attribute.to_string(),
            domain: infer_domain(values),
            comparison: Comparison::OneOf,
            values: distinct,
            included: BTreeSet::new(),
            threshold: DEFAULT_THRESHOLD.to_string(),
        }
    }

    /// Ticked values in catalog order.
    pub fn allowed_values(&self) -> Vec<String> {
        self.values
            .iter()
            .filter(|v| self.included.contains(*v))
            .cloned()
            .collect()
    }

    pub fn is_included(&self, value: &str) -> bool {
        self.included.contains(value)
    }

    pub fn threshold_status(&self) -> Result<f64, ThresholdError> {
        parse_number(&self.threshold).ok_or_else(|| ThresholdError(self.threshold.clone()))
    }

    fn is_ready(&self, strict_thresholds: bool) -> bool {
        match self.comparison {
            Comparison::OneOf => !self.included.is_empty(),
            _ if strict_thresholds => self.threshold_status().is_ok(),
            _ => true,
        }
    }

    fn build(&self, id: PredicateId) -> Option<Predicate> {
        if self.comparison.is_threshold() {
            let threshold = self.threshold_status().unwrap_or(f64::NAN);
            Predicate::threshold(id, &self.attribute, self.comparison, threshold)
        } else {
            Some(Predicate::one_of(id, &self.attribute, self.allowed_values()))
        }
    }
}

// ---------------------------------------------------------------------------
// Stage – where the picker flow currently is
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Stage {
    #[default]
    NoAttributeSelected,
    /// Attribute just picked; nothing else provided yet.
    AwaitingComparison(Selection),
    /// Input started but not committable.
    CollectingValues(Selection),
    /// The Add control is shown only here.
    ReadyToCommit(Selection),
}

impl Stage {
    pub fn selection(&self) -> Option<&Selection> {
        match self {
            Stage::NoAttributeSelected => None,
            Stage::AwaitingComparison(s) | Stage::CollectingValues(s) | Stage::ReadyToCommit(s) => {
                Some(s)
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Stage::ReadyToCommit(_))
    }

    fn settle(selection: Selection, strict_thresholds: bool) -> Stage {
        if selection.is_ready(strict_thresholds) {
            Stage::ReadyToCommit(selection)
        } else {
            Stage::CollectingValues(selection)
        }
    }
}

// ---------------------------------------------------------------------------
// Actions and the reducer
// ---------------------------------------------------------------------------

/// Every user interaction the widget can report.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SelectAttribute(String),
    ToggleValue(String),
    SetComparison(Comparison),
    SetThreshold(String),
    Commit,
    Remove(PredicateId),
}

/// Consumer notified with the whole filter set after every add / remove.
pub type FiltersChanged = Box<dyn FnMut(&[Predicate])>;

fn log_filters_changed() -> FiltersChanged {
    Box::new(|filters: &[Predicate]| {
        log::info!("Filters changed ({} active)", filters.len());
    })
}

/// The filter builder: pending selection, committed predicates and the
/// consumer callback.
pub struct FilterBuilder {
    catalog: AttributeCatalog,
    stage: Stage,
    filters: Vec<Predicate>,
    next_id: PredicateId,
    on_filters_changed: FiltersChanged,
    pub visible: bool,
    pub strict_thresholds: bool,
}

impl Default for FilterBuilder {
    fn default() -> Self {
        Self {
            catalog: AttributeCatalog::default(),
            stage: Stage::default(),
            filters: Vec::new(),
            next_id: 1,
            on_filters_changed: log_filters_changed(),
            visible: true,
            strict_thresholds: false,
        }
    }
}

impl fmt::Debug for FilterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterBuilder")
            .field("stage", &self.stage)
            .field("filters", &self.filters)
            .field("next_id", &self.next_id)
            .field("visible", &self.visible)
            .finish_non_exhaustive()
    }
}

impl FilterBuilder {
    pub fn new(catalog: AttributeCatalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    /// Replace the consumer callback.
    pub fn on_filters_changed(mut self, callback: impl FnMut(&[Predicate]) + 'static) -> Self {
        self.on_filters_changed = Box::new(callback);
        self
    }

    pub fn with_strict_thresholds(mut self, strict: bool) -> Self {
        self.strict_thresholds = strict;
        self
    }

    pub fn possible_filters(&self) -> &AttributeCatalog {
        &self.catalog
    }

    /// Swap in a new catalog. A pending selection survives only if its
    /// attribute is still present, in which case it is re-seeded.
    pub fn set_possible_filters(&mut self, catalog: AttributeCatalog) {
        let keep = self
            .stage
            .selection()
            .map(|s| s.attribute.clone())
            .filter(|a| catalog.contains(a));
        self.catalog = catalog;
        self.stage = Stage::NoAttributeSelected;
        if let Some(attribute) = keep {
            self.select_attribute(&attribute);
        }
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.stage.selection()
    }

    pub fn filters(&self) -> &[Predicate] {
        &self.filters
    }

    /// Parse state of the pending threshold, if an attribute is selected.
    pub fn threshold_status(&self) -> Option<Result<f64, ThresholdError>> {
        self.selection().map(Selection::threshold_status)
    }

    /// Apply one action. Out-of-order actions leave the state unchanged.
    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::SelectAttribute(name) => self.select_attribute(&name),
            Action::ToggleValue(value) => self.toggle_value(&value),
            Action::SetComparison(kind) => self.set_comparison(kind),
            Action::SetThreshold(text) => self.set_threshold(text),
            Action::Commit => self.commit(),
            Action::Remove(id) => self.remove(id),
        }
    }

    pub fn select_attribute(&mut self, name: &str) {
        let Some(values) = self.catalog.values(name) else {
            return;
        };
        let selection = Selection::new(name, values);
        log::debug!(
            "Selected attribute '{name}' ({} values, {})",
            selection.values.len(),
            selection.domain
        );
        self.stage = Stage::AwaitingComparison(selection);
    }

    pub fn toggle_value(&mut self, value: &str) {
        self.update_selection(|s| {
            if !s.values.iter().any(|v| v == value) {
                return false;
            }
            if !s.included.remove(value) {
                s.included.insert(value.to_string());
            }
            true
        });
    }

    pub fn set_comparison(&mut self, kind: Comparison) {
        self.update_selection(|s| {
            if s.domain != DomainKind::Numeric {
                return false;
            }
            s.comparison = kind;
            true
        });
    }

    pub fn set_threshold(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.update_selection(|s| {
            s.threshold = text;
            true
        });
    }

    /// Commit the pending selection. Only valid in [`Stage::ReadyToCommit`].
    pub fn commit(&mut self) {
        let Stage::ReadyToCommit(selection) = &self.stage else {
            return;
        };
        let Some(predicate) = selection.build(self.next_id) else {
            return;
        };
        log::info!("Added filter #{}: {}", predicate.id(), predicate);

        self.next_id += 1;
        self.filters.push(predicate);
        self.stage = Stage::NoAttributeSelected;
        self.notify();
    }

    /// Remove the predicate with `id`. The consumer is notified even when no
    /// predicate matched.
    pub fn remove(&mut self, id: PredicateId) {
        let before = self.filters.len();
        self.filters.retain(|p| p.id() != id);
        if self.filters.len() != before {
            log::info!("Removed filter #{id}");
        }
        self.notify();
    }

    fn notify(&mut self) {
        (self.on_filters_changed)(&self.filters);
    }

    /// Run `edit` on the pending selection and re-settle the stage. `edit`
    /// returns false to signal that nothing changed.
    fn update_selection(&mut self, edit: impl FnOnce(&mut Selection) -> bool) {
        let stage = std::mem::take(&mut self.stage);
        self.stage = match stage {
            Stage::NoAttributeSelected => Stage::NoAttributeSelected,
            Stage::AwaitingComparison(mut s) => {
                if edit(&mut s) {
                    Stage::settle(s, self.strict_thresholds)
                } else {
                    Stage::AwaitingComparison(s)
                }
            }
            Stage::CollectingValues(mut s) | Stage::ReadyToCommit(mut s) => {
                edit(&mut s);
                Stage::settle(s, self.strict_thresholds)
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn catalog() -> AttributeCatalog {
        [
            ("color", vec!["red", "blue", "green"]),
            ("age", vec!["1", "2", "3"]),
            ("profile_picture", vec!["a.png"]),
        ]
        .into_iter()
        .collect()
    }

    fn recording_builder() -> (FilterBuilder, Rc<RefCell<Vec<Vec<Predicate>>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let builder = FilterBuilder::new(catalog())
            .on_filters_changed(move |f: &[Predicate]| sink.borrow_mut().push(f.to_vec()));
        (builder, calls)
    }

    #[test]
    fn starts_with_nothing_selected() {
        let builder = FilterBuilder::new(catalog());
        assert_eq!(builder.stage(), &Stage::NoAttributeSelected);
        assert!(builder.filters().is_empty());
        assert!(builder.visible);
    }

    #[test]
    fn unknown_attribute_is_ignored() {
        let mut builder = FilterBuilder::new(catalog());
        builder.select_attribute("height");
        assert_eq!(builder.stage(), &Stage::NoAttributeSelected);

        builder.select_attribute("color");
        let before = builder.stage().clone();
        builder.select_attribute("height");
        assert_eq!(builder.stage(), &before);
    }

    #[test]
    fn selecting_seeds_unticked_values_and_infers_domain() {
        let mut builder = FilterBuilder::new(catalog());
        builder.select_attribute("color");
        let s = builder.selection().unwrap();
        assert!(matches!(builder.stage(), Stage::AwaitingComparison(_)));
        assert_eq!(s.values, ["red", "blue", "green"]);
        assert!(s.included.is_empty());
        assert_eq!(s.domain, DomainKind::Categorical);
        assert_eq!(s.comparison, Comparison::OneOf);

        builder.select_attribute("age");
        assert_eq!(builder.selection().unwrap().domain, DomainKind::Numeric);
    }

    #[test]
    fn changing_attribute_clears_values_and_comparison() {
        let mut builder = FilterBuilder::new(catalog());
        builder.select_attribute("age");
        builder.set_comparison(Comparison::GreaterThan);
        builder.set_threshold("9");
        builder.select_attribute("color");
        builder.toggle_value("red");
        builder.select_attribute("age");

        let s = builder.selection().unwrap();
        assert_eq!(s.comparison, Comparison::OneOf);
        assert!(s.included.is_empty());
        assert_eq!(s.threshold, "0");
    }

    #[test]
    fn toggle_twice_restores_membership() {
        let mut builder = FilterBuilder::new(catalog());
        builder.select_attribute("color");
        builder.toggle_value("blue");
        assert!(builder.selection().unwrap().is_included("blue"));
        assert!(builder.stage().is_ready());

        builder.toggle_value("blue");
        assert!(!builder.selection().unwrap().is_included("blue"));
        assert!(matches!(builder.stage(), Stage::CollectingValues(_)));
    }

    #[test]
    fn toggle_without_attribute_or_unknown_value_is_noop() {
        let mut builder = FilterBuilder::new(catalog());
        builder.toggle_value("red");
        assert_eq!(builder.stage(), &Stage::NoAttributeSelected);

        builder.select_attribute("color");
        builder.toggle_value("purple");
        assert!(matches!(builder.stage(), Stage::AwaitingComparison(_)));
    }

    #[test]
    fn categorical_attribute_ignores_comparison_change() {
        let mut builder = FilterBuilder::new(catalog());
        builder.select_attribute("color");
        builder.set_comparison(Comparison::LessThan);
        assert_eq!(builder.selection().unwrap().comparison, Comparison::OneOf);
    }

    #[test]
    fn commit_is_gated_until_ready() {
        let (mut builder, calls) = recording_builder();
        builder.commit();
        builder.select_attribute("color");
        builder.commit();
        builder.toggle_value("red");
        builder.toggle_value("red");
        builder.commit();

        assert!(builder.filters().is_empty());
        assert!(calls.borrow().is_empty());
        assert!(builder.selection().is_some());
    }

    #[test]
    fn commit_appends_and_resets() {
        let (mut builder, calls) = recording_builder();
        builder.select_attribute("color");
        builder.toggle_value("green");
        builder.toggle_value("red");
        builder.commit();

        assert_eq!(builder.filters().len(), 1);
        assert_eq!(builder.stage(), &Stage::NoAttributeSelected);
        // catalog order, not click order
        assert_eq!(
            builder.filters()[0].allowed_values().unwrap(),
            ["red", "green"]
        );

        builder.select_attribute("age");
        builder.set_comparison(Comparison::GreaterThan);
        builder.commit();
        assert_eq!(builder.filters().len(), 2);
        assert_eq!(builder.filters()[1].threshold_value(), Some(0.0));
        assert_eq!(calls.borrow().len(), 2);
    }

    #[test]
    fn lenient_mode_commits_nan() {
        let (mut builder, calls) = recording_builder();
        builder.select_attribute("age");
        builder.set_comparison(Comparison::LessThan);
        builder.set_threshold("abc");
        assert!(matches!(
            builder.threshold_status(),
            Some(Err(ThresholdError(ref t))) if t == "abc"
        ));
        builder.commit();

        let calls = calls.borrow();
        let threshold = calls[0][0].threshold_value().unwrap();
        assert!(threshold.is_nan());
    }

    #[test]
    fn threshold_uses_numeric_prefix() {
        let (mut builder, calls) = recording_builder();
        builder.select_attribute("age");
        builder.set_comparison(Comparison::GreaterThan);
        builder.set_threshold("5abc");
        builder.commit();

        assert_eq!(calls.borrow()[0][0].threshold_value(), Some(5.0));
    }

    #[test]
    fn repeated_catalog_values_are_offered_once() {
        let catalog: AttributeCatalog = [("color", vec!["red", "red", "blue"])]
            .into_iter()
            .collect();
        let mut builder = FilterBuilder::new(catalog);
        builder.select_attribute("color");
        assert_eq!(builder.selection().unwrap().values, ["red", "blue"]);

        builder.toggle_value("red");
        builder.commit();
        assert_eq!(builder.filters()[0].allowed_values().unwrap(), ["red"]);
    }

    #[test]
    fn strict_mode_waits_for_a_number() {
        let mut builder = FilterBuilder::new(catalog()).with_strict_thresholds(true);
        builder.select_attribute("age");
        builder.set_comparison(Comparison::LessThan);
        builder.set_threshold("abc");
        assert!(matches!(builder.stage(), Stage::CollectingValues(_)));
        builder.commit();
        assert!(builder.filters().is_empty());

        builder.set_threshold("4.5");
        assert!(builder.stage().is_ready());
        builder.commit();
        assert_eq!(builder.filters()[0].threshold_value(), Some(4.5));
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let (mut builder, calls) = recording_builder();
        for value in ["red", "blue"] {
            builder.select_attribute("color");
            builder.toggle_value(value);
            builder.commit();
        }
        builder.remove(1);
        builder.select_attribute("color");
        builder.toggle_value("green");
        builder.commit();

        let ids: Vec<PredicateId> = builder.filters().iter().map(Predicate::id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(calls.borrow().len(), 4);
    }

    #[test]
    fn removing_unknown_id_still_notifies() {
        let (mut builder, calls) = recording_builder();
        builder.remove(42);
        assert_eq!(calls.borrow().len(), 1);
        assert!(calls.borrow()[0].is_empty());
    }

    #[test]
    fn dispatch_routes_actions() {
        let mut builder = FilterBuilder::new(catalog());
        builder.dispatch(Action::SelectAttribute("age".into()));
        builder.dispatch(Action::SetComparison(Comparison::GreaterThan));
        builder.dispatch(Action::SetThreshold("2".into()));
        builder.dispatch(Action::Commit);
        assert_eq!(builder.filters()[0].summary(), "age > 2");

        builder.dispatch(Action::Remove(1));
        assert!(builder.filters().is_empty());
    }

    #[test]
    fn new_catalog_keeps_surviving_attribute() {
        let mut builder = FilterBuilder::new(catalog());
        builder.select_attribute("color");
        builder.toggle_value("red");

        let mut next = catalog();
        next.insert("color", vec!["red".into(), "black".into()]);
        builder.set_possible_filters(next);
        let s = builder.selection().unwrap();
        assert_eq!(s.values, ["red", "black"]);
        assert!(s.included.is_empty());

        let gone: AttributeCatalog = [("age", vec!["1"])].into_iter().collect();
        builder.set_possible_filters(gone);
        assert_eq!(builder.stage(), &Stage::NoAttributeSelected);
    }
}
