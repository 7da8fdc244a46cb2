//! Audit capture for pricing calculations.
//!
//! The engine emits `tracing` events whose target names a table
//! (`catalog_load`, `adjustment`, `quote`). [`capture`] runs a closure under a
//! scoped subscriber and returns every event it saw, grouped by target, so
//! tests and analysis code can ask *why* a price came out the way it did.
//!
//! # Usage
//!
//! ```ignore
//! let (quote, log) = pricing_audit::capture(|| calculator.calculate(...));
//! let fired = log.table("adjustment").map(|t| t.strings("rule")).unwrap_or_default();
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use polars::prelude::*;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Record};
use tracing::{Event, Id, Metadata, Subscriber};

/// One recorded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum AuditValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl AuditValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AuditValue::Int(v) => Some(*v as f64),
            AuditValue::Float(v) => Some(*v),
            AuditValue::Bool(_) | AuditValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AuditValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// A single event: field name -> value.
pub type AuditRow = BTreeMap<String, AuditValue>;

/// All events recorded under one target, in emission order.
#[derive(Debug, Clone, Default)]
pub struct AuditTable {
    pub rows: Vec<AuditRow>,
}

impl AuditTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Text values of `field`, skipping rows where it is absent.
    pub fn strings(&self, field: &str) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|row| row.get(field).and_then(AuditValue::as_str))
            .map(str::to_string)
            .collect()
    }

    /// Numeric values of `field`, skipping rows where it is absent.
    pub fn numbers(&self, field: &str) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|row| row.get(field).and_then(AuditValue::as_f64))
            .collect()
    }

    /// Column-oriented view. Text columns become `String`, everything else
    /// becomes `Float64`; missing cells are null.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut names: Vec<&str> = Vec::new();
        for row in &self.rows {
            for key in row.keys() {
                if !names.contains(&key.as_str()) {
                    names.push(key);
                }
            }
        }

        let columns: Vec<Column> = names
            .into_iter()
            .map(|name| {
                let is_text = self
                    .rows
                    .iter()
                    .any(|row| matches!(row.get(name), Some(AuditValue::Text(_))));
                if is_text {
                    let values: Vec<Option<String>> = self
                        .rows
                        .iter()
                        .map(|row| row.get(name).and_then(AuditValue::as_str).map(str::to_string))
                        .collect();
                    Column::new(name.into(), values)
                } else {
                    let values: Vec<Option<f64>> = self
                        .rows
                        .iter()
                        .map(|row| match row.get(name) {
                            Some(AuditValue::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
                            Some(v) => v.as_f64(),
                            None => None,
                        })
                        .collect();
                    Column::new(name.into(), values)
                }
            })
            .collect();

        DataFrame::new(columns)
    }
}

/// Tables keyed by tracing target.
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    pub tables: HashMap<String, AuditTable>,
}

impl AuditLog {
    pub fn table(&self, target: &str) -> Option<&AuditTable> {
        self.tables.get(target)
    }

    /// Number of events recorded under `target` (0 when absent).
    pub fn count(&self, target: &str) -> usize {
        self.tables.get(target).map_or(0, AuditTable::len)
    }

    pub fn to_dataframes(&self) -> HashMap<String, DataFrame> {
        self.tables
            .iter()
            .filter_map(|(name, table)| table.to_dataframe().ok().map(|df| (name.clone(), df)))
            .collect()
    }
}

thread_local! {
    static LOG: RefCell<AuditLog> = RefCell::default();
}

struct RowVisitor<'a> {
    row: &'a mut AuditRow,
}

impl RowVisitor<'_> {
    fn put(&mut self, field: &Field, value: AuditValue) {
        self.row.insert(field.name().to_string(), value);
    }
}

impl Visit for RowVisitor<'_> {
    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, AuditValue::Int(i64::try_from(value).unwrap_or(i64::MAX)));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, AuditValue::Int(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.put(field, AuditValue::Float(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, AuditValue::Bool(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, AuditValue::Text(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.put(field, AuditValue::Text(format!("{:?}", value)));
    }
}

/// Subscriber that appends info-level events to the thread-local log.
pub struct AuditSubscriber;

impl Subscriber for AuditSubscriber {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.is_event() && *metadata.level() <= tracing::Level::INFO
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let mut row = AuditRow::new();
        event.record(&mut RowVisitor { row: &mut row });

        let target = event.metadata().target().to_string();
        LOG.with(|log| {
            log.borrow_mut()
                .tables
                .entry(target)
                .or_default()
                .rows
                .push(row);
        });
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

/// Run `f` with the audit subscriber installed for this thread only and
/// return its result together with everything it emitted.
pub fn capture<T>(f: impl FnOnce() -> T) -> (T, AuditLog) {
    clear();
    let out = tracing::subscriber::with_default(AuditSubscriber, f);
    (out, drain())
}

/// Take all recorded events, leaving the log empty.
pub fn drain() -> AuditLog {
    LOG.with(|log| std::mem::take(&mut *log.borrow_mut()))
}

pub fn clear() {
    LOG.with(|log| *log.borrow_mut() = AuditLog::default());
}
