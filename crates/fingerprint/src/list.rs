//! Ordered annotation lists
//!
//! Order is significant: it is the on-disk order of the minutiae, and the
//! index column is not required to follow it.

use crate::annotation::{Annotation, AnnotationKind, ColumnValue, FormatSpec};
use nist_core::{Location, NistError, Result};
use serde_json::Value;
use std::cmp::Ordering;
use tracing::debug;

/// Ordered sequence of annotations of one kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnnotationList {
    kind: AnnotationKind,
    items: Vec<Annotation>,
}

impl AnnotationList {
    /// Empty list
    pub fn new(kind: AnnotationKind) -> Self {
        AnnotationList {
            kind,
            items: Vec::new(),
        }
    }

    /// One annotation per row, columns named by `spec`.
    ///
    /// Without an `i` column in `spec`, annotations are numbered from 1 in
    /// row order.
    ///
    /// # Errors
    ///
    /// `FormatMismatch` for the first row whose length differs from `spec`.
    pub fn from_list(rows: &[Vec<ColumnValue>], spec: &FormatSpec, kind: AnnotationKind) -> Result<Self> {
        let mut items = Vec::with_capacity(rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            if row.len() != spec.len() {
                return Err(NistError::FormatMismatch {
                    location: Location::unknown(),
                    row: row_index,
                    expected: spec.len(),
                    actual: row.len(),
                });
            }
            let mut annotation = Annotation::new(kind);
            for (&column, value) in spec.columns().iter().zip(row) {
                annotation.set(column, value.clone());
            }
            if !spec.contains('i') {
                annotation.set('i', row_index as i64 + 1);
            }
            items.push(annotation);
        }
        Ok(AnnotationList { kind, items })
    }

    /// Rows in the column order of `spec`.
    ///
    /// # Errors
    ///
    /// `MissingColumn` when an annotation has neither the column nor a default.
    pub fn to_list(&self, spec: &FormatSpec) -> Result<Vec<Vec<ColumnValue>>> {
        self.items.iter().map(|a| a.project(spec)).collect()
    }

    /// Kind of the annotations
    pub fn kind(&self) -> AnnotationKind {
        self.kind
    }

    /// Number of annotations
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// No annotation?
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Annotations in order
    pub fn iter(&self) -> std::slice::Iter<'_, Annotation> {
        self.items.iter()
    }

    /// Annotations in order, mutable
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Annotation> {
        self.items.iter_mut()
    }

    /// Annotation at `index`
    pub fn get(&self, index: usize) -> Option<&Annotation> {
        self.items.get(index)
    }

    /// Append an annotation
    pub fn push(&mut self, annotation: Annotation) {
        self.items.push(annotation);
    }

    /// Remove every annotation equal to `annotation`; returns how many.
    pub fn remove(&mut self, annotation: &Annotation) -> usize {
        let before = self.items.len();
        self.items.retain(|a| a != annotation);
        before - self.items.len()
    }

    /// Annotations whose type designator is one of `designators`.
    pub fn get_by_type(&self, designators: &str) -> AnnotationList {
        AnnotationList {
            kind: self.kind,
            items: self
                .items
                .iter()
                .filter(|a| match a.designator() {
                    Some(d) => !d.is_empty() && designators.contains(d.as_str()),
                    None => false,
                })
                .cloned()
                .collect(),
        }
    }

    /// Keep the annotations matching `keep`; returns how many were dropped.
    pub fn retain(&mut self, keep: impl FnMut(&Annotation) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(keep);
        before - self.items.len()
    }

    /// Annotations carrying a pairing name
    pub fn get_paired(&self) -> AnnotationList {
        let mut paired = self.clone();
        paired.retain(|a| a.pairing_name().is_some());
        paired
    }

    /// Annotations paired under one of `names`, in list order.
    pub fn get_by_pairing_name(&self, names: &[&str]) -> AnnotationList {
        let mut found = self.clone();
        found.retain(|a| match a.pairing_name() {
            Some(n) => names.contains(&n.as_str()),
            None => false,
        });
        found
    }

    /// Clear the pairing of the annotations paired under one of `names`;
    /// returns how many were unpaired.
    pub fn unpair(&mut self, names: &[&str]) -> usize {
        let mut cleared = 0;
        for a in &mut self.items {
            if a.pairing_name().map_or(false, |n| names.contains(&n.as_str())) {
                a.unset('n');
                cleared += 1;
            }
        }
        cleared
    }

    /// Sort in place by distance to `point`, closest first.
    ///
    /// Annotations without coordinates go last, in their current order.
    pub fn sort_by_distance(&mut self, point: (f64, f64)) {
        self.items.sort_by(|a, b| {
            match (a.distance_to(point), b.distance_to(point)) {
                (Some(da), Some(db)) => da.total_cmp(&db),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        });
    }

    /// The `n` annotations closest to `point`, closest first
    pub fn n_closest(&self, n: usize, point: (f64, f64)) -> AnnotationList {
        let mut sorted = self.clone();
        sorted.sort_by_distance(point);
        sorted.items.truncate(n);
        sorted
    }

    /// The `n` annotations furthest from `point`, in ascending distance
    pub fn n_furthest(&self, n: usize, point: (f64, f64)) -> AnnotationList {
        let mut sorted = self.clone();
        sorted.sort_by_distance(point);
        let skip = sorted.items.len().saturating_sub(n);
        sorted.items.drain(..skip);
        sorted
    }

    /// Shift every annotation by (`dx`, `dy`)
    pub fn offset(&mut self, dx: f64, dy: f64) {
        for a in &mut self.items {
            a.offset(dx, dy);
        }
    }

    /// Drop annotations outside `[0, width] x [0, height]` and renumber the
    /// rest from 1. Returns the number dropped.
    pub fn retain_within(&mut self, width: f64, height: f64) -> usize {
        let before = self.items.len();
        self.items.retain(|a| match (a.x(), a.y()) {
            (Some(x), Some(y)) => (0.0..=width).contains(&x) && (0.0..=height).contains(&y),
            _ => false,
        });
        for (n, a) in self.items.iter_mut().enumerate() {
            a.set('i', n as i64 + 1);
        }
        let dropped = before - self.items.len();
        if dropped > 0 {
            debug!(target: "nist::fingerprint", dropped, kept = self.items.len(), "Dropped annotations outside the image");
        }
        dropped
    }

    /// JSON array of the annotations' stored columns
    pub fn to_json(&self) -> Value {
        Value::Array(self.items.iter().map(Annotation::to_json).collect())
    }
}

impl<'a> IntoIterator for &'a AnnotationList {
    type Item = &'a Annotation;
    type IntoIter = std::slice::Iter<'a, Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<Annotation> for AnnotationList {
    fn from_iter<I: IntoIterator<Item = Annotation>>(iter: I) -> Self {
        let items: Vec<Annotation> = iter.into_iter().collect();
        let kind = items.first().map(Annotation::kind).unwrap_or_default();
        AnnotationList { kind, items }
    }
}
