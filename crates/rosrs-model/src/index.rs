//! Bidirectional target ↔ annotation index.
//!
//! Both directions are kept in lock step so cascade-on-delete is a
//! single function per mutation kind rather than removal calls
//! scattered over the aggregate.

use std::collections::{BTreeMap, BTreeSet};

use url::Url;

#[derive(Debug, Clone, Default)]
pub struct AnnotationIndex {
    by_target: BTreeMap<Url, BTreeSet<Url>>,
    by_annotation: BTreeMap<Url, BTreeSet<Url>>,
}

/// Outcome of removing a target key from the index.
#[derive(Debug, Default)]
pub struct TargetRemoval {
    /// Annotations that had the removed target.
    pub touched: Vec<Url>,
    /// Annotations whose target set became empty and were dropped from
    /// the index entirely.
    pub orphaned: Vec<Url>,
}

impl AnnotationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, annotation: &Url, target: &Url) {
        self.by_target
            .entry(target.clone())
            .or_default()
            .insert(annotation.clone());
        self.by_annotation
            .entry(annotation.clone())
            .or_default()
            .insert(target.clone());
    }

    pub fn annotations_for(&self, target: &Url) -> Option<&BTreeSet<Url>> {
        self.by_target.get(target)
    }

    pub fn targets_of(&self, annotation: &Url) -> Option<&BTreeSet<Url>> {
        self.by_annotation.get(annotation)
    }

    pub fn is_empty(&self) -> bool {
        self.by_target.is_empty() && self.by_annotation.is_empty()
    }

    /// Remove a target key entirely: every annotation loses this target,
    /// and annotations left without any target are dropped from both
    /// directions.
    pub fn remove_target(&mut self, target: &Url) -> TargetRemoval {
        let annotations = self.by_target.remove(target).unwrap_or_default();
        let mut removal = TargetRemoval::default();
        for annotation in annotations {
            let now_empty = match self.by_annotation.get_mut(&annotation) {
                Some(targets) => {
                    targets.remove(target);
                    targets.is_empty()
                }
                None => false,
            };
            if now_empty {
                self.by_annotation.remove(&annotation);
                removal.orphaned.push(annotation.clone());
            }
            removal.touched.push(annotation);
        }
        removal
    }

    /// Remove an annotation from every target bucket it appears in.
    /// Returns the targets it had.
    pub fn remove_annotation(&mut self, annotation: &Url) -> BTreeSet<Url> {
        let targets = self.by_annotation.remove(annotation).unwrap_or_default();
        for target in &targets {
            let now_empty = match self.by_target.get_mut(target) {
                Some(annotations) => {
                    annotations.remove(annotation);
                    annotations.is_empty()
                }
                None => false,
            };
            if now_empty {
                self.by_target.remove(target);
            }
        }
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn sole_target_removal_orphans_the_annotation() {
        let mut index = AnnotationIndex::new();
        let a1 = url("http://example.org/ann/1");
        let r1 = url("http://example.org/r1");
        index.insert(&a1, &r1);

        let removal = index.remove_target(&r1);
        assert_eq!(removal.touched, vec![a1.clone()]);
        assert_eq!(removal.orphaned, vec![a1.clone()]);
        assert!(index.is_empty());
    }

    #[test]
    fn shared_annotation_survives_under_remaining_targets() {
        let mut index = AnnotationIndex::new();
        let a1 = url("http://example.org/ann/1");
        let r1 = url("http://example.org/r1");
        let ro = url("http://example.org/ro/");
        index.insert(&a1, &r1);
        index.insert(&a1, &ro);

        let removal = index.remove_target(&r1);
        assert_eq!(removal.touched, vec![a1.clone()]);
        assert!(removal.orphaned.is_empty());
        assert!(index.annotations_for(&r1).is_none());
        assert!(index.annotations_for(&ro).unwrap().contains(&a1));
        assert_eq!(
            index.targets_of(&a1).unwrap().iter().collect::<Vec<_>>(),
            vec![&ro]
        );
    }

    #[test]
    fn annotation_removal_leaves_other_annotations_in_the_bucket() {
        let mut index = AnnotationIndex::new();
        let a1 = url("http://example.org/ann/1");
        let a2 = url("http://example.org/ann/2");
        let r1 = url("http://example.org/r1");
        index.insert(&a1, &r1);
        index.insert(&a2, &r1);

        let targets = index.remove_annotation(&a1);
        assert!(targets.contains(&r1));
        assert!(index.targets_of(&a1).is_none());
        assert!(index.annotations_for(&r1).unwrap().contains(&a2));
    }

    #[test]
    fn removing_an_unknown_key_is_a_no_op() {
        let mut index = AnnotationIndex::new();
        let removal = index.remove_target(&url("http://example.org/none"));
        assert!(removal.touched.is_empty());
        assert!(index.remove_annotation(&url("http://example.org/none")).is_empty());
    }
}
