//! Optional capabilities shared by unrelated element types.
//!
//! Each capability is a small struct embedded in the node that uses it plus a
//! trait exposing it, so every instance owns its own storage.

use chrono::NaiveDateTime;

use crate::clinical::{Annotation, Flag, FlagValue};
use crate::element::{Attributes, Element, format_datetime};
use crate::error::Result;
use crate::sink::XmlSink;

/// Codelist milestone labels are filed under when none is given.
pub const DEFAULT_MILESTONE_CODELIST: &str = "MILESTONES";

/// Optional `mdsol:LastUpdateTime` attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LastUpdate(Option<NaiveDateTime>);

impl LastUpdate {
    pub fn get(&self) -> Option<NaiveDateTime> {
        self.0
    }

    pub fn set(&mut self, at: NaiveDateTime) {
        self.0 = Some(at);
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    pub(crate) fn apply(&self, attributes: Attributes) -> Attributes {
        attributes.with_opt("mdsol:LastUpdateTime", self.0.as_ref().map(format_datetime))
    }
}

/// Elements that may carry a last-update timestamp.
pub trait LastUpdateTime {
    fn last_update(&self) -> &LastUpdate;

    fn last_update_mut(&mut self) -> &mut LastUpdate;

    fn last_update_time(&self) -> Option<NaiveDateTime> {
        self.last_update().get()
    }

    fn set_last_update_time(&mut self, at: NaiveDateTime) -> &mut Self {
        self.last_update_mut().set(at);
        self
    }
}

/// Milestone labels grouped by codelist, in first-added order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Milestones {
    by_codelist: Vec<(String, Vec<String>)>,
}

impl Milestones {
    /// Adds a label; a label already filed under the codelist is ignored.
    pub fn add(&mut self, milestone: impl Into<String>, codelist_oid: &str) {
        let milestone = milestone.into();
        let position = self
            .by_codelist
            .iter()
            .position(|(codelist, _)| codelist == codelist_oid);
        let labels = match position {
            Some(index) => &mut self.by_codelist[index].1,
            None => {
                self.by_codelist.push((codelist_oid.to_string(), Vec::new()));
                let last = self.by_codelist.len() - 1;
                &mut self.by_codelist[last].1
            }
        };
        if !labels.contains(&milestone) {
            labels.push(milestone);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.by_codelist.is_empty()
    }

    /// `(codelist, label)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_codelist.iter().flat_map(|(codelist, labels)| {
            labels
                .iter()
                .map(move |label| (codelist.as_str(), label.as_str()))
        })
    }

    /// The synthetic annotation the labels are written as.
    ///
    /// Built fresh on each call, so building a tree never mutates it.
    pub fn to_annotation(&self) -> Option<Annotation> {
        if self.is_empty() {
            return None;
        }
        let mut annotation = Annotation::new();
        for (codelist, label) in self.iter() {
            annotation
                .flags
                .push(Flag::new(FlagValue::new(label, codelist)));
        }
        Some(annotation)
    }

    pub(crate) fn build(&self, sink: &mut dyn XmlSink) -> Result<()> {
        match self.to_annotation() {
            Some(annotation) => annotation.build(sink),
            None => Ok(()),
        }
    }
}

/// Elements that accumulate milestone labels.
pub trait HasMilestones {
    fn milestones(&self) -> &Milestones;

    fn milestones_mut(&mut self) -> &mut Milestones;

    /// Files `milestone` under `codelist_oid`, or under
    /// [`DEFAULT_MILESTONE_CODELIST`] when none is given.
    fn add_milestone(&mut self, milestone: impl Into<String>, codelist_oid: Option<&str>) -> &mut Self {
        self.milestones_mut().add(
            milestone,
            codelist_oid.unwrap_or(DEFAULT_MILESTONE_CODELIST),
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::EventLog;

    #[test]
    fn milestones_group_by_codelist_and_ignore_duplicates() {
        let mut milestones = Milestones::default();
        milestones.add("Randomized", "MILESTONES");
        milestones.add("Screened", "OTHER");
        milestones.add("Randomized", "MILESTONES");
        milestones.add("Completed", "MILESTONES");

        let pairs: Vec<_> = milestones.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("MILESTONES", "Randomized"),
                ("MILESTONES", "Completed"),
                ("OTHER", "Screened"),
            ]
        );
    }

    #[test]
    fn milestone_annotation_is_rebuilt_each_time() {
        let mut milestones = Milestones::default();
        milestones.add("Randomized", DEFAULT_MILESTONE_CODELIST);

        let mut first = EventLog::new();
        milestones.build(&mut first).unwrap();
        let mut second = EventLog::new();
        milestones.build(&mut second).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.start_tags(), vec!["Annotation", "Flag", "FlagValue"]);
        assert_eq!(
            first.attributes_of("FlagValue").unwrap().get("CodeListOID"),
            Some("MILESTONES")
        );
    }

    #[test]
    fn empty_milestones_emit_nothing() {
        let mut log = EventLog::new();
        Milestones::default().build(&mut log).unwrap();
        assert!(log.events().is_empty());
    }
}
