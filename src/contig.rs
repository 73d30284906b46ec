//! Per-contig placement on the genetic map.
//!
//! [`Contig::complete`] runs the full placement of one contig:
//!
//!  1. assign a linkage group from the highest-weight ("top") markers,
//!  2. average the weights of the markers on that linkage group,
//!  3. take the weight-weighted mean of their genetic positions,
//!  4. orient the contig (see [`crate::orient`]),
//!  5. compute the genetic range the contig spans.
//!
//! Any step may leave the contig unplaceable, after which the remaining steps
//! do nothing.
use indexmap::{IndexMap, IndexSet};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::marker::{MapPosition, Marker, Position, Weight};
use crate::numeric::{mean, weighted_mean};
use crate::orient::{orient_markers, Strand};

/// Linkage group name given to contigs that cannot be placed.
pub const UNPLACED: &str = "-";

/// Why a contig could not be placed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContigError {
    #[error("contig has no markers on the genetic map")]
    NoMarkers,
    #[error("top markers span several linkage groups")]
    MixedLinkageGroups,
    #[error("no markers on linkage group '{0}' to average")]
    EmptyAverage(String),
    #[error("markers on linkage group '{0}' have zero total weight")]
    ZeroWeight(String),
    #[error("top markers all share one genetic position")]
    SinglePosition,
    #[error("markers disagree on orientation")]
    ConflictingOrientation,
}

#[derive(Debug, Clone)]
pub struct Contig {
    pub name: String,
    markers: IndexMap<String, Arc<Marker>>,
    /// Weighted mean genetic position.
    pub gen_pos: MapPosition,
    pub avg_weight: Weight,
    pub orientation: Strand,
    /// The lowest and highest genetic position markers spanned by the contig.
    pub range: Option<[Arc<Marker>; 2]>,
    /// Assigned linkage group: empty until assigned, [`UNPLACED`] if unplaceable.
    pub lg: String,
    pub placeable: bool,
    /// The reason the contig became unplaceable, if any.
    pub failure: Option<ContigError>,
}

impl Contig {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            markers: IndexMap::new(),
            gen_pos: 0,
            avg_weight: 0,
            orientation: Strand::Unknown,
            range: None,
            lg: String::new(),
            placeable: true,
            failure: None,
        }
    }

    pub fn add_markers<I>(&mut self, markers: I)
    where
        I: IntoIterator<Item = Arc<Marker>>,
    {
        for marker in markers {
            self.markers.insert(marker.name.clone(), marker);
        }
    }

    pub fn markers(&self) -> impl Iterator<Item = &Arc<Marker>> {
        self.markers.values()
    }

    /// Return the number of markers on the contig.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn fail(&mut self, error: ContigError) {
        self.placeable = false;
        self.failure = Some(error);
    }

    /// Complete markers on the assigned linkage group, or all complete markers
    /// if none is assigned yet.
    fn candidates(&self) -> impl Iterator<Item = &Arc<Marker>> {
        self.markers
            .values()
            .filter(|m| m.is_complete())
            .filter(move |m| self.lg.is_empty() || m.lg == self.lg)
    }

    /// The complete markers sharing the assigned linkage group.
    fn lg_markers(&self) -> impl Iterator<Item = &Arc<Marker>> {
        self.markers
            .values()
            .filter(move |m| m.is_complete() && m.lg == self.lg)
    }

    /// The maximum-weight markers, ties included. Once a linkage group is
    /// assigned only markers on it are considered.
    pub fn top(&self) -> Vec<Arc<Marker>> {
        let Some(max_weight) = self.candidates().map(|m| m.weight).max() else {
            return Vec::new();
        };
        self.candidates()
            .filter(|m| m.weight == max_weight)
            .cloned()
            .collect()
    }

    /// The maximum weight over all markers.
    pub fn max_weight(&self) -> Weight {
        self.markers.values().map(|m| m.weight).max().unwrap_or(0)
    }

    /// The mean contig position of the markers on the assigned linkage group.
    pub fn centre_pos(&self) -> Result<Position, ContigError> {
        mean(self.lg_markers().map(|m| m.con_pos))
            .ok_or_else(|| ContigError::EmptyAverage(self.lg.clone()))
    }

    /// Assign the linkage group shared by all top markers.
    pub fn assign_lg(&mut self) -> &str {
        if !self.placeable {
            self.lg = UNPLACED.to_string();
            return &self.lg;
        }
        let groups: IndexSet<String> = self.top().iter().map(|m| m.lg.clone()).collect();
        match groups.len() {
            1 => {
                self.lg = groups.into_iter().next().unwrap_or_default();
            }
            n => {
                self.fail(if n == 0 {
                    ContigError::NoMarkers
                } else {
                    ContigError::MixedLinkageGroups
                });
                self.lg = UNPLACED.to_string();
            }
        }
        &self.lg
    }

    /// Average the weights of the markers on the assigned linkage group,
    /// truncating. Unplaceable contigs average to zero.
    pub fn calculate_avg_weight(&mut self) -> Result<Weight, ContigError> {
        if self.lg.is_empty() {
            self.assign_lg();
        }
        if !self.placeable {
            self.avg_weight = 0;
            return Ok(0);
        }
        match mean(self.lg_markers().map(|m| m.weight)) {
            Some(avg_weight) => {
                self.avg_weight = avg_weight;
                Ok(avg_weight)
            }
            None => {
                let error = ContigError::EmptyAverage(self.lg.clone());
                self.fail(error.clone());
                Err(error)
            }
        }
    }

    /// The weight-weighted mean genetic position of the markers on the
    /// assigned linkage group, truncating.
    pub fn calculate_map_pos(&mut self) -> Result<MapPosition, ContigError> {
        if self.lg.is_empty() {
            self.assign_lg();
        }
        if !self.placeable {
            return Ok(0);
        }
        match weighted_mean(self.lg_markers().map(|m| (m.gen_pos, m.weight))) {
            Some(gen_pos) => {
                self.gen_pos = gen_pos;
                Ok(gen_pos)
            }
            None => {
                let error = ContigError::ZeroWeight(self.lg.clone());
                self.fail(error.clone());
                Err(error)
            }
        }
    }

    /// Orient the contig from its top markers.
    ///
    /// Returns `None`, and makes the contig unplaceable, if there is not
    /// enough information or the markers conflict.
    pub fn orient(&mut self) -> Option<Strand> {
        if !self.placeable {
            return None;
        }
        let mut top = self.top();
        let positions: IndexSet<MapPosition> = top.iter().map(|m| m.gen_pos).collect();

        if top.len() == self.markers.len() && positions.len() == 1 {
            self.fail(ContigError::SinglePosition);
            return None;
        }

        if top.len() == 1 || positions.len() == 1 {
            // compare against the contig's weighted centre
            let centre = match self.centre_pos() {
                Ok(centre) => centre,
                Err(error) => {
                    self.fail(error);
                    return None;
                }
            };
            top.push(Arc::new(Marker::synthetic(centre, self.gen_pos, 0)));
        }

        let strand = orient_markers(top.iter().map(|m| m.as_ref()));
        match strand {
            Some(strand) => self.orientation = strand,
            None => {
                self.orientation = Strand::Unknown;
                self.fail(ContigError::ConflictingOrientation);
            }
        }
        strand
    }

    /// Set the genetic range spanned by the contig.
    pub fn calculate_range(&mut self) {
        if !self.placeable {
            return;
        }
        let positions: IndexSet<MapPosition> = self.markers.values().map(|m| m.gen_pos).collect();
        let centre = Arc::new(Marker::synthetic(0, self.gen_pos, self.max_weight()));

        if positions.len() <= 1 {
            self.range = Some([centre.clone(), centre]);
            return;
        }

        let mut top = self.top();
        if top.len() == 1 {
            top.push(centre);
        }
        top.sort_by_key(|m| m.gen_pos);
        if let (Some(first), Some(last)) = (top.first(), top.last()) {
            self.range = Some([first.clone(), last.clone()]);
        }
    }

    /// Genetic position where the contig's range starts.
    pub fn range_start(&self) -> Option<MapPosition> {
        self.range.as_ref().map(|[start, _]| start.gen_pos)
    }

    /// Genetic position where the contig's range ends.
    pub fn range_end(&self) -> Option<MapPosition> {
        self.range.as_ref().map(|[_, end]| end.gen_pos)
    }

    /// Place the contig, returning a human-readable trace of each step.
    pub fn complete(&mut self) -> String {
        let mut trace = vec![format!("Processing contig {}", self.name)];
        let lg = self.assign_lg().to_string();
        trace.push(format!("Assigning LG = {}", lg));

        match self.calculate_avg_weight() {
            Ok(avg_weight) => trace.push(format!("Calculating Avg weight = {}", avg_weight)),
            Err(e) => trace.push(format!("Calculating Avg weight failed: {}", e)),
        }
        match self.calculate_map_pos() {
            Ok(gen_pos) => trace.push(format!("Calculating Map Position = {}", gen_pos)),
            Err(e) => trace.push(format!("Calculating Map Position failed: {}", e)),
        }

        let strand = self.orient();
        trace.push(format!(
            "Orienting contig = {} {}",
            strand.unwrap_or_default(),
            strand.is_some()
        ));

        self.calculate_range();
        trace.push(format!("Placeable = {}", self.placeable));
        if let Some(failure) = &self.failure {
            trace.push(format!("Reason = {}", failure));
        }
        trace.join("\n\t")
    }
}

impl fmt::Display for Contig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ Name: {}, Placeable: {}, Markers: {}, GenPos: {}, AvgWeight: {}, Orientation: {}, LG: {}",
            self.name,
            self.placeable,
            self.markers.len(),
            self.gen_pos,
            self.avg_weight,
            self.orientation,
            self.lg
        )?;
        match (self.range_start(), self.range_end()) {
            (Some(start), Some(end)) => write!(f, ", Range: [ {}, {} ] }}", start, end),
            _ => write!(f, ", Range: [ ] }}"),
        }
    }
}
