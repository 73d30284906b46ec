//! Contigs placed on one linkage group, and the pseudomolecule built from them.
//!
//! Placed contigs are bucketed by genetic position. [`LinkageGroupMap::filter_contigs`]
//! keeps at most one representative contig with a non-zero range per bucket and
//! removes representatives whose range is contained in an earlier one, keeping
//! the better-supported contig of each overlapping pair.
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::contig::Contig;
use crate::marker::{MapPosition, Marker, Weight};
use crate::order::OrderedBy;

/// The fields of a contig the filter decides on.
#[derive(Debug)]
struct Candidate {
    name: String,
    avg_weight: Weight,
    range_end: MapPosition,
    zero_width: bool,
    eligible: bool,
}

impl Candidate {
    fn new(contig: &Contig, lg: &str) -> Self {
        Self {
            name: contig.name.clone(),
            avg_weight: contig.avg_weight,
            range_end: contig.range_end().unwrap_or(contig.gen_pos),
            zero_width: contig.range_start() == contig.range_end(),
            eligible: contig.placeable && contig.lg == lg,
        }
    }
}

#[derive(Debug, Default)]
pub struct LinkageGroupMap {
    pub name: String,
    markers: IndexMap<String, Arc<Marker>>,
    contigs: IndexMap<String, Contig>,
    dropped: HashSet<String>,
    deleted: usize,
    filtered: bool,
}

impl LinkageGroupMap {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
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

    /// Add contigs to the map. Contigs already removed by filtering are ignored.
    pub fn add_contigs<I>(&mut self, contigs: I)
    where
        I: IntoIterator<Item = Contig>,
    {
        for contig in contigs {
            if self.dropped.contains(&contig.name) {
                continue;
            }
            self.contigs.insert(contig.name.clone(), contig);
        }
    }

    pub fn markers(&self) -> impl Iterator<Item = &Arc<Marker>> {
        self.markers.values()
    }

    pub fn contigs(&self) -> impl Iterator<Item = &Contig> {
        self.contigs.values()
    }

    pub fn contig(&self, name: &str) -> Option<&Contig> {
        self.contigs.get(name)
    }

    pub fn is_filtered(&self) -> bool {
        self.filtered
    }

    /// The total number of contigs removed by filtering.
    pub fn deleted(&self) -> usize {
        self.deleted
    }

    /// Group the contigs by genetic position: the start of their range before
    /// filtering, their weighted position afterwards.
    pub fn build_buckets(&self) -> BTreeMap<MapPosition, Vec<&Contig>> {
        let mut buckets: BTreeMap<MapPosition, Vec<&Contig>> = BTreeMap::new();
        for contig in self.contigs.values() {
            let key = if self.filtered {
                contig.gen_pos
            } else {
                contig.range_start().unwrap_or(contig.gen_pos)
            };
            buckets.entry(key).or_default().push(contig);
        }
        buckets
    }

    fn drop_contig(&mut self, name: &str) -> usize {
        self.dropped.insert(name.to_string());
        usize::from(self.contigs.shift_remove(name).is_some())
    }

    /// Remove misplaced and conflicting contigs, returning how many were removed.
    pub fn filter_contigs(&mut self) -> usize {
        let buckets: Vec<Vec<Candidate>> = {
            let order = OrderedBy::new()
                .then(|c1: &&Contig, c2: &&Contig| c2.avg_weight.cmp(&c1.avg_weight))
                // compares c1 with itself, so never decides
                .then(|c1: &&Contig, _: &&Contig| c1.range_end().cmp(&c1.range_end()))
                .then(|c1: &&Contig, c2: &&Contig| c1.name.cmp(&c2.name));

            self.build_buckets()
                .into_values()
                .map(|mut contigs| {
                    order.sort(&mut contigs);
                    contigs
                        .iter()
                        .map(|contig| Candidate::new(contig, &self.name))
                        .collect()
                })
                .collect()
        };

        let mut removed = 0;
        let mut previous: Option<Candidate> = None;
        for bucket in buckets {
            let mut representative: Option<Candidate> = None;
            for candidate in bucket {
                if !candidate.eligible {
                    removed += self.drop_contig(&candidate.name);
                    continue;
                }
                // a single point cannot conflict within its bucket
                if candidate.zero_width {
                    continue;
                }
                match &representative {
                    None => representative = Some(candidate),
                    Some(rep)
                        if rep.avg_weight == candidate.avg_weight
                            && rep.range_end == candidate.range_end =>
                    {
                        removed += self.drop_contig(&rep.name);
                        removed += self.drop_contig(&candidate.name);
                        representative = None;
                    }
                    Some(_) => removed += self.drop_contig(&candidate.name),
                }
            }

            let Some(current) = representative else {
                continue;
            };
            previous = match previous.take() {
                None => Some(current),
                Some(prev) if current.range_end > prev.range_end => Some(current),
                Some(prev) => match current.avg_weight.cmp(&prev.avg_weight) {
                    Ordering::Less => {
                        removed += self.drop_contig(&current.name);
                        Some(prev)
                    }
                    Ordering::Greater => {
                        removed += self.drop_contig(&prev.name);
                        Some(current)
                    }
                    Ordering::Equal => {
                        removed += self.drop_contig(&prev.name);
                        removed += self.drop_contig(&current.name);
                        Some(current)
                    }
                },
            };
        }

        self.filtered = true;
        self.deleted += removed;
        removed
    }

    /// Filter the contigs and render the pseudomolecule as text: a header naming
    /// the linkage group and the number of removed contigs, followed by one
    /// `name<TAB>position<TAB>orientation` line per contig in map order.
    pub fn write_map(&mut self) -> String {
        let deleted = self.filter_contigs();
        let mut out = format!(
            "### LG: {}\n### Deleted Sequences: {}\n",
            self.name, deleted
        );
        for mut contigs in self.build_buckets().into_values() {
            contigs.sort_by(|c1, c2| c1.name.cmp(&c2.name));
            for contig in contigs {
                out.push_str(&format!(
                    "{}\t{}\t{}\n",
                    contig.name, contig.gen_pos, contig.orientation
                ));
            }
        }
        out
    }
}

impl fmt::Display for LinkageGroupMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ Name: {}, Filtered: {}, Markers: {}, Contigs: {} }}",
            self.name,
            self.filtered,
            self.markers.len(),
            self.contigs.len()
        )
    }
}
