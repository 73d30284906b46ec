use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// The integer type for positions within a contig, in basepairs.
pub type Position = u64;

/// The integer type for genetic map positions, in centiMorgans × 1000.
pub type MapPosition = u64;

/// The integer type for marker weights. Higher weights mean less missing data.
pub type Weight = u64;

/// A genetic marker, placed both on the genetic map and on a contig.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Marker {
    pub name: String,
    /// Position within the contig.
    pub con_pos: Position,
    /// Position on the genetic map, fixed-point centiMorgans × 1000.
    pub gen_pos: MapPosition,
    pub weight: Weight,
    /// Linkage group name, empty until the genetic map assigns one.
    pub lg: String,
    /// Owning contig name, empty until the marker info assigns one.
    pub contig: String,
}

impl Marker {
    /// An unnamed marker used as an extra comparison or range point.
    pub fn synthetic(con_pos: Position, gen_pos: MapPosition, weight: Weight) -> Self {
        Self {
            con_pos,
            gen_pos,
            weight,
            ..Self::default()
        }
    }

    /// Whether both the genetic map and the marker info have described this marker.
    pub fn is_complete(&self) -> bool {
        !self.lg.is_empty() && !self.contig.is_empty()
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ Name: {}, ConPos: {}, GenPos: {}, Weight: {}, LG: {}, Contig: {} }}",
            self.name, self.con_pos, self.gen_pos, self.weight, self.lg, self.contig
        )
    }
}

/// The registry of all markers seen while reading the inputs.
///
/// Both input producers write into the same registry; the first one to see a
/// marker creates it and the other fills in its own fields.
#[derive(Debug, Default)]
pub struct MarkerRegistry {
    markers: IndexMap<String, Marker>,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, name: &str) -> &mut Marker {
        self.markers
            .entry(name.to_string())
            .or_insert_with(|| Marker {
                name: name.to_string(),
                ..Marker::default()
            })
    }

    /// Record the genetic map position of a marker.
    ///
    /// Returns `false` and leaves the marker untouched if it already has a
    /// linkage group.
    pub fn record_genetic(&mut self, name: &str, gen_pos: MapPosition, lg: &str) -> bool {
        let marker = self.entry(name);
        if !marker.lg.is_empty() {
            return false;
        }
        marker.gen_pos = gen_pos;
        marker.lg = lg.to_string();
        true
    }

    /// Record the contig placement of a marker.
    ///
    /// Returns `false` and leaves the marker untouched if it already has a contig.
    pub fn record_placement(
        &mut self,
        name: &str,
        contig: &str,
        con_pos: Position,
        weight: Weight,
    ) -> bool {
        let marker = self.entry(name);
        if !marker.contig.is_empty() {
            return false;
        }
        marker.contig = contig.to_string();
        marker.con_pos = con_pos;
        marker.weight = weight;
        true
    }

    pub fn get(&self, name: &str) -> Option<&Marker> {
        self.markers.get(name)
    }

    /// Return the number of markers in the registry.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Return if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the markers, in the order they were first seen.
    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.values()
    }

    /// Finish ingestion, turning every marker into a shared immutable record.
    pub fn freeze(self) -> SharedMarkers {
        SharedMarkers {
            markers: self
                .markers
                .into_iter()
                .map(|(name, marker)| (name, Arc::new(marker)))
                .collect(),
        }
    }
}

/// Markers after ingestion, shared between contigs and linkage groups.
#[derive(Debug, Default)]
pub struct SharedMarkers {
    markers: IndexMap<String, Arc<Marker>>,
}

impl SharedMarkers {
    pub fn get(&self, name: &str) -> Option<&Arc<Marker>> {
        self.markers.get(name)
    }

    /// Look up each name in `names`, skipping unknown names.
    pub fn resolve<'a, I>(&self, names: I) -> Vec<Arc<Marker>>
    where
        I: IntoIterator<Item = &'a String>,
    {
        names
            .into_iter()
            .filter_map(|name| self.get(name).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_producers_merge_into_one_record() {
        let mut registry = MarkerRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.record_placement("m1", "ctg1", 150, 4));
        assert!(registry.record_genetic("m1", 12_500, "LG1"));
        assert!(registry.record_genetic("m2", 3_000, "LG1"));

        assert_eq!(registry.len(), 2);
        let m1 = registry.get("m1").unwrap();
        assert_eq!(
            *m1,
            Marker {
                name: "m1".to_string(),
                con_pos: 150,
                gen_pos: 12_500,
                weight: 4,
                lg: "LG1".to_string(),
                contig: "ctg1".to_string(),
            }
        );
        assert!(m1.is_complete());
        assert!(!registry.get("m2").unwrap().is_complete());
        assert!(!registry.is_empty());
        let names: Vec<&str> = registry.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["m1", "m2"]);
    }

    #[test]
    fn test_first_assignment_wins() {
        let mut registry = MarkerRegistry::new();
        assert!(registry.record_genetic("m1", 100, "LG1"));
        assert!(!registry.record_genetic("m1", 900, "LG2"));
        assert!(registry.record_placement("m1", "ctg1", 10, 3));
        assert!(!registry.record_placement("m1", "ctg2", 20, 9));

        let m1 = registry.get("m1").unwrap();
        assert_eq!((m1.gen_pos, m1.lg.as_str()), (100, "LG1"));
        assert_eq!((m1.con_pos, m1.weight, m1.contig.as_str()), (10, 3, "ctg1"));
    }

    #[test]
    fn test_freeze_shares_records() {
        let mut registry = MarkerRegistry::new();
        registry.record_genetic("m1", 100, "LG1");
        let shared = registry.freeze();
        let names = vec!["m1".to_string(), "missing".to_string()];
        let resolved = shared.resolve(&names);
        assert_eq!(resolved.len(), 1);
        assert!(Arc::ptr_eq(&resolved[0], shared.get("m1").unwrap()));
    }

    #[test]
    fn test_display() {
        let m = Marker::synthetic(5, 10, 2);
        assert_eq!(
            m.to_string(),
            "{ Name: , ConPos: 5, GenPos: 10, Weight: 2, LG: , Contig:  }"
        );
    }
}
