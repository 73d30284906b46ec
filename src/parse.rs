//! Readers for the two inputs: the genetic map and the marker info.
//!
//! Both readers record every marker into a shared [`MarkerRegistry`] through a
//! [`Token`], acquiring it once per record, so the two can run concurrently.
//! They return the layout of their input by marker name; the shared
//! [`crate::marker::Marker`] records are attached once both have finished.
use csv::{ReaderBuilder, Trim};
use genomap::GenomeMap;
use indexmap::IndexMap;
use log::{info, warn};
use serde::Deserialize;
use std::io::{BufRead, Read};

use crate::error::ContigMapError;
use crate::file::InputFile;
use crate::marker::{MapPosition, MarkerRegistry, Position, Weight};
use crate::token::Token;

/// Parse a genetic map position in centiMorgans into fixed-point thousandths.
fn parse_map_position(field: &str) -> Option<MapPosition> {
    let cm: f64 = field.parse().ok()?;
    if !cm.is_finite() || cm < 0.0 {
        return None;
    }
    Some((cm * 1000.0).round() as MapPosition)
}

/// Read a genetic map.
///
/// The genetic map format looks like:
///
/// ```text
/// ; comments start with a semicolon
/// group LG1
/// marker_1    0.000
/// marker_2    1.254
/// group LG2
/// marker_3    0.000
/// ```
///
/// Marker lines are whitespace-delimited; columns after the position are ignored.
/// Positions are rounded to three decimal places. Malformed lines are skipped with a
/// warning, and a marker listed twice keeps its first position.
///
/// Returns the marker names of each linkage group, in file order.
pub fn parse_genetic_map<R: BufRead>(
    reader: R,
    markers: &Token<MarkerRegistry>,
) -> Result<GenomeMap<Vec<String>>, ContigMapError> {
    info!("Reading and parsing map...");
    let mut groups: GenomeMap<Vec<String>> = GenomeMap::new();
    let mut current: Option<String> = None;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }

        let mut fields = line.split_whitespace();
        let Some(first) = fields.next() else {
            continue;
        };

        if first == "group" {
            match fields.next() {
                Some(name) => {
                    if groups.get(name).is_none() {
                        groups.insert(name, Vec::new())?;
                    }
                    current = Some(name.to_string());
                }
                None => warn!("line {}: group line without a name, skipped", line_number),
            }
            continue;
        }

        let Some(lg) = &current else {
            warn!("line {}: marker '{}' before any group, skipped", line_number, first);
            continue;
        };
        let Some(gen_pos) = fields.next().and_then(parse_map_position) else {
            warn!("line {}: no valid map position for marker '{}', skipped", line_number, first);
            continue;
        };

        if markers.acquire()?.record_genetic(first, gen_pos, lg) {
            if let Some(group) = groups.get_mut(lg) {
                group.push(first.to_string());
            }
        } else {
            warn!("line {}: marker '{}' already on the map, skipped", line_number, first);
        }
    }

    info!("Finished with map: {} linkage groups", groups.len());
    Ok(groups)
}

/// Read a genetic map from a (possibly gzip-compressed) file.
pub fn read_genetic_map(
    filepath: &str,
    markers: &Token<MarkerRegistry>,
) -> Result<GenomeMap<Vec<String>>, ContigMapError> {
    let reader = InputFile::new(filepath).reader()?;
    parse_genetic_map(reader, markers)
}

#[derive(Debug, Deserialize)]
struct MarkerInfoEntry {
    marker: String,
    contig: String,
    position: String,
    weight: Weight,
}

/// Read marker info: the contig and position of each marker, and its weight.
///
/// The marker info format is headerless and tab-delimited:
///
/// ```text
/// marker_1    contig_7    1520.0    12
/// marker_2    contig_7    88041.0   9
/// ```
///
/// Only the integer part of the position is kept. Malformed records are skipped with
/// a warning, and a marker listed twice keeps its first placement.
///
/// Returns the marker names on each contig, in file order.
pub fn parse_marker_info<R: Read>(
    reader: R,
    markers: &Token<MarkerRegistry>,
) -> Result<IndexMap<String, Vec<String>>, ContigMapError> {
    info!("Reading and parsing marker info...");
    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut contigs: IndexMap<String, Vec<String>> = IndexMap::new();

    for (index, result) in rdr.deserialize::<MarkerInfoEntry>().enumerate() {
        let record_number = index + 1;
        let entry = match result {
            Ok(entry) => entry,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                warn!("record {}: {}, skipped", record_number, e);
                continue;
            }
        };

        let position = entry.position.split('.').next().unwrap_or_default();
        let Ok(con_pos) = position.parse::<Position>() else {
            warn!(
                "record {}: invalid contig position '{}' for marker '{}', skipped",
                record_number, entry.position, entry.marker
            );
            continue;
        };

        let recorded = markers.acquire()?.record_placement(
            &entry.marker,
            &entry.contig,
            con_pos,
            entry.weight,
        );
        if recorded {
            contigs.entry(entry.contig).or_default().push(entry.marker);
        } else {
            warn!(
                "record {}: marker '{}' already placed on a contig, skipped",
                record_number, entry.marker
            );
        }
    }

    info!("Finished reading marker info: {} contigs", contigs.len());
    Ok(contigs)
}

/// Read marker info from a (possibly gzip-compressed) file.
pub fn read_marker_info(
    filepath: &str,
    markers: &Token<MarkerRegistry>,
) -> Result<IndexMap<String, Vec<String>>, ContigMapError> {
    let reader = InputFile::new(filepath).reader()?;
    parse_marker_info(reader, markers)
}
