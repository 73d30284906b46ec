//! Assembly of pseudomolecules from a genetic map and marker info.
//!
//! The run has three stages:
//!
//!  1. the genetic map and the marker info are read concurrently into one
//!     shared marker registry;
//!  2. every contig is placed by its own task, which writes its trace to the
//!     diagnostics sink and registers the contig in its linkage group;
//!  3. every linkage group is filtered and rendered by its own task, which
//!     writes the result to the output.
//!
//! Shared resources (the marker registry, the linkage groups, and both sinks)
//! are only reached through single-owner [`Token`]s. Linkage group blocks are
//! written in whatever order their tasks finish.
use genomap::GenomeMap;
use indexmap::IndexMap;
use log::{debug, info, warn};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::io::{self, BufRead, Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::contig::Contig;
use crate::error::ContigMapError;
use crate::file::{open_writer, InputFile};
use crate::linkage_group::LinkageGroupMap;
use crate::marker::{MarkerRegistry, SharedMarkers};
use crate::parse::{parse_genetic_map, parse_marker_info};
use crate::token::Token;

/// Linkage groups by name, in genetic map order.
pub type LinkageGroups = IndexMap<String, LinkageGroupMap>;

/// Settings for one assembly run.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// The genetic map file.
    pub genetic_map: String,
    /// The marker info file.
    pub marker_info: String,
    /// Where to write the pseudomolecules; standard out if not set.
    pub output: Option<String>,
    /// Where to write per-contig traces; standard error if not set.
    pub trace: Option<String>,
    /// Number of worker threads; 0 lets rayon decide.
    pub threads: usize,
}

/// Counts describing a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub markers: usize,
    pub contigs: usize,
    pub placed: usize,
    pub linkage_groups: usize,
    pub deleted: usize,
}

pub fn build_thread_pool(threads: usize) -> Result<ThreadPool, ContigMapError> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("contigmap-worker-{}", i))
        .build()?;
    Ok(pool)
}

/// Attach the shared markers to each linkage group.
pub fn build_linkage_groups(
    layout: &GenomeMap<Vec<String>>,
    markers: &SharedMarkers,
) -> LinkageGroups {
    layout
        .iter()
        .map(|(name, marker_names)| {
            let mut lg = LinkageGroupMap::new(name);
            lg.add_markers(markers.resolve(marker_names));
            (name.clone(), lg)
        })
        .collect()
}

/// Build each contig from its markers. Markers missing from either input are left out.
pub fn build_contigs(
    layout: &IndexMap<String, Vec<String>>,
    markers: &SharedMarkers,
) -> Vec<Contig> {
    layout
        .iter()
        .map(|(name, marker_names)| {
            let mut contig = Contig::new(name);
            contig.add_markers(
                markers
                    .resolve(marker_names)
                    .into_iter()
                    .filter(|m| m.is_complete()),
            );
            contig
        })
        .collect()
}

/// Place every contig in parallel, registering placeable contigs in their
/// linkage group. Returns the number of contigs registered.
pub fn complete_contigs<W: Write + Send>(
    contigs: Vec<Contig>,
    groups: &Token<LinkageGroups>,
    trace: &Token<W>,
) -> Result<usize, ContigMapError> {
    let placed = AtomicUsize::new(0);
    contigs
        .into_par_iter()
        .try_for_each(|mut contig| -> Result<(), ContigMapError> {
            let report = contig.complete();
            {
                let mut sink = trace.acquire()?;
                writeln!(sink, "{}", report)?;
            }

            if !contig.placeable {
                debug!("contig '{}' is not placeable", contig.name);
                return Ok(());
            }
            let mut groups = groups.acquire()?;
            match groups.get_mut(&contig.lg) {
                Some(lg) => {
                    debug!("contig '{}' registered on {}", contig.name, lg.name);
                    lg.add_contigs([contig]);
                    placed.fetch_add(1, Ordering::Relaxed);
                }
                None => warn!(
                    "contig '{}' assigned to unknown linkage group '{}'",
                    contig.name, contig.lg
                ),
            }
            Ok(())
        })?;
    Ok(placed.into_inner())
}

/// Filter and render every linkage group in parallel. Returns the number of
/// contigs removed by filtering.
pub fn write_maps<W: Write + Send>(
    groups: &mut LinkageGroups,
    output: &Token<W>,
) -> Result<usize, ContigMapError> {
    let deleted: Vec<usize> = groups
        .values_mut()
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|lg| -> Result<usize, ContigMapError> {
            let block = lg.write_map();
            let mut sink = output.acquire()?;
            writeln!(sink, "{}", block)?;
            Ok(lg.deleted())
        })
        .collect::<Result<_, _>>()?;
    Ok(deleted.iter().sum())
}

/// Run the whole assembly on already opened inputs and sinks, on the current
/// rayon thread pool. The sinks are returned once everything is written.
pub fn assemble<M, I, T, O>(
    genetic_map: M,
    marker_info: I,
    trace: T,
    output: O,
) -> Result<(Summary, T, O), ContigMapError>
where
    M: BufRead + Send,
    I: Read + Send,
    T: Write + Send,
    O: Write + Send,
{
    let registry = Token::new("marker registry", MarkerRegistry::new());
    let (map_layout, contig_layout) = rayon::join(
        || parse_genetic_map(genetic_map, &registry),
        || parse_marker_info(marker_info, &registry),
    );
    let (map_layout, contig_layout) = (map_layout?, contig_layout?);
    let markers = registry.into_inner()?.freeze();

    let groups = build_linkage_groups(&map_layout, &markers);
    let contigs = build_contigs(&contig_layout, &markers);
    let mut summary = Summary {
        markers: markers.len(),
        contigs: contigs.len(),
        linkage_groups: groups.len(),
        ..Summary::default()
    };

    info!("Completing {} contigs...", summary.contigs);
    let groups = Token::new("linkage groups", groups);
    let trace = Token::new("diagnostics", trace);
    summary.placed = complete_contigs(contigs, &groups, &trace)?;
    info!("Placed {} of {} contigs", summary.placed, summary.contigs);

    info!("Writing the maps...");
    let mut groups = groups.into_inner()?;
    let output = Token::new("output", output);
    summary.deleted = write_maps(&mut groups, &output)?;
    info!(
        "Wrote {} linkage groups, {} sequences deleted",
        summary.linkage_groups, summary.deleted
    );

    Ok((summary, trace.into_inner()?, output.into_inner()?))
}

/// Open every input and output named in `config`, then run the assembly on a
/// dedicated thread pool.
pub fn run(config: &Config) -> Result<Summary, ContigMapError> {
    let genetic_map = InputFile::new(&config.genetic_map).reader()?;
    let marker_info = InputFile::new(&config.marker_info).reader()?;
    let trace = open_writer(config.trace.as_deref(), || Box::new(io::stderr()))?;
    let output = open_writer(config.output.as_deref(), || Box::new(io::stdout()))?;
    let pool = build_thread_pool(config.threads)?;

    let (summary, mut trace, mut output) =
        pool.install(|| assemble(genetic_map, marker_info, trace, output))?;
    trace.flush()?;
    output.flush()?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const MAP: &str = "\
; two linkage groups
group LG1
m1 1.0
m2 2.0
m3 1.2
m4 1.8
m7 3.0
group LG2
m5 0.5
m6 0.7
m8 0.9
";

    const INFO: &str = "\
m1\tc1\t100.0\t5
m2\tc1\t200.0\t5
m3\tc2\t10.0\t5
m4\tc2\t50.0\t5
m5\tc3\t10.0\t3
m6\tc3\t90.0\t3
m9\tc3\t95.0\t3
m7\tc4\t10.0\t4
m8\tc4\t20.0\t4
";

    fn assemble_text() -> (Summary, String, String) {
        let (summary, trace, output) =
            assemble(MAP.as_bytes(), INFO.as_bytes(), Vec::new(), Vec::new()).unwrap();
        (
            summary,
            String::from_utf8(trace).unwrap(),
            String::from_utf8(output).unwrap(),
        )
    }

    #[test]
    fn test_assemble() {
        let (summary, trace, output) = assemble_text();
        assert_eq!(
            summary,
            Summary {
                markers: 9,
                contigs: 4,
                placed: 3,
                linkage_groups: 2,
                deleted: 2,
            }
        );
        assert!(output.contains("### LG: LG1\n### Deleted Sequences: 2\n\n"));
        assert!(output.contains("### LG: LG2\n### Deleted Sequences: 0\nc3\t600\t+\n\n"));
        assert!(trace.contains("Processing contig c4\n\tAssigning LG = -"));
        assert_eq!(trace.matches("Processing contig").count(), 4);
    }

    #[test]
    fn test_output_does_not_depend_on_scheduling() {
        let blocks = |output: &str| {
            let mut blocks: Vec<String> = output.split("\n\n").map(str::to_string).collect();
            blocks.sort();
            blocks
        };
        let (_, _, expected) = assemble_text();
        for _ in 0..10 {
            let (_, _, output) = assemble_text();
            assert_eq!(blocks(&output), blocks(&expected));
        }
    }

    #[test]
    fn test_run_from_files() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("pseudomolecules.txt");
        let trace = dir.path().join("trace.txt");
        let config = Config {
            genetic_map: "tests/data/genetic_map.txt".to_string(),
            marker_info: "tests/data/marker_info.tsv".to_string(),
            output: Some(output.to_str().unwrap().to_string()),
            trace: Some(trace.to_str().unwrap().to_string()),
            threads: 2,
        };
        let summary = run(&config).unwrap();
        assert_eq!(summary.linkage_groups, 2);
        assert_eq!(summary.deleted, 2);

        let text = fs::read_to_string(&output).unwrap();
        assert!(text.contains("### LG: LG2\n### Deleted Sequences: 0\nc3\t600\t+\n"));
        assert!(fs::read_to_string(&trace).unwrap().contains("Placeable = false"));
    }

    #[test]
    fn test_missing_input_is_fatal_before_output() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("pseudomolecules.txt");
        let config = Config {
            genetic_map: "tests/data/does_not_exist.txt".to_string(),
            marker_info: "tests/data/marker_info.tsv".to_string(),
            output: Some(output.to_str().unwrap().to_string()),
            ..Config::default()
        };
        assert!(matches!(run(&config), Err(ContigMapError::FileError(_))));
        assert!(!output.exists());
    }
}
