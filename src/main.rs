use clap::{Parser, Subcommand};
use contigmap::{run, Config, ContigMapError};
use log::{info, LevelFilter};

const INFO: &str = "\
contigmap: order and orient contigs along a genetic map
usage: contigmap [--help] <subcommand>

Subcommands:

  build: assemble one pseudomolecule per linkage group.

";

#[derive(Parser)]
#[clap(name = "contigmap")]
#[clap(about = INFO)]
struct Cli {
    /// Increase log verbosity (-d for debug, -dd for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    debug: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble pseudomolecules from a genetic map and marker info.
    ///
    /// For each linkage group this will output a block like:
    ///
    ///  ### LG: <linkage group>
    ///  ### Deleted Sequences: <number of contigs removed>
    ///  <contig>   <genetic position>   <orientation>
    ///
    /// where genetic positions are centiMorgans × 1000 and orientation is
    /// "+", "-", or empty when unknown. Blocks are written in no particular
    /// order.
    ///
    /// Example:
    ///
    ///  $ contigmap build --map genetic_map.txt --markers marker_info.tsv.gz \
    ///      --output pseudomolecules.txt --trace contigs.log
    Build {
        /// the genetic map: "group <name>" lines followed by "<marker> <cM>" lines
        #[arg(long, required = true)]
        map: String,
        /// a headerless TSV of marker, contig, contig position, and weight
        #[arg(long, required = true)]
        markers: String,
        /// the output file path (if not set, uses standard out)
        #[arg(long)]
        output: Option<String>,
        /// where to write per-contig placement traces (if not set, uses standard error)
        #[arg(long)]
        trace: Option<String>,
        /// number of worker threads (0 uses all cores)
        #[arg(long, default_value_t = 0)]
        threads: usize,
    },
}

fn init_logging(debug: u8) {
    let level = match debug {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn run_cli() -> Result<(), ContigMapError> {
    let cli = Cli::parse();
    init_logging(cli.debug);
    match cli.command {
        Some(Commands::Build {
            map,
            markers,
            output,
            trace,
            threads,
        }) => {
            let config = Config {
                genetic_map: map,
                marker_info: markers,
                output,
                trace,
                threads,
            };
            let summary = run(&config)?;
            info!(
                "Done: {} of {} contigs placed on {} linkage groups, {} deleted",
                summary.placed, summary.contigs, summary.linkage_groups, summary.deleted
            );
            Ok(())
        }
        None => {
            println!("{}\n", INFO);
            std::process::exit(1);
        }
    }
}

fn main() {
    match run_cli() {
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
