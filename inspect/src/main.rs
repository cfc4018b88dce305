use std::fs::File;

use anyhow::*;
use camino::{Utf8Path, Utf8PathBuf};
use log::*;
use memmap2::Mmap;
use structopt::*;

use file_inspector::{Format, Inspection, Node};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "inspect",
    about = "Decodes the structure of a .zip file or Zucchini patch"
)]
struct Opt {
    /// Pass multiple times for additional verbosity (info, debug, trace)
    #[structopt(short, long, parse(from_occurrences))]
    verbosity: usize,

    /// The file's format ("zip" or "zucc").
    /// Guessed from the file extension if not given.
    #[structopt(short, long)]
    format: Option<String>,

    /// Print each field's byte range instead of JSON.
    #[structopt(long)]
    spans: bool,

    #[structopt(name("FILE"))]
    path: Utf8PathBuf,
}

fn main() -> Result<()> {
    let args = Opt::from_args();

    let mut errlog = stderrlog::new();
    errlog.verbosity(args.verbosity + 1);
    errlog.init()?;

    let tag = match &args.format {
        Some(f) => f.clone(),
        None => Format::from_path_extension(&args.path)
            .map(|f| f.tag().to_owned())
            .unwrap_or_default(),
    };

    match inspect(&args.path, &tag)? {
        Inspection::Tree(tree) if args.spans => print_spans(&tree),
        Inspection::Tree(tree) => println!("{}", tree.to_json_pretty()?),
        unknown => println!("{unknown}"),
    }
    Ok(())
}

fn inspect(path: &Utf8Path, tag: &str) -> Result<Inspection> {
    info!("Memory mapping {}", path);
    let file = File::open(path).with_context(|| format!("Couldn't open {path}"))?;
    let mapping = unsafe { Mmap::map(&file).with_context(|| format!("Couldn't mmap {path}"))? };

    file_inspector::decode(&mapping, tag).with_context(|| format!("Couldn't decode {path}"))
}

/// One line per leaf: `start..end path = value`
fn print_spans(tree: &Node) {
    for (path, leaf) in tree.leaves() {
        match leaf.span {
            Some(span) => println!("{span} {path} = {}", leaf.value),
            None => println!("(computed) {path} = {}", leaf.value),
        }
    }
}
