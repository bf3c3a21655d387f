//! Converting a SAMI export file to binary MARC or MARCXML
//!
//! Usage:
//!
//! ```text
//! cargo run --example sami_to_marc -- <input> <output.mrc|output.xml> [--authorities] [--tidy]
//! ```
//!
//! The input dialect comes from the file extension unless `--authorities` is
//! given; the output format comes from the output extension. Records with
//! extraction issues are skipped and reported. Set `RUST_LOG=debug` to see
//! every chunk as it is read.

use sami2marc::formats::{Format, FormatWriter};
use sami2marc::{Dialect, MarcWriter, MarcXmlWriter, SamiReader};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let paths: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();
    let [input, output] = paths.as_slice() else {
        eprintln!("usage: sami_to_marc <input> <output.mrc|output.xml> [--authorities] [--tidy]");
        return ExitCode::FAILURE;
    };
    let authorities = args.iter().any(|a| a == "--authorities");
    let tidy = args.iter().any(|a| a == "--tidy");

    match convert(Path::new(input.as_str()), Path::new(output.as_str()), authorities, tidy) {
        Ok((written, skipped)) => {
            println!("{written} records written, {skipped} skipped");
            ExitCode::SUCCESS
        },
        Err(e) => {
            eprintln!("conversion failed: {e}");
            ExitCode::FAILURE
        },
    }
}

fn convert(
    input: &Path,
    output: &Path,
    authorities: bool,
    tidy: bool,
) -> Result<(usize, usize), Box<dyn std::error::Error>> {
    let format = output
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(Format::from_extension)
        .ok_or("output must end in .mrc, .marc or .xml")?;

    let dialect = authorities.then_some(Dialect::Authorities);
    let reader = SamiReader::open(input, dialect, tidy)?;
    tracing::info!(input = %input.display(), dialect = %reader.config().dialect, %format, "converting");

    let file = BufWriter::new(File::create(output)?);
    let mut writer: Box<dyn FormatWriter> = match format {
        Format::Iso2709 => Box::new(MarcWriter::new(file)),
        Format::MarcXml => Box::new(MarcXmlWriter::new(file)),
    };

    let mut skipped = 0;
    for sami in reader {
        let sami = sami?;
        if sami.is_bad() {
            for issue in sami.issues() {
                eprintln!("skipping {}: {issue}", sami.identifier().unwrap_or_default());
            }
            skipped += 1;
            continue;
        }
        writer.write_record(sami.record())?;
    }
    writer.finish()?;

    Ok((writer.records_written().unwrap_or_default(), skipped))
}
