//! # Popconv Converter Binary
//!
//! Reads a population from one interchange format and writes it to another.
//!
//! ## Usage
//! ```bash
//! popconv --input pop.fstat --from fstat --to linkage --out study1
//! popconv --input fam.csv --from csv --to fstat --out pop.fstat
//! ```

use popconv::config::{Config, Format};
use popconv::error::Result;
use popconv::io::{csv, fstat, linkage};
use popconv::LinkageOptions;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = Config::parse_and_validate()?;

    let pop = match config.from {
        Format::Fstat => fstat::read_fstat(&config.input, config.loci.as_deref())?,
        Format::Csv => csv::read_csv(&config.input)?,
        Format::Linkage => unreachable!("rejected by Config::validate"),
    };
    pop.validate()?;

    let exclude: Vec<popconv::LocusIdx> =
        config.exclude.iter().copied().map(Into::into).collect();
    match config.to {
        Format::Fstat => fstat::write_fstat(&pop, &config.out)?,
        Format::Linkage => {
            let opts = LinkageOptions {
                pop_type: config.pop_type()?,
                recombination: config.recombination,
                exclude,
                pre: !config.makeped,
                daf: config.daf,
                ..LinkageOptions::default()
            };
            linkage::write_linkage(&pop, &config.out, &opts)?;
        }
        Format::Csv => {
            let opts = csv::CsvOptions { exclude };
            csv::write_csv(&pop, &config.out, &opts)?;
        }
    }
    Ok(())
}
