//! List the variables of a MAT-file, and optionally dump one of them.
//!
//! Usage: `cargo run --example inspect -- file.mat [variable]`

use rustymat::{LazyMatFile, MatrixData};

fn main() {
    let mut args = std::env::args().skip(1);
    let path = match args.next() {
        Some(p) => p,
        None => {
            eprintln!("usage: inspect <file.mat> [variable]");
            std::process::exit(2);
        }
    };
    let wanted = args.next();

    let mut file = match LazyMatFile::open(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("{path}: {e}");
            std::process::exit(1);
        }
    };

    println!("{path}: {} variable(s)", file.entries().len());
    for entry in file.entries() {
        let dims: Vec<String> = entry.dims.iter().map(|d| d.to_string()).collect();
        let compressed = if entry.compressed { " (compressed)" } else { "" };
        println!(
            "  {:<24} {:>8} {}{}",
            entry.name,
            entry.class.name(),
            dims.join("x"),
            compressed
        );
    }

    let Some(name) = wanted else { return };
    match file.get(&name) {
        Ok(m) => match &m.data {
            MatrixData::Numeric { real, .. } => println!("{name} = {:?}", real.to_f64()),
            MatrixData::Char { text } => println!("{name} = {text:?}"),
            MatrixData::Struct { fields } => {
                println!("{name}: struct with fields:");
                for (field, _) in fields {
                    println!("  .{field}");
                }
            }
            MatrixData::Cell { grid } => println!("{name}: cell with {} slots", grid.len()),
            MatrixData::Sparse(csc) => println!("{name}: sparse, {} nonzeros", csc.nnz()),
            MatrixData::Empty => println!("{name}: empty"),
        },
        Err(e) => {
            eprintln!("{name}: {e}");
            std::process::exit(1);
        }
    }
}
