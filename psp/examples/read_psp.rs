//! Print the components of a PSP dump and a few particles of each
//!
//! Usage: `cargo run --example read_psp -- OUT.run0.00010 [max_bodies]`
//! Set `RUST_LOG=debug` to see the directory scan.

use psp::{PspFile, ReadOptions, TableCache};
use std::time::Instant;

fn main() -> psp::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(filename) = args.next() else {
        println!("usage: read_psp <file> [max_bodies]");
        return Ok(());
    };
    let mut options = ReadOptions::default();
    if let Some(max) = args.next() {
        let max = max
            .parse()
            .map_err(|_| psp::Error::InvalidInput(format!("bad body limit '{max}'")))?;
        options = options.with_max_bodies(max);
    }

    let start = Instant::now();
    let psp = PspFile::open_with(&filename, options)?;
    println!(
        "Scanned '{filename}' in {:.3}ms",
        start.elapsed().as_secs_f64() * 1000.0
    );
    println!("{psp}");
    println!("   Time: {}", psp.time());

    for component in psp.components() {
        println!("\n[{}] {} ({})", component.index, component.name, component.id);
        println!(
            "   Bodies: {}, precision: {:?}, stride: {} bytes",
            component.particle_count,
            component.precision,
            component.record_stride()
        );
        for (key, value) in &component.parameters {
            println!("   {key} = {value}");
        }
    }

    let cache = TableCache::new();
    let start = Instant::now();
    let tables = psp.load_all(&cache)?;
    println!(
        "\nDecoded {} components in {:.3}ms",
        tables.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    for table in &tables {
        println!("\n{} ({} rows)", table.component(), table.len());
        println!("   {}", table.names().join("  "));
        for row in 0..table.len().min(3) {
            let values: Vec<String> = table
                .columns()
                .map(|(_, column)| format!("{:.4}", column.get_f64(row).unwrap_or(f64::NAN)))
                .collect();
            println!("   {}", values.join("  "));
        }
    }
    Ok(())
}
