use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

/// Write a deterministic, deliberately dirty CSV for trying the pipeline:
/// missing numbers and labels, exact duplicate rows and a constant column.
#[derive(Parser, Debug)]
#[command(name = "generate_sample", version, about)]
struct Args {
    /// Number of distinct rows before duplicates are added
    #[arg(long, default_value_t = 200)]
    rows: usize,

    /// Seed for the generator
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Output path
    #[arg(short, long, default_value = "sample_data.csv")]
    output: PathBuf,
}

/// SplitMix64 stream; reproducible for a given seed.
struct SplitMix64(u64);

impl SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len() as u64) as usize]
    }

    /// A missing-value token with probability `p`, otherwise `value()`.
    /// The tokens vary so the loader's NA recognition gets exercised.
    fn or_missing(&mut self, p: f64, value: impl FnOnce(&mut Self) -> String) -> String {
        if self.unit() < p {
            self.pick(&["", "NA", "NaN", "null"]).to_string()
        } else {
            value(self)
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = SplitMix64(args.seed);

    let cities = ["Oslo", "Lima", "Pune", "Turin"];
    let grades = ["A", "B", "C"];

    let mut rows: Vec<[String; 6]> = Vec::with_capacity(args.rows + args.rows / 10);
    for id in 0..args.rows {
        let age = rng.or_missing(0.1, |r| (18 + r.below(60)).to_string());
        let income = rng.or_missing(0.1, |r| format!("{:.2}", 20_000.0 + r.unit() * 80_000.0));
        let city = rng.or_missing(0.05, |r| r.pick(&cities).to_string());
        rows.push([
            id.to_string(),
            age,
            income,
            city,
            rng.pick(&grades).to_string(),
            "1".to_string(),
        ]);
    }

    // Re-append every tenth row as an exact duplicate.
    let duplicates: Vec<[String; 6]> = rows.iter().step_by(10).cloned().collect();
    rows.extend(duplicates);

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    writer.write_record(["id", "age", "income", "city", "grade", "batch"])?;
    for row in &rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    log::info!("generator seed {}", args.seed);
    println!("Wrote {} rows to {}", rows.len(), args.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = SplitMix64(7);
        let mut b = SplitMix64(7);
        let xs: Vec<u64> = (0..5).map(|_| a.next_u64()).collect();
        let ys: Vec<u64> = (0..5).map(|_| b.next_u64()).collect();
        assert_eq!(xs, ys);
        assert_ne!(SplitMix64(8).next_u64(), xs[0]);
    }

    #[test]
    fn or_missing_respects_probability_bounds() {
        let mut rng = SplitMix64(1);
        for _ in 0..100 {
            let u = rng.unit();
            assert!((0.0..1.0).contains(&u));
            assert!(rng.below(3) < 3);
            assert_eq!(rng.or_missing(0.0, |_| "x".to_string()), "x");
            assert!(["", "NA", "NaN", "null"].contains(&rng.or_missing(1.0, |_| "x".to_string()).as_str()));
        }
    }
}
