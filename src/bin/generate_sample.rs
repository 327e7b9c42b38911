use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a>(&mut self, options: &[&'a str]) -> &'a str {
        options[(self.next_u64() % options.len() as u64) as usize]
    }
}

struct Row {
    gender: String,
    location: String,
    age: i64,
    account_balance: f64,
    profile_picture: String,
}

fn generate_rows(n: usize, rng: &mut SimpleRng) -> Vec<Row> {
    let genders = ["male", "female"];
    let locations = ["Nairobi", "Mombasa", "Kisumu", "Nakuru", "Eldoret"];

    (0..n)
        .map(|i| Row {
            gender: rng.pick(&genders).to_string(),
            location: rng.pick(&locations).to_string(),
            age: 18 + (rng.next_u64() % 8) as i64 * 5,
            // Balances rounded to whole cents.
            account_balance: (rng.next_f64() * 50_000.0).round() / 100.0,
            profile_picture: format!("user_{i:03}.png"),
        })
        .collect()
}

fn write_parquet(rows: &[Row], path: &str) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("gender", DataType::Utf8, false),
        Field::new("location", DataType::Utf8, false),
        Field::new("age", DataType::Int64, false),
        Field::new("account_balance", DataType::Float64, false),
        Field::new("profile_picture", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.gender.as_str()))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.location.as_str()))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.age))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.account_balance))),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.profile_picture.as_str()),
            )),
        ],
    )
    .context("creating record batch")?;

    let file = std::fs::File::create(path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn write_csv(rows: &[Row], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV output")?;
    writer.write_record(["gender", "location", "age", "account_balance", "profile_picture"])?;
    for r in rows {
        writer.write_record([
            r.gender.clone(),
            r.location.clone(),
            r.age.to_string(),
            r.account_balance.to_string(),
            r.profile_picture.clone(),
        ])?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(60, &mut rng);

    write_parquet(&rows, "sample_catalog.parquet")?;
    write_csv(&rows, "sample_catalog.csv")?;

    println!(
        "Wrote {} records to sample_catalog.parquet and sample_catalog.csv",
        rows.len()
    );
    Ok(())
}
