use std::fs::File;
use std::io::BufWriter;

use anyhow::{Context, Result};
use log::info;

use volcano_stats::data::model::{Volcano, MAX_VEI};

const DEFAULT_OUTPUT: &str = "volcano_sample.json";
const DEFAULT_COUNT: usize = 200;

const NAMES: [&str; 10] = [
    "Fuego", "Merapi", "Etna", "Kilauea", "Villarrica", "Shiveluch", "Ruapehu", "Nyiragongo",
    "Popocatepetl", "Sinabung",
];
const COUNTRIES: [&str; 8] = [
    "Guatemala", "Indonesia", "Italy", "United States", "Chile", "Russia", "New Zealand",
    "Congo, DRC",
];
const TYPES: [&str; 5] = [
    "Stratovolcano", "Shield volcano", "Caldera", "Complex volcano", "Lava dome",
];
const AGENTS: [&str; 8] = ["A", "E", "I", "L", "M", "P", "T", "W"];

/// Minimal deterministic PRNG (xoshiro256**, Blackman & Vigna), seeded by
/// stepping an LCG so one `u64` seed fills the whole state.
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

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }
}

fn generate_volcano(rng: &mut SimpleRng, id: usize) -> Volcano {
    // Small eruptions are far more common than large ones.
    let vei = (rng.next_f64().powi(2) * f64::from(MAX_VEI)).floor() as u8;

    let deaths = if rng.chance(0.4) {
        None
    } else {
        let scale = 10f64.powi(i32::from(vei.min(5)));
        Some(rng.uniform(0.0, scale).round() as u64)
    };

    let agents = if deaths.is_some() {
        let n = 1 + rng.below(3);
        let mut picked: Vec<String> = Vec::with_capacity(n);
        for _ in 0..n {
            let agent = rng.pick(&AGENTS).to_string();
            if !picked.contains(&agent) {
                picked.push(agent);
            }
        }
        picked
    } else {
        Vec::new()
    };

    Volcano {
        name: format!("{} {}", rng.pick(&NAMES), id),
        country: rng.pick(&COUNTRIES).to_string(),
        kind: rng.pick(&TYPES).to_string(),
        // About one record in twenty has no known year.
        year: (!rng.chance(0.05)).then(|| 1500 + rng.below(525) as i32),
        latitude: (rng.uniform(-60.0, 70.0) * 100.0).round() / 100.0,
        vei,
        elevation: rng.uniform(-500.0, 6000.0).round(),
        deaths,
        tsunami: rng.chance(0.1),
        agents,
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let output_path = args.next().unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
    let count = match args.next() {
        Some(n) => n.parse::<usize>().with_context(|| format!("invalid record count '{n}'"))?,
        None => DEFAULT_COUNT,
    };

    let mut rng = SimpleRng::new(42);
    let volcanoes: Vec<Volcano> = (0..count).map(|i| generate_volcano(&mut rng, i)).collect();

    let file = File::create(&output_path)
        .with_context(|| format!("creating output file {output_path}"))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &volcanoes)
        .context("writing sample dataset")?;

    info!("sample generator seed 42, {count} records");
    println!("Wrote {count} volcano records to {output_path}");
    Ok(())
}
