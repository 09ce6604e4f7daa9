//! Synthetic multi-band lightcurve fixtures.

use std::path::PathBuf;

use anyhow::Result;
use tempfile::TempDir;

pub const BANDS: [&str; 3] = ["g", "r", "i"];

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Minimal deterministic PRNG (xoshiro256**)
pub struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    pub fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    pub fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// One observation row of the fixture file.
pub struct Observation {
    pub mjd: f64,
    pub band: &'static str,
    pub psf_mag: f64,
}

/// A variable star sampled in each band: sinusoid plus gaussian noise,
/// with a per-band mean offset.
pub fn variable_star(samples_per_band: usize, seed: u64) -> Vec<Observation> {
    let mut rng = SimpleRng::new(seed);
    let mut rows = Vec::with_capacity(samples_per_band * BANDS.len());
    for (b, &band) in BANDS.iter().enumerate() {
        let base = 18.0 - 0.4 * b as f64;
        for k in 0..samples_per_band {
            let mjd = 59000.0 + k as f64 * 0.7 + b as f64 * 0.01;
            let phase = 2.0 * std::f64::consts::PI * mjd / 3.3;
            rows.push(Observation {
                mjd,
                band,
                psf_mag: base + 0.3 * phase.sin() + rng.gauss(0.0, 0.02),
            });
        }
    }
    rows
}

/// Write observations as `objectId,mjd,band,psfMag` CSV in a fresh temp dir.
/// Keep the returned `TempDir` alive while the file is in use.
pub fn write_lightcurve(rows: &[Observation]) -> Result<(TempDir, PathBuf)> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("lightcurve.csv");
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(["objectId", "mjd", "band", "psfMag"])?;
    for row in rows {
        writer.write_record([
            "1251".to_string(),
            row.mjd.to_string(),
            row.band.to_string(),
            row.psf_mag.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok((dir, path))
}
