//! Write synthetic GROMACS-style RMSD trajectories for trying the plotter.
//!
//! ```text
//! cargo run --bin generate_sample -- [OUT_DIR]
//! ```

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Relaxation towards a plateau with noise, in Å:
/// `plateau * (1 - exp(-t / tau)) + noise`.
fn rmsd_trace(times: &[f64], plateau: f64, tau: f64, noise: f64, rng: &mut SimpleRng) -> Vec<f64> {
    times
        .iter()
        .map(|&t| (plateau * (1.0 - (-t / tau).exp()) + rng.gauss(0.0, noise)).max(0.0))
        .collect()
}

fn xvg(name: &str, times: &[f64], values: &[f64]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# This file was created by generate_sample");
    let _ = writeln!(out, "# Synthetic backbone RMSD for {name}");
    let _ = writeln!(out, "@    title \"RMSD\"");
    let _ = writeln!(out, "@    xaxis  label \"Time (ns)\"");
    let _ = writeln!(out, "@    yaxis  label \"RMSD (Å)\"");
    let _ = writeln!(out, "@TYPE xy");
    for (t, v) in times.iter().zip(values) {
        let _ = writeln!(out, "{t:12.4} {v:12.7}");
    }
    out
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);

    // 0 → 250 ns, one frame every 0.1 ns
    let times: Vec<f64> = (0..=2500).map(|i| i as f64 * 0.1).collect();

    let systems: [(&str, f64, f64, f64); 3] = [
        ("apo", 2.4, 15.0, 0.12),
        ("holo", 1.6, 8.0, 0.08),
        ("mutant", 3.1, 30.0, 0.18),
    ];

    for (name, plateau, tau, noise) in systems {
        let values = rmsd_trace(&times, plateau, tau, noise, &mut rng);
        let path = out_dir.join(format!("rmsd_{name}.xvg"));
        std::fs::write(&path, xvg(name, &times, &values))
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote {} frames to {}", times.len(), path.display());
    }

    Ok(())
}
