//! CPU hydraulic + thermal erosion on a rectangular vertex grid.
//!
//! Virtual-pipe style: water is rained onto every vertex, flows toward
//! lower neighbours, picks up sediment up to a velocity/slope dependent
//! capacity and drops the excess. A thermal pass then slumps slopes that
//! are steeper than the angle of repose. Grid borders are closed: a vertex
//! on the edge treats the missing neighbour as itself.

use crate::erosion::ErosionConfig;

/// Outputs produced by the CPU erosion backend.
#[derive(Debug, Clone)]
pub struct ErosionCpuOutputs {
    pub heights: Vec<f32>,
    pub water: Vec<f32>,
    pub sediment: Vec<f32>,
    /// Net height delta caused by hydraulic+thermal erosion (zeros unless tracked).
    pub deposition: Vec<f32>,
}

/// Row-major layout of a `cols x rows` vertex grid.
#[derive(Debug, Clone, Copy)]
struct Layout {
    cols: usize,
    rows: usize,
}

impl Layout {
    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.cols + x
    }

    /// Neighbour indices (E, W, N, S), clamped to the grid.
    #[inline]
    fn neighbors(&self, i: usize) -> [usize; 4] {
        let x = i % self.cols;
        let y = i / self.cols;
        let east = if x + 1 < self.cols { x + 1 } else { x };
        let west = x.saturating_sub(1);
        let north = if y + 1 < self.rows { y + 1 } else { y };
        let south = y.saturating_sub(1);
        [
            self.index(east, y),
            self.index(west, y),
            self.index(x, north),
            self.index(x, south),
        ]
    }
}

#[inline]
fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Run hydraulic erosion for `config.hydraulic_steps`, then mass-conserving
/// thermal erosion for `config.thermal_iterations`.
///
/// `heights0` is a row-major buffer of `cols * rows` values and
/// `cell_size` the world-space vertex spacing used for the talus threshold.
pub fn run_hydraulic_thermal_cpu(
    cols: usize,
    rows: usize,
    cell_size: f32,
    heights0: &[f32],
    config: &ErosionConfig,
) -> ErosionCpuOutputs {
    let layout = Layout { cols, rows };
    let total = heights0.len().min(cols * rows);

    let mut h = heights0[..total].to_vec();
    let mut w = vec![0.0f32; total];
    let mut s = vec![0.0f32; total];

    // flux = (E, W, N, S)
    let mut flux = vec![[0.0f32; 4]; total];
    let mut deposition = vec![0.0f32; total];

    let mut w_next = vec![0.0f32; total];
    let mut h_next = vec![0.0f32; total];
    let mut s_next = vec![0.0f32; total];
    let mut flux_next = vec![[0.0f32; 4]; total];

    let rainfall = config.rainfall;
    let evap = clamp01(config.evaporation);
    let ks = config.erosion_rate.max(0.0);
    let kd = config.deposition_rate.max(0.0);
    let kc = config.sediment_capacity.max(0.0);

    for _step in 0..config.hydraulic_steps {
        // Rainfall.
        if rainfall != 0.0 {
            for wi in &mut w {
                *wi += rainfall;
            }
        }

        // Outflow fluxes toward lower water surfaces.
        for i in 0..total {
            let surface = h[i] + w[i];
            let mut f = [0.0f32; 4];
            for (dir, &n) in layout.neighbors(i).iter().enumerate() {
                if n != i {
                    f[dir] = (surface - (h[n] + w[n])).max(0.0);
                }
            }

            let sum = f[0] + f[1] + f[2] + f[3];
            if sum > 1e-6 && sum > w[i] {
                let scale = w[i] / sum;
                for v in &mut f {
                    *v *= scale;
                }
            }
            flux_next[i] = f;
        }
        std::mem::swap(&mut flux, &mut flux_next);

        // Water update: flux divergence + evaporation.
        for i in 0..total {
            let f = flux[i];
            let outflow = f[0] + f[1] + f[2] + f[3];
            let [east, west, north, south] = layout.neighbors(i);

            // Inflow: west's E, east's W, south's N, north's S.
            let mut inflow = 0.0;
            if west != i {
                inflow += flux[west][0];
            }
            if east != i {
                inflow += flux[east][1];
            }
            if south != i {
                inflow += flux[south][2];
            }
            if north != i {
                inflow += flux[north][3];
            }

            let w1 = (w[i] + inflow - outflow).max(0.0);
            w_next[i] = w1 * (1.0 - evap);
        }
        std::mem::swap(&mut w, &mut w_next);

        // Erosion / deposition against transport capacity.
        for i in 0..total {
            let surface = h[i] + w[i];
            let min_n = layout
                .neighbors(i)
                .iter()
                .map(|&n| h[n] + w[n])
                .fold(f32::MAX, f32::min);
            let slope = (surface - min_n).max(0.0);

            let f = flux[i];
            let vx = f[0] - f[1];
            let vy = f[2] - f[3];
            let vel = (vx * vx + vy * vy).sqrt();

            let capacity = kc * vel * slope;
            let h0 = h[i];
            let s0 = s[i];

            let (h1, s1) = if s0 > capacity {
                let dep = kd * (s0 - capacity);
                (h0 + dep, s0 - dep)
            } else {
                let ero = ks * (capacity - s0);
                (h0 - ero, s0 + ero)
            };

            deposition[i] += h1 - h0;
            h_next[i] = h1;
            s_next[i] = s1;
        }
        std::mem::swap(&mut h, &mut h_next);
        std::mem::swap(&mut s, &mut s_next);

        // Sediment transport: gather from the dominant upstream neighbour.
        for i in 0..total {
            let f = flux[i];
            let vx = f[0] - f[1];
            let vy = f[2] - f[3];
            let [east, west, north, south] = layout.neighbors(i);

            let src = if vx.abs() > vy.abs() {
                if vx > 0.0 {
                    west
                } else if vx < 0.0 {
                    east
                } else {
                    i
                }
            } else if vy > 0.0 {
                south
            } else if vy < 0.0 {
                north
            } else {
                i
            };

            s_next[i] = s[src];
        }
        std::mem::swap(&mut s, &mut s_next);

        if evap != 0.0 {
            let factor = 1.0 - 0.25 * evap;
            for wi in &mut w {
                *wi = (*wi * factor).max(0.0);
            }
        }
    }

    if config.thermal_iterations > 0 {
        run_thermal_cpu(layout, cell_size, &mut h, &mut deposition, config);
    }

    if !config.track_deposition {
        deposition.fill(0.0);
    }

    ErosionCpuOutputs {
        heights: h,
        water: w,
        sediment: s,
        deposition,
    }
}

fn run_thermal_cpu(layout: Layout, cell_size: f32, heights: &mut [f32], deposition: &mut [f32], config: &ErosionConfig) {
    let total = heights.len();
    let talus = config.angle_of_repose_rad.tan().max(0.0) * cell_size;
    let strength = clamp01(config.thermal_strength);

    let mut delta = vec![0.0f32; total];

    for _ in 0..config.thermal_iterations {
        delta.fill(0.0);

        for i in 0..total {
            let h0 = heights[i];

            // Lower neighbours steeper than talus.
            let mut candidates: [(usize, f32); 4] = [(0, 0.0); 4];
            let mut count = 0usize;
            for n in layout.neighbors(i) {
                if n == i {
                    continue;
                }
                let diff = h0 - heights[n];
                if diff > talus {
                    candidates[count] = (n, diff - talus);
                    count += 1;
                }
            }
            if count == 0 {
                continue;
            }

            // Move a fraction of the excess, split equally among steep directions.
            let total_excess: f32 = candidates[..count].iter().map(|&(_, ex)| ex).sum();
            let move_amount = strength * total_excess;
            if move_amount <= 0.0 {
                continue;
            }

            let share = move_amount / (count as f32);
            delta[i] -= move_amount;
            for &(n, _) in &candidates[..count] {
                delta[n] += share;
            }
        }

        for i in 0..total {
            heights[i] += delta[i];
            deposition[i] += delta[i];
        }
    }
}
