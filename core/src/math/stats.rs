/// Linear reflectivity factor from dBZ.
pub fn dbz_to_z(dbz: f64) -> f64 {
    10f64.powf(dbz / 10.0)
}

/// dBZ from linear reflectivity factor. Zero maps to negative infinity.
pub fn z_to_dbz(z: f64) -> f64 {
    10.0 * z.log10()
}

pub struct StatsHelper;

impl StatsHelper {
    pub fn mean(samples: &[f64]) -> Option<f64> {
        if samples.is_empty() {
            return None;
        }
        Some(samples.iter().sum::<f64>() / samples.len() as f64)
    }

    /// Population standard deviation around `mean`.
    pub fn std_dev(samples: &[f64], mean: f64) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = samples.iter().map(|&v| (v - mean) * (v - mean)).sum();
        (sum_sq / samples.len() as f64).sqrt()
    }
}

/// Reflectivity moments computed in linear Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReflectivityStats {
    pub count: usize,
    pub mean_z: f64,
    pub std_z: f64,
}

impl ReflectivityStats {
    pub fn from_linear(values: &[f64]) -> Option<Self> {
        let first = *values.first()?;
        // identical samples must not pick up a rounding spread
        if values.iter().all(|&v| v == first) {
            return Some(Self {
                count: values.len(),
                mean_z: first,
                std_z: 0.0,
            });
        }
        let mean_z = StatsHelper::mean(values)?;
        Some(Self {
            count: values.len(),
            mean_z,
            std_z: StatsHelper::std_dev(values, mean_z),
        })
    }

    pub fn mean_dbz(&self) -> f64 {
        z_to_dbz(self.mean_z)
    }

    /// Standard deviation converted on its own through the dBZ mapping.
    pub fn std_dbz(&self) -> f64 {
        z_to_dbz(self.std_z)
    }
}
