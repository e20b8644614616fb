use ndarray::Array2;

/// One named quantity of a sweep, stored as raw values indexed `[ray, bin]`.
///
/// Physical values are `offset + gain * raw`; `nodata` and `undetect` are raw sentinels.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanParameter {
    pub quantity: String,
    pub gain: f64,
    pub offset: f64,
    pub nodata: f64,
    pub undetect: f64,
    data: Array2<f64>,
}

impl ScanParameter {
    pub fn new(quantity: impl Into<String>, data: Array2<f64>) -> Self {
        Self {
            quantity: quantity.into(),
            gain: 1.0,
            offset: 0.0,
            nodata: 255.0,
            undetect: 0.0,
            data,
        }
    }

    pub fn with_scaling(mut self, gain: f64, offset: f64) -> Self {
        self.gain = gain;
        self.offset = offset;
        self
    }

    pub fn with_sentinels(mut self, nodata: f64, undetect: f64) -> Self {
        self.nodata = nodata;
        self.undetect = undetect;
        self
    }

    pub fn nrays(&self) -> usize {
        self.data.nrows()
    }

    pub fn nbins(&self) -> usize {
        self.data.ncols()
    }

    /// Raw stored value, `None` outside the grid.
    pub fn raw(&self, ray: usize, bin: usize) -> Option<f64> {
        self.data.get((ray, bin)).copied()
    }

    /// Physical value, `None` for nodata, undetect or out-of-grid cells.
    pub fn value(&self, ray: usize, bin: usize) -> Option<f64> {
        let raw = self.raw(ray, bin)?;
        if raw == self.nodata || raw == self.undetect {
            return None;
        }
        Some(self.offset + self.gain * raw)
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }
}
