/// Fixed-shape histogram over a flat row-major buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    shape: Vec<usize>,
    strides: Vec<usize>,
    data: Vec<f64>,
}

impl Histogram {
    pub fn new(shape: &[usize]) -> Histogram {
        let mut strides = vec![1; shape.len()];
        for axis in (0..shape.len().saturating_sub(1)).rev() {
            strides[axis] = strides[axis + 1]*shape[axis + 1];
        }

        Histogram {
            shape: shape.to_vec(),
            strides,
            data: vec![0.; shape.iter().product()],
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat offset of a bin, or None when any component falls outside the shape.
    pub fn index(&self, bin: &[i64]) -> Option<usize> {
        if bin.len() != self.shape.len() {
            return None;
        }

        let mut offset = 0;
        for ((&i, &n), &stride) in bin.iter().zip(&self.shape).zip(&self.strides) {
            if i < 0 || i as usize >= n {
                return None;
            }
            offset += i as usize*stride;
        }
        Some(offset)
    }

    /// Add `weight` to a bin. Out-of-range bins are dropped and false is returned.
    pub fn add(&mut self, bin: &[i64], weight: f64) -> bool {
        match self.index(bin) {
            Some(offset) => {
                self.data[offset] += weight;
                true
            },
            None => false,
        }
    }

    pub fn get(&self, bin: &[i64]) -> Option<f64> {
        self.index(bin).map(|offset| self.data[offset])
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Contiguous values along the last axis for the leading indices `prefix`.
    pub fn row(&self, prefix: &[usize]) -> &[f64] {
        let offset: usize = prefix.iter().zip(&self.strides).map(|(i, stride)| i*stride).sum();
        let len = self.strides[prefix.len() - 1];
        &self.data[offset..offset + len]
    }

    pub fn values(&self) -> &[f64] {
        &self.data
    }

    /// Multiply each bin by `f(flat offset)`.
    pub fn scale_with<F: Fn(usize) -> f64>(&mut self, f: F) {
        for (offset, value) in self.data.iter_mut().enumerate() {
            *value *= f(offset);
        }
    }

    pub fn scale(&mut self, factor: f64) {
        self.scale_with(|_| factor);
    }
}

/// Bin index by floor division; values below `origin` give negative indices.
pub fn bin_index(value: f64, origin: f64, width: f64) -> i64 {
    let index = ((value - origin)/width).floor();
    if index.is_finite() {
        index as i64
    } else {
        -1
    }
}
