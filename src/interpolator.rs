use super::*;

/// Piecewise-linear interpolation over a tabulated profile. Values outside the table clamp to the end points.
#[derive(Clone, Debug)]
pub struct Interpolator {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Interpolator {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Interpolator> {
        if x.is_empty() {
            bail!("Input error: cannot interpolate over an empty table.");
        }
        if x.len() != y.len() {
            bail!("Input error: interpolation table columns of unequal length ({} and {}).", x.len(), y.len());
        }
        if !x.windows(2).all(|pair| pair[1] > pair[0]) {
            bail!("Input error: interpolation abscissae must be strictly increasing.");
        }
        if x.iter().chain(y.iter()).any(|value| !value.is_finite()) {
            bail!("Input error: interpolation table contains a non-finite value.");
        }
        Ok(Interpolator {x, y})
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let n = self.x.len();
        if n == 1 || x <= self.x[0] {
            return self.y[0];
        }
        if x >= self.x[n - 1] {
            return self.y[n - 1];
        }

        //First abscissa strictly greater than x; 1 <= upper <= n - 1 here
        let upper = self.x.partition_point(|&xi| xi <= x);
        let lower = upper - 1;
        let fraction = (x - self.x[lower])/(self.x[upper] - self.x[lower]);
        self.y[lower] + fraction*(self.y[upper] - self.y[lower])
    }

    pub fn last_x(&self) -> f64 {
        self.x[self.x.len() - 1]
    }
}
