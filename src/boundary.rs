use super::*;

/// Escape counts by hemisphere.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EscapeTally {
    pub day: usize,
    pub night: usize,
}

impl EscapeTally {
    pub fn add(&mut self, hemisphere: Hemisphere) {
        match hemisphere {
            Hemisphere::DAY => self.day += 1,
            Hemisphere::NIGHT => self.night += 1,
        }
    }

    /// Escaped fraction (day, night) of `total_parts` test particles.
    pub fn fractions(&self, total_parts: usize) -> (f64, f64) {
        (self.day as f64/total_parts as f64, self.night as f64/total_parts as f64)
    }
}

/// Classifies particles against the thermal, upper and lower bounds, in that order.
#[derive(Clone, Debug)]
pub struct BoundaryClassifier {
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub escape_speed_upper: f64,
    pub thermal_threshold: ThermalThreshold,
    k: f64,
    pub escapes: EscapeTally,
}

impl BoundaryClassifier {
    /// Bounds are altitudes in cm and are converted to radii once here.
    pub fn new(planet: &Planet, lower_bound_alt: f64, upper_bound_alt: f64, thermal_threshold: ThermalThreshold) -> Result<BoundaryClassifier> {
        if !(upper_bound_alt > lower_bound_alt) {
            bail!("Input error: sim_upper_bound {} must be above sim_lower_bound {}.", upper_bound_alt, lower_bound_alt);
        }
        if let Some(temperature) = thermal_threshold.temperature() {
            if !(temperature >= 0. && temperature.is_finite()) {
                bail!("Input error: thermal_threshold temperature must be non-negative, got {}.", temperature);
            }
        }

        let upper_bound = planet.radius() + upper_bound_alt;
        Ok(BoundaryClassifier {
            lower_bound: planet.radius() + lower_bound_alt,
            upper_bound,
            escape_speed_upper: planet.escape_speed(upper_bound),
            thermal_threshold,
            k: planet.gravitational_parameter(),
            escapes: EscapeTally::default(),
        })
    }

    /// Speed below which a particle of mass `m` at radius `r` is thermalized.
    pub fn thermal_speed(&self, r: f64, m: f64) -> f64 {
        match self.thermal_threshold {
            ThermalThreshold::ESCAPE => (2.*self.k/r).sqrt(),
            ThermalThreshold::MOST_PROBABLE{temperature} => (2.*K_B*temperature/m).sqrt(),
            ThermalThreshold::RMS{temperature} => (3.*K_B*temperature/m).sqrt(),
            ThermalThreshold::MEAN{temperature} => (8.*K_B*temperature/(PI*m)).sqrt(),
        }
    }

    /// Reason `particle` should leave the simulation, if any.
    pub fn check(&self, particle: &Particle) -> Option<Deactivation> {
        let r = particle.radius();
        let speed = particle.speed();

        if speed < self.thermal_speed(r, particle.m) {
            Some(Deactivation::THERMALIZED)
        } else if r >= self.upper_bound && speed >= self.escape_speed_upper {
            Some(Deactivation::ESCAPED(Hemisphere::of(particle.pos.x)))
        } else if r <= self.lower_bound {
            Some(Deactivation::LOST)
        } else {
            None
        }
    }

    /// Deactivate `particle` if it crossed a bound. Returns true when it was deactivated.
    pub fn classify(&mut self, particle: &mut Particle, time: f64) -> bool {
        match self.check(particle) {
            Some(reason) => {
                if let Deactivation::ESCAPED(hemisphere) = reason {
                    self.escapes.add(hemisphere);
                }
                particle.deactivate(reason, time);
                true
            },
            None => false,
        }
    }
}
