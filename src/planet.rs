use super::*;

/// Immutable planet constants shared by value across the simulation.
#[derive(Clone, Copy, Debug)]
pub struct Planet {
    mass: f64,
    radius: f64,
    k_g: f64,
}

impl Planet {
    pub fn new(mass: f64, radius: f64) -> Result<Planet> {
        if !(mass > 0. && mass.is_finite()) {
            bail!("Input error: planet_mass must be positive and finite, got {}.", mass);
        }
        if !(radius > 0. && radius.is_finite()) {
            bail!("Input error: planet_radius must be positive and finite, got {}.", radius);
        }

        Ok(Planet {
            mass,
            radius,
            k_g: G*mass,
        })
    }

    /// Planet radius in cm.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Planet mass in g.
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// G*M in cm^3/s^2.
    pub fn gravitational_parameter(&self) -> f64 {
        self.k_g
    }

    /// Escape speed in cm/s at radius `r` from the planet center.
    pub fn escape_speed(&self, r: f64) -> f64 {
        (2.*self.k_g/r).sqrt()
    }

    /// Gravitational acceleration in cm/s^2 at altitude `alt` above the surface.
    pub fn gravity_at_altitude(&self, alt: f64) -> f64 {
        let r = self.radius + alt;
        self.k_g/(r*r)
    }
}
