use super::*;

/// Synthesized background particle a test particle collides with.
#[derive(Clone, Copy, Debug)]
pub struct CollisionPartner {
    pub particle_type: ParticleType,
    pub vel: Vector,
}

/// Mean-free-path collision sampling against the background atmosphere.
pub struct CollisionSampler {
    pub atmosphere: BackgroundAtmosphere,
    pub relative_velocity_model: RelativeVelocityModel,
    pub num_collisions: usize,
    probabilities: Vec<f64>,
    partners: Vec<(CollisionPartner, f64)>,
}

impl CollisionSampler {
    pub fn new(atmosphere: BackgroundAtmosphere, relative_velocity_model: RelativeVelocityModel) -> CollisionSampler {
        let num_species = atmosphere.num_species();
        CollisionSampler {
            atmosphere,
            relative_velocity_model,
            num_collisions: 0,
            probabilities: Vec::with_capacity(num_species),
            partners: Vec::with_capacity(num_species),
        }
    }

    /// Draw the velocity of a background particle of species `index` at altitude `alt`.
    pub fn sample_partner<R: Rng + ?Sized>(&self, index: usize, alt: f64, rng: &mut R) -> CollisionPartner {
        let species = &self.atmosphere.species[index];

        let vel = match self.relative_velocity_model {
            RelativeVelocityModel::SAMPLED => {
                let temperature = self.atmosphere.temperature(alt, species.temperature_source);
                maxwell_boltzmann_velocity(temperature, species.m, rng)
            },
            RelativeVelocityModel::MEAN => {
                let speed = self.atmosphere.average_velocity(alt, index);
                isotropic_direction(rng).scale(speed)
            },
        };

        CollisionPartner {
            particle_type: species.particle_type,
            vel,
        }
    }

    /// Decide whether `particle` collides during a step of length `dt`; on a collision, scatter it and return true.
    pub fn maybe_collide<R: Rng + ?Sized>(&mut self, particle: &mut Particle, dt: f64, time: f64, rng: &mut R) -> bool {
        let planet_radius = self.atmosphere.planet().radius();
        let alt = particle.radius() - planet_radius;
        let m1 = particle.m;

        self.probabilities.clear();
        self.partners.clear();

        //P_s = n_s*sigma_s(E_rel)*v_rel*dt for each background species
        for index in 0..self.atmosphere.num_species() {
            let density = self.atmosphere.get_density(alt, index);
            let partner = self.sample_partner(index, alt, rng);

            let m2 = partner.particle_type.mass();
            let relative_speed = particle.vel.sub(&partner.vel).magnitude();
            let reduced_mass = m1*m2/(m1 + m2);
            let relative_energy = 0.5*reduced_mass*relative_speed*relative_speed/EV;

            let probability = if density > 0. {
                density*self.atmosphere.total_cross_section(relative_energy, index)*relative_speed*dt
            } else {
                0.
            };

            self.probabilities.push(probability);
            self.partners.push((partner, relative_energy));
        }

        let mut total_probability: f64 = self.probabilities.iter().sum();
        if !total_probability.is_finite() || total_probability < 0. {
            warn!("Numerical error: collision probability {} at altitude {} km; no collision this step.", total_probability, alt/KM);
            return false;
        }
        if total_probability > 1. {
            warn!("Numerical error: collision probability {} exceeds 1 at altitude {} km; reduce dt.", total_probability, alt/KM);
            total_probability = 1.;
        }

        let u_collide: f64 = rng.gen();
        if u_collide >= total_probability {
            return false;
        }

        //Species chosen in proportion to its share of the total probability
        let u_species: f64 = rng.gen::<f64>()*self.probabilities.iter().sum::<f64>();
        let mut cumulative = 0.;
        let mut selected = self.probabilities.len() - 1;
        for (index, probability) in self.probabilities.iter().enumerate() {
            cumulative += probability;
            if u_species < cumulative {
                selected = index;
                break;
            }
        }

        let (partner, relative_energy) = self.partners[selected];
        let theta = self.atmosphere.find_new_theta(selected, relative_energy, rng);
        let phi = TWO_PI*rng.gen::<f64>();

        particle.apply_collision(&partner, theta, phi, time, planet_radius);
        self.num_collisions += 1;

        true
    }
}

/// Velocity with Maxwell-Boltzmann components at `temperature` for mass `m`. Zero temperature gives a particle at rest.
pub fn maxwell_boltzmann_velocity<R: Rng + ?Sized>(temperature: f64, m: f64, rng: &mut R) -> Vector {
    if temperature <= 0. {
        return Vector::zero();
    }

    match Normal::new(0., (K_B*temperature/m).sqrt()) {
        Ok(normal) => Vector::new(normal.sample(rng), normal.sample(rng), normal.sample(rng)),
        Err(error) => {
            warn!("Numerical error: no thermal distribution at {} K ({}); using a particle at rest.", temperature, error);
            Vector::zero()
        }
    }
}

/// Unit vector uniformly distributed over the sphere.
pub fn isotropic_direction<R: Rng + ?Sized>(rng: &mut R) -> Vector {
    let cos_theta: f64 = 1. - 2.*rng.gen::<f64>();
    let sin_theta = (1. - cos_theta*cos_theta).max(0.).sqrt();
    let phi = TWO_PI*rng.gen::<f64>();
    Vector::new(sin_theta*phi.cos(), sin_theta*phi.sin(), cos_theta)
}
