use super::*;

/// Source of initial test particle states.
#[derive(Clone, Debug)]
pub enum Distribution {
    /// Uniform on the sphere of `radius` cm, Maxwell-Boltzmann velocities at `temperature` K with an outward radial component.
    MB{radius: f64, temperature: f64, m: f64, global_rate: f64},
    /// Positions and velocities read from files, one particle per line.
    IMPORT{positions: Vec<Vector>, velocities: Vec<Vector>, global_rate: f64},
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Distribution::MB{radius, temperature, ..} => write!(f, "Maxwell-Boltzmann at {} K from r = {} km", temperature, radius/KM),
            Distribution::IMPORT{positions, ..} => write!(f, "Imported states for {} particles", positions.len()),
        }
    }
}

impl Distribution {
    pub fn from_input(input: &Input, planet: &Planet, m: f64) -> Result<Distribution> {
        if !(input.global_rate >= 0. && input.global_rate.is_finite()) {
            bail!("Input error: global_rate must be non-negative, got {}.", input.global_rate);
        }

        match input.dist_type.as_str() {
            "MB" => {
                if !(input.ref_temp > 0.) {
                    bail!("Input error: MB distribution needs a positive ref_temp, got {}.", input.ref_temp);
                }
                Ok(Distribution::MB{
                    radius: planet.radius() + input.ref_height,
                    temperature: input.ref_temp,
                    m,
                    global_rate: input.global_rate,
                })
            },
            "IMPORT" | "Import" => {
                let positions = read_vectors(&input.pos_infile)?;
                let velocities = read_vectors(&input.vel_infile)?;
                for (name, vectors) in [("pos_infile", &positions), ("vel_infile", &velocities)] {
                    if vectors.len() < input.num_testparts {
                        bail!("Input error: {} has {} lines for {} test particles.", name, vectors.len(), input.num_testparts);
                    }
                }
                Ok(Distribution::IMPORT{positions, velocities, global_rate: input.global_rate})
            },
            other => Err(anyhow!("Input error: unknown distribution type {}. Choose MB or IMPORT.", other)),
        }
    }

    /// Physical production rate in particles/s the test particles represent.
    pub fn global_rate(&self) -> f64 {
        match self {
            Distribution::MB{global_rate, ..} | Distribution::IMPORT{global_rate, ..} => *global_rate,
        }
    }

    /// Initial (position, velocity) of test particle `index`.
    pub fn sample<R: Rng + ?Sized>(&self, index: usize, rng: &mut R) -> (Vector, Vector) {
        match self {
            Distribution::MB{radius, temperature, m, ..} => {
                let direction = collision::isotropic_direction(rng);
                let mut vel = collision::maxwell_boltzmann_velocity(*temperature, *m, rng);

                //Reflect inward-moving draws so the radial component points up
                let radial_speed = vel.dot(&direction);
                if radial_speed < 0. {
                    vel = vel.sub(&direction.scale(2.*radial_speed));
                }

                (direction.scale(*radius), vel)
            },
            Distribution::IMPORT{positions, velocities, ..} => (positions[index], velocities[index]),
        }
    }

    /// Seed the state of `particle` as test particle `index`.
    pub fn init<R: Rng + ?Sized>(&self, index: usize, particle: &mut Particle, rng: &mut R) {
        let (pos, vel) = self.sample(index, rng);
        particle.pos = pos;
        particle.vel = vel;
        particle.previous_radius = pos.magnitude();
    }
}

/// Read whitespace-separated x y z rows.
pub fn read_vectors(path: &str) -> Result<Vec<Vector>> {
    input::read_rows(path)?
        .into_iter()
        .enumerate()
        .map(|(row, values)| {
            if values.len() < 3 {
                bail!("Input error: row {} of {} has {} columns, expected 3.", row + 1, path, values.len());
            }
            Ok(Vector::new(values[0], values[1], values[2]))
        })
        .collect()
}
