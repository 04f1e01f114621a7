use super::*;

/// One collision recorded in a traced particle's log.
#[derive(Clone, Debug, PartialEq)]
pub struct CollisionEvent {
    pub time: f64,
    pub target: ParticleType,
    pub theta: f64,
    pub altitude: f64,
}

impl fmt::Display for CollisionEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t{}\t{}\t{}", self.time, self.target, self.theta, self.altitude/KM)
    }
}

/// Test particle. Positions in cm, velocities in cm/s.
#[derive(Clone, Debug)]
pub struct Particle {
    pub particle_type: ParticleType,
    pub m: f64,
    pub pos: Vector,
    pub vel: Vector,
    pub previous_radius: f64,
    pub active: bool,
    pub traced: bool,
    pub collision_log: Vec<CollisionEvent>,
    pub deactivation: Option<(f64, Deactivation)>,
}

impl Particle {
    pub fn new(particle_type: ParticleType, pos: Vector, vel: Vector) -> Particle {
        let radius = pos.magnitude();
        Particle {
            particle_type,
            m: particle_type.mass(),
            pos,
            vel,
            previous_radius: radius,
            active: true,
            traced: false,
            collision_log: vec![],
            deactivation: None,
        }
    }

    pub fn position(&self) -> &Vector {
        &self.pos
    }

    pub fn radius(&self) -> f64 {
        self.pos.magnitude()
    }

    /// Radius before the most recent orbit advance.
    pub fn previous_radius(&self) -> f64 {
        self.previous_radius
    }

    pub fn speed(&self) -> f64 {
        self.vel.magnitude()
    }

    pub fn energy_eV(&self) -> f64 {
        0.5*self.m*self.vel.magnitude_squared()/EV
    }

    /// Cosine of the angle between the velocity and the local radial direction.
    pub fn cos_theta(&self) -> f64 {
        let denominator = self.radius()*self.speed();
        if denominator > 0. {
            self.pos.dot(&self.vel)/denominator
        } else {
            0.
        }
    }

    /// Advance position and velocity by `dt` in the central field of gravitational parameter `k`.
    pub fn advance(&mut self, dt: f64, k: f64) {
        self.previous_radius = self.radius();

        //Velocity Verlet: kick, drift, kick
        let half_dt = 0.5*dt;
        let a_old = gravitational_acceleration(&self.pos, k);
        let v_half = self.vel.add(&a_old.scale(half_dt));

        self.pos = self.pos.add(&v_half.scale(dt));

        let a_new = gravitational_acceleration(&self.pos, k);
        self.vel = v_half.add(&a_new.scale(half_dt));
    }

    /// Elastic two-body collision with `partner`, scattering by `theta` at azimuth `phi` in the center-of-mass frame.
    pub fn apply_collision(&mut self, partner: &collision::CollisionPartner, theta: f64, phi: f64, time: f64, planet_radius: f64) {
        let m1 = self.m;
        let m2 = partner.particle_type.mass();
        let total_mass = m1 + m2;

        let relative_velocity = self.vel.sub(&partner.vel);
        let relative_speed = relative_velocity.magnitude();

        if relative_speed > 0. {
            let v_cm = self.vel.scale(m1).add(&partner.vel.scale(m2)).scale(1./total_mass);
            let direction = relative_velocity.scale(1./relative_speed);
            let scattered = structs::rotate_direction(&direction, theta, phi).scale(relative_speed);
            self.vel = v_cm.add(&scattered.scale(m2/total_mass));
        }

        if self.traced {
            self.append_collision_log(CollisionEvent {
                time,
                target: partner.particle_type,
                theta,
                altitude: self.radius() - planet_radius,
            });
        }
    }

    /// Terminal transition; later calls keep the first reason.
    pub fn deactivate(&mut self, reason: Deactivation, time: f64) {
        if self.active {
            self.active = false;
            self.deactivation = Some((time, reason));
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_traced(&mut self) {
        self.traced = true;
    }

    pub fn append_collision_log(&mut self, event: CollisionEvent) {
        self.collision_log.push(event);
    }
}

pub fn gravitational_acceleration(pos: &Vector, k: f64) -> Vector {
    let r = pos.magnitude();
    pos.scale(-k/(r*r*r))
}
