use super::*;

/// Closed set of particle species, used both for test particles and background species.
#[derive(Deserialize, PartialEq, Eq, Clone, Copy, Debug)]
pub enum ParticleType {
    H,
    O,
    N2,
    CO,
    CO2,
}

impl ParticleType {
    /// Species mass in grams.
    pub fn mass(&self) -> f64 {
        match *self {
            ParticleType::H => 1.00794*AMU,
            ParticleType::O => 15.9994*AMU,
            ParticleType::N2 => 28.0134*AMU,
            ParticleType::CO => 28.0101*AMU,
            ParticleType::CO2 => 44.0095*AMU,
        }
    }
}

impl FromStr for ParticleType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<ParticleType> {
        match s {
            "H" => Ok(ParticleType::H),
            "O" => Ok(ParticleType::O),
            "N2" => Ok(ParticleType::N2),
            "CO" => Ok(ParticleType::CO),
            "CO2" => Ok(ParticleType::CO2),
            _ => Err(anyhow!("Input error: invalid particle type {}. Choose one of: H, O, N2, CO, CO2", s)),
        }
    }
}

impl fmt::Display for ParticleType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ParticleType::H => write!(f, "H"),
            ParticleType::O => write!(f, "O"),
            ParticleType::N2 => write!(f, "N2"),
            ParticleType::CO => write!(f, "CO"),
            ParticleType::CO2 => write!(f, "CO2"),
        }
    }
}

/// Speed below which a test particle counts as thermalized.
#[derive(Deserialize, PartialEq, Clone, Copy, Debug)]
pub enum ThermalThreshold {
    /// Local escape speed at the particle's current radius.
    ESCAPE,
    /// Most probable Maxwell-Boltzmann speed, sqrt(2kT/m).
    MOST_PROBABLE{temperature: f64},
    /// Root-mean-square thermal speed, sqrt(3kT/m).
    RMS{temperature: f64},
    /// Mean thermal speed, sqrt(8kT/(pi m)).
    MEAN{temperature: f64},
}

impl ThermalThreshold {
    /// Temperature in K of the thermal speed policies; None for ESCAPE.
    pub fn temperature(&self) -> Option<f64> {
        match *self {
            ThermalThreshold::ESCAPE => None,
            ThermalThreshold::MOST_PROBABLE{temperature}
            | ThermalThreshold::RMS{temperature}
            | ThermalThreshold::MEAN{temperature} => Some(temperature),
        }
    }
}

impl fmt::Display for ThermalThreshold {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ThermalThreshold::ESCAPE => write!(f, "Local escape speed"),
            ThermalThreshold::MOST_PROBABLE{temperature} => write!(f, "Most probable thermal speed at {} K", temperature),
            ThermalThreshold::RMS{temperature} => write!(f, "RMS thermal speed at {} K", temperature),
            ThermalThreshold::MEAN{temperature} => write!(f, "Mean thermal speed at {} K", temperature),
        }
    }
}

/// How the velocity of the synthesized background collision partner is chosen.
#[derive(Deserialize, PartialEq, Clone, Copy, Debug)]
pub enum RelativeVelocityModel {
    /// Partner velocity drawn from a Maxwell-Boltzmann distribution at the local temperature.
    SAMPLED,
    /// Partner moves at the tabulated average thermal speed in an isotropic direction.
    MEAN,
}

impl fmt::Display for RelativeVelocityModel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RelativeVelocityModel::SAMPLED => write!(f, "Maxwell-Boltzmann sampled partner velocity"),
            RelativeVelocityModel::MEAN => write!(f, "Mean thermal speed partner, isotropic direction"),
        }
    }
}

/// Temperature profile a background species is thermalized to.
#[derive(Deserialize, PartialEq, Clone, Copy, Debug)]
pub enum TemperatureSource {
    NEUTRAL,
    ION,
    ELECTRON,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Hemisphere {
    DAY,
    NIGHT,
}

impl Hemisphere {
    /// Day side is x > 0, toward the Sun.
    pub fn of(x: f64) -> Hemisphere {
        if x > 0. {Hemisphere::DAY} else {Hemisphere::NIGHT}
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Hemisphere::DAY => write!(f, "day"),
            Hemisphere::NIGHT => write!(f, "night"),
        }
    }
}

/// Terminal state of a test particle.
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Deactivation {
    THERMALIZED,
    ESCAPED(Hemisphere),
    LOST,
}

impl fmt::Display for Deactivation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Deactivation::THERMALIZED => write!(f, "Particle was thermalized."),
            Deactivation::ESCAPED(hemisphere) => write!(f, "Reached upper bound on {} side with at least escape velocity.", hemisphere),
            Deactivation::LOST => write!(f, "Dropped below lower bound."),
        }
    }
}
