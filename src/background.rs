use super::*;

/// Background species as read from the configuration.
#[derive(Deserialize, Clone, Debug)]
pub struct BackgroundSpeciesInput {
    pub part_type: String,
    /// Number density in cm^-3 at `ref_height`.
    pub ref_density: f64,
    /// Scale height in cm; derived from `ref_temp` when absent.
    #[serde(default)]
    pub scale_height: Option<f64>,
    #[serde(default = "default_temperature_source")]
    pub temperature_source: TemperatureSource,
    /// Total cross section in cm^2 used when no table is given.
    pub sigma_default: f64,
    /// (collision energy in eV, total cross section in cm^2)
    #[serde(default)]
    pub sigma_table: Vec<(f64, f64)>,
    #[serde(default)]
    pub diff_sigma: Option<DiffSigmaInput>,
    /// Densities in cm^-3 at `profiles.dens_alt_bins`.
    #[serde(default)]
    pub density_profile: Vec<f64>,
}

///This helper function is a workaround to issue #368 in serde
fn default_temperature_source() -> TemperatureSource {
    TemperatureSource::NEUTRAL
}

/// Differential cross section table: one row of `sigma` per energy, one column per angle.
#[derive(Deserialize, Clone, Debug)]
pub struct DiffSigmaInput {
    /// Collision energies in eV.
    pub energies: Vec<f64>,
    /// Scattering angles in degrees.
    pub angles: Vec<f64>,
    pub sigma: Vec<Vec<f64>>,
}

/// Altitude profiles shared by all background species. Altitudes in cm above the surface.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct ProfilesInput {
    pub profile_bottom_alt: f64,
    pub profile_top_alt: f64,
    #[serde(default)]
    pub temp_alt_bins: Vec<f64>,
    #[serde(default)]
    pub Tn: Vec<f64>,
    #[serde(default)]
    pub Ti: Vec<f64>,
    #[serde(default)]
    pub Te: Vec<f64>,
    #[serde(default)]
    pub dens_alt_bins: Vec<f64>,
}

/// Scattering angle CDFs on a shared angle grid, one row per tabulated energy.
#[derive(Clone, Debug)]
pub struct CdfGrid {
    pub energies: Vec<f64>,
    pub angles: Vec<f64>,
    cdf: Vec<f64>,
}

impl CdfGrid {
    pub fn row(&self, energy_index: usize) -> &[f64] {
        let n = self.angles.len();
        &self.cdf[energy_index*n..(energy_index + 1)*n]
    }

    /// Index of the tabulated energy closest to `energy`.
    pub fn nearest_energy_index(&self, energy: f64) -> usize {
        self.energies.iter()
            .map(|e| (e - energy).abs())
            .enumerate()
            .fold((0, f64::INFINITY), |(best, best_distance), (i, distance)| {
                if distance < best_distance {(i, distance)} else {(best, best_distance)}
            }).0
    }
}

#[derive(Clone, Debug)]
pub struct BackgroundSpecies {
    pub particle_type: ParticleType,
    pub m: f64,
    pub ref_density: f64,
    pub scale_height: f64,
    pub temperature_source: TemperatureSource,
    pub sigma_default: f64,
    density: Option<Interpolator>,
    avg_v: Interpolator,
    sigma: Option<Interpolator>,
    diff_sigma: Option<CdfGrid>,
}

/// Modeled background atmosphere that test particles collide with.
#[derive(Clone, Debug)]
pub struct BackgroundAtmosphere {
    pub species: Vec<BackgroundSpecies>,
    planet: Planet,
    ref_temp: f64,
    ref_height: f64,
    profile_bottom_alt: f64,
    profile_top_alt: f64,
    Tn: Option<Interpolator>,
    Ti: Option<Interpolator>,
    Te: Option<Interpolator>,
}

impl BackgroundAtmosphere {
    pub fn new(species_inputs: &[BackgroundSpeciesInput], profiles: Option<&ProfilesInput>, planet: Planet, ref_temp: f64, ref_height: f64) -> Result<BackgroundAtmosphere> {
        if !(ref_temp >= 0. && ref_temp.is_finite()) {
            bail!("Input error: ref_temp must be non-negative, got {}.", ref_temp);
        }

        let temperature_profile = |values: &Vec<f64>, name: &str| -> Result<Option<Interpolator>> {
            match profiles {
                Some(p) if !values.is_empty() => {
                    if values.iter().any(|&t| t < 0.) {
                        bail!("Input error: negative temperature in {} profile.", name);
                    }
                    Interpolator::new(p.temp_alt_bins.clone(), values.clone())
                        .with_context(|| format!("Input error: bad {} temperature profile.", name))
                        .map(Some)
                },
                _ => Ok(None),
            }
        };

        let (Tn, Ti, Te) = match profiles {
            Some(p) => (temperature_profile(&p.Tn, "Tn")?, temperature_profile(&p.Ti, "Ti")?, temperature_profile(&p.Te, "Te")?),
            None => (None, None, None),
        };

        let (profile_bottom_alt, profile_top_alt) = match profiles {
            Some(p) => {
                if p.profile_top_alt < p.profile_bottom_alt {
                    bail!("Input error: profile_top_alt {} below profile_bottom_alt {}.", p.profile_top_alt, p.profile_bottom_alt);
                }
                (p.profile_bottom_alt, p.profile_top_alt)
            },
            None => (0., 0.),
        };

        let mut atmosphere = BackgroundAtmosphere {
            species: Vec::with_capacity(species_inputs.len()),
            planet,
            ref_temp,
            ref_height,
            profile_bottom_alt,
            profile_top_alt,
            Tn,
            Ti,
            Te,
        };

        for input in species_inputs {
            let species = atmosphere.build_species(input, profiles)
                .with_context(|| format!("Input error: could not set up background species {}.", input.part_type))?;
            atmosphere.species.push(species);
        }

        Ok(atmosphere)
    }

    fn build_species(&self, input: &BackgroundSpeciesInput, profiles: Option<&ProfilesInput>) -> Result<BackgroundSpecies> {
        let particle_type: ParticleType = input.part_type.parse()?;
        let m = particle_type.mass();

        if !(input.ref_density >= 0. && input.ref_density.is_finite()) {
            bail!("Input error: ref_density must be non-negative, got {}.", input.ref_density);
        }
        if !(input.sigma_default >= 0. && input.sigma_default.is_finite()) {
            bail!("Input error: sigma_default must be non-negative, got {}.", input.sigma_default);
        }

        let scale_height = match input.scale_height {
            Some(h) => h,
            None => K_B*self.ref_temp/(m*self.planet.gravity_at_altitude(self.ref_height)),
        };
        if !(scale_height > 0. && scale_height.is_finite()) {
            bail!("Input error: scale height {} cm is not positive. Set scale_height or a positive ref_temp.", scale_height);
        }

        let density = match profiles {
            Some(p) if !input.density_profile.is_empty() => {
                if input.density_profile.iter().any(|&n| n < 0.) {
                    bail!("Input error: negative density in density_profile.");
                }
                Some(Interpolator::new(p.dens_alt_bins.clone(), input.density_profile.clone())
                    .context("Input error: density_profile does not match dens_alt_bins.")?)
            },
            _ => None,
        };

        //Average thermal velocity tabulated on the temperature grid of this species' source
        let mean_speed = |t: f64| (8.*K_B*t/(PI*m)).sqrt();
        let avg_v = match (profiles, self.temperature_profile(input.temperature_source)) {
            (Some(p), Some(_)) => {
                let v: Vec<f64> = p.temp_alt_bins.iter()
                    .map(|&alt| mean_speed(self.temperature(alt, input.temperature_source)))
                    .collect();
                Interpolator::new(p.temp_alt_bins.clone(), v)?
            },
            _ => Interpolator::new(vec![self.ref_height], vec![mean_speed(self.ref_temp)])?,
        };

        let sigma = if input.sigma_table.is_empty() {
            None
        } else {
            let (energies, sigmas): (Vec<f64>, Vec<f64>) = input.sigma_table.iter().cloned().unzip();
            Some(Interpolator::new(energies, sigmas).context("Input error: bad sigma_table.")?)
        };

        let diff_sigma = match &input.diff_sigma {
            Some(table) => Some(build_cdf_grid(table)?),
            None => None,
        };

        Ok(BackgroundSpecies {
            particle_type,
            m,
            ref_density: input.ref_density,
            scale_height,
            temperature_source: input.temperature_source,
            sigma_default: input.sigma_default,
            density,
            avg_v,
            sigma,
            diff_sigma,
        })
    }

    fn temperature_profile(&self, source: TemperatureSource) -> Option<&Interpolator> {
        match source {
            TemperatureSource::NEUTRAL => self.Tn.as_ref(),
            TemperatureSource::ION => self.Ti.as_ref(),
            TemperatureSource::ELECTRON => self.Te.as_ref(),
        }
    }

    pub fn planet(&self) -> &Planet {
        &self.planet
    }

    pub fn num_species(&self) -> usize {
        self.species.len()
    }

    /// Temperature in K at altitude `alt` (cm) from the requested profile, or `ref_temp` without one.
    pub fn temperature(&self, alt: f64, source: TemperatureSource) -> f64 {
        match self.temperature_profile(source) {
            Some(profile) => profile.evaluate(alt).max(0.),
            None => self.ref_temp,
        }
    }

    /// Number density in cm^-3 of species `index` at altitude `alt` (cm).
    pub fn get_density(&self, alt: f64, index: usize) -> f64 {
        let species = &self.species[index];
        match &species.density {
            Some(profile) => {
                let top = self.profile_top_alt.min(profile.last_x());
                if alt > top {
                    calc_new_density(profile.evaluate(top), species.scale_height, alt - top)
                } else {
                    profile.evaluate(alt.max(self.profile_bottom_alt))
                }
            },
            None => calc_new_density(species.ref_density, species.scale_height, alt - self.ref_height),
        }
    }

    /// Average thermal speed in cm/s of species `index` at altitude `alt` (cm).
    pub fn average_velocity(&self, alt: f64, index: usize) -> f64 {
        self.species[index].avg_v.evaluate(alt)
    }

    /// Total cross section in cm^2 of species `index` at collision energy `energy` (eV).
    pub fn total_cross_section(&self, energy: f64, index: usize) -> f64 {
        let species = &self.species[index];
        let sigma = match &species.sigma {
            Some(table) => table.evaluate(energy),
            None => species.sigma_default,
        };

        if sigma.is_finite() && sigma >= 0. {
            sigma
        } else {
            warn!("Numerical error: cross section {} for {} at {} eV; using 0.", sigma, species.particle_type, energy);
            0.
        }
    }

    /// Sample a center-of-mass scattering angle in radians for species `index` at collision energy `energy` (eV).
    pub fn find_new_theta<R: Rng + ?Sized>(&self, index: usize, energy: f64, rng: &mut R) -> f64 {
        let u: f64 = rng.gen();
        match &self.species[index].diff_sigma {
            Some(grid) => invert_cdf(&grid.angles, grid.row(grid.nearest_energy_index(energy)), u),
            //Isotropic in the center-of-mass frame
            None => (1. - 2.*u).clamp(-1., 1.).acos(),
        }
    }
}

/// Exponential falloff of `ref_density` over `r_moved` cm with scale height `scale_height` cm.
pub fn calc_new_density(ref_density: f64, scale_height: f64, r_moved: f64) -> f64 {
    ref_density*(-r_moved/scale_height).exp()
}

/// Normalized CDF of scattering angle from a differential cross section sampled at `angle` (radians).
pub fn make_new_cdf(angle: &[f64], sigma: &[f64]) -> Vec<f64> {
    let mut cdf = Vec::with_capacity(angle.len());
    let mut total = 0.;
    cdf.push(0.);

    let weight = |i: usize| sigma[i].max(0.)*angle[i].sin();
    for i in 1..angle.len() {
        total += 0.5*(weight(i - 1) + weight(i))*(angle[i] - angle[i - 1]);
        cdf.push(total);
    }

    if total > 0. && total.is_finite() {
        cdf.iter().map(|c| c/total).collect()
    } else {
        //Degenerate row; fall back to isotropic scattering over the tabulated range
        warn!("Numerical error: differential cross section integrates to {}; using isotropic angles.", total);
        let c0 = angle[0].cos();
        let span = c0 - angle[angle.len() - 1].cos();
        angle.iter().map(|a| if span > 0. {(c0 - a.cos())/span} else {1.}).collect()
    }
}

fn build_cdf_grid(table: &DiffSigmaInput) -> Result<CdfGrid> {
    if table.energies.is_empty() || table.angles.len() < 2 {
        bail!("Input error: diff_sigma needs at least one energy and two angles.");
    }
    if table.sigma.len() != table.energies.len() {
        bail!("Input error: diff_sigma has {} rows for {} energies.", table.sigma.len(), table.energies.len());
    }
    if let Some(row) = table.sigma.iter().find(|row| row.len() != table.angles.len()) {
        bail!("Input error: diff_sigma row of length {} for {} angles.", row.len(), table.angles.len());
    }
    if !table.angles.windows(2).all(|pair| pair[1] > pair[0]) {
        bail!("Input error: diff_sigma angles must be strictly increasing.");
    }

    let angles: Vec<f64> = table.angles.iter().map(|a| a*PI/180.).collect();
    let cdf = table.sigma.iter()
        .flat_map(|row| make_new_cdf(&angles, row))
        .collect();

    Ok(CdfGrid {
        energies: table.energies.clone(),
        angles,
        cdf,
    })
}

/// Inverse-CDF lookup with linear interpolation between angle nodes.
pub fn invert_cdf(angles: &[f64], cdf: &[f64], u: f64) -> f64 {
    let upper = cdf.partition_point(|&c| c < u);
    if upper == 0 {
        return angles[0];
    }
    if upper >= cdf.len() {
        return angles[angles.len() - 1];
    }
    let lower = upper - 1;
    let dc = cdf[upper] - cdf[lower];
    if dc > 0. {
        angles[lower] + (u - cdf[lower])/dc*(angles[upper] - angles[lower])
    } else {
        angles[upper]
    }
}
