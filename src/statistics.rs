use super::*;

/// Raw per-step samples of the test particle population, normalized once at the end of a run.
#[derive(Clone, Debug)]
pub struct StatisticsAccumulator {
    planet_radius: f64,
    /// EDF altitudes, in shells (km).
    pub edf_alts: Vec<usize>,
    pub density_day: Histogram,
    pub density_night: Histogram,
    pub column_density_day: Histogram,
    pub image: Histogram,
    pub edf_day: Histogram,
    pub edf_night: Histogram,
    pub loss_rates: Vec<f64>,
    pub angleavg_dens: Vec<f64>,
}

/// Statistics converted to physical units, laid out like the accumulator.
#[derive(Clone, Debug)]
pub struct NormalizedStatistics {
    pub edf_alts: Vec<usize>,
    /// cm^-3
    pub density_day: Histogram,
    /// cm^-3
    pub density_night: Histogram,
    /// cm^-2
    pub column_density_day: Histogram,
    /// cm^-2 per pixel
    pub image: Histogram,
    /// cm^-3 eV^-1 per unit cosine
    pub edf_day: Histogram,
    pub edf_night: Histogram,
    /// s^-1
    pub loss_rates: Vec<f64>,
    /// cm^-2
    pub angleavg_dens: Vec<f64>,
}

impl StatisticsAccumulator {
    pub fn new(planet: &Planet, edf_alts: &[i64]) -> Result<StatisticsAccumulator> {
        let edf_alts = edf_alts.iter()
            .map(|&alt| {
                if alt < 0 || alt as usize >= NUM_SHELLS {
                    Err(anyhow!("Input error: EDF altitude {} km outside 0..{} km.", alt, NUM_SHELLS))
                } else {
                    Ok(alt as usize)
                }
            })
            .collect::<Result<Vec<usize>>>()?;

        let num_edfs = edf_alts.len();
        Ok(StatisticsAccumulator {
            planet_radius: planet.radius(),
            edf_alts,
            density_day: Histogram::new(&[NUM_SHELLS]),
            density_night: Histogram::new(&[NUM_SHELLS]),
            column_density_day: Histogram::new(&[NUM_SHELLS]),
            image: Histogram::new(&[IMAGE_SIZE, IMAGE_SIZE]),
            edf_day: Histogram::new(&[num_edfs, EDF_BINS, EDF_BINS]),
            edf_night: Histogram::new(&[num_edfs, EDF_BINS, EDF_BINS]),
            loss_rates: vec![0.; num_edfs],
            angleavg_dens: vec![0.; num_edfs],
        })
    }

    /// Sample one particle's state before it is advanced this step.
    pub fn record(&mut self, dt: f64, particle: &Particle) {
        let Vector {x, y, z} = *particle.position();
        let hemisphere = Hemisphere::of(x);

        let shell = bin_index(particle.radius() - self.planet_radius, 0., SHELL_WIDTH);
        match hemisphere {
            Hemisphere::DAY => self.density_day.add(&[shell], 1.),
            Hemisphere::NIGHT => self.density_night.add(&[shell], 1.),
        };

        //Column density seen perpendicular to the day-night axis
        if x >= 0. {
            let projected_shell = bin_index((x*x + z*z).sqrt() - self.planet_radius, 0., SHELL_WIDTH);
            self.column_density_day.add(&[projected_shell], 1.);
        }

        //Pixel (IMAGE_SIZE - 1)/2 is centered on the planet in both axes
        let half_image = (IMAGE_SIZE/2) as i64;
        let column = bin_index(x, -0.5*PIXEL_WIDTH, PIXEL_WIDTH) + half_image;
        let row = bin_index(z, -0.5*PIXEL_WIDTH, PIXEL_WIDTH) + half_image;
        self.image.add(&[row, column], 1.);

        let slab = bin_index(x - self.planet_radius, 0., SHELL_WIDTH);
        for (j, &alt) in self.edf_alts.iter().enumerate() {
            if shell == alt as i64 {
                let energy_index = bin_index(particle.energy_eV(), 0., EDF_ENERGY_BIN);
                let cos_index = cos_bin(particle.cos_theta());
                let bin = [j as i64, energy_index, cos_index];
                match hemisphere {
                    Hemisphere::DAY => self.edf_day.add(&bin, 1.),
                    Hemisphere::NIGHT => self.edf_night.add(&bin, 1.),
                };

                self.loss_rates[j] += ((particle.radius() - particle.previous_radius())/dt).abs();
            }

            if slab == alt as i64 {
                self.angleavg_dens[j] += limb_weight((y*y + z*z).sqrt(), 0.5*SHELL_WIDTH);
            }
        }
    }

    /// Convert raw counts to densities and rates for a source of `rate` particles/s represented by `total_parts` test particles.
    pub fn finalize(&self, dt: f64, rate: f64, total_parts: usize) -> NormalizedStatistics {
        let weight = dt*rate/total_parts as f64;
        let planet_radius = self.planet_radius;
        let shell_radius = |i: usize| planet_radius + SHELL_WIDTH*i as f64;

        let mut density_day = self.density_day.clone();
        let mut density_night = self.density_night.clone();
        density_day.scale_with(|i| weight/half_shell_volume(shell_radius(i)));
        density_night.scale_with(|i| weight/half_shell_volume(shell_radius(i)));

        let mut column_density_day = self.column_density_day.clone();
        column_density_day.scale_with(|i| weight/half_annulus_area(shell_radius(i)));

        let mut image = self.image.clone();
        image.scale(weight/(PIXEL_WIDTH*PIXEL_WIDTH));

        let bins_per_edf = EDF_BINS*EDF_BINS;
        let edf_volumes: Vec<f64> = self.edf_alts.iter()
            .map(|&alt| half_shell_volume(shell_radius(alt)))
            .collect();

        let mut edf_day = self.edf_day.clone();
        let mut edf_night = self.edf_night.clone();
        edf_day.scale_with(|i| weight/(edf_volumes[i/bins_per_edf]*EDF_ENERGY_BIN*EDF_COS_BIN));
        edf_night.scale_with(|i| weight/(edf_volumes[i/bins_per_edf]*EDF_ENERGY_BIN*EDF_COS_BIN));

        let loss_rates = izip!(&self.loss_rates, &self.edf_alts, &edf_volumes)
            .map(|(&sum, &alt, &volume)| {
                let r_outer = shell_radius(alt) + SHELL_WIDTH;
                sum/volume*weight*TWO_PI*r_outer*r_outer
            })
            .collect();

        let angleavg_dens = self.angleavg_dens.iter()
            .map(|&sum| weight*sum/(SHELL_WIDTH*SHELL_WIDTH))
            .collect();

        NormalizedStatistics {
            edf_alts: self.edf_alts.clone(),
            density_day,
            density_night,
            column_density_day,
            image,
            edf_day,
            edf_night,
            loss_rates,
            angleavg_dens,
        }
    }
}

/// Cosine bin with outward directions in the upper half of the axis and inward in the lower half; 0 maps to the center bin.
pub fn cos_bin(cos_theta: f64) -> i64 {
    let magnitude = bin_index(cos_theta.abs(), 0., EDF_COS_BIN);
    let center = (EDF_BINS/2) as i64;
    if cos_theta > 0. {
        center + magnitude
    } else {
        center - magnitude
    }
}

/// Visibility weight of a particle at transverse distance `rho` from the line of sight through a slab of half-thickness `half_thickness`.
pub fn limb_weight(rho: f64, half_thickness: f64) -> f64 {
    if rho <= half_thickness {
        1.
    } else {
        (2./PI)*(half_thickness/rho).asin()
    }
}

/// Volume of the half shell (one hemisphere) between `r` and `r + SHELL_WIDTH`.
pub fn half_shell_volume(r: f64) -> f64 {
    let r_outer = r + SHELL_WIDTH;
    TWO_PI/3.*(r_outer.powi(3) - r.powi(3))
}

/// Projected area of the half annulus between `r` and `r + SHELL_WIDTH`.
pub fn half_annulus_area(r: f64) -> f64 {
    let r_outer = r + SHELL_WIDTH;
    0.5*PI*(r_outer*r_outer - r*r)
}
