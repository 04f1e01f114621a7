use super::*;

/// Output locations of a run.
#[derive(Clone, Debug, Default)]
pub struct OutputDirs {
    pub trace: String,
    pub positions: String,
    pub stats: String,
    pub distributions: String,
}

/// End-of-run counts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSummary {
    pub num_collisions: usize,
    pub active_remaining: usize,
    pub escapes: EscapeTally,
    pub total_parts: usize,
    pub global_rate: f64,
    pub steps_taken: usize,
}

impl RunSummary {
    /// Loss rate in particles/s from the escaped fractions; the source feeds each hemisphere with half the global rate.
    pub fn total_loss_rate(&self) -> f64 {
        let (day_fraction, night_fraction) = self.escapes.fractions(self.total_parts);
        (day_fraction + night_fraction)*(self.global_rate/2.)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (day_fraction, night_fraction) = self.escapes.fractions(self.total_parts);
        writeln!(f, "Number of collisions: {}", self.num_collisions)?;
        writeln!(f, "Active particles remaining: {}", self.active_remaining)?;
        writeln!(f, "Number of day side escaped particles: {}", self.escapes.day)?;
        writeln!(f, "Number of night side escaped particles: {}", self.escapes.night)?;
        writeln!(f, "Total particles spawned: {}", self.total_parts)?;
        writeln!(f, "Day side fraction of escaped particles: {}", day_fraction)?;
        writeln!(f, "Night side fraction of escaped particles: {}", night_fraction)?;
        writeln!(f, "Global production rate: {}", self.global_rate)?;
        write!(f, "Total loss rate: {}", self.total_loss_rate())
    }
}

/// Test particle population moving through the background atmosphere of a planet.
pub struct Atmosphere {
    pub particles: Vec<Particle>,
    pub traced: Vec<usize>,
    pub planet: Planet,
    pub distribution: Distribution,
    pub collisions: CollisionSampler,
    pub statistics: StatisticsAccumulator,
    pub active: ActiveIndexSet,
    pub active_parts: usize,
    pub thermal_threshold: ThermalThreshold,
    pub output_dirs: OutputDirs,
    rng: ChaChaRng,
}

impl Atmosphere {
    pub fn new(particle_type: ParticleType, num_parts: usize, num_traced: usize, planet: Planet, distribution: Distribution,
        collisions: CollisionSampler, edf_alts: &[i64], thermal_threshold: ThermalThreshold, output_dirs: OutputDirs, mut rng: ChaChaRng) -> Result<Atmosphere> {

        if num_parts == 0 {
            bail!("Input error: num_testparts must be greater than zero.");
        }
        if num_traced > num_parts {
            bail!("Input error: num_traced {} exceeds num_testparts {}.", num_traced, num_parts);
        }

        let mut particles = Vec::with_capacity(num_parts);
        for index in 0..num_parts {
            let mut particle = Particle::new(particle_type, Vector::zero(), Vector::zero());
            distribution.init(index, &mut particle, &mut rng);
            particles.push(particle);
        }

        let mut traced = rand::seq::index::sample(&mut rng, num_parts, num_traced).into_vec();
        traced.sort_unstable();
        for &index in &traced {
            particles[index].set_traced();
        }

        let statistics = StatisticsAccumulator::new(&planet, edf_alts)?;

        Ok(Atmosphere {
            particles,
            traced,
            planet,
            distribution,
            collisions,
            statistics,
            active: ActiveIndexSet::new(num_parts),
            active_parts: num_parts,
            thermal_threshold,
            output_dirs,
            rng,
        })
    }

    /// Build the planet, background atmosphere and test particles an input file describes.
    pub fn from_input(input: &Input) -> Result<Atmosphere> {
        let planet = Planet::new(input.planet_mass, input.planet_radius)?;
        let particle_type: ParticleType = input.part_type.parse()?;

        let seed = match input.seed {
            Some(seed) => seed,
            None => {
                let seed: u64 = rand::thread_rng().gen();
                info!("No seed given; using seed = {}.", seed);
                seed
            }
        };
        let rng = ChaChaRng::seed_from_u64(seed);

        let distribution = Distribution::from_input(input, &planet, particle_type.mass())?;
        let background = BackgroundAtmosphere::new(&input.background_species, input.profiles.as_ref(), planet, input.ref_temp, input.ref_height)?;
        let collisions = CollisionSampler::new(background, input.relative_velocity_model);

        let output_dirs = OutputDirs {
            trace: input.trace_output_dir.clone(),
            positions: input.output_pos_dir.clone(),
            stats: input.output_stats_dir.clone(),
            distributions: input.output_dir.clone(),
        };

        info!("Test particles: {} {} from {}.", input.num_testparts, particle_type, distribution);
        info!("Background species: {}.", input.background_species.iter().map(|species| species.part_type.as_str()).collect::<Vec<&str>>().join(", "));
        info!("Thermal threshold: {}. Relative velocity: {}.", input.thermal_threshold, input.relative_velocity_model);

        Atmosphere::new(particle_type, input.num_testparts, input.num_traced, planet, distribution, collisions,
            &input.EDF_alts, input.thermal_threshold, output_dirs, rng)
    }

    /// One timestep over every active particle: sample statistics, advance, collide, then classify.
    /// Returns the number of particles deactivated.
    pub fn step(&mut self, step: usize, dt: f64, classifier: &mut BoundaryClassifier) -> usize {
        let time = step as f64*dt;
        let k = self.planet.gravitational_parameter();
        let particles = &mut self.particles;
        let statistics = &mut self.statistics;
        let collisions = &mut self.collisions;
        let rng = &mut self.rng;

        let removed = self.active.retain_pass(|index| {
            let particle = &mut particles[index];
            statistics.record(dt, particle);
            particle.advance(dt, k);
            collisions.maybe_collide(particle, dt, time, &mut *rng);
            !classifier.classify(particle, time)
        });

        self.active_parts -= removed;
        debug_assert_eq!(self.active_parts, self.active.len());
        removed
    }

    /// Run for at most `num_steps` steps of `dt` seconds between altitudes `lower_bound` and `upper_bound` (cm),
    /// then write the normalized statistics and collision logs.
    pub fn run(&mut self, dt: f64, num_steps: usize, lower_bound: f64, upper_bound: f64, print_status_freq: usize, output_pos_freq: usize) -> Result<RunSummary> {
        let mut classifier = BoundaryClassifier::new(&self.planet, lower_bound, upper_bound, self.thermal_threshold)?;
        let total_parts = self.particles.len();

        println!("Simulating particle transport...");
        info!("Escape speed at upper bound: {} cm/s.", classifier.escape_speed_upper);

        let bar: ProgressBar = ProgressBar::new(num_steps as u64);
        bar.set_style(ProgressStyle::default_bar()
            .template("[{elapsed_precise}][{bar:40.cyan/blue}][{eta_precise}] {percent}%")
            .progress_chars("#>-"));

        let mut steps_taken = 0;
        for step in 0..num_steps {
            if self.active_parts == 0 {
                break;
            }

            if print_status_freq > 0 && (step + 1) % print_status_freq == 0 {
                bar.println(status_line((step + 1) as f64*dt, self.active_parts, &classifier.escapes, total_parts));
            }

            if output_pos_freq > 0 && (step + 1) % output_pos_freq == 0 {
                output::output_positions(&self.particles, &self.output_dirs.positions, step + 1)?;
            }

            if !self.traced.is_empty() {
                output::output_trace_data(&self.particles, &self.traced, &self.output_dirs.trace)?;
            }

            self.step(step, dt, &mut classifier);
            steps_taken += 1;
            bar.inc(1);
        }
        bar.finish();

        if !self.traced.is_empty() {
            output::output_collision_data(&self.particles, &self.traced, &self.output_dirs.trace)?;
        }

        let global_rate = self.distribution.global_rate();
        let normalized = self.statistics.finalize(dt, global_rate/2., total_parts);
        output::output_stats(&normalized, &self.output_dirs.stats)?;

        let summary = RunSummary {
            num_collisions: self.collisions.num_collisions,
            active_remaining: self.active_parts,
            escapes: classifier.escapes,
            total_parts,
            global_rate,
            steps_taken,
        };
        println!("{}", summary);

        Ok(summary)
    }

    /// Altitude, speed and per-EDF-altitude energy distributions of the active particles, with `suffix` appended to each file name.
    pub fn output_distributions(&self, suffix: &str) -> Result<()> {
        let dir = &self.output_dirs.distributions;
        output::output_altitude_distro(&self.particles, &self.planet, SHELL_WIDTH, dir, &format!("altdist{}.out", suffix))?;
        output::output_velocity_distro(&self.particles, 1E4, dir, &format!("vdist{}.out", suffix))?;
        for alt in &self.statistics.edf_alts {
            output::output_alt_energy_distro(&self.particles, &self.planet, *alt as f64*KM, 0.03, dir, &format!("edist_{}km{}.out", alt, suffix))?;
        }
        Ok(())
    }
}

/// Elapsed simulated time with the active count and escapes so far.
pub fn status_line(time: f64, active_parts: usize, escapes: &EscapeTally, total_parts: usize) -> String {
    let hours = time/3600.;
    let minutes = hours.fract()*60.;
    let seconds = minutes.fract()*60.;
    let (day_fraction, night_fraction) = escapes.fractions(total_parts);
    format!("{}h {}m {:.3}s\tActive: {}\tDay escape: {}\tDay fraction: {}\tNight escape: {}\tNight fraction: {}",
        hours.trunc(), minutes.trunc(), seconds, active_parts, escapes.day, day_fraction, escapes.night, night_fraction)
}
