use super::*;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Path of `name` inside output directory `dir`; an empty `dir` means the working directory.
pub fn output_path(dir: &str, name: &str) -> PathBuf {
    Path::new(dir).join(name)
}

/// Open `name` in `dir` for writing, creating the directory if needed.
pub fn open_output(dir: &str, name: &str, append: bool) -> Result<BufWriter<File>> {
    if !dir.is_empty() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Output error: could not create output directory {}.", dir))?;
    }

    let path = output_path(dir, name);
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .append(append)
        .truncate(!append)
        .open(&path)
        .with_context(|| format!("Output error: could not open output file {}.", path.display()))?;

    Ok(BufWriter::with_capacity(8192, file))
}

fn write_header<W: Write>(stream: &mut W, description: &str, bin_width: &str, num_bins: &str) -> Result<()> {
    writeln!(stream, "#{}", description)?;
    writeln!(stream, "{}", bin_width)?;
    writeln!(stream, "{}", num_bins)?;
    Ok(())
}

/// One `index\tvalue` row per bin.
pub fn write_profile<W: Write>(stream: &mut W, description: &str, bin_width: f64, values: &[f64]) -> Result<()> {
    write_header(stream, description, &bin_width.to_string(), &values.len().to_string())?;
    for (index, value) in values.iter().enumerate() {
        writeln!(stream, "{}\t{:e}", index, value)?;
    }
    Ok(())
}

/// One line of tab-separated values per grid row.
pub fn write_grid<W: Write>(stream: &mut W, description: &str, bin_widths: (f64, f64), grid: &[f64], row_length: usize) -> Result<()> {
    let num_rows = grid.len()/row_length.max(1);
    write_header(stream, description,
        &format!("{}\t{}", bin_widths.0, bin_widths.1),
        &format!("{}\t{}", num_rows, row_length))?;

    for row in grid.chunks(row_length.max(1)) {
        let line = row.iter().map(|value| format!("{:e}", value)).collect::<Vec<String>>().join("\t");
        writeln!(stream, "{}", line)?;
    }
    Ok(())
}

/// Write every normalized statistics file into `dir`.
pub fn output_stats(statistics: &NormalizedStatistics, dir: &str) -> Result<()> {
    let shell_km = SHELL_WIDTH/KM;

    let files: [(&str, &str, &Histogram); 3] = [
        ("density1d_day.out", "alt[km]\tdensity[cm-3]", &statistics.density_day),
        ("density1d_night.out", "alt[km]\tdensity[cm-3]", &statistics.density_night),
        ("column_density_day.out", "alt[km]\tcol density[cm-2]", &statistics.column_density_day),
    ];
    for (name, description, histogram) in files {
        let mut stream = open_output(dir, name, false)?;
        write_profile(&mut stream, description, shell_km, histogram.values())
            .with_context(|| format!("Output error: could not write {}.", name))?;
        stream.flush()?;
    }

    let mut stream = open_output(dir, "density2d.out", false)?;
    write_grid(&mut stream,
        &format!("{} x {} grid of column densities [cm-2] viewing the XZ plane from +Y; rows are z, columns are x, pixels are {} km wide",
            IMAGE_SIZE, IMAGE_SIZE, PIXEL_WIDTH/KM),
        (PIXEL_WIDTH/KM, PIXEL_WIDTH/KM), statistics.image.values(), IMAGE_SIZE)
        .context("Output error: could not write density2d.out.")?;
    stream.flush()?;

    for (j, alt) in statistics.edf_alts.iter().enumerate() {
        for (side, histogram) in [("day", &statistics.edf_day), ("night", &statistics.edf_night)] {
            let name = format!("EDF_{}_{}km.out", side, alt);
            let mut stream = open_output(dir, &name, false)?;
            write_grid(&mut stream,
                &format!("rows are energy from 0 eV in {} eV bins; columns are cos(theta) from -1 to 1 in {} bins", EDF_ENERGY_BIN, EDF_COS_BIN),
                (EDF_ENERGY_BIN, EDF_COS_BIN), histogram.row(&[j]), EDF_BINS)
                .with_context(|| format!("Output error: could not write {}.", name))?;
            stream.flush()?;
        }
    }

    let per_altitude: [(&str, &str, &Vec<f64>); 2] = [
        ("loss_rates.out", "alt[km]\tloss rate[s-1]", &statistics.loss_rates),
        ("angleavg_dens.out", "alt[km]\tangle-averaged column density[cm-2]", &statistics.angleavg_dens),
    ];
    for (name, description, values) in per_altitude {
        let mut stream = open_output(dir, name, false)?;
        write_header(&mut stream, description, &shell_km.to_string(), &values.len().to_string())?;
        for (alt, value) in statistics.edf_alts.iter().zip(values) {
            writeln!(stream, "{}\t{:e}", alt, value)?;
        }
        stream.flush()
            .with_context(|| format!("Output error: could not write {}.", name))?;
    }

    Ok(())
}

/// Snapshot of every particle's position, active or not.
pub fn output_positions(particles: &[Particle], dir: &str, step: usize) -> Result<()> {
    let name = format!("positions{}.out", step);
    let mut stream = open_output(dir, &name, false)?;
    for particle in particles {
        writeln!(stream, "{:.10e}\t{:.10e}\t{:.10e}", particle.pos.x, particle.pos.y, particle.pos.z)?;
    }
    stream.flush()
        .with_context(|| format!("Output error: could not write {}.", name))?;
    Ok(())
}

/// Append the current position of each active traced particle to its trace file.
pub fn output_trace_data(particles: &[Particle], traced: &[usize], dir: &str) -> Result<()> {
    for &index in traced {
        let particle = &particles[index];
        if particle.is_active() {
            let mut stream = open_output(dir, &format!("part{}_positions.out", index), true)?;
            writeln!(stream, "{:.10e}\t{:.10e}\t{:.10e}", particle.pos.x, particle.pos.y, particle.pos.z)?;
            stream.flush()?;
        }
    }
    Ok(())
}

/// Collision log of each traced particle followed by how and when it was deactivated.
pub fn output_collision_data(particles: &[Particle], traced: &[usize], dir: &str) -> Result<()> {
    for &index in traced {
        let particle = &particles[index];
        let name = format!("part{}_collisions.out", index);
        let mut stream = open_output(dir, &name, false)?;

        writeln!(stream, "#time[s]\ttarget\ttheta[rad]\talt[km]")?;
        for event in &particle.collision_log {
            writeln!(stream, "{}", event)?;
        }
        match particle.deactivation {
            Some((time, reason)) => writeln!(stream, "{}\t\t{}", time, reason)?,
            None => writeln!(stream, "#still active")?,
        }
        stream.flush()
            .with_context(|| format!("Output error: could not write {}.", name))?;
    }
    Ok(())
}

/// Counts of `values` in bins of `bin_width` from zero, sized to the largest value plus ten bins.
pub fn bin_counts(values: &[f64], bin_width: f64) -> Result<Vec<f64>> {
    if !(bin_width > 0. && bin_width.is_finite()) {
        bail!("Numerical error: distribution bin width {} must be positive and finite.", bin_width);
    }

    let max_value = values.iter().cloned().fold(0., f64::max);
    let extent = (max_value/bin_width).floor() + 10.;
    if !extent.is_finite() || extent < 0. || values.iter().any(|value| !value.is_finite() || *value < 0.) {
        bail!("Numerical error: distribution extent {} from maximum {} is invalid.", extent, max_value);
    }
    if extent > MAX_DISTRO_BINS as f64 {
        bail!("Numerical error: distribution extent {} bins from maximum {} exceeds {} bins. Is a particle far outside the simulation?", extent, max_value, MAX_DISTRO_BINS);
    }

    let mut counts = Histogram::new(&[extent as usize]);
    for value in values {
        counts.add(&[bin_index(*value, 0., bin_width)], 1.);
    }
    Ok(counts.values().to_vec())
}

fn write_distro(dir: &str, name: &str, description: &str, bin_width: f64, counts: &[f64]) -> Result<()> {
    let mut stream = open_output(dir, name, false)?;
    write_header(&mut stream, description, &bin_width.to_string(), &counts.len().to_string())?;
    for count in counts {
        writeln!(stream, "{}", count)?;
    }
    stream.flush()
        .with_context(|| format!("Output error: could not write {}.", name))?;
    Ok(())
}

/// Altitude distribution of active particles; `bin_width` in cm.
pub fn output_altitude_distro(particles: &[Particle], planet: &Planet, bin_width: f64, dir: &str, name: &str) -> Result<()> {
    let altitudes: Vec<f64> = particles.iter()
        .filter(|particle| particle.is_active())
        .map(|particle| particle.radius() - planet.radius())
        .collect();
    let counts = bin_counts(&altitudes, bin_width)
        .context("Numerical error: could not bin altitudes. Are there active particles below the surface?")?;
    write_distro(dir, name, "altitude bin counts; bin width [cm], number of bins", bin_width, &counts)
}

/// Speed distribution of active particles; `bin_width` in cm/s.
pub fn output_velocity_distro(particles: &[Particle], bin_width: f64, dir: &str, name: &str) -> Result<()> {
    let speeds: Vec<f64> = particles.iter()
        .filter(|particle| particle.is_active())
        .map(|particle| particle.speed())
        .collect();
    let counts = bin_counts(&speeds, bin_width)?;
    write_distro(dir, name, "speed bin counts; bin width [cm/s], number of bins", bin_width, &counts)
}

/// Energy distribution of active particles in the 1 km slab above `alt` cm; `bin_width` in eV.
pub fn output_alt_energy_distro(particles: &[Particle], planet: &Planet, alt: f64, bin_width: f64, dir: &str, name: &str) -> Result<()> {
    let r = planet.radius() + alt;
    let energies: Vec<f64> = particles.iter()
        .filter(|particle| particle.is_active() && particle.radius() >= r && particle.radius() < r + SHELL_WIDTH)
        .map(|particle| particle.energy_eV())
        .collect();
    let counts = bin_counts(&energies, bin_width)?;
    write_distro(dir, name, "energy bin counts; bin width [eV], number of bins", bin_width, &counts)
}
