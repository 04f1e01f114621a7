use super::*;
use std::path::Path;
use toml::value::{Table, Value};

/// Top-level keys of an input file.
pub const INPUT_KEYS: [&str; 28] = [
    "num_testparts", "part_type", "dist_type", "pos_infile", "vel_infile", "num_traced",
    "output_dir", "trace_output_dir", "output_pos_dir", "output_stats_dir",
    "print_status_freq", "output_pos_freq", "timesteps", "dt", "ref_height", "ref_temp",
    "planet_mass", "planet_radius", "sim_lower_bound", "sim_upper_bound", "EDF_alts",
    "global_rate", "seed", "thermal_threshold", "relative_velocity_model",
    "write_distributions", "profiles", "background_species",
];

/// Keys of a `[profiles]` table.
pub const PROFILE_KEYS: [&str; 7] = [
    "profile_bottom_alt", "profile_top_alt", "temp_alt_bins", "Tn", "Ti", "Te", "dens_alt_bins",
];

/// Keys of a `[[background_species]]` table.
pub const BACKGROUND_SPECIES_KEYS: [&str; 8] = [
    "part_type", "ref_density", "scale_height", "temperature_source", "sigma_default",
    "sigma_table", "diff_sigma", "density_profile",
];

///This helper function is a workaround to issue #368 in serde
fn default_false() -> bool {
    false
}

///This helper function is a workaround to issue #368 in serde
fn default_global_rate() -> f64 {
    1.
}

///This helper function is a workaround to issue #368 in serde
fn default_thermal_threshold() -> ThermalThreshold {
    ThermalThreshold::ESCAPE
}

///This helper function is a workaround to issue #368 in serde
fn default_relative_velocity_model() -> RelativeVelocityModel {
    RelativeVelocityModel::SAMPLED
}

/// Internal representation of an input file. Lengths in cm, masses in g, times in s.
#[derive(Deserialize, Clone, Debug)]
pub struct Input {
    pub num_testparts: usize,
    pub part_type: String,
    pub dist_type: String,
    #[serde(default)]
    pub pos_infile: String,
    #[serde(default)]
    pub vel_infile: String,
    #[serde(default)]
    pub num_traced: usize,
    #[serde(default)]
    pub output_dir: String,
    #[serde(default)]
    pub trace_output_dir: String,
    #[serde(default)]
    pub output_pos_dir: String,
    #[serde(default)]
    pub output_stats_dir: String,
    /// Steps between status lines; 0 disables them.
    #[serde(default)]
    pub print_status_freq: usize,
    /// Steps between position snapshots; 0 disables them.
    #[serde(default)]
    pub output_pos_freq: usize,
    pub timesteps: usize,
    pub dt: f64,
    #[serde(default)]
    pub ref_height: f64,
    #[serde(default)]
    pub ref_temp: f64,
    pub planet_mass: f64,
    pub planet_radius: f64,
    pub sim_lower_bound: f64,
    pub sim_upper_bound: f64,
    /// Altitudes in km of the energy-angle distributions.
    #[serde(default)]
    pub EDF_alts: Vec<i64>,
    #[serde(default = "default_global_rate")]
    pub global_rate: f64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_thermal_threshold")]
    pub thermal_threshold: ThermalThreshold,
    #[serde(default = "default_relative_velocity_model")]
    pub relative_velocity_model: RelativeVelocityModel,
    #[serde(default = "default_false")]
    pub write_distributions: bool,
    #[serde(default)]
    pub profiles: Option<ProfilesInput>,
    #[serde(default)]
    pub background_species: Vec<BackgroundSpeciesInput>,
}

impl Input {
    /// Parse a TOML input file's contents, warning about keys nothing reads.
    pub fn from_toml(string: &str) -> Result<Input> {
        let value: Value = toml::from_str(string)
            .context("Input error: could not parse TOML input file.")?;
        warn_unknown_keys(&value);

        value.try_into::<Input>()
            .context("Input error: TOML input file does not describe a simulation.")
    }

    /// Parse a legacy `key value` configuration file's contents.
    pub fn from_cfg(string: &str) -> Result<Input> {
        let table = legacy_cfg_table(string)?;
        Value::Table(table).try_into::<Input>()
            .context("Input error: configuration file does not describe a simulation.")
    }

    /// Fill empty output directories from `output_dir`.
    pub fn apply_output_defaults(&mut self) {
        let output_dir = self.output_dir.clone();
        for dir in [&mut self.trace_output_dir, &mut self.output_pos_dir, &mut self.output_stats_dir] {
            if dir.is_empty() {
                *dir = output_dir.clone();
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_testparts == 0 {
            bail!("Input error: num_testparts must be greater than zero.");
        }
        if !(self.dt > 0. && self.dt.is_finite()) {
            bail!("Input error: dt must be positive, got {}.", self.dt);
        }
        if self.timesteps == 0 {
            bail!("Input error: timesteps must be greater than zero.");
        }
        if !(self.sim_upper_bound > self.sim_lower_bound) {
            bail!("Input error: sim_upper_bound {} must be above sim_lower_bound {}.", self.sim_upper_bound, self.sim_lower_bound);
        }
        if self.num_traced > self.num_testparts {
            bail!("Input error: num_traced {} exceeds num_testparts {}.", self.num_traced, self.num_testparts);
        }
        if self.ref_temp < 0. {
            bail!("Input error: ref_temp must be non-negative, got {}.", self.ref_temp);
        }
        if let Some(temperature) = self.thermal_threshold.temperature() {
            if !(temperature >= 0. && temperature.is_finite()) {
                bail!("Input error: thermal_threshold temperature must be non-negative, got {}.", temperature);
            }
        }
        if let Some(profiles) = &self.profiles {
            let temperature_lengths = [profiles.Tn.len(), profiles.Ti.len(), profiles.Te.len()];
            if temperature_lengths.iter().any(|&n| n != 0 && n != profiles.temp_alt_bins.len()) {
                bail!("Input error: temperature profiles must match temp_alt_bins in length.");
            }
        }
        for species in &self.background_species {
            let has_profile = self.profiles.as_ref().map_or(false, |p| !p.dens_alt_bins.is_empty());
            if !species.density_profile.is_empty() && !has_profile {
                bail!("Input error: density_profile for {} given without profiles.dens_alt_bins.", species.part_type);
            }
            if !species.sigma_table.windows(2).all(|pair| pair[1].0 > pair[0].0) {
                bail!("Input error: sigma_table for {} must be sorted by energy.", species.part_type);
            }
        }
        Ok(())
    }
}

/// Read, parse and validate an input file. Files ending in `.cfg` use the legacy format; anything else is TOML.
pub fn input(input_file: &str) -> Result<Input> {
    let mut input_string = String::new();
    let mut file = OpenOptions::new()
        .read(true)
        .write(false)
        .create(false)
        .open(input_file)
        .with_context(|| format!("Input error: could not open input file {}.", input_file))?;
    file.read_to_string(&mut input_string)
        .with_context(|| format!("Input error: could not read input file {}.", input_file))?;

    let is_legacy = Path::new(input_file).extension().map_or(false, |extension| extension == "cfg");
    let mut input = if is_legacy {
        Input::from_cfg(&input_string)?
    } else {
        Input::from_toml(&input_string)?
    };

    input.apply_output_defaults();
    input.validate()?;
    Ok(input)
}

/// Warn about every key in `value` that no input struct reads.
pub fn warn_unknown_keys(value: &Value) -> Vec<String> {
    let mut unknown = vec![];
    if let Some(table) = value.as_table() {
        unknown.extend(unknown_keys(table, &INPUT_KEYS, ""));

        if let Some(profiles) = table.get("profiles").and_then(Value::as_table) {
            unknown.extend(unknown_keys(profiles, &PROFILE_KEYS, "profiles."));
        }

        if let Some(species) = table.get("background_species").and_then(Value::as_array) {
            for (index, entry) in species.iter().enumerate() {
                if let Some(entry) = entry.as_table() {
                    let prefix = format!("background_species[{}].", index);
                    unknown.extend(unknown_keys(entry, &BACKGROUND_SPECIES_KEYS, &prefix));
                }
            }
        }
    }

    for key in &unknown {
        warn!("Input warning: unrecognized key {} is ignored.", key);
    }
    unknown
}

fn unknown_keys(table: &Table, known: &[&str], prefix: &str) -> Vec<String> {
    table.keys()
        .filter(|key| !known.contains(&key.as_str()))
        .map(|key| format!("{}{}", prefix, key))
        .collect()
}

//Legacy key/value configuration
const LEGACY_INTEGER_KEYS: [&str; 6] = ["num_testparts", "num_traced", "print_status_freq", "output_pos_freq", "timesteps", "seed"];
const LEGACY_FLOAT_KEYS: [&str; 8] = ["dt", "ref_height", "ref_temp", "planet_mass", "planet_radius", "sim_lower_bound", "sim_upper_bound", "global_rate"];
const LEGACY_STRING_KEYS: [&str; 7] = ["part_type", "dist_type", "pos_infile", "output_dir", "trace_output_dir", "output_pos_dir", "output_stats_dir"];
const LEGACY_PROFILE_KEYS: [&str; 2] = ["profile_bottom_alt", "profile_top_alt"];

/// First two whitespace-separated tokens of each non-comment line.
pub fn legacy_cfg_lines(string: &str) -> Vec<(String, String)> {
    string.lines()
        .filter(|line| !line.starts_with('#') && !line.trim().is_empty())
        .map(|line| {
            let mut tokens = line.split_whitespace();
            let key = tokens.next().unwrap_or_default().to_string();
            let value = tokens.next().unwrap_or_default().to_string();
            (key, value)
        })
        .collect()
}

fn parse_legacy<T: FromStr>(key: &str, value: &str) -> Result<T>
where <T as FromStr>::Err: std::error::Error + Send + Sync + 'static {
    value.parse::<T>()
        .with_context(|| format!("Input error: could not parse value {} of {}.", value, key))
}

/// Build an input table from a legacy configuration. Each recognized key is matched exactly as written,
/// including `vel_infle` for the velocity import file.
pub fn legacy_cfg_table(string: &str) -> Result<Table> {
    let lines = legacy_cfg_lines(string);
    let mut consumed = vec![false; lines.len()];
    let mut table = Table::new();
    let mut profiles = Table::new();
    let mut species_files: Vec<String> = vec![];
    let mut temp_profile: Option<String> = None;
    let mut neutral_densities: Option<String> = None;

    let mut i = 0;
    while i < lines.len() {
        let (key, value) = (&lines[i].0, &lines[i].1);

        //Positional lists: the value column of the following lines
        let list_length = match key.as_str() {
            "num_bgparts" | "num_EDFs" => Some(parse_legacy::<usize>(key, value)?),
            _ => None,
        };

        if let Some(n) = list_length {
            if i + n >= lines.len() {
                bail!("Input error: {} {} is followed by only {} lines.", key, n, lines.len() - i - 1);
            }
            consumed[i] = true;
            let entries: Vec<&String> = lines[i + 1..=i + n].iter().map(|(_, value)| value).collect();
            if key == "num_bgparts" {
                species_files.extend(entries.into_iter().cloned());
            } else {
                let alts = entries.into_iter()
                    .map(|alt| parse_legacy::<i64>("num_EDFs", alt).map(Value::Integer))
                    .collect::<Result<Vec<Value>>>()?;
                table.insert("EDF_alts".to_string(), Value::Array(alts));
            }
            for flag in consumed[i + 1..=i + n].iter_mut() {
                *flag = true;
            }
            i += n + 1;
            continue;
        }

        let recognized = if LEGACY_INTEGER_KEYS.contains(&key.as_str()) {
            table.insert(key.clone(), Value::Integer(parse_legacy::<i64>(key, value)?));
            true
        } else if LEGACY_FLOAT_KEYS.contains(&key.as_str()) {
            table.insert(key.clone(), Value::Float(parse_legacy::<f64>(key, value)?));
            true
        } else if LEGACY_STRING_KEYS.contains(&key.as_str()) {
            table.insert(key.clone(), Value::String(value.clone()));
            true
        } else if LEGACY_PROFILE_KEYS.contains(&key.as_str()) {
            profiles.insert(key.clone(), Value::Float(parse_legacy::<f64>(key, value)?));
            true
        } else {
            match key.as_str() {
                "vel_infle" => {
                    table.insert("vel_infile".to_string(), Value::String(value.clone()));
                    true
                },
                "temp_profile" => {
                    temp_profile = Some(value.clone());
                    true
                },
                "neutral_densities" => {
                    neutral_densities = Some(value.clone());
                    true
                },
                "ion_densities" => {
                    warn!("Input warning: ion_densities {} is read but not used.", value);
                    true
                },
                _ => false,
            }
        };

        consumed[i] = recognized;
        i += 1;
    }

    for ((key, _), _) in lines.iter().zip(&consumed).filter(|(_, used)| !**used) {
        warn!("Input warning: unrecognized key {} is ignored.", key);
    }

    let mut species_tables = species_files.iter()
        .map(|path| {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Input error: could not read background species file {}.", path))?;
            let value: Value = toml::from_str(&contents)
                .with_context(|| format!("Input error: could not parse background species file {}.", path))?;
            match value {
                Value::Table(species) => {
                    for key in unknown_keys(&species, &BACKGROUND_SPECIES_KEYS, "") {
                        warn!("Input warning: unrecognized key {} in {} is ignored.", key, path);
                    }
                    Ok(species)
                },
                _ => Err(anyhow!("Input error: background species file {} is not a table.", path)),
            }
        })
        .collect::<Result<Vec<Table>>>()?;

    if let Some(path) = &temp_profile {
        let columns = read_columns(path)?;
        let names = ["temp_alt_bins", "Tn", "Ti", "Te"];
        for (name, column) in names.iter().zip(columns) {
            profiles.insert(name.to_string(), float_array(column));
        }
    }

    if let Some(path) = &neutral_densities {
        let mut columns = read_columns(path)?.into_iter();
        if let Some(alts) = columns.next() {
            profiles.insert("dens_alt_bins".to_string(), float_array(alts));
        }
        let density_columns: Vec<Vec<f64>> = columns.collect();
        if density_columns.len() < species_tables.len() {
            bail!("Input error: {} has {} density columns for {} background species.", path, density_columns.len(), species_tables.len());
        }
        for (species, column) in species_tables.iter_mut().zip(density_columns) {
            species.insert("density_profile".to_string(), float_array(column));
        }
    }

    if !profiles.is_empty() {
        table.insert("profiles".to_string(), Value::Table(profiles));
    }
    table.insert("background_species".to_string(), Value::Array(species_tables.into_iter().map(Value::Table).collect()));

    Ok(table)
}

fn float_array(values: Vec<f64>) -> Value {
    Value::Array(values.into_iter().map(Value::Float).collect())
}

/// Rows of whitespace-separated floats, skipping blank and `#` lines.
pub fn read_rows(path: &str) -> Result<Vec<Vec<f64>>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Input error: could not read {}.", path))?;

    contents.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
        .map(|(line_number, line)| {
            line.split_whitespace()
                .map(|value| value.parse::<f64>())
                .collect::<Result<Vec<f64>, _>>()
                .with_context(|| format!("Input error: could not parse line {} of {}.", line_number + 1, path))
        })
        .collect()
}

/// Columns of a whitespace-separated table; every row must have the first row's width.
pub fn read_columns(path: &str) -> Result<Vec<Vec<f64>>> {
    let rows = read_rows(path)?;
    let width = rows.first().map_or(0, |row| row.len());
    if rows.iter().any(|row| row.len() != width) {
        bail!("Input error: rows of {} differ in length.", path);
    }

    Ok((0..width).map(|column| rows.iter().map(|row| row[column]).collect()).collect())
}
