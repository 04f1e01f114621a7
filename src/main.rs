use anyhow::Result;
use log::info;

use libcorona3d::*;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let input_file = match args.len() {
        1 => "corona3d_2020.cfg".to_string(),
        2 => args[1].clone(),
        _ => anyhow::bail!("Too many command line arguments. Usage: corona3d [input file]"),
    };

    println!("Initializing Simulation...");
    let input = input::input(&input_file)?;
    info!("Read {} with {} background species.", input_file, input.background_species.len());

    let mut atmosphere = Atmosphere::from_input(&input)?;

    if input.write_distributions {
        atmosphere.output_distributions("")?;
    }

    atmosphere.run(input.dt, input.timesteps, input.sim_lower_bound, input.sim_upper_bound,
        input.print_status_freq, input.output_pos_freq)?;

    if input.write_distributions {
        atmosphere.output_distributions("2")?;
    }

    Ok(())
}
