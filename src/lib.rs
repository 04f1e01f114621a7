#![allow(non_snake_case)]
#![allow(non_camel_case_types)]

use std::{fmt};
use std::str::FromStr;

//Error handling crate
use anyhow::Result;
use anyhow::{anyhow, bail, Context};

//Serializing/Deserializing crate
use serde::*;

//Logging
use log::{info, warn};

//Progress bar crate
use indicatif::{ProgressBar, ProgressStyle};

//Random numbers
use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;
use rand_distr::Normal;
use rand_distr::Distribution as _;

//I/O
use std::fs::OpenOptions;
use std::io::prelude::*;
use std::io::BufWriter;

//itertools
use itertools::izip;

//Math
use std::f64::consts::PI;

//Load internal modules
pub mod consts;
pub mod structs;
pub mod enums;
pub mod planet;
pub mod particle;
pub mod interpolator;
pub mod background;
pub mod collision;
pub mod boundary;
pub mod active;
pub mod histogram;
pub mod statistics;
pub mod distribution;
pub mod input;
pub mod output;
pub mod simulation;

pub use crate::enums::*;
pub use crate::consts::*;
pub use crate::structs::*;
pub use crate::planet::Planet;
pub use crate::particle::{Particle, CollisionEvent};
pub use crate::interpolator::Interpolator;
pub use crate::background::{BackgroundAtmosphere, BackgroundSpecies, BackgroundSpeciesInput, DiffSigmaInput, ProfilesInput, calc_new_density, make_new_cdf};
pub use crate::collision::{CollisionPartner, CollisionSampler};
pub use crate::boundary::{BoundaryClassifier, EscapeTally};
pub use crate::active::ActiveIndexSet;
pub use crate::histogram::{Histogram, bin_index};
pub use crate::statistics::{StatisticsAccumulator, NormalizedStatistics};
pub use crate::distribution::Distribution;
pub use crate::input::Input;
pub use crate::simulation::{Atmosphere, OutputDirs, RunSummary};
