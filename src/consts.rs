use super::*;

//Physical constants, CGS
/// Gravitational constant in cm^3 g^-1 s^-2.
pub const G: f64 = 6.67430E-8;
/// Boltzmann constant in erg/K.
pub const K_B: f64 = 1.380649E-16;
/// One atomic mass unit in grams.
pub const AMU: f64 = 1.66053906660E-24;
/// One electron-volt in ergs.
pub const EV: f64 = 1.602176634E-12;
/// One kilometer in centimeters.
pub const KM: f64 = 1E5;
/// 2*pi.
pub const TWO_PI: f64 = 2.*PI;

//Statistics extents
/// Width of one altitude shell in cm.
pub const SHELL_WIDTH: f64 = KM;
/// Number of altitude shells tracked by the 1D histograms.
pub const NUM_SHELLS: usize = 100001;
/// Edge length of one 2D image pixel in cm (100 km).
pub const PIXEL_WIDTH: f64 = 100.*KM;
/// Pixels per side of the 2D image; pixel 512 is centered on the planet.
pub const IMAGE_SIZE: usize = 1025;
/// Energy bin width of the EDFs in eV.
pub const EDF_ENERGY_BIN: f64 = 0.05;
/// Cosine bin width of the EDFs.
pub const EDF_COS_BIN: f64 = 0.01;
/// Bins per EDF axis.
pub const EDF_BINS: usize = 201;
/// Largest bin count a diagnostic distribution may derive from its data.
pub const MAX_DISTRO_BINS: usize = 10_000_000;
