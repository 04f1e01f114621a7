/// 3D vector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}
impl Vector {
    pub fn new(x: f64, y: f64, z: f64) -> Vector {
        Vector {
            x,
            y,
            z
        }
    }

    pub fn zero() -> Vector {
        Vector::new(0., 0., 0.)
    }

    /// Calculates vector magnitude.
    pub fn magnitude(&self) -> f64 {
        (self.x*self.x + self.y*self.y + self.z*self.z).sqrt()
    }

    pub fn magnitude_squared(&self) -> f64 {
        self.x*self.x + self.y*self.y + self.z*self.z
    }

    /// Normalizes vector components to magnitude 1.
    pub fn normalize(&mut self) {
        let magnitude = self.magnitude();
        self.x /= magnitude;
        self.y /= magnitude;
        self.z /= magnitude;
    }

    /// Add this vector and another and return a new vector.
    pub fn add(&self, other: &Vector) -> Vector {
        Vector::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    /// Subtract another vector from this one and return a new vector.
    pub fn sub(&self, other: &Vector) -> Vector {
        Vector::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn scale(&self, factor: f64) -> Vector {
        Vector::new(self.x*factor, self.y*factor, self.z*factor)
    }

    pub fn dot(&self, other: &Vector) -> f64 {
        self.x*other.x + self.y*other.y + self.z*other.z
    }
}

/// Rotate a unit direction by a polar deflection `psi` at azimuth `phi` about its own axis.
pub fn rotate_direction(dir: &Vector, psi: f64, phi: f64) -> Vector {
    //Direction cosine update from Moeller and Eckstein 1988 is singular along x;
    //rotate a cyclic permutation of the components instead and permute back.
    if (1. - dir.x*dir.x) < 1E-12 {
        let permuted = Vector::new(dir.y, dir.z, dir.x);
        let rotated = rotate_direction(&permuted, psi, phi);
        return Vector::new(rotated.z, rotated.x, rotated.y);
    }

    let cosx: f64 = dir.x;
    let cosy: f64 = dir.y;
    let cosz: f64 = dir.z;
    let cphi: f64 = phi.cos();
    let sphi: f64 = phi.sin();
    let sa = (1. - cosx*cosx).sqrt();

    let cpsi: f64 = psi.cos();
    let spsi: f64 = psi.sin();
    let cosx_new: f64 = cpsi*cosx + spsi*cphi*sa;
    let cosy_new: f64 = cpsi*cosy - spsi/sa*(cphi*cosx*cosy - sphi*cosz);
    let cosz_new: f64 = cpsi*cosz - spsi/sa*(cphi*cosx*cosz + sphi*cosy);

    let mut dir_new = Vector::new(cosx_new, cosy_new, cosz_new);
    dir_new.normalize();
    dir_new
}
