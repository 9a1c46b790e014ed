use crate::StrError;
use russell_lab::Vector;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

/// Holds the grain orientation data of all grains
///
/// The data is a flat list of `offset × n_grains` values, one contiguous block
/// per grain, indexed by the grain id (the cell attribute).
#[derive(Clone, Debug)]
pub struct GrainData {
    /// Number of values defining one grain orientation
    pub offset: usize,

    /// Number of grains
    pub n_grains: usize,

    /// Flat orientation values (offset × n_grains)
    pub values: Vector,
}

impl GrainData {
    /// Reads the grain orientation data from a text file
    ///
    /// The file must contain `offset × n_grains` whitespace-separated numbers,
    /// one contiguous block per grain, in grain-id order.
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read_text_file<P>(full_path: &P, n_grains: usize, offset: usize) -> Result<Self, StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let contents = fs::read_to_string(&path).map_err(|_| "cannot open grain file")?;
        let mut values = Vec::new();
        for word in contents.split_whitespace() {
            let number: f64 = word.parse().map_err(|_| "cannot parse number in grain file")?;
            values.push(number);
        }
        if values.len() != offset * n_grains {
            return Err("grain file does not contain offset × n_grains values");
        }
        Ok(GrainData {
            offset,
            n_grains,
            values: Vector::from(&values),
        })
    }

    /// Allocates a new instance with the same orientation vector for all grains
    pub fn from_uniform(vector: &[f64], n_grains: usize) -> Result<Self, StrError> {
        if vector.len() != 3 {
            return Err("the uniform grain orientation vector must have three components");
        }
        if n_grains < 1 {
            return Err("the number of grains must be at least one");
        }
        let offset = vector.len();
        let mut values = Vector::new(offset * n_grains);
        for g in 0..n_grains {
            for k in 0..offset {
                values[k + offset * g] = vector[k];
            }
        }
        Ok(GrainData {
            offset,
            n_grains,
            values,
        })
    }

    /// Returns the orientation vector of a grain
    pub fn orientation(&self, grain_id: usize) -> Result<&[f64], StrError> {
        if grain_id >= self.n_grains {
            return Err("grain id (cell attribute) is out-of-bounds of the grain data");
        }
        let start = grain_id * self.offset;
        Ok(&self.values.as_data()[start..start + self.offset])
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::GrainData;
    use crate::base::DEFAULT_TEST_DIR;
    use std::fs;

    #[test]
    fn read_text_file_works() {
        fs::create_dir_all(DEFAULT_TEST_DIR).unwrap();
        let path = format!("{}/grains.txt", DEFAULT_TEST_DIR);
        fs::write(&path, "0.1 0.2 0.3\n1.1 1.2 1.3\n").unwrap();
        let grains = GrainData::read_text_file(&path, 2, 3).unwrap();
        assert_eq!(grains.offset, 3);
        assert_eq!(grains.n_grains, 2);
        assert_eq!(grains.orientation(0).unwrap(), &[0.1, 0.2, 0.3]);
        assert_eq!(grains.orientation(1).unwrap(), &[1.1, 1.2, 1.3]);
    }

    #[test]
    fn read_text_file_captures_errors() {
        assert_eq!(
            GrainData::read_text_file("__inexistent__.txt", 1, 3).err(),
            Some("cannot open grain file")
        );
        fs::create_dir_all(DEFAULT_TEST_DIR).unwrap();
        let path = format!("{}/grains_bad.txt", DEFAULT_TEST_DIR);
        fs::write(&path, "0.1 what 0.3\n").unwrap();
        assert_eq!(
            GrainData::read_text_file(&path, 1, 3).err(),
            Some("cannot parse number in grain file")
        );
        let path = format!("{}/grains_short.txt", DEFAULT_TEST_DIR);
        fs::write(&path, "0.1 0.2\n").unwrap();
        assert_eq!(
            GrainData::read_text_file(&path, 1, 3).err(),
            Some("grain file does not contain offset × n_grains values")
        );
    }

    #[test]
    fn from_uniform_works() {
        let grains = GrainData::from_uniform(&[1.0, 0.0, 0.0], 3).unwrap();
        assert_eq!(grains.offset, 3);
        assert_eq!(grains.n_grains, 3);
        for g in 0..3 {
            assert_eq!(grains.orientation(g).unwrap(), &[1.0, 0.0, 0.0]);
        }
        assert_eq!(
            grains.orientation(3).err(),
            Some("grain id (cell attribute) is out-of-bounds of the grain data")
        );
    }

    #[test]
    fn from_uniform_captures_errors() {
        assert_eq!(
            GrainData::from_uniform(&[1.0], 1).err(),
            Some("the uniform grain orientation vector must have three components")
        );
        assert_eq!(
            GrainData::from_uniform(&[1.0, 0.0, 0.0], 0).err(),
            Some("the number of grains must be at least one")
        );
    }
}
