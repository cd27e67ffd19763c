use crate::dims::Dimensions;
use crate::error::{Error, Result};
use crate::gateway::ModelSnapshot;
use crate::matrix::Matrix;
use crate::Quantity;
use std::path::Path;

/// A complete model: dimensions plus all three containers, already shaped to match.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Scenario {
    pub dims: Dimensions,
    pub alloc: Matrix,
    pub max: Matrix,
    pub avail: Vec<Quantity>,
}

const EXAMPLE_ALLOC: [[Quantity; 3]; 3] = [[0, 1, 0], [2, 0, 0], [3, 0, 2]];
const EXAMPLE_MAX: [[Quantity; 3]; 3] = [[7, 5, 3], [3, 2, 2], [9, 0, 2]];
const EXAMPLE_AVAIL: [Quantity; 3] = [5, 4, 5];

/// The fixed 3×3 classroom example loaded by the "load example" action.
pub fn example_scenario() -> Scenario {
    fn matrix(rows: &[[Quantity; 3]; 3]) -> Matrix {
        let rows: Vec<Vec<Quantity>> = rows.iter().map(|r| r.to_vec()).collect();
        Matrix::from_rows_lenient(3, 3, &rows)
    }
    Scenario {
        dims: Dimensions::new_unchecked(3, 3),
        alloc: matrix(&EXAMPLE_ALLOC),
        max: matrix(&EXAMPLE_MAX),
        avail: EXAMPLE_AVAIL.to_vec(),
    }
}

impl Scenario {
    /// Validates a snapshot's shape. Unlike backend graph data, a scenario must match
    /// its declared `P` and `R` exactly.
    pub fn from_snapshot(snapshot: &ModelSnapshot) -> Result<Self> {
        let dims = snapshot.dims().ok_or_else(|| {
            Error::Scenario(format!(
                "P={} R={} is not a usable size",
                snapshot.processes, snapshot.resources
            ))
        })?;
        let shaped = |name: &str, rows: &[Vec<Quantity>]| -> Result<Matrix> {
            if rows.len() != dims.processes() {
                return Err(Error::Scenario(format!(
                    "{} has {} rows, expected {}",
                    name,
                    rows.len(),
                    dims.processes()
                )));
            }
            Matrix::from_rows(dims.resources(), rows).ok_or_else(|| {
                Error::Scenario(format!(
                    "every {} row must have {} entries",
                    name,
                    dims.resources()
                ))
            })
        };
        let alloc = shaped("alloc", &snapshot.alloc)?;
        let max = shaped("maxd", &snapshot.maxd)?;
        if snapshot.avail.len() != dims.resources() {
            return Err(Error::Scenario(format!(
                "avail has {} entries, expected {}",
                snapshot.avail.len(),
                dims.resources()
            )));
        }
        Ok(Self {
            dims,
            alloc,
            max,
            avail: snapshot.avail.clone(),
        })
    }

    pub fn to_snapshot(&self) -> ModelSnapshot {
        ModelSnapshot {
            processes: self.dims.processes(),
            resources: self.dims.resources(),
            alloc: self.alloc.to_rows(),
            maxd: self.max.to_rows(),
            avail: self.avail.clone(),
        }
    }

    /// Parses a scenario in the same JSON shape as a check request.
    pub fn from_json(text: &str) -> Result<Self> {
        let snapshot: ModelSnapshot = serde_json::from_str(text)?;
        Self::from_snapshot(&snapshot)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_contents() {
        let ex = example_scenario();
        assert_eq!(ex.dims, Dimensions::new(3, 3).unwrap());
        assert_eq!(
            ex.alloc.to_rows(),
            vec![vec![0, 1, 0], vec![2, 0, 0], vec![3, 0, 2]]
        );
        assert_eq!(
            ex.max.to_rows(),
            vec![vec![7, 5, 3], vec![3, 2, 2], vec![9, 0, 2]]
        );
        assert_eq!(ex.avail, vec![5, 4, 5]);
    }

    #[test]
    fn json_round_trip() {
        let ex = example_scenario();
        let text = serde_json::to_string(&ex.to_snapshot()).unwrap();
        assert_eq!(Scenario::from_json(&text).unwrap(), ex);
    }

    #[test]
    fn shape_errors() {
        fn case(text: &str) {
            match Scenario::from_json(text) {
                Err(Error::Scenario(msg)) => println!("{} -> {}", text, msg),
                other => panic!("{} should be rejected, got {:?}", text, other),
            }
        }
        case(r#"{"P": 0, "R": 1, "alloc": [], "maxd": [], "avail": [0]}"#);
        case(r#"{"P": 1, "R": 1, "alloc": [], "maxd": [[1]], "avail": [0]}"#);
        case(r#"{"P": 1, "R": 2, "alloc": [[1]], "maxd": [[1, 2]], "avail": [0, 0]}"#);
        case(r#"{"P": 1, "R": 1, "alloc": [[1]], "maxd": [[1]], "avail": []}"#);
    }

    #[test]
    fn bad_json_is_a_json_error() {
        assert!(matches!(Scenario::from_json("{"), Err(Error::Json(_))));
        assert!(matches!(
            Scenario::load("/nonexistent/ragviz/scenario.json"),
            Err(Error::Io(_))
        ));
    }
}
