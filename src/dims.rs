use crate::coerce::parse_number;
use crate::Quantity;
use log::debug;

/// The shape of the model: `processes` rows by `resources` columns.
///
/// Both counts are always >= 1. "No model" is represented by `Option<Dimensions>::None`
/// rather than by a zero count, so every `Dimensions` value describes a real grid.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Dimensions {
    processes: usize,
    resources: usize,
}

impl Dimensions {
    /// Returns `None` if either count is zero, or if a `processes × resources` grid of
    /// quantities could not be addressed at all.
    pub fn new(processes: usize, resources: usize) -> Option<Self> {
        if processes == 0 || resources == 0 {
            return None;
        }
        let bytes = processes
            .checked_mul(resources)
            .and_then(|cells| cells.checked_mul(core::mem::size_of::<Quantity>()));
        if bytes.map_or(true, |b| b > isize::MAX as usize) {
            debug!("{}×{} does not fit in memory", processes, resources);
            return None;
        }
        Some(Self {
            processes,
            resources,
        })
    }

    /// For sizes known at compile time. Both counts must be nonzero.
    pub(crate) const fn new_unchecked(processes: usize, resources: usize) -> Self {
        Self {
            processes,
            resources,
        }
    }

    /// Parses the two dimension inputs. Missing, non-numeric, or non-positive values
    /// produce `None`; the caller treats that as "not ready yet", not as an error.
    pub fn parse(processes: &str, resources: &str) -> Option<Self> {
        let p = parse_count(processes);
        let r = parse_count(resources);
        match (p, r) {
            (Some(p), Some(r)) => Self::new(p, r),
            _ => {
                debug!(
                    "dimension input incomplete: P={:?} R={:?}",
                    processes, resources
                );
                None
            }
        }
    }

    pub fn processes(&self) -> usize {
        self.processes
    }

    pub fn resources(&self) -> usize {
        self.resources
    }

    pub fn num_cells(&self) -> usize {
        self.processes * self.resources
    }

    pub fn contains(&self, process: usize, resource: usize) -> bool {
        process < self.processes && resource < self.resources
    }
}

impl core::fmt::Display for Dimensions {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(fmt, "{}×{}", self.processes, self.resources)
    }
}

fn parse_count(raw: &str) -> Option<usize> {
    let n = parse_number(raw)?.trunc();
    if n >= 1.0 && n.is_finite() {
        // saturating
        Some(n as usize)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    #[test]
    fn parse_test() {
        fn case(p: &str, r: &str, expected: Option<(usize, usize)>) {
            let dims = Dimensions::parse(p, r);
            assert_eq!(
                dims.map(|d| (d.processes(), d.resources())),
                expected,
                "P={:?} R={:?}",
                p,
                r
            );
        }
        init_test();
        case("3", "3", Some((3, 3)));
        case(" 4 ", "2", Some((4, 2)));
        case("2.9", "1", Some((2, 1)));
        case("", "3", None);
        case("3", "", None);
        case("0", "3", None);
        case("-2", "3", None);
        case("abc", "3", None);
        case("0.5", "3", None);
        case("300", "2", Some((300, 2)));
        case("1000", "1000", Some((1000, 1000)));
        case("Infinity", "1", None);
    }

    #[test]
    fn new_rejects_zero() {
        assert!(Dimensions::new(0, 1).is_none());
        assert!(Dimensions::new(usize::MAX, 2).is_none());
        assert!(Dimensions::new(1, 0).is_none());
        let d = Dimensions::new(2, 5).unwrap();
        assert_eq!(d.num_cells(), 10);
        assert!(d.contains(1, 4));
        assert!(!d.contains(2, 0));
        assert!(!d.contains(0, 5));
        assert_eq!(d.to_string(), "2×5");
    }
}
