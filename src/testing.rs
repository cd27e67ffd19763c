use crate::dims::Dimensions;

pub fn init_test() {
    drop(env_logger::try_init());
}

pub fn dims(p: usize, r: usize) -> Dimensions {
    Dimensions::new(p, r).unwrap()
}
