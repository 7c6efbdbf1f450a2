pub mod rng;
pub mod sample_pool;

pub use rng::XorShift64;
pub use sample_pool::SamplePool;
