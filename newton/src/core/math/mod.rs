pub mod ad;

pub use ad::Dual;
