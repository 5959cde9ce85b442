pub mod errors;
pub mod field;
pub mod generator;
pub mod preset;
pub mod ring;
pub mod sbox;
pub mod spn;
pub mod system;
