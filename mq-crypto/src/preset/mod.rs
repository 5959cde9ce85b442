pub mod sboxes;
