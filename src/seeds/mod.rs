pub mod studio_seed;
