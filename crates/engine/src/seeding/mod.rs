//! Database Seeding
//!
//! Runs ordered seed scripts independently of migration state.

pub mod seeder;

pub use seeder::*;
