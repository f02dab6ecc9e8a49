//! Infrastructure layer: concrete providers, stores, and services

pub mod cache;
pub mod corpus;
pub mod embedding;
pub mod logging;
pub mod matching;
pub mod retrieval;
pub mod seeder;
pub mod store;
