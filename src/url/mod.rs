//! URL normalization and same-host policy

mod normalizer;

pub use normalizer::UrlNormalizer;
