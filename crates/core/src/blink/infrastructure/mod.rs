pub mod geometry_closure_classifier;
pub mod probability_closure_classifier;
