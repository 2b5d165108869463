mod google_maps;

pub use google_maps::DistanceMatrix;
