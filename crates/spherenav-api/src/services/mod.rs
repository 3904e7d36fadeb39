mod spheres;

pub use spheres::SphereService;
