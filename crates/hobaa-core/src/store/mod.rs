mod registry;

pub use registry::SiteRegistry;
