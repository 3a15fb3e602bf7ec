/// Metadata source adapters
pub mod caching;
pub mod declared;
pub mod dist_info;

pub use caching::CachingMetadataSource;
pub use declared::DeclaredMetadataSource;
pub use dist_info::DistInfoMetadataSource;
