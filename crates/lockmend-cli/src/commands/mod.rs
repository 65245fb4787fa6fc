pub mod auto;
pub mod fix;
pub mod output;
pub mod reset;
pub mod resolutions;
pub mod shrink;
pub mod version;
