pub mod fonparam;
pub mod local;
pub mod util;

pub use fonparam::FonparamProvider;
pub use local::LocalDatasetProvider;
