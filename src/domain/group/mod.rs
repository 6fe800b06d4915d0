pub mod model;
pub mod repository;

pub use model::Group;
pub use repository::GroupRepository;
