pub mod matcher;
pub mod slug;

pub use matcher::branches_for;
pub use slug::slugify;
