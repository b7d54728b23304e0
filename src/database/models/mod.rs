pub mod category;
pub mod contact_info;
pub mod content_section;
pub mod example_work;
pub mod product;

pub use category::{Category, CategoryInput};
pub use contact_info::{ContactInfo, ContactInput};
pub use content_section::{ContentSection, ContentInput};
pub use example_work::{ExampleWork, ExampleWorkInput};
pub use product::{Product, ProductInput, ProductView};

pub(crate) fn default_true() -> bool {
    true
}
