//! UI components for the Basket desktop app

mod add_category_form;
mod category_section;
mod empty_state;
mod item_row;
mod list_header;
mod list_view;
mod sign_in;

pub use add_category_form::AddCategoryForm;
pub use category_section::CategorySection;
pub use empty_state::EmptyState;
pub use item_row::ItemRow;
pub use list_header::ListHeader;
pub use list_view::ListView;
pub use sign_in::SignIn;
