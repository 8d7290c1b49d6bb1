//! Interactive terminal helpers.

pub mod editor;
pub mod file_box;
pub mod menu;

pub use editor::edit_message;
pub use file_box::display_file_box;
pub use menu::prompt_choice;
