pub mod help_overlay;
pub mod paged_list;
pub mod progress_bar;
pub mod search_input;
pub mod status_bar;
pub mod toast;
