mod central_panel;
mod diagram_list;
mod toolbar;

pub use central_panel::{central_panel, EMPTY_STATE_TEXT};
pub use diagram_list::{diagram_list, ListAction};
pub use toolbar::{toolbar, ToolbarAction, ToolbarView};
