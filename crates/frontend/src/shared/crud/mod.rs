pub mod controller;
pub mod details;
pub mod form;
pub mod page;

pub use controller::{
    ControllerError, CrudController, ListQuery, LoadState, Notification, NotificationLevel,
    SortSpec, ViewMode,
};
pub use page::crud_page;
