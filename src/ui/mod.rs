pub mod panels;
pub mod widget;
