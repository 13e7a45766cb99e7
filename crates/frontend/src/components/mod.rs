pub mod controls;
pub mod help_overlay;
