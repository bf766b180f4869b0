pub mod is_close;
pub mod thermal;
