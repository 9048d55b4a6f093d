pub mod discovery;
pub mod excel_write;
pub mod text_read;
