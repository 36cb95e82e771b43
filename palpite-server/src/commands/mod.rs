pub mod generate;
pub mod records;

pub use generate::handle_generate_command;
pub use records::{handle_records_command, RecordCommands};
