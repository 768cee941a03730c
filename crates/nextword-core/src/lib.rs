// Library root for the shared next-word prediction model: input state,
// wire/UI protocol types, display formatting, the suggestion rule, and
// configuration loading.

pub mod config;
pub mod format;
pub mod input;
pub mod protocol;
pub mod suggestion;
