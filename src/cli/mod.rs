mod args;

pub use args::Cli;

pub use args::parse;
