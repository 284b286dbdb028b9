use std::env;
use std::process;

mod builtins;
mod command;
mod editor;
mod history;
mod launcher;
mod parser;
mod pipes;
mod resolver;
mod shell;
mod tokenizer;

fn print_help() {
    println!("npshell - numbered-pipe shell");
    println!();
    println!("Usage: npshell [OPTIONS]");
    println!("  -h, --help       Print this help");
    println!("  -v, --version    Print version");
}

fn print_version() {
    println!("npshell v {}", env!("CARGO_PKG_VERSION"));
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_help();
        process::exit(0);
    }

    if args.iter().any(|a| a == "-v" || a == "--version" || a == "-V") {
        print_version();
        process::exit(0);
    }

    shell::Shell::new().run();
}
