//! Debug script to see what the IDL frontend produces.
//!
//! Usage: debug_parse <file.idl> [import_dir...]

use std::path::{Path, PathBuf};

use idl_compat::frontend::create_frontend;

fn main() {
    let mut args = std::env::args().skip(1);
    let Some(file) = args.next() else {
        eprintln!("usage: debug_parse <file.idl> [import_dir...]");
        std::process::exit(2);
    };
    let path = Path::new(&file);

    let mut import_dirs: Vec<PathBuf> = args.map(PathBuf::from).collect();
    if import_dirs.is_empty() {
        import_dirs.push(path.parent().unwrap_or(Path::new(".")).to_path_buf());
    }

    let mut frontend = match create_frontend("idl") {
        Ok(frontend) => frontend,
        Err(e) => {
            println!("Error: {:?}", e);
            return;
        }
    };

    match frontend.parse_file(path, &import_dirs) {
        Ok(parsed) => {
            println!("Parsed file: {:?}", parsed.path);
            println!("\nCommands:");
            for cmd in &parsed.commands {
                println!(
                    "  {} (api_version: {:?}, imported: {}, namespace: {})",
                    cmd.name,
                    cmd.api_version,
                    cmd.imported,
                    cmd.namespace.as_str()
                );
                for field in &cmd.parameters.fields {
                    println!("    {}: {} {:?}", field.name, field.type_ref, field.stability);
                }
                if let Some(reply) = &cmd.reply_type {
                    println!("    reply: {}", reply);
                }
            }
            println!("\nStructs:");
            for s in &parsed.structs {
                println!("  {}", s.name);
                for field in &s.fields {
                    println!("    {}: {} {:?}", field.name, field.type_ref, field.stability);
                }
            }
            println!("\nVisible symbols: {}", parsed.symbols.len());
        }
        Err(e) => {
            println!("Error: {:?}", e);
        }
    }
}
