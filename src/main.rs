use clap::Parser;
use colored::Colorize;
use filefolder::{FileRecord, FolderRecord, ScanMode};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File or directory to inspect
    path: PathBuf,

    /// List every file below the directory, not only its immediate files
    #[arg(long, short = 'r')]
    recursive: bool,

    /// Compute content hashes and inferred dates (reads every file)
    #[arg(long, short = 'c')]
    calculated: bool,

    /// Print the folder export as JSON instead of a table
    #[arg(long, short = 'j')]
    json: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if args.path.is_file() {
        print_file(&args);
    } else if args.path.is_dir() {
        print_folder(&args);
    } else {
        eprintln!(
            "Error: '{}' is neither a file nor a directory.",
            args.path.display()
        );
        std::process::exit(1);
    }
}

fn print_file(args: &Args) {
    let record = match FileRecord::new(&args.path) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let meta = record.metadata();

    println!("{}", format!("=== {} ===", record.path().display()).cyan());
    println!("Name:      {}", record.name());
    println!("Extension: {}", record.extension());
    println!(
        "Size:      {} ({} bytes)",
        human_bytes::human_bytes(meta.file_size_bytes as f64).green(),
        meta.file_size_bytes
    );
    println!("Created:   {}", meta.created_time.format("%Y-%m-%d %H:%M:%S"));
    println!("Modified:  {}", meta.modified_time.format("%Y-%m-%d %H:%M:%S"));
    println!("Accessed:  {}", meta.accessed_time.format("%Y-%m-%d %H:%M:%S"));
    println!("Owner:     {}", meta.owner);

    if args.calculated {
        match record.hash() {
            Ok(hash) => println!("SHA-256:   {hash}"),
            Err(e) => println!("SHA-256:   {}", e.to_string().red()),
        }
        println!("Date:      {}", record.inferred_date());
    }
}

fn print_folder(args: &Args) {
    let mode = if args.recursive {
        ScanMode::Recursive
    } else {
        ScanMode::Shallow
    };
    let folder = FolderRecord::scan(&args.path, mode);

    let table = match folder.to_table(args.calculated) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if args.json {
        match table.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    println!("{}", format!("=== {} ===", folder.path().display()).cyan());
    if table.is_empty() {
        println!("{}", "No files found.".yellow());
    } else {
        println!("{}", table.to_comfy_table());
    }
    println!(
        "{} files, {} subfolders, {} total.",
        folder.files().len().to_string().green(),
        folder.subfolders().len().to_string().green(),
        human_bytes::human_bytes(folder.total_size_bytes() as f64).green()
    );
}
